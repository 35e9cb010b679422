//! Randomness and batch execution

use crate::battle::{resolve, BattleOptions, BattleResult};
use crate::config::BattleScenario;
use crate::stats::AggregatedStats;
use rayon::prelude::*;
use tracing::debug;

/// Source of the uniform draws a battle consumes
pub trait Dice {
    /// Uniform draw in [0, 1)
    fn next_f64(&mut self) -> f64;

    /// True with probability `chance`
    #[inline(always)]
    fn roll(&mut self, chance: f64) -> bool {
        self.next_f64() < chance
    }

    /// Uniform index in 0..len
    #[inline(always)]
    fn pick(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_f64() * len as f64) as usize).min(len - 1)
    }
}

/// Fast RNG wrapper for better performance
#[derive(Clone)]
pub struct FastRng {
    inner: fastrand::Rng,
}

impl FastRng {
    #[inline(always)]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: fastrand::Rng::with_seed(seed),
        }
    }

    /// Seeded from the thread RNG
    pub fn from_entropy() -> Self {
        Self::new(rand::random::<u64>())
    }
}

impl Dice for FastRng {
    #[inline(always)]
    fn next_f64(&mut self) -> f64 {
        self.inner.f64()
    }

    #[inline(always)]
    fn pick(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.inner.usize(..len)
    }
}

/// Replays a fixed draw sequence, cycling when it runs out
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    draws: Vec<f64>,
    cursor: usize,
}

impl ScriptedDice {
    pub fn new(draws: Vec<f64>) -> Self {
        let draws = if draws.is_empty() { vec![0.0] } else { draws };
        Self { draws, cursor: 0 }
    }

    /// Every draw returns `value`
    pub fn always(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// Draws consumed so far
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl Dice for ScriptedDice {
    fn next_f64(&mut self) -> f64 {
        let value = self.draws[self.cursor % self.draws.len()];
        self.cursor += 1;
        value
    }
}

/// Run a single battle with a fresh random seed
pub fn run_battle(scenario: &BattleScenario, options: &BattleOptions) -> BattleResult {
    let mut rng = FastRng::from_entropy();
    run_battle_with_rng(scenario, options, &mut rng)
}

/// Run a single battle with a specific seed
pub fn run_battle_with_seed(scenario: &BattleScenario, options: &BattleOptions, seed: u64) -> BattleResult {
    let mut rng = FastRng::new(seed);
    run_battle_with_rng(scenario, options, &mut rng)
}

pub fn run_battle_with_rng<D: Dice + ?Sized>(
    scenario: &BattleScenario,
    options: &BattleOptions,
    dice: &mut D,
) -> BattleResult {
    resolve(
        &scenario.team,
        scenario.boss.as_ref(),
        &scenario.config,
        &scenario.reserve,
        options,
        dice,
    )
}

/// Batch battles skip event lines
fn batch_options(scenario: &BattleScenario) -> BattleOptions {
    BattleOptions {
        fast_log: true,
        max_rounds: scenario.max_rounds,
        ..BattleOptions::default()
    }
}

/// Run multiple battles in parallel, battle `i` seeded with `base_seed + i`
pub fn run_simulations_parallel(scenario: &BattleScenario, count: usize, base_seed: u64) -> Vec<BattleResult> {
    let options = batch_options(scenario);
    debug!(count, base_seed, threads = rayon::current_num_threads(), "parallel batch");
    (0..count)
        .into_par_iter()
        .map(|i| run_battle_with_seed(scenario, &options, base_seed.wrapping_add(i as u64)))
        .collect()
}

/// Run multiple battles sequentially from one RNG stream
pub fn run_simulations_sequential(scenario: &BattleScenario, count: usize, seed: u64) -> Vec<BattleResult> {
    let options = batch_options(scenario);
    debug!(count, seed, "sequential batch");
    let mut rng = FastRng::new(seed);
    (0..count)
        .map(|_| run_battle_with_rng(scenario, &options, &mut rng))
        .collect()
}

/// Run battles and return aggregated stats
pub fn run_and_aggregate(
    scenario: &BattleScenario,
    count: usize,
    parallel: bool,
    seed: Option<u64>,
) -> AggregatedStats {
    let seed = seed.unwrap_or_else(rand::random::<u64>);
    let results = if parallel {
        run_simulations_parallel(scenario, count, seed)
    } else {
        run_simulations_sequential(scenario, count, seed)
    };

    AggregatedStats::from_results(&results)
}
