//! Summary statistics over a batch of battles

use crate::battle::{BattleResult, Outcome};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedStats {
    pub total: usize,
    pub victories: usize,
    pub defeats: usize,
    pub errors: usize,
    pub win_rate: f64,
    /// Averaged over victories only
    pub avg_team_hp_remaining: f64,
    pub avg_boss_hp_remaining: f64,
    pub avg_rounds: f64,
    pub min_rounds: u32,
    pub max_rounds: u32,
}

impl AggregatedStats {
    pub fn from_results(results: &[BattleResult]) -> Self {
        if results.is_empty() {
            return Self::default();
        }

        let mut stats = Self {
            total: results.len(),
            min_rounds: u32::MAX,
            ..Self::default()
        };
        let mut team_hp = 0.0;
        let mut boss_hp = 0.0;
        let mut rounds = 0.0;
        let mut fought = 0usize;

        for result in results {
            match result.outcome {
                Outcome::Victory => {
                    stats.victories += 1;
                    team_hp += result.team_hp_remaining() as f64;
                }
                Outcome::Defeat => stats.defeats += 1,
                Outcome::Error(_) => {
                    stats.errors += 1;
                    continue;
                }
            }
            fought += 1;
            boss_hp += result.boss_remaining_hp.max(0) as f64;
            rounds += result.rounds as f64;
            stats.min_rounds = stats.min_rounds.min(result.rounds);
            stats.max_rounds = stats.max_rounds.max(result.rounds);
        }

        stats.win_rate = stats.victories as f64 / stats.total as f64;
        if stats.victories > 0 {
            stats.avg_team_hp_remaining = team_hp / stats.victories as f64;
        }
        if fought > 0 {
            stats.avg_boss_hp_remaining = boss_hp / fought as f64;
            stats.avg_rounds = rounds / fought as f64;
        } else {
            stats.min_rounds = 0;
        }
        stats
    }
}

impl fmt::Display for AggregatedStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Battles:      {}", self.total)?;
        writeln!(
            f,
            "Win rate:     {:.2}% ({} won, {} lost, {} errors)",
            self.win_rate * 100.0,
            self.victories,
            self.defeats,
            self.errors
        )?;
        writeln!(
            f,
            "Rounds:       avg {:.1} (min {}, max {})",
            self.avg_rounds, self.min_rounds, self.max_rounds
        )?;
        writeln!(f, "Team HP left: {:.0} (avg per victory)", self.avg_team_hp_remaining)?;
        write!(f, "Boss HP left: {:.0} (avg)", self.avg_boss_hp_remaining)
    }
}
