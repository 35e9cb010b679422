//! Round-by-round battle resolution

use crate::boss::{AttackCount, Boss, BossUnit, DamageMultiplier, Interception, Targeting};
use crate::card::{scale, unit_attack, CombatUnit, RosterCard};
use crate::error::BattleError;
use crate::simulation::Dice;
use crate::skills::{BattleConfig, Mechanic};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, trace};

/// Extra attacks a unit can chain in one turn
pub const MAX_EXTRA_ATTACKS: u32 = 5;

pub const DEFAULT_MAX_ROUNDS: u32 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BattleOptions {
    /// Skip per-event lines, keep only the start and result lines
    pub fast_log: bool,
    /// Sample round-scoped lines every N rounds
    pub log_every: u32,
    pub max_rounds: u32,
}

impl Default for BattleOptions {
    fn default() -> Self {
        Self {
            fast_log: false,
            log_every: 1,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

impl BattleOptions {
    pub fn fast() -> Self {
        Self {
            fast_log: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Victory,
    Defeat,
    Error(BattleError),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Victory => write!(f, "Victory"),
            Outcome::Defeat => write!(f, "Defeat"),
            Outcome::Error(_) => write!(f, "Error"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BattleResult {
    pub outcome: Outcome,
    pub log: Vec<String>,
    pub final_team: Vec<CombatUnit>,
    pub boss_remaining_hp: i64,
    pub rounds: u32,
}

impl BattleResult {
    fn error(error: BattleError) -> Self {
        Self {
            outcome: Outcome::Error(error),
            log: vec![error.to_string()],
            final_team: Vec::new(),
            boss_remaining_hp: 0,
            rounds: 0,
        }
    }

    pub fn is_victory(&self) -> bool {
        self.outcome == Outcome::Victory
    }

    /// Remaining hp of the surviving team units
    pub fn team_hp_remaining(&self) -> i64 {
        self.final_team
            .iter()
            .filter(|u| u.is_alive())
            .map(|u| u.cur_hp)
            .sum()
    }
}

/// Compact amount: 1.50K, 2.00M, 3.25B, 1.00T
pub fn fmt_amount(amount: i64) -> String {
    let value = amount as f64;
    if value >= 1e12 {
        format!("{:.2}T", value / 1e12)
    } else if value >= 1e9 {
        format!("{:.2}B", value / 1e9)
    } else if value >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else if value >= 1e3 {
        format!("{:.2}K", value / 1e3)
    } else {
        amount.to_string()
    }
}

/// Log sampling interval that keeps long fights readable
pub fn suggested_log_every(team: &[RosterCard], boss: &Boss, config: &BattleConfig) -> u32 {
    let total_attack: i64 = team.iter().map(|card| unit_attack(card, config)).sum();
    if total_attack <= 0 {
        return 1;
    }
    let ratio = boss.hp() as f64 / total_attack as f64;
    let every = (ratio / 100.0).floor() * 5.0;
    every.clamp(1.0, u32::MAX as f64) as u32
}

/// Resolve one battle.
///
/// Inputs are copied; nothing passed in is mutated. Boundary failures come
/// back as `Outcome::Error` with a single log line.
pub fn resolve<D: Dice + ?Sized>(
    team: &[RosterCard],
    boss: Option<&Boss>,
    config: &BattleConfig,
    reserve: &[CombatUnit],
    options: &BattleOptions,
    dice: &mut D,
) -> BattleResult {
    let Some(boss) = boss else {
        return BattleResult::error(BattleError::NoBossSelected);
    };
    if team.is_empty() {
        return BattleResult::error(BattleError::EmptyTeam);
    }

    let battle = Battle {
        team: team.iter().map(|card| CombatUnit::from_card(card, config)).collect(),
        reserve: reserve.iter().cloned().collect(),
        boss: BossUnit::spawn(boss),
        config,
        log: BattleLog::new(options),
        round: 0,
    };
    battle.run(options.max_rounds, dice)
}

/// User-facing event log with sampling
struct BattleLog {
    lines: Vec<String>,
    fast: bool,
    every: u32,
}

impl BattleLog {
    fn new(options: &BattleOptions) -> Self {
        Self {
            lines: Vec::new(),
            fast: options.fast_log,
            every: options.log_every.max(1),
        }
    }

    fn always(&mut self, line: String) {
        self.lines.push(line);
    }

    /// Event lines, dropped in fast mode
    fn detail(&mut self, line: impl FnOnce() -> String) {
        if !self.fast {
            self.lines.push(line());
        }
    }

    /// Round-scoped lines, only on sampled rounds
    fn sampled(&mut self, round: u32, line: impl FnOnce() -> String) {
        if !self.fast && round % self.every == 0 {
            self.lines.push(line());
        }
    }
}

enum Landing {
    Hit(i64),
    /// Healed back as it lands, boss hp unchanged
    Healed(i64),
    TurnOver,
}

struct Battle<'a> {
    team: Vec<CombatUnit>,
    reserve: VecDeque<CombatUnit>,
    boss: BossUnit,
    config: &'a BattleConfig,
    log: BattleLog,
    round: u32,
}

impl Battle<'_> {
    fn run<D: Dice + ?Sized>(mut self, max_rounds: u32, dice: &mut D) -> BattleResult {
        self.log.always(format!(
            "Battle starts: Team ({}) vs {} (HP {})",
            self.team.len(),
            self.boss.name,
            fmt_amount(self.boss.cur_hp)
        ));
        debug!(
            boss = %self.boss.name,
            boss_hp = self.boss.cur_hp,
            team = self.team.len(),
            reserve = self.reserve.len(),
            "battle start"
        );

        while self.team_alive() && self.boss.is_alive() {
            if self.round >= max_rounds {
                self.log.always("Round limit reached".to_string());
                break;
            }
            self.round += 1;
            let round = self.round;
            self.log.sampled(round, || format!("— Round {round} —"));
            trace!(round, boss_hp = self.boss.cur_hp, "round start");

            if self.team_phase(dice) {
                let name = &self.boss.name;
                self.log.detail(|| format!("{name} beaten!"));
                break;
            }
            if self.team_alive() {
                self.boss_phase(dice);
            }
            self.rotate_reserve();
        }

        let outcome = if self.boss.is_alive() {
            Outcome::Defeat
        } else {
            Outcome::Victory
        };
        self.log.always(format!("Result: {outcome}"));
        debug!(%outcome, rounds = self.round, boss_hp = self.boss.cur_hp, "battle end");

        BattleResult {
            outcome,
            log: self.log.lines,
            final_team: self.team,
            boss_remaining_hp: self.boss.cur_hp,
            rounds: self.round,
        }
    }

    fn team_alive(&self) -> bool {
        self.team.iter().any(CombatUnit::is_alive)
    }

    /// Returns true once the boss is down
    fn team_phase<D: Dice + ?Sized>(&mut self, dice: &mut D) -> bool {
        for idx in 0..self.team.len() {
            if !self.team[idx].is_alive() {
                continue;
            }
            if self.team[idx].stun_turns > 0 {
                self.team[idx].stun_turns -= 1;
                let name = &self.team[idx].name;
                self.log.sampled(self.round, || format!("{name} is stunned and misses turn"));
                continue;
            }
            self.unit_turn(idx, dice);
            if !self.boss.is_alive() {
                return true;
            }
        }
        false
    }

    /// Evolution and empowerment adjusted damage
    fn boosted_damage(&self, idx: usize) -> i64 {
        let unit = &self.team[idx];
        let mut damage = unit.attack;
        if unit.evolution_bonus > 0.0 {
            damage = scale(damage, 1.0 + unit.evolution_bonus);
        }
        // array neighbour, alive or not
        if let Some(prev) = idx.checked_sub(1).map(|p| &self.team[p]) {
            let empowerment = prev.skills.get(Mechanic::Empowerment);
            if empowerment > 0.0 {
                damage = scale(damage, 1.0 + empowerment);
            }
        }
        damage
    }

    fn unit_turn<D: Dice + ?Sized>(&mut self, idx: usize, dice: &mut D) {
        let round = self.round;
        let mut damage = self.boosted_damage(idx);

        let mut critical = false;
        if self.config.crit_chance > 0.0 && dice.roll(self.config.crit_chance) {
            critical = true;
            damage = scale(damage, 1.0 + self.config.crit_damage);
        }
        if critical {
            let weak_point = self.team[idx].skills.get(Mechanic::WeakPoint);
            if weak_point > 0.0 {
                damage += scale(self.boss.cur_hp, weak_point);
            }
            let dismember = self.team[idx].skills.get(Mechanic::Dismember);
            if dismember > 0.0 {
                self.boss.dismember_stacks += 1;
                self.boss.attack = scale(self.boss.attack, 1.0 - dismember);
            }
        }

        let evolution = self.team[idx].skills.get(Mechanic::Evolution);
        if evolution > 0.0 && dice.roll(evolution) {
            self.team[idx].evolution_bonus += evolution;
            let name = &self.team[idx].name;
            self.log.sampled(round, || {
                format!(
                    "{name} evolves! Attack increased by {}%",
                    (evolution * 100.0).floor()
                )
            });
        }

        let extra_chance = self.team[idx].skills.get(Mechanic::ExtraAttack);
        let mut extra_attacks = 0;
        if extra_chance > 0.0 && dice.roll(extra_chance) {
            extra_attacks = 1;
            while dice.roll(extra_chance) && extra_attacks < MAX_EXTRA_ATTACKS {
                extra_attacks += 1;
            }
        }

        let damage = match self.intercept(idx, damage, dice) {
            Landing::Hit(damage) => {
                self.boss.cur_hp -= damage;
                damage
            }
            Landing::Healed(damage) => damage,
            Landing::TurnOver => return,
        };

        {
            let name = &self.team[idx].name;
            let boss = &self.boss;
            self.log.sampled(round, || {
                format!(
                    "{name} hits for {}{} - {}/{}",
                    fmt_amount(damage),
                    if critical { " (CRIT!)" } else { "" },
                    fmt_amount(boss.cur_hp),
                    fmt_amount(boss.hp)
                )
            });
        }

        for _ in 0..extra_attacks {
            let extra = self.boosted_damage(idx);
            self.boss.cur_hp -= extra;
            let name = &self.team[idx].name;
            let boss = &self.boss;
            self.log.sampled(round, || {
                format!(
                    "{name} hits again for {} - {}/{}",
                    fmt_amount(extra),
                    fmt_amount(boss.cur_hp),
                    fmt_amount(boss.hp)
                )
            });
        }
    }

    /// Boss-specific handling of a unit's main hit
    fn intercept<D: Dice + ?Sized>(&mut self, idx: usize, damage: i64, dice: &mut D) -> Landing {
        match self.boss.behavior.interception {
            Interception::None => Landing::Hit(damage),
            Interception::Mitigate { chance, kept } => {
                if dice.roll(chance) {
                    Landing::Hit(scale(damage, kept))
                } else {
                    Landing::Hit(damage)
                }
            }
            Interception::Heal { chance } => {
                if !dice.roll(chance) {
                    return Landing::Hit(damage);
                }
                let boss = &self.boss.name;
                self.log.detail(|| format!("{boss} heals for {}", fmt_amount(damage)));
                Landing::Healed(damage)
            }
            Interception::Evade { chance } => {
                if !dice.roll(chance) {
                    return Landing::Hit(damage);
                }
                let name = &self.team[idx].name;
                self.log.detail(|| format!("{name} misses!"));
                Landing::TurnOver
            }
            Interception::Redirect { chance } => {
                if !dice.roll(chance) {
                    return Landing::Hit(damage);
                }
                let living: Vec<usize> = (0..self.team.len())
                    .filter(|&i| self.team[i].is_alive())
                    .collect();
                let target = living[dice.pick(living.len())];
                let victim = &mut self.team[target];
                victim.cur_hp = (victim.cur_hp - damage).max(0);

                let boss = &self.boss.name;
                let attacker = &self.team[idx].name;
                let victim = &self.team[target].name;
                self.log.detail(|| {
                    format!(
                        "{boss} confuses {attacker}'s attack to {victim} for {}",
                        fmt_amount(damage)
                    )
                });
                Landing::TurnOver
            }
            Interception::FirstSlotOnly => {
                if idx == 0 {
                    Landing::Hit(damage)
                } else {
                    trace!(slot = idx, "hit ignored, only the first slot damages this boss");
                    Landing::TurnOver
                }
            }
        }
    }

    fn attack_count<D: Dice + ?Sized>(&self, dice: &mut D) -> u32 {
        match self.boss.behavior.attack_count {
            AttackCount::Fixed(n) => n,
            AttackCount::Double { chance } => {
                if dice.roll(chance) {
                    2
                } else {
                    1
                }
            }
            AttackCount::Chain { chance, max } => {
                let mut attacks = 1;
                while attacks < max && dice.roll(chance) {
                    attacks += 1;
                }
                attacks
            }
        }
    }

    fn boss_phase<D: Dice + ?Sized>(&mut self, dice: &mut D) {
        let attacks = self.attack_count(dice);
        trace!(attacks, "boss phase");

        for strike in 0..attacks {
            let living: Vec<usize> = (0..self.team.len())
                .filter(|&i| self.team[i].is_alive())
                .collect();
            if living.is_empty() {
                break;
            }
            let slot = match self.boss.behavior.targeting {
                Targeting::RandomAfterFirst if strike > 0 => dice.pick(living.len()),
                Targeting::LastAfterFirst if strike > 0 => living.len() - 1,
                _ => 0,
            };
            let guardian = slot.checked_sub(1).map(|s| living[s]);
            self.boss_strike(living[slot], guardian, dice);
        }
    }

    fn boss_strike<D: Dice + ?Sized>(&mut self, target: usize, guardian: Option<usize>, dice: &mut D) {
        let mut damage = self.boss.strike_damage();
        let mut empowered = false;
        match self.boss.behavior.multiplier {
            DamageMultiplier::None => {}
            DamageMultiplier::Scale { chance, factor } => {
                if dice.roll(chance) {
                    damage = scale(damage, factor);
                    empowered = true;
                }
            }
            DamageMultiplier::TargetMaxHp { chance, fraction } => {
                if dice.roll(chance) {
                    damage = scale(self.team[target].hp, fraction);
                    empowered = true;
                }
            }
        }

        let skills = &self.team[target].skills;
        let dodge = skills.get(Mechanic::Dodge);
        let protection = skills.get(Mechanic::Protection);
        let absorption = skills.get(Mechanic::DamageAbsorption);
        let stun = skills.get(Mechanic::Stun);
        let target_name = &self.team[target].name;

        if dodge > 0.0 && dice.roll(dodge) {
            self.log.detail(|| format!("{target_name} dodges the attack!"));
            return;
        }

        // (guardian index, damage it takes)
        let mut protected = None;
        if protection > 0.0 && dice.roll(protection) {
            if let Some(guardian) = guardian {
                protected = Some((guardian, scale(damage, 0.5)));
                damage = 0;
                let guardian_name = &self.team[guardian].name;
                self.log.detail(|| {
                    format!("{target_name} protects {guardian_name}, reducing damage by 50%")
                });
            }
        }

        let mut absorbed = false;
        if protected.is_none() && absorption > 0.0 {
            damage = scale(damage, 1.0 - absorption);
            absorbed = true;
        }

        let mut stunned = false;
        if stun > 0.0 && dice.roll(stun) {
            self.boss.stun_turns += 1;
            stunned = true;
            let boss_name = &self.boss.name;
            self.log.detail(|| format!("{target_name} stuns {boss_name}!"));
        }

        if self.boss.stun_turns > 0 {
            self.boss.stun_turns -= 1;
            let boss_name = &self.boss.name;
            self.log.detail(|| format!("{boss_name} is stunned and misses turn"));
            return;
        }

        match protected {
            Some((guardian, guarded_damage)) => {
                let unit = &mut self.team[guardian];
                unit.cur_hp = (unit.cur_hp - guarded_damage).max(0);
            }
            None => self.team[target].cur_hp -= damage,
        }

        let unit = &self.team[target];
        self.log.detail(|| {
            let mut line = format!("{} got hit for {}", unit.name, fmt_amount(damage));
            if empowered {
                line.push_str(" (empowerment)");
            }
            if absorbed {
                line.push_str(" (absorbed)");
            }
            if stunned {
                line.push_str(" (stunned)");
            }
            if protected.is_some() {
                line.push_str(" (protected)");
            } else {
                line.push_str(&format!(" - {}/{}", fmt_amount(unit.cur_hp), fmt_amount(unit.hp)));
            }
            line
        });

        if protected.is_none() {
            if let Some(fraction) = self.boss.behavior.reflection {
                let reflected = scale(damage, fraction);
                self.team[target].cur_hp -= reflected;
                let boss_name = &self.boss.name;
                let target_name = &self.team[target].name;
                self.log.detail(|| {
                    format!("{boss_name} reflects {} to {target_name}", fmt_amount(reflected))
                });
            }
        }

        // only the struck unit's death enrages the boss
        if let Some(rage) = self.boss.behavior.death_rage {
            if !self.team[target].is_alive() {
                self.boss.attack = scale(self.boss.attack, rage);
                let boss_name = &self.boss.name;
                self.log.detail(|| format!("{boss_name}'s attack increases!"));
            }
        }
    }

    /// Drop the fallen and pull replacements from the reserve, in order
    fn rotate_reserve(&mut self) {
        let before = self.team.len();
        self.team.retain(CombatUnit::is_alive);
        let fallen = before - self.team.len();

        for _ in 0..fallen {
            let Some(unit) = self.reserve.pop_front() else {
                break;
            };
            let name = &unit.name;
            self.log.detail(|| format!("{name} moves up!"));
            self.team.push(unit);
        }
    }
}
