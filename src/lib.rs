//! Cosmic battle simulator
//!
//! Resolves a team of roster cards against a single boss, round by round,
//! and runs seeded batches of battles for win-rate estimates.

pub mod battle;
pub mod boss;
pub mod card;
pub mod catalog;
pub mod config;
pub mod error;
pub mod save;
pub mod simulation;
pub mod skills;
pub mod stats;

#[cfg(feature = "python")]
mod python;

pub use battle::{fmt_amount, resolve, suggested_log_every, BattleOptions, BattleResult, Outcome};
pub use boss::{Boss, BossBehavior};
pub use card::{assemble_team, CombatUnit, Lineup, RosterCard};
pub use catalog::Catalog;
pub use config::{BattleScenario, ScenarioConfig};
pub use error::{BattleError, CatalogError, ConfigError, SaveError};
pub use save::SaveData;
pub use simulation::{Dice, FastRng, ScriptedDice};
pub use skills::{compile, BattleConfig, GlobalUpgrades, Mechanic, SkillSet};
pub use stats::AggregatedStats;
