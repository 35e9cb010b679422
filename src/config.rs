//! Scenario files: which cards fight which boss, under which save

use crate::battle::{suggested_log_every, DEFAULT_MAX_ROUNDS};
use crate::boss::Boss;
use crate::card::{assemble_team, CombatUnit, RosterCard};
use crate::catalog::Catalog;
use crate::error::ConfigError;
use crate::save::SaveData;
use crate::skills::{compile, BattleConfig, GlobalUpgrades};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Scenario loaded from YAML/JSON.
///
/// ```yaml
/// catalog: cards.json
/// save: save.json
/// team: ["Pebble", "205", "Comet", "Gull"]
/// boss: Darth Vader
/// skills: [26001, 26201]
/// ```
///
/// Relative paths resolve against the scenario file's directory. Cards past
/// the slot limit wait in reserve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub catalog: PathBuf,
    #[serde(default)]
    pub save: Option<PathBuf>,
    /// Card ids or names in slot order
    #[serde(default)]
    pub team: Vec<String>,
    #[serde(default)]
    pub boss: Option<String>,
    /// Purchased skill ids on top of the save's
    #[serde(default)]
    pub skills: Vec<u32>,
    /// Overrides the save's multipliers
    #[serde(default)]
    pub upgrades: Option<GlobalUpgrades>,
    #[serde(default)]
    pub fast: bool,
    #[serde(default)]
    pub log_every: Option<u32>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub num_sims: Option<usize>,
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

fn default_max_rounds() -> u32 {
    DEFAULT_MAX_ROUNDS
}

impl ScenarioConfig {
    /// Load from a file, JSON by extension, YAML otherwise
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let mut config: ScenarioConfig = if is_json {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Load from JSON string (for Python interop)
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Load the referenced catalog and save and assemble the battle
    pub fn build(&self) -> Result<BattleScenario, ConfigError> {
        let catalog = Catalog::from_file(self.resolve_path(&self.catalog))?;
        let save = match &self.save {
            Some(path) => Some(SaveData::from_file(self.resolve_path(path))?),
            None => None,
        };
        self.build_with(&catalog, save.as_ref())
    }

    /// Assemble the battle from an already loaded catalog and save
    pub fn build_with(&self, catalog: &Catalog, save: Option<&SaveData>) -> Result<BattleScenario, ConfigError> {
        let purchased = save
            .into_iter()
            .flat_map(|save| save.purchased_skills.iter().copied())
            .chain(self.skills.iter().copied());
        let upgrades = self
            .upgrades
            .or_else(|| save.map(|save| save.upgrades))
            .unwrap_or_default();
        let config = compile(purchased).with_upgrades(upgrades);

        let cards = self
            .team
            .iter()
            .map(|key| -> Result<RosterCard, ConfigError> {
                let card = catalog
                    .lookup(key)
                    .ok_or_else(|| ConfigError::UnknownCard(key.clone()))?;
                Ok(match save.and_then(|save| save.owned_card(&card.id)) {
                    Some(owned) => owned.overlay(card),
                    None => card.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let boss = match &self.boss {
            Some(key) => Some(
                catalog
                    .lookup(key)
                    .map(Boss::from_card)
                    .ok_or_else(|| ConfigError::UnknownBoss(key.clone()))?,
            ),
            None => None,
        };

        let mut scenario = BattleScenario::new(&cards, boss, config);
        scenario.max_rounds = self.max_rounds;
        Ok(scenario)
    }
}

/// A fully assembled battle, ready to run any number of times
#[derive(Debug, Clone, Serialize)]
pub struct BattleScenario {
    pub team: Vec<RosterCard>,
    pub reserve: Vec<CombatUnit>,
    pub boss: Option<Boss>,
    pub config: BattleConfig,
    pub max_rounds: u32,
}

impl BattleScenario {
    /// Split `cards` at the slot limit into team and reserve
    pub fn new(cards: &[RosterCard], boss: Option<Boss>, config: BattleConfig) -> Self {
        let lineup = assemble_team(cards, &config);
        Self {
            team: lineup.team,
            reserve: lineup.reserve,
            boss,
            config,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    pub fn suggested_log_every(&self) -> u32 {
        match &self.boss {
            Some(boss) => suggested_log_every(&self.team, boss, &self.config),
            None => 1,
        }
    }
}
