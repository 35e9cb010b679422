//! Import of the game's JSON save

use crate::card::RosterCard;
use crate::catalog::Catalog;
use crate::error::SaveError;
use crate::skills::{compile, BattleConfig, GlobalUpgrades};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Progress the save records for one owned card
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OwnedCard {
    pub id: String,
    pub level: Option<u32>,
    pub tier: Option<u32>,
    pub quantity: Option<u32>,
    pub locked: bool,
}

impl OwnedCard {
    fn from_entry(id: String, entry: &Map<String, Value>) -> Self {
        Self {
            id,
            level: positive(entry, &["lvl", "level"]),
            tier: positive(entry, &["tier"]),
            quantity: positive(entry, &["qty", "quantity"]),
            locked: entry.get("locked").and_then(Value::as_bool).unwrap_or(false),
        }
    }

    /// Save progress over catalog values; zero or missing keeps the catalog's
    pub fn overlay(&self, card: &RosterCard) -> RosterCard {
        let fallback = |value: u32| value.max(1);
        RosterCard {
            level: self.level.unwrap_or(fallback(card.level)),
            tier: self.tier.unwrap_or(fallback(card.tier)),
            quantity: self.quantity.unwrap_or(fallback(card.quantity)),
            locked: self.locked,
            ..card.clone()
        }
    }
}

/// First non-zero number among `keys`
fn positive(entry: &Map<String, Value>, keys: &[&str]) -> Option<u32> {
    keys.iter()
        .filter_map(|key| entry.get(*key).and_then(as_u32))
        .find(|&value| value > 0)
}

fn as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_f64().map(|f| f.max(0.0) as u32),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn id_of(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// Everything the battle needs from a save
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SaveData {
    pub purchased_skills: BTreeSet<u32>,
    pub upgrades: GlobalUpgrades,
    pub owned: Vec<OwnedCard>,
}

impl SaveData {
    pub fn from_json_str(json: &str) -> Result<Self, SaveError> {
        let root: Value = serde_json::from_str(json.trim())?;
        let root = root.as_object().ok_or(SaveError::NotAnObject)?;

        let purchased_skills: BTreeSet<u32> = root
            .get("purchasedSkills")
            .and_then(Value::as_array)
            .map(|ids| ids.iter().filter_map(as_u32).collect())
            .unwrap_or_default();

        let upgrades = GlobalUpgrades {
            global_attack_mult: multiplier(root, "globalAttackMult"),
            global_hp_mult: multiplier(root, "globalHPMult"),
        };

        let owned = root
            .get("ownedCards")
            .or_else(|| root.get("cards"))
            .map(owned_cards)
            .unwrap_or_default();

        Ok(Self {
            purchased_skills,
            upgrades,
            owned,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SaveError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SaveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let save = Self::from_json_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            skills = save.purchased_skills.len(),
            cards = save.owned.len(),
            "save loaded"
        );
        Ok(save)
    }

    /// Compiled skills with the save's global multipliers
    pub fn battle_config(&self) -> BattleConfig {
        compile(self.purchased_skills.iter().copied()).with_upgrades(self.upgrades)
    }

    pub fn owned_card(&self, id: &str) -> Option<&OwnedCard> {
        self.owned.iter().find(|owned| owned.id == id)
    }

    /// Owned cards resolved against the catalog, unknown ids skipped
    pub fn roster(&self, catalog: &Catalog) -> Vec<RosterCard> {
        self.owned
            .iter()
            .filter_map(|owned| match catalog.get(&owned.id) {
                Some(card) => Some(owned.overlay(card)),
                None => {
                    warn!(id = %owned.id, "save card not in catalog, skipping");
                    None
                }
            })
            .collect()
    }
}

/// `battle.<key>`, then `upgrades.<key>`, else 1.0
fn multiplier(root: &Map<String, Value>, key: &str) -> f64 {
    ["battle", "upgrades"]
        .iter()
        .filter_map(|section| root.get(*section)?.get(key)?.as_f64())
        .find(|&value| value != 0.0)
        .unwrap_or(1.0)
}

/// Array of `{id, ..}` or an object keyed by id
fn owned_cards(value: &Value) -> Vec<OwnedCard> {
    match value {
        Value::Array(entries) => entries
            .iter()
            .filter_map(|entry| {
                let entry = entry.as_object()?;
                let id = entry.get("id").and_then(id_of)?;
                Some(OwnedCard::from_entry(id, entry))
            })
            .collect(),
        Value::Object(entries) => entries
            .iter()
            .map(|(id, entry)| {
                let fields = entry.as_object().cloned().unwrap_or_default();
                OwnedCard::from_entry(id.clone(), &fields)
            })
            .collect(),
        _ => Vec::new(),
    }
}
