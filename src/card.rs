//! Roster cards and their battle-time combat units

use crate::skills::{BattleConfig, SkillSet};
use serde::{Deserialize, Deserializer, Serialize};

/// A catalog entry, possibly overlaid with the player's save data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterCard {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub realm: u8,
    #[serde(default)]
    pub power: f64,
    #[serde(default)]
    pub defense: f64,
    #[serde(default = "one")]
    pub tier: u32,
    #[serde(default = "one")]
    pub level: u32,
    #[serde(default = "one")]
    pub quantity: u32,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<String>,
}

fn one() -> u32 {
    1
}

/// Catalog ids show up both as JSON numbers and as strings
pub(crate) fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Str(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Int(n) => n.to_string(),
        RawId::Str(s) => s,
    })
}

impl RosterCard {
    pub fn new(id: impl Into<String>, name: impl Into<String>, realm: u8, power: f64, defense: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            realm,
            power,
            defense,
            tier: 1,
            level: 1,
            quantity: 1,
            locked: false,
            rarity: None,
        }
    }

    pub fn with_progress(mut self, tier: u32, level: u32, quantity: u32) -> Self {
        self.tier = tier;
        self.level = level;
        self.quantity = quantity;
        self
    }
}

/// floor(power * tier * sqrt(level) * globalAttackMult)
pub fn unit_attack(card: &RosterCard, config: &BattleConfig) -> i64 {
    let level = card.level.max(1) as f64;
    (card.power * card.tier as f64 * level.sqrt() * config.global_attack_mult).floor() as i64
}

/// floor(defense * sqrt(quantity) * globalHPMult)
pub fn unit_hp(card: &RosterCard, config: &BattleConfig) -> i64 {
    let quantity = card.quantity.max(1) as f64;
    (card.defense * quantity.sqrt() * config.global_hp_mult).floor() as i64
}

/// Multiply and truncate, the rounding every damage step uses
#[inline(always)]
pub(crate) fn scale(amount: i64, factor: f64) -> i64 {
    (amount as f64 * factor).floor() as i64
}

/// Battle-time copy of a card with computed stats and transient flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatUnit {
    pub id: String,
    pub name: String,
    pub realm: u8,
    pub attack: i64,
    pub hp: i64,
    pub cur_hp: i64,
    pub skills: SkillSet,
    #[serde(default)]
    pub stun_turns: u32,
    #[serde(default)]
    pub evolution_bonus: f64,
    #[serde(default)]
    pub dismember_stacks: u32,
}

impl CombatUnit {
    /// Team slot: stats plus the realm's projected skills
    pub fn from_card(card: &RosterCard, config: &BattleConfig) -> Self {
        let mut unit = Self::reserve_from_card(card, config);
        unit.skills = SkillSet::for_realm(card.realm, config);
        unit
    }

    /// Reserve slot: stats only, no skills
    pub fn reserve_from_card(card: &RosterCard, config: &BattleConfig) -> Self {
        let hp = unit_hp(card, config);
        Self {
            id: card.id.clone(),
            name: card.name.clone(),
            realm: card.realm,
            attack: unit_attack(card, config),
            hp,
            cur_hp: hp,
            skills: SkillSet::new(),
            stun_turns: 0,
            evolution_bonus: 0.0,
            dismember_stacks: 0,
        }
    }

    #[inline(always)]
    pub fn is_alive(&self) -> bool {
        self.cur_hp > 0
    }
}

/// Cards split into the active team and the reserve queue
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Lineup {
    pub team: Vec<RosterCard>,
    pub reserve: Vec<CombatUnit>,
}

/// First `slot_limit` cards fight, the rest wait in order as skill-less reserves
pub fn assemble_team(cards: &[RosterCard], config: &BattleConfig) -> Lineup {
    let split = cards.len().min(config.slot_limit);
    let (team, overflow) = cards.split_at(split);
    Lineup {
        team: team.to_vec(),
        reserve: overflow
            .iter()
            .map(|card| CombatUnit::reserve_from_card(card, config))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::{compile, Mechanic};

    #[test]
    fn stat_formulas_floor_once() {
        let config = BattleConfig {
            global_attack_mult: 1.5,
            global_hp_mult: 2.0,
            ..BattleConfig::default()
        };
        let card = RosterCard::new("1", "Pebble", 1, 10.0, 100.0).with_progress(2, 4, 9);
        assert_eq!(unit_attack(&card, &config), 60);
        assert_eq!(unit_hp(&card, &config), 600);
    }

    #[test]
    fn zero_level_and_quantity_count_as_one() {
        let card = RosterCard::new("1", "Pebble", 1, 7.0, 11.0).with_progress(1, 0, 0);
        let config = BattleConfig::default();
        assert_eq!(unit_attack(&card, &config), 7);
        assert_eq!(unit_hp(&card, &config), 11);
    }

    #[test]
    fn non_integer_stats_truncate() {
        // 3 * sqrt(2) = 4.24..
        let card = RosterCard::new("1", "Gull", 4, 3.0, 3.0).with_progress(1, 2, 2);
        let config = BattleConfig::default();
        assert_eq!(unit_attack(&card, &config), 4);
        assert_eq!(unit_hp(&card, &config), 4);
    }

    #[test]
    fn team_unit_carries_projected_skills() {
        let config = compile([26401]);
        let card = RosterCard::new("6", "Comet", 6, 1.0, 1.0);
        let unit = CombatUnit::from_card(&card, &config);
        assert!(unit.skills.has(Mechanic::Stun));
        assert_eq!(unit.cur_hp, unit.hp);
        assert_eq!(unit.stun_turns, 0);
    }

    #[test]
    fn overflow_goes_to_reserve_without_skills() {
        let config = compile([26401]);
        let cards: Vec<_> = (0..5)
            .map(|i| RosterCard::new(i.to_string(), format!("C{i}"), 6, 10.0, 10.0))
            .collect();
        let lineup = assemble_team(&cards, &config);
        assert_eq!(lineup.team.len(), 3);
        assert_eq!(lineup.reserve.len(), 2);
        assert_eq!(lineup.reserve[0].name, "C3");
        assert!(lineup.reserve.iter().all(|u| u.skills.is_empty()));
    }

    #[test]
    fn short_roster_has_no_reserve() {
        let cards = vec![RosterCard::new("1", "Solo", 1, 1.0, 1.0)];
        let lineup = assemble_team(&cards, &BattleConfig::default());
        assert_eq!(lineup.team.len(), 1);
        assert!(lineup.reserve.is_empty());
    }

    #[test]
    fn numeric_ids_deserialize_as_strings() {
        let card: RosterCard =
            serde_json::from_str(r#"{"id": 101, "name": "Pebble", "realm": 1, "power": 5}"#).unwrap();
        assert_eq!(card.id, "101");
        assert_eq!(card.defense, 0.0);
        assert_eq!(card.tier, 1);
    }
}
