//! Skill aggregation: purchased skill ids -> `BattleConfig`, and the per-card
//! projection of that config onto a realm.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Default team size before overflow goes to the reserve queue
pub const DEFAULT_SLOT_LIMIT: usize = 3;

/// A named combat modifier. Every realm 1-10 owns exactly one natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Mechanic {
    #[serde(rename = "damageAbsorption")]
    DamageAbsorption,
    #[serde(rename = "protectionChance")]
    Protection,
    #[serde(rename = "evolutionChance")]
    Evolution,
    #[serde(rename = "extraAttackChance")]
    ExtraAttack,
    #[serde(rename = "empowerment")]
    Empowerment,
    #[serde(rename = "stunChance")]
    Stun,
    #[serde(rename = "weakPointChance")]
    WeakPoint,
    #[serde(rename = "resourcefulAttack")]
    ResourcefulAttack,
    #[serde(rename = "dodgeChance")]
    Dodge,
    #[serde(rename = "dismemberChance")]
    Dismember,
}

impl Mechanic {
    pub const ALL: [Mechanic; 10] = [
        Mechanic::DamageAbsorption,
        Mechanic::Protection,
        Mechanic::Evolution,
        Mechanic::ExtraAttack,
        Mechanic::Empowerment,
        Mechanic::Stun,
        Mechanic::WeakPoint,
        Mechanic::ResourcefulAttack,
        Mechanic::Dodge,
        Mechanic::Dismember,
    ];

    /// Native mechanic of a realm (1 Rocks .. 10 Weapons). Realm 11+ has none.
    pub fn native_to(realm: u8) -> Option<Mechanic> {
        match realm {
            1 => Some(Mechanic::DamageAbsorption),  // Rocks
            2 => Some(Mechanic::Protection),        // Sea World
            3 => Some(Mechanic::Evolution),         // Bugdom
            4 => Some(Mechanic::ExtraAttack),       // Aviary
            5 => Some(Mechanic::Empowerment),       // Ancient Relics
            6 => Some(Mechanic::Stun),              // Celestial Bodies
            7 => Some(Mechanic::WeakPoint),         // Mythical Beasts
            8 => Some(Mechanic::ResourcefulAttack), // Incremental Games
            9 => Some(Mechanic::Dodge),             // Spirit Familiars
            10 => Some(Mechanic::Dismember),        // Weapons
            _ => None,
        }
    }

    /// Value a fused mechanic falls back to while its compiled value is still zero
    pub fn fusion_default(self) -> f64 {
        match self {
            Mechanic::DamageAbsorption => 0.1,
            Mechanic::Protection => 0.05,
            Mechanic::Evolution => 0.01,
            Mechanic::ExtraAttack => 0.04,
            Mechanic::Empowerment => 0.025,
            Mechanic::Stun => 0.01,
            Mechanic::WeakPoint => 0.01,
            Mechanic::ResourcefulAttack => 0.5,
            Mechanic::Dodge => 0.025,
            Mechanic::Dismember => 0.01,
        }
    }

    /// Whether fusion adds onto a native value or replaces it
    pub fn fusion_stacks(self) -> bool {
        !matches!(self, Mechanic::Empowerment | Mechanic::ResourcefulAttack)
    }

    pub fn label(self) -> &'static str {
        match self {
            Mechanic::DamageAbsorption => "Damage Absorption",
            Mechanic::Protection => "Protection",
            Mechanic::Evolution => "Evolution",
            Mechanic::ExtraAttack => "Extra Attack",
            Mechanic::Empowerment => "Empowerment",
            Mechanic::Stun => "Stun",
            Mechanic::WeakPoint => "Weak Point",
            Mechanic::ResourcefulAttack => "Resourceful Attack",
            Mechanic::Dodge => "Dodge",
            Mechanic::Dismember => "Dismember",
        }
    }
}

/// Attack/HP multipliers carried by the save, outside the skill tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobalUpgrades {
    #[serde(default = "one")]
    pub global_attack_mult: f64,
    #[serde(default = "one")]
    pub global_hp_mult: f64,
}

fn one() -> f64 {
    1.0
}

impl Default for GlobalUpgrades {
    fn default() -> Self {
        Self {
            global_attack_mult: 1.0,
            global_hp_mult: 1.0,
        }
    }
}

/// Compiled combat-modifier configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleConfig {
    pub global_attack_mult: f64,
    #[serde(rename = "globalHPMult")]
    pub global_hp_mult: f64,
    pub crit_chance: f64,
    pub crit_damage: f64,
    pub slot_limit: usize,
    pub damage_absorption: f64,
    pub protection_chance: f64,
    pub evolution_chance: f64,
    pub extra_attack_chance: f64,
    pub empowerment: f64,
    pub dodge_chance: f64,
    pub stun_chance: f64,
    pub weak_point_chance: f64,
    pub dismember_chance: f64,
    pub resourceful_attack: f64,
    /// Realms that gained a mechanic through a fusion skill
    #[serde(default)]
    pub fusion_realms: BTreeMap<Mechanic, BTreeSet<u8>>,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            global_attack_mult: 1.0,
            global_hp_mult: 1.0,
            crit_chance: 0.0,
            crit_damage: 0.0,
            slot_limit: DEFAULT_SLOT_LIMIT,
            damage_absorption: 0.0,
            protection_chance: 0.0,
            evolution_chance: 0.0,
            extra_attack_chance: 0.0,
            empowerment: 0.0,
            dodge_chance: 0.0,
            stun_chance: 0.0,
            weak_point_chance: 0.0,
            dismember_chance: 0.0,
            resourceful_attack: 0.0,
            fusion_realms: BTreeMap::new(),
        }
    }
}

impl BattleConfig {
    /// Compiled base value of a mechanic
    pub fn mechanic(&self, mechanic: Mechanic) -> f64 {
        match mechanic {
            Mechanic::DamageAbsorption => self.damage_absorption,
            Mechanic::Protection => self.protection_chance,
            Mechanic::Evolution => self.evolution_chance,
            Mechanic::ExtraAttack => self.extra_attack_chance,
            Mechanic::Empowerment => self.empowerment,
            Mechanic::Stun => self.stun_chance,
            Mechanic::WeakPoint => self.weak_point_chance,
            Mechanic::ResourcefulAttack => self.resourceful_attack,
            Mechanic::Dodge => self.dodge_chance,
            Mechanic::Dismember => self.dismember_chance,
        }
    }

    fn mechanic_mut(&mut self, mechanic: Mechanic) -> &mut f64 {
        match mechanic {
            Mechanic::DamageAbsorption => &mut self.damage_absorption,
            Mechanic::Protection => &mut self.protection_chance,
            Mechanic::Evolution => &mut self.evolution_chance,
            Mechanic::ExtraAttack => &mut self.extra_attack_chance,
            Mechanic::Empowerment => &mut self.empowerment,
            Mechanic::Stun => &mut self.stun_chance,
            Mechanic::WeakPoint => &mut self.weak_point_chance,
            Mechanic::ResourcefulAttack => &mut self.resourceful_attack,
            Mechanic::Dodge => &mut self.dodge_chance,
            Mechanic::Dismember => &mut self.dismember_chance,
        }
    }

    /// True if `realm` gained `mechanic` through a fusion skill
    pub fn is_fused(&self, mechanic: Mechanic, realm: u8) -> bool {
        self.fusion_realms
            .get(&mechanic)
            .is_some_and(|realms| realms.contains(&realm))
    }

    pub fn with_upgrades(mut self, upgrades: GlobalUpgrades) -> Self {
        self.global_attack_mult = upgrades.global_attack_mult;
        self.global_hp_mult = upgrades.global_hp_mult;
        self
    }

    fn apply(&mut self, effect: SkillEffect) {
        match effect {
            SkillEffect::CritChance(amount) => self.crit_chance += amount,
            SkillEffect::CritDamage(amount) => self.crit_damage += amount,
            SkillEffect::SlotLimit(extra) => self.slot_limit += extra,
            SkillEffect::Boost(mechanic, amount) => *self.mechanic_mut(mechanic) += amount,
            SkillEffect::Fusion(pairs) => {
                for (mechanic, realm) in pairs {
                    self.fusion_realms.entry(mechanic).or_default().insert(realm);
                }
            }
            SkillEffect::Reserved => {}
        }
    }
}

/// Fixed effect of one purchasable skill
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkillEffect {
    CritChance(f64),
    CritDamage(f64),
    SlotLimit(usize),
    Boost(Mechanic, f64),
    /// Grants each mechanic to the paired realm
    Fusion([(Mechanic, u8); 2]),
    /// Belongs to a game system the battle does not model
    Reserved,
}

/// Look up a skill id. Unknown ids yield `None`.
pub fn skill_effect(id: u32) -> Option<SkillEffect> {
    use Mechanic::*;
    use SkillEffect::*;

    let effect = match id {
        26001 => CritChance(0.05),
        26002..=26006 => CritChance(0.02),
        26101..=26115 => CritDamage(0.1),
        26201..=26203 => SlotLimit(1),

        26301..=26310 => Boost(Dodge, 0.025),
        26311 => Boost(Dodge, 0.08),
        26401..=26410 => Boost(Stun, 0.01),
        26411 => Boost(Stun, 0.025),
        26501..=26505 => Boost(DamageAbsorption, 0.1),
        26506 => Boost(DamageAbsorption, 0.16),
        26601..=26610 => Boost(Protection, 0.05),
        26611 => Boost(Protection, 0.16),
        27701..=27710 => Boost(Evolution, 0.01),
        27711 => Boost(Evolution, 0.05),
        27801..=27810 => Boost(ExtraAttack, 0.04),
        27811 => Boost(ExtraAttack, 0.1),
        27901..=27910 => Boost(ResourcefulAttack, 0.5),
        28001..=28010 => Boost(Empowerment, 0.025),
        28011 => Boost(Empowerment, 0.08),
        28101..=28110 => Boost(WeakPoint, 0.01),
        28111 => Boost(WeakPoint, 0.025),
        28201..=28210 => Boost(Dismember, 0.01),
        28211 => Boost(Dismember, 0.025),

        29001 => Fusion([(ResourcefulAttack, 4), (ExtraAttack, 8)]),
        29002 => Fusion([(Empowerment, 2), (Protection, 5)]),
        29003 => Fusion([(Dodge, 1), (DamageAbsorption, 9)]),
        29004 => Fusion([(Dismember, 6), (Stun, 10)]),
        29005 => Fusion([(WeakPoint, 3), (Evolution, 7)]),

        29101..=29104 | 30001..=30003 => Reserved,
        _ => return None,
    };
    Some(effect)
}

/// Compile a set of purchased skill ids into a `BattleConfig`.
///
/// Duplicates collapse and ids are applied in ascending order, so the result
/// does not depend on input order. Unknown ids are ignored.
pub fn compile<I>(purchased: I) -> BattleConfig
where
    I: IntoIterator<Item = u32>,
{
    let ids: BTreeSet<u32> = purchased.into_iter().collect();
    let mut config = BattleConfig::default();
    for id in ids {
        match skill_effect(id) {
            Some(effect) => config.apply(effect),
            None => tracing::trace!(skill = id, "ignoring unknown skill id"),
        }
    }
    config
}

/// Mechanic values a combat unit carries into battle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillSet(BTreeMap<Mechanic, f64>);

impl SkillSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Native mechanic at the compiled value, plus every fused mechanic
    pub fn for_realm(realm: u8, config: &BattleConfig) -> Self {
        let mut skills = Self::new();
        if let Some(native) = Mechanic::native_to(realm) {
            skills.0.insert(native, config.mechanic(native));
        }
        for mechanic in Mechanic::ALL {
            if !config.is_fused(mechanic, realm) {
                continue;
            }
            let compiled = config.mechanic(mechanic);
            let value = if compiled != 0.0 {
                compiled
            } else {
                mechanic.fusion_default()
            };
            let entry = skills.0.entry(mechanic).or_insert(0.0);
            if mechanic.fusion_stacks() {
                *entry += value;
            } else {
                *entry = value;
            }
        }
        skills
    }

    /// Value of a mechanic, 0 when absent
    pub fn get(&self, mechanic: Mechanic) -> f64 {
        self.0.get(&mechanic).copied().unwrap_or(0.0)
    }

    /// A mechanic only takes effect with a positive value
    pub fn has(&self, mechanic: Mechanic) -> bool {
        self.get(mechanic) > 0.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Mechanic, f64)> + '_ {
        self.0.iter().map(|(m, v)| (*m, *v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
