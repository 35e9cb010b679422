//! Bosses and their special-rule table

use crate::card::{scale, RosterCard};
use serde::{Deserialize, Serialize};

/// Name of the final antagonist, whose attack is scaled 100x
pub const EGO: &str = "Your Ego";

/// A selectable boss
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boss {
    #[serde(deserialize_with = "crate::card::id_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub realm: u8,
    #[serde(default)]
    pub power: f64,
    #[serde(default)]
    pub defense: f64,
}

impl Boss {
    pub fn new(name: impl Into<String>, realm: u8, power: f64, defense: f64) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            realm,
            power,
            defense,
        }
    }

    pub fn from_card(card: &RosterCard) -> Self {
        Self {
            id: card.id.clone(),
            name: card.name.clone(),
            realm: card.realm,
            power: card.power,
            defense: card.defense,
        }
    }

    pub fn behavior(&self) -> &'static BossBehavior {
        behavior_for(&self.name)
    }

    /// floor(power * 10 * attack_scale)
    pub fn attack(&self) -> i64 {
        (self.power * 10.0 * self.behavior().attack_scale).floor() as i64
    }

    /// Realm 11 bosses have a smaller hp multiplier
    pub fn hp(&self) -> i64 {
        let multiplier = if self.realm == 11 { 100_000.0 } else { 400_000.0 };
        (self.defense * multiplier).floor() as i64
    }

    pub fn special_rules(&self) -> Vec<String> {
        self.behavior().special_rules()
    }
}

/// What happens to a team unit's hit before it reaches the boss
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interception {
    None,
    /// With `chance`, only `kept` of the damage lands
    Mitigate { chance: f64, kept: f64 },
    /// With `chance`, the boss heals the hit back as it lands
    Heal { chance: f64 },
    /// With `chance`, the attacker misses and its turn ends
    Evade { chance: f64 },
    /// With `chance`, the hit lands on a random living teammate instead
    Redirect { chance: f64 },
    /// Only the unit in the first slot can damage the boss
    FirstSlotOnly,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackCount {
    Fixed(u32),
    /// Two attacks with `chance`, else one
    Double { chance: f64 },
    /// Each further attack continues with `chance`, up to `max` in total
    Chain { chance: f64, max: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Targeting {
    FirstAlive,
    /// First attack on the front unit, the rest at random
    RandomAfterFirst,
    /// First attack on the front unit, the rest on the back unit
    LastAfterFirst,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageMultiplier {
    None,
    Scale { chance: f64, factor: f64 },
    /// Damage becomes `fraction` of the target's max hp
    TargetMaxHp { chance: f64, fraction: f64 },
}

/// One row of the boss table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BossBehavior {
    pub name: &'static str,
    pub attack_scale: f64,
    pub interception: Interception,
    pub attack_count: AttackCount,
    pub targeting: Targeting,
    pub multiplier: DamageMultiplier,
    /// Fraction of applied damage bounced back onto the target
    pub reflection: Option<f64>,
    /// Boss attack multiplier per team death
    pub death_rage: Option<f64>,
}

impl BossBehavior {
    const fn plain(name: &'static str) -> Self {
        Self {
            name,
            attack_scale: 1.0,
            interception: Interception::None,
            attack_count: AttackCount::Fixed(1),
            targeting: Targeting::FirstAlive,
            multiplier: DamageMultiplier::None,
            reflection: None,
            death_rage: None,
        }
    }

    const fn intercept(mut self, interception: Interception) -> Self {
        self.interception = interception;
        self
    }

    const fn attacks(mut self, count: AttackCount, targeting: Targeting) -> Self {
        self.attack_count = count;
        self.targeting = targeting;
        self
    }

    const fn multiply(mut self, multiplier: DamageMultiplier) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Human-readable rule list, for display only
    pub fn special_rules(&self) -> Vec<String> {
        let mut rules = Vec::new();

        match self.interception {
            Interception::None => {}
            Interception::Mitigate { kept, .. } => {
                rules.push(format!("Mitigates {}% of incoming damage", percent(1.0 - kept)))
            }
            Interception::Heal { chance } => {
                rules.push(format!("{}% chance to heal from damage", percent(chance)))
            }
            Interception::Evade { chance } => {
                rules.push(format!("{}% chance to dodge attacks", percent(chance)))
            }
            Interception::Redirect { chance } => rules.push(format!(
                "{}% chance to redirect attacks to random team member",
                percent(chance)
            )),
            Interception::FirstSlotOnly => {
                rules.push("Only takes damage from the first card".to_string())
            }
        }

        let spread = match self.targeting {
            Targeting::FirstAlive => "",
            Targeting::RandomAfterFirst => " on random targets",
            Targeting::LastAfterFirst => " (first on first card, second on last)",
        };
        match self.attack_count {
            AttackCount::Fixed(1) => {}
            AttackCount::Fixed(n) => rules.push(format!("{n} attacks{spread}")),
            AttackCount::Double { chance } => {
                rules.push(format!("{}% chance for 2 attacks{spread}", percent(chance)))
            }
            AttackCount::Chain { chance, .. } => rules.push(format!(
                "Variable number of attacks (cumulative {}% chance)",
                percent(chance)
            )),
        }

        match self.multiplier {
            DamageMultiplier::None => {}
            DamageMultiplier::Scale { chance, factor } => {
                rules.push(format!("{}% chance for {}x damage", percent(chance), factor))
            }
            DamageMultiplier::TargetMaxHp { chance, fraction } => rules.push(format!(
                "{}% chance for {}% of target HP damage",
                percent(chance),
                percent(fraction)
            )),
        }

        if let Some(fraction) = self.reflection {
            rules.push(format!("Reflects {}% of damage back", percent(fraction)));
        }
        if let Some(rage) = self.death_rage {
            rules.push(format!("Attack +{}% when a team member dies", percent(rage - 1.0)));
        }

        rules
    }
}

/// 0.025 -> "2.5", 0.97 -> "97"
fn percent(fraction: f64) -> String {
    let value = fraction * 100.0;
    if (value - value.round()).abs() < 1e-6 {
        format!("{}", value.round() as i64)
    } else {
        format!("{value:.1}")
    }
}

static DEFAULT_BEHAVIOR: BossBehavior = BossBehavior::plain("");

static BOSS_TABLE: &[BossBehavior] = &[
    BossBehavior::plain("Darth Vader").intercept(Interception::Mitigate { chance: 0.97, kept: 0.03 }),
    BossBehavior::plain("Typhon").intercept(Interception::Heal { chance: 0.025 }),
    BossBehavior::plain("Dr Wily").intercept(Interception::Evade { chance: 0.25 }),
    BossBehavior::plain("Agent Smith").intercept(Interception::Evade { chance: 0.75 }),
    BossBehavior::plain("Arceus").intercept(Interception::Redirect { chance: 0.05 }),
    BossBehavior::plain("Kaguya")
        .intercept(Interception::FirstSlotOnly)
        .attacks(AttackCount::Fixed(2), Targeting::LastAfterFirst),
    BossBehavior::plain("Zeus").attacks(AttackCount::Fixed(3), Targeting::RandomAfterFirst),
    BossBehavior::plain("Isshin").attacks(AttackCount::Fixed(3), Targeting::RandomAfterFirst),
    BossBehavior::plain("Chaos").attacks(AttackCount::Fixed(2), Targeting::FirstAlive),
    BossBehavior::plain("Cronus").attacks(AttackCount::Double { chance: 0.5 }, Targeting::FirstAlive),
    BossBehavior {
        attack_scale: 100.0,
        ..BossBehavior::plain(EGO)
            .attacks(AttackCount::Double { chance: 0.5 }, Targeting::RandomAfterFirst)
            .multiply(DamageMultiplier::Scale { chance: 0.05, factor: 5.0 })
    },
    BossBehavior::plain("Aizen").attacks(AttackCount::Chain { chance: 0.5, max: 8 }, Targeting::FirstAlive),
    BossBehavior::plain("Genghis Khan").multiply(DamageMultiplier::Scale { chance: 0.25, factor: 3.0 }),
    BossBehavior::plain("Sauron").multiply(DamageMultiplier::TargetMaxHp { chance: 0.08, fraction: 1.01 }),
    BossBehavior {
        reflection: Some(0.1),
        ..BossBehavior::plain("Bowser")
    },
    BossBehavior {
        reflection: Some(0.2),
        ..BossBehavior::plain("Godzilla")
    },
    BossBehavior {
        death_rage: Some(1.5),
        ..BossBehavior::plain("Galactus")
    },
];

/// Behavior row for a boss name; unlisted bosses follow the plain rules
pub fn behavior_for(name: &str) -> &'static BossBehavior {
    BOSS_TABLE
        .iter()
        .find(|row| row.name == name)
        .unwrap_or(&DEFAULT_BEHAVIOR)
}

/// Live boss state inside one battle
#[derive(Debug, Clone)]
pub struct BossUnit {
    pub name: String,
    pub realm: u8,
    pub attack: i64,
    pub hp: i64,
    pub cur_hp: i64,
    pub stun_turns: u32,
    pub dismember_stacks: u32,
    pub behavior: &'static BossBehavior,
}

impl BossUnit {
    pub fn spawn(boss: &Boss) -> Self {
        let hp = boss.hp();
        Self {
            name: boss.name.clone(),
            realm: boss.realm,
            attack: boss.attack(),
            hp,
            cur_hp: hp,
            stun_turns: 0,
            dismember_stacks: 0,
            behavior: boss.behavior(),
        }
    }

    #[inline(always)]
    pub fn is_alive(&self) -> bool {
        self.cur_hp > 0
    }

    /// Attack after the per-stack dismember shrink
    pub fn strike_damage(&self) -> i64 {
        if self.dismember_stacks == 0 {
            return self.attack;
        }
        scale(self.attack, 0.99_f64.powi(self.dismember_stacks as i32))
    }
}
