//! Species definitions
//!
//! Every creature references an immutable [`SpeciesDef`] through a
//! [`SpeciesId`]. Attributes are typed fields, so a misspelled attribute is a
//! compile error rather than a missing-key lookup at runtime.

pub mod builtin;
pub mod catalog;

pub use catalog::SpeciesCatalog;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::terrain::Habitat;

/// Index of a species inside its catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpeciesId(pub u16);

impl std::fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "species#{}", self.0)
    }
}

/// Rarity tier: drives reward value, population quota and top-level behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RarityTier {
    Rare,
    SuperRare,
    Legendary,
}

impl RarityTier {
    pub const ALL: [RarityTier; 3] = [RarityTier::Rare, RarityTier::SuperRare, RarityTier::Legendary];
}

/// Legacy temperament tag, consulted only for untiered species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorTag {
    Peaceful,
    Defensive,
    Territorial,
}

/// How dangerous the species is to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ThreatLevel {
    Harmless,
    Low,
    Medium,
    High,
    Extreme,
}

/// One possible drop when a creature of this species is killed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootEntry {
    pub item: String,
    pub min: u32,
    pub max: u32,
    /// Probability the entry drops at all
    #[serde(default = "always")]
    pub chance: f64,
}

fn always() -> f64 {
    1.0
}

fn one() -> f32 {
    1.0
}

/// Items handed to the player after a kill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootDrop {
    pub item: String,
    pub quantity: u32,
}

/// Numeric species attribute, for tooling that needs to address stats by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeciesStat {
    Size,
    BaseSpeed,
    MaxHealth,
    Damage,
    Agility,
    AttackRange,
    TerritoryRadius,
    FleeSpeedMultiplier,
    VisionAngle,
    VisionDistance,
    SpawnWeight,
}

impl SpeciesStat {
    pub const ALL: [SpeciesStat; 11] = [
        SpeciesStat::Size,
        SpeciesStat::BaseSpeed,
        SpeciesStat::MaxHealth,
        SpeciesStat::Damage,
        SpeciesStat::Agility,
        SpeciesStat::AttackRange,
        SpeciesStat::TerritoryRadius,
        SpeciesStat::FleeSpeedMultiplier,
        SpeciesStat::VisionAngle,
        SpeciesStat::VisionDistance,
        SpeciesStat::SpawnWeight,
    ];
}

/// Immutable attributes of a species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesDef {
    pub name: String,
    pub habitat: Habitat,
    /// Body diameter in world units
    pub size: f32,
    pub base_speed: f32,
    pub max_health: f32,
    /// Damage dealt to the player per landed attack
    #[serde(default)]
    pub damage: f32,
    /// Chase speed multiplier over base speed
    #[serde(default = "one")]
    pub agility: f32,
    #[serde(default)]
    pub attack_range: f32,
    /// Territory radius; zero means the species holds no territory
    #[serde(default)]
    pub territory_radius: f32,
    pub flee_speed_multiplier: f32,
    #[serde(default)]
    pub rarity: Option<RarityTier>,
    pub behavior: BehaviorTag,
    pub threat: ThreatLevel,
    /// Apex predators perceive in every direction at extended distance
    #[serde(default)]
    pub apex: bool,
    #[serde(default)]
    pub can_traverse_water: bool,
    pub vision_angle_degrees: f32,
    pub vision_distance: f32,
    #[serde(default = "one")]
    pub spawn_weight: f32,
    /// Reward for untiered species; tiered species pay the tier reward
    #[serde(default)]
    pub bounty: u32,
    #[serde(default)]
    pub loot: Vec<LootEntry>,
}

impl SpeciesDef {
    pub fn body_radius(&self) -> f32 {
        self.size * 0.5
    }

    pub fn has_territory(&self) -> bool {
        self.territory_radius > 0.0
    }

    /// Whether this species chooses to fight rather than run when it has a choice
    pub fn is_aggressive(&self) -> bool {
        match self.rarity {
            Some(RarityTier::Legendary) => true,
            Some(RarityTier::Rare) => false,
            Some(RarityTier::SuperRare) | None => {
                self.threat >= ThreatLevel::Medium && self.behavior != BehaviorTag::Peaceful
            }
        }
    }

    pub fn stat(&self, stat: SpeciesStat) -> f32 {
        match stat {
            SpeciesStat::Size => self.size,
            SpeciesStat::BaseSpeed => self.base_speed,
            SpeciesStat::MaxHealth => self.max_health,
            SpeciesStat::Damage => self.damage,
            SpeciesStat::Agility => self.agility,
            SpeciesStat::AttackRange => self.attack_range,
            SpeciesStat::TerritoryRadius => self.territory_radius,
            SpeciesStat::FleeSpeedMultiplier => self.flee_speed_multiplier,
            SpeciesStat::VisionAngle => self.vision_angle_degrees,
            SpeciesStat::VisionDistance => self.vision_distance,
            SpeciesStat::SpawnWeight => self.spawn_weight,
        }
    }

    /// Roll this species' loot table
    pub fn roll_loot(&self, rng: &mut impl Rng) -> Vec<LootDrop> {
        let mut drops = Vec::new();
        for entry in &self.loot {
            if entry.chance < 1.0 && !rng.gen_bool(entry.chance.clamp(0.0, 1.0)) {
                continue;
            }
            let quantity = if entry.max > entry.min {
                rng.gen_range(entry.min..=entry.max)
            } else {
                entry.min
            };
            if quantity > 0 {
                drops.push(LootDrop {
                    item: entry.item.clone(),
                    quantity,
                });
            }
        }
        drops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn sample() -> SpeciesDef {
        SpeciesDef {
            name: "Test Boar".into(),
            habitat: Habitat::Forest,
            size: 30.0,
            base_speed: 60.0,
            max_health: 100.0,
            damage: 10.0,
            agility: 1.2,
            attack_range: 25.0,
            territory_radius: 0.0,
            flee_speed_multiplier: 1.4,
            rarity: None,
            behavior: BehaviorTag::Defensive,
            threat: ThreatLevel::High,
            apex: false,
            can_traverse_water: false,
            vision_angle_degrees: 160.0,
            vision_distance: 200.0,
            spawn_weight: 1.0,
            bounty: 15,
            loot: vec![
                LootEntry { item: "hide".into(), min: 1, max: 2, chance: 1.0 },
                LootEntry { item: "tusk".into(), min: 1, max: 1, chance: 0.0 },
            ],
        }
    }

    #[test]
    fn test_aggression_by_temperament() {
        let mut def = sample();
        assert!(def.is_aggressive());
        def.behavior = BehaviorTag::Peaceful;
        assert!(!def.is_aggressive());
        def.rarity = Some(RarityTier::Legendary);
        assert!(def.is_aggressive());
    }

    #[test]
    fn test_stat_lookup_matches_fields() {
        let def = sample();
        assert_eq!(def.stat(SpeciesStat::MaxHealth), 100.0);
        assert_eq!(def.stat(SpeciesStat::VisionAngle), 160.0);
        assert_eq!(def.body_radius(), 15.0);
        assert!(!def.has_territory());
    }

    #[test]
    fn test_loot_roll_respects_chance() {
        let def = sample();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..20 {
            let drops = def.roll_loot(&mut rng);
            assert_eq!(drops.len(), 1);
            assert_eq!(drops[0].item, "hide");
            assert!((1..=2).contains(&drops[0].quantity));
        }
    }
}
