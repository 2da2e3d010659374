//! Wildlife configuration with documented constants
//!
//! All tuning numbers for perception, behavior timers, population quotas and
//! projectiles live here. Values can be overridden from a TOML file; any
//! field missing from the file keeps its default.

use std::fs;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, WildlifeError};
use crate::core::types::{Rect, Vec2};
use crate::species::RarityTier;

/// Inclusive range of seconds a timed state lasts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DurationRange {
    pub min: f32,
    pub max: f32,
}

impl DurationRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Roll a duration uniformly inside the range
    pub fn roll(&self, rng: &mut impl Rng) -> f32 {
        if self.max <= self.min {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }

    fn is_valid(&self) -> bool {
        self.min >= 0.0 && self.max >= self.min
    }
}

/// Perception and state-machine tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    // === PERCEPTION ===
    /// Radius inside which untiered species consult the threat table (world units)
    pub detection_radius: f32,

    /// Fraction of the detection radius treated as "close" by the threat table.
    ///
    /// Defensive and territorial species attack outright inside this band and
    /// only warn (Alert / Roaring) outside it.
    pub close_threat_fraction: f32,

    /// Vision distance multiplier for apex predators' 360° perception
    pub apex_vision_multiplier: f32,

    // === WANDERING / GRAZING ===
    /// Wander speed as a fraction of base speed
    pub wander_speed_fraction: f32,

    /// Chance to start grazing when a wander leg ends
    pub graze_chance: f64,

    pub graze_duration: DurationRange,
    pub wander_duration: DurationRange,

    /// Distance at which a movement target counts as reached
    pub arrival_distance: f32,

    /// Random samples tried when picking a wander target on valid terrain
    pub wander_target_attempts: u32,

    // === FLEEING ===
    /// Flee timer when a rare creature spots the player
    pub rare_flee_duration: DurationRange,

    /// Flee timer from the untiered threat table
    pub flee_duration: DurationRange,

    /// Flee timer after being wounded (longer than a sighting)
    pub damage_flee_duration: DurationRange,

    /// How far away from the threat a flee target is placed
    pub flee_distance: f32,

    /// Extra flee speed for rare creatures (they are the skittish tier)
    pub rare_flee_speed_multiplier: f32,

    /// Extra flee speed while injured
    pub injured_flee_speed_multiplier: f32,

    /// Per-tick chance an injured fleeing creature jinks sideways
    pub erratic_turn_chance: f64,

    /// Largest sideways jink, in degrees
    pub erratic_turn_max_deg: f32,

    /// Per-tick chance to re-aim the flee target away from the player
    pub flee_reaim_chance: f64,

    /// Safety distance as a multiple of the detection radius
    pub safety_distance_multiplier: f32,

    /// Safety distance multiple for rare creatures
    pub rare_safety_distance_multiplier: f32,

    // === HIDING / ALERT / ROARING ===
    pub hide_duration: DurationRange,

    /// Health regenerated per second by injured rare creatures while hidden
    pub hide_regen_per_sec: f32,

    pub alert_duration: DurationRange,

    /// Alert timer after a wounded rare creature comes out of hiding
    pub extended_alert_duration: DurationRange,

    /// How long heightened wariness lasts after hiding
    pub wary_duration: f32,

    /// Detection radius multiplier while wary
    pub wary_detection_multiplier: f32,

    pub roar_duration: DurationRange,

    // === ATTACKING ===
    /// Seconds between two landed attacks from the same creature
    pub attack_cooldown: f32,

    /// Territorial chasers give up beyond this multiple of their territory radius
    pub territory_exit_multiplier: f32,

    /// Non-territorial chasers give up beyond this multiple of the detection radius
    pub chase_abandon_multiplier: f32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            detection_radius: 200.0,
            close_threat_fraction: 0.5,
            apex_vision_multiplier: 1.5,

            wander_speed_fraction: 0.6,
            graze_chance: 0.3,
            graze_duration: DurationRange::new(2.0, 5.0),
            wander_duration: DurationRange::new(5.0, 10.0),
            arrival_distance: 8.0,
            wander_target_attempts: 20,

            rare_flee_duration: DurationRange::new(4.0, 7.0),
            flee_duration: DurationRange::new(3.0, 6.0),
            damage_flee_duration: DurationRange::new(6.0, 9.0),
            flee_distance: 300.0,
            rare_flee_speed_multiplier: 1.5,
            injured_flee_speed_multiplier: 1.25,
            erratic_turn_chance: 0.15,
            erratic_turn_max_deg: 60.0,
            flee_reaim_chance: 0.08,
            safety_distance_multiplier: 3.0,
            rare_safety_distance_multiplier: 4.0,

            hide_duration: DurationRange::new(3.0, 6.0),
            hide_regen_per_sec: 2.0,
            alert_duration: DurationRange::new(2.0, 4.0),
            extended_alert_duration: DurationRange::new(6.0, 9.0),
            wary_duration: 15.0,
            wary_detection_multiplier: 1.5,
            roar_duration: DurationRange::new(1.5, 2.5),

            attack_cooldown: 1.5,
            territory_exit_multiplier: 2.0,
            chase_abandon_multiplier: 2.5,
        }
    }
}

/// Spawn quotas, placement and lifecycle tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub rare_quota: usize,
    pub super_rare_quota: usize,
    pub legendary_quota: usize,
    /// Quota for species without a rarity tier
    pub untiered_quota: usize,

    /// Cell size of the coarse placement grid (world units)
    pub spawn_cell_size: f32,

    /// No new creature is placed closer than this to an existing one
    pub min_spawn_separation: f32,

    /// Constrained placement attempts before falling back to plain terrain matching
    pub max_placement_attempts: u32,

    /// Attempts for the unconstrained fallback
    pub fallback_placement_attempts: u32,

    /// Seconds a corpse stays in the collection before being purged
    pub corpse_grace_period: f32,

    /// Seconds between restock passes over the active scene
    pub restock_interval: f32,

    /// Damage dealt by a melee hunt
    pub hunt_damage: f32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            rare_quota: 20,
            super_rare_quota: 10,
            legendary_quota: 5,
            untiered_quota: 15,
            spawn_cell_size: 200.0,
            min_spawn_separation: 100.0,
            max_placement_attempts: 40,
            fallback_placement_attempts: 60,
            corpse_grace_period: 10.0,
            restock_interval: 30.0,
            hunt_damage: 35.0,
        }
    }
}

impl PopulationConfig {
    /// Live-instance quota for a tier (`None` = untiered species)
    pub fn quota(&self, tier: Option<RarityTier>) -> usize {
        match tier {
            Some(RarityTier::Rare) => self.rare_quota,
            Some(RarityTier::SuperRare) => self.super_rare_quota,
            Some(RarityTier::Legendary) => self.legendary_quota,
            None => self.untiered_quota,
        }
    }
}

/// Projectile flight tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Flight speed (world units per second)
    pub speed: f32,

    /// Seconds before an unresolved projectile expires
    pub max_lifetime: f32,

    /// Half-size of the projectile's bounding box
    pub half_extent: f32,

    /// Projectiles are discarded this far outside the world bounds
    pub bounds_margin: f32,

    /// Shots per second allowed by the caller-side fire gate
    pub fire_rate: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: 450.0,
            max_lifetime: 3.0,
            half_extent: 2.0,
            bounds_margin: 50.0,
            fire_rate: 2.0,
        }
    }
}

/// Top-level configuration for the wildlife core
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WildlifeConfig {
    /// Seed for the simulation RNG; identical seeds replay identically
    pub seed: u64,

    /// Playable world rectangle
    pub world_bounds: Rect,

    pub behavior: BehaviorConfig,
    pub population: PopulationConfig,
    pub projectile: ProjectileConfig,
}

impl Default for WildlifeConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            world_bounds: Rect {
                min: Vec2::new(0.0, 0.0),
                max: Vec2::new(4000.0, 4000.0),
            },
            behavior: BehaviorConfig::default(),
            population: PopulationConfig::default(),
            projectile: ProjectileConfig::default(),
        }
    }
}

impl WildlifeConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: WildlifeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let b = &self.behavior;
        let p = &self.population;
        let pr = &self.projectile;

        if self.world_bounds.width() <= 0.0 || self.world_bounds.height() <= 0.0 {
            return Err(WildlifeError::InvalidConfig(
                "world_bounds must have positive area".into(),
            ));
        }

        if b.detection_radius <= 0.0 {
            return Err(WildlifeError::InvalidConfig(format!(
                "detection_radius ({}) must be positive",
                b.detection_radius
            )));
        }

        // Safety distance must lie beyond detection or fleeing never ends early
        if b.safety_distance_multiplier <= 1.0 || b.rare_safety_distance_multiplier <= 1.0 {
            return Err(WildlifeError::InvalidConfig(
                "safety distance multipliers must be > 1".into(),
            ));
        }

        let ranges = [
            ("graze_duration", b.graze_duration),
            ("wander_duration", b.wander_duration),
            ("rare_flee_duration", b.rare_flee_duration),
            ("flee_duration", b.flee_duration),
            ("damage_flee_duration", b.damage_flee_duration),
            ("hide_duration", b.hide_duration),
            ("alert_duration", b.alert_duration),
            ("extended_alert_duration", b.extended_alert_duration),
            ("roar_duration", b.roar_duration),
        ];
        for (name, range) in ranges {
            if !range.is_valid() {
                return Err(WildlifeError::InvalidConfig(format!(
                    "{} must satisfy 0 <= min <= max (got {}..{})",
                    name, range.min, range.max
                )));
            }
        }

        let chances = [
            ("graze_chance", b.graze_chance),
            ("erratic_turn_chance", b.erratic_turn_chance),
            ("flee_reaim_chance", b.flee_reaim_chance),
        ];
        for (name, chance) in chances {
            if !(0.0..=1.0).contains(&chance) {
                return Err(WildlifeError::InvalidConfig(format!(
                    "{} ({}) must be within [0, 1]",
                    name, chance
                )));
            }
        }

        if b.erratic_turn_max_deg < 0.0 {
            return Err(WildlifeError::InvalidConfig(
                "erratic_turn_max_deg must not be negative".into(),
            ));
        }

        if p.spawn_cell_size <= 0.0 {
            return Err(WildlifeError::InvalidConfig(
                "spawn_cell_size must be positive".into(),
            ));
        }

        if pr.speed <= 0.0 || pr.max_lifetime <= 0.0 || pr.fire_rate <= 0.0 {
            return Err(WildlifeError::InvalidConfig(
                "projectile speed, max_lifetime and fire_rate must be positive".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_default_config_is_valid() {
        assert!(WildlifeConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_quotas() {
        let p = PopulationConfig::default();
        assert_eq!(p.quota(Some(RarityTier::Rare)), 20);
        assert_eq!(p.quota(Some(RarityTier::SuperRare)), 10);
        assert_eq!(p.quota(Some(RarityTier::Legendary)), 5);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = WildlifeConfig::from_toml_str(
            r#"
            seed = 7

            [population]
            rare_quota = 3

            [projectile]
            speed = 300.0
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, 7);
        assert_eq!(config.population.rare_quota, 3);
        assert_eq!(config.population.legendary_quota, 5);
        assert_eq!(config.projectile.speed, 300.0);
        assert_eq!(config.behavior.detection_radius, 200.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = WildlifeConfig::from_toml_str(
            r#"
            [behavior]
            graze_chance = 1.5
            "#,
        );
        assert!(matches!(err, Err(WildlifeError::InvalidConfig(_))));

        let mut config = WildlifeConfig::default();
        config.behavior.hide_duration = DurationRange::new(5.0, 1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duration_roll_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let range = DurationRange::new(4.0, 7.0);
        for _ in 0..100 {
            let d = range.roll(&mut rng);
            assert!((4.0..=7.0).contains(&d));
        }
        assert_eq!(DurationRange::new(2.0, 2.0).roll(&mut rng), 2.0);
    }
}
