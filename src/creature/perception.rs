//! Vision cone perception of the player

use serde::Serialize;

use super::Creature;
use crate::core::config::BehaviorConfig;
use crate::core::types::{angle_difference_deg, Vec2};
use crate::species::SpeciesDef;

/// What a creature knows about the player this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perception {
    pub distance: f32,
    /// Heading from the creature to the player, degrees
    pub bearing_deg: f32,
    pub sees_player: bool,
}

impl Perception {
    pub fn of(creature: &Creature, def: &SpeciesDef, player: Vec2, config: &BehaviorConfig) -> Self {
        let offset = player - creature.position;
        let distance = offset.length();
        let bearing_deg = if distance > 1e-4 {
            offset.angle_deg()
        } else {
            creature.facing_deg
        };
        let cone = VisionCone::of(creature, def, config);

        Self {
            distance,
            bearing_deg,
            sees_player: cone.covers(distance, bearing_deg),
        }
    }
}

/// Angular + distance field of view
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisionCone {
    pub origin: Vec2,
    pub facing_deg: f32,
    pub half_angle_deg: f32,
    pub distance: f32,
    pub omnidirectional: bool,
}

impl VisionCone {
    /// Apex predators see all around them, further than their cone
    pub fn of(creature: &Creature, def: &SpeciesDef, config: &BehaviorConfig) -> Self {
        if def.apex {
            Self {
                origin: creature.position,
                facing_deg: creature.facing_deg,
                half_angle_deg: 180.0,
                distance: def.vision_distance * config.apex_vision_multiplier,
                omnidirectional: true,
            }
        } else {
            Self {
                origin: creature.position,
                facing_deg: creature.facing_deg,
                half_angle_deg: def.vision_angle_degrees * 0.5,
                distance: def.vision_distance,
                omnidirectional: def.vision_angle_degrees >= 360.0,
            }
        }
    }

    /// Is a point at `distance` along `bearing_deg` inside the cone?
    pub fn covers(&self, distance: f32, bearing_deg: f32) -> bool {
        if distance > self.distance {
            return false;
        }
        self.omnidirectional || angle_difference_deg(self.facing_deg, bearing_deg) <= self.half_angle_deg
    }

    pub fn covers_point(&self, p: Vec2) -> bool {
        let offset = p - self.origin;
        let distance = offset.length();
        if distance <= 1e-4 {
            return true;
        }
        self.covers(distance, offset.angle_deg())
    }
}
