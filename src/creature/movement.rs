//! Terrain-constrained movement and target selection

use rand::Rng;

use super::Creature;
use crate::core::config::BehaviorConfig;
use crate::core::types::Vec2;
use crate::terrain::{HabitatConstraint, TerrainOracle};

/// Random point on valid habitat terrain; falls back to `current` when no
/// sample lands on allowed terrain.
pub fn pick_wander_target(
    habitat: &HabitatConstraint,
    terrain: &dyn TerrainOracle,
    current: Vec2,
    attempts: u32,
    rng: &mut impl Rng,
) -> Vec2 {
    let b = habitat.bounds;
    if b.width() <= 0.0 || b.height() <= 0.0 {
        return current;
    }
    for _ in 0..attempts {
        let candidate = Vec2::new(
            rng.gen_range(b.min.x..=b.max.x),
            rng.gen_range(b.min.y..=b.max.y),
        );
        if habitat.allows(terrain, candidate) {
            return candidate;
        }
    }
    current
}

/// Point `distance` away from `threat`, straight through `from`, clamped to
/// the habitat bounds. A threat on top of the creature gives a random heading.
pub fn flee_target(
    from: Vec2,
    threat: Vec2,
    distance: f32,
    habitat: &HabitatConstraint,
    rng: &mut impl Rng,
) -> Vec2 {
    let away = from - threat;
    let direction = if away.length() > 0.1 {
        away.normalize()
    } else {
        Vec2::from_angle_deg(rng.gen_range(0.0..360.0))
    };
    habitat.bounds.clamp(from + direction * distance)
}

impl Creature {
    /// Step toward the current target. A step that would leave allowed
    /// terrain is discarded and a fresh wander target is chosen instead.
    ///
    /// Returns true if the creature moved.
    pub fn advance_movement(
        &mut self,
        dt: f32,
        terrain: &dyn TerrainOracle,
        config: &BehaviorConfig,
        rng: &mut impl Rng,
    ) -> bool {
        if dt <= 0.0 || self.speed <= 0.0 {
            return false;
        }

        let to_target = self.target - self.position;
        let remaining = to_target.length();
        if remaining <= 1e-3 {
            return false;
        }

        let direction = to_target.normalize();
        let step = (self.speed * dt).min(remaining);
        let candidate = self.habitat.bounds.clamp(self.position + direction * step);

        if !self.habitat.allows(terrain, candidate) {
            self.target = pick_wander_target(
                &self.habitat,
                terrain,
                self.position,
                config.wander_target_attempts,
                rng,
            );
            return false;
        }

        let moved = candidate != self.position;
        self.position = candidate;
        if moved {
            self.facing_deg = direction.angle_deg();
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::core::types::Rect;
    use crate::terrain::{Habitat, TerrainClass};

    fn lake_shore(x: f32, _y: f32) -> TerrainClass {
        if x < 100.0 {
            TerrainClass::Grass
        } else {
            TerrainClass::Water
        }
    }

    #[test]
    fn test_step_does_not_overshoot() {
        let config = BehaviorConfig::default();
        let d = def("Deer");
        let mut c = spawn(&d, Vec2::ZERO);
        c.target = Vec2::new(5.0, 0.0);
        c.speed = 100.0;
        assert!(c.advance_movement(1.0, &GRASS, &config, &mut rng()));
        assert_eq!(c.position(), Vec2::new(5.0, 0.0));
        assert!((c.facing_deg() - 0.0).abs() < 1e-3);
    }

    #[test]
    fn test_invalid_terrain_step_is_discarded() {
        let config = BehaviorConfig::default();
        let d = def("Hare");
        let mut c = spawn(&d, Vec2::new(95.0, 0.0));
        c.habitat = HabitatConstraint::new(
            Habitat::Plains,
            Rect::new(0.0, -100.0, 300.0, 100.0),
            false,
        );
        c.target = Vec2::new(200.0, 0.0);
        c.speed = 50.0;

        let moved = c.advance_movement(0.5, &lake_shore, &config, &mut rng());
        assert!(!moved);
        assert_eq!(c.position(), Vec2::new(95.0, 0.0));
        // New target sits on grass
        assert!(c.target().x < 100.0);
    }

    #[test]
    fn test_bounds_clamp() {
        let config = BehaviorConfig::default();
        let d = def("Deer");
        let mut c = spawn(&d, Vec2::new(90.0, 0.0));
        c.habitat = HabitatConstraint::new(
            Habitat::Plains,
            Rect::new(0.0, -100.0, 100.0, 100.0),
            false,
        );
        c.target = Vec2::new(500.0, 0.0);
        c.speed = 100.0;
        c.advance_movement(1.0, &GRASS, &config, &mut rng());
        assert_eq!(c.position(), Vec2::new(100.0, 0.0));
    }

    #[test]
    fn test_flee_target_points_away() {
        let habitat = HabitatConstraint::new(
            Habitat::Plains,
            Rect::new(-1000.0, -1000.0, 1000.0, 1000.0),
            false,
        );
        let from = Vec2::new(0.0, 0.0);
        let threat = Vec2::new(-30.0, -40.0);
        let target = flee_target(from, threat, 100.0, &habitat, &mut rng());
        assert!((target.x - 60.0).abs() < 1e-3);
        assert!((target.y - 80.0).abs() < 1e-3);
    }

    #[test]
    fn test_wander_target_on_valid_terrain() {
        let habitat = HabitatConstraint::new(
            Habitat::Plains,
            Rect::new(0.0, 0.0, 300.0, 300.0),
            false,
        );
        let mut r = rng();
        for _ in 0..50 {
            let t = pick_wander_target(&habitat, &lake_shore, Vec2::new(10.0, 10.0), 20, &mut r);
            assert!(habitat.allows(&lake_shore, t) || t == Vec2::new(10.0, 10.0));
        }
    }
}
