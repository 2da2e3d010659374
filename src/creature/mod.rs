//! Creature entity: vitals, perception, behavior and movement
//!
//! A creature is advanced once per tick by [`Creature::update`]:
//! perceive the player, apply the tier / territory policy, run the current
//! state's function, then move. Damage arrives separately through
//! [`Creature::take_damage`].

pub mod behavior;
pub mod damage;
pub mod movement;
pub mod perception;
pub mod state;

pub use damage::{Attacker, DamageEvent, DamageOutcome};
pub use perception::{Perception, VisionCone};
pub use state::{BehaviorState, MovementIntent, StateOutcome, Transition};

use rand::Rng;
use serde::Serialize;

use crate::core::config::BehaviorConfig;
use crate::core::types::{Circle, CreatureId, SceneId, SimTime, Vec2};
use crate::species::{RarityTier, SpeciesDef, SpeciesId};
use crate::terrain::{HabitatConstraint, TerrainOracle};

/// Per-tick inputs shared by every creature update
pub struct TickContext<'a> {
    pub dt: f32,
    pub now: SimTime,
    pub player: Vec2,
    pub config: &'a BehaviorConfig,
    pub terrain: &'a dyn TerrainOracle,
}

/// A creature landed a hit on the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerAttack {
    pub source: CreatureId,
    pub species: SpeciesId,
    pub damage: f32,
}

/// One live (or recently dead) animal
#[derive(Debug, Clone)]
pub struct Creature {
    id: CreatureId,
    species: SpeciesId,
    tier: Option<RarityTier>,

    position: Vec2,
    facing_deg: f32,

    health: f32,
    max_health: f32,
    injured: bool,

    state: BehaviorState,
    state_timer: f32,
    wary_timer: f32,

    target: Vec2,
    speed: f32,

    territory: Option<Circle>,
    territory_intruded: bool,

    last_attack_at: Option<SimTime>,
    killer: Option<Attacker>,
    died_at: Option<SimTime>,
    reward_claimed: bool,

    habitat: HabitatConstraint,
    scene: SceneId,
}

impl Creature {
    pub fn new(
        id: CreatureId,
        species: SpeciesId,
        def: &SpeciesDef,
        position: Vec2,
        habitat: HabitatConstraint,
        scene: SceneId,
        rng: &mut impl Rng,
    ) -> Self {
        let territory = def
            .has_territory()
            .then(|| Circle::new(position, def.territory_radius));

        Self {
            id,
            species,
            tier: def.rarity,
            position,
            facing_deg: rng.gen_range(0.0..360.0),
            health: def.max_health,
            max_health: def.max_health,
            injured: false,
            state: BehaviorState::Wandering,
            // Expired timer: the first update picks a wander target
            state_timer: 0.0,
            wary_timer: 0.0,
            target: position,
            speed: 0.0,
            territory,
            territory_intruded: false,
            last_attack_at: None,
            killer: None,
            died_at: None,
            reward_claimed: false,
            habitat,
            scene,
        }
    }

    pub fn id(&self) -> CreatureId {
        self.id
    }

    pub fn species(&self) -> SpeciesId {
        self.species
    }

    pub fn tier(&self) -> Option<RarityTier> {
        self.tier
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn facing_deg(&self) -> f32 {
        self.facing_deg
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health > 0.0 {
            self.health / self.max_health
        } else {
            0.0
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn is_injured(&self) -> bool {
        self.injured
    }

    pub fn state(&self) -> BehaviorState {
        self.state
    }

    pub fn state_timer(&self) -> f32 {
        self.state_timer
    }

    pub fn is_wary(&self) -> bool {
        self.wary_timer > 0.0
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn territory(&self) -> Option<Circle> {
        self.territory
    }

    pub fn killer(&self) -> Option<Attacker> {
        self.killer
    }

    pub fn died_at(&self) -> Option<SimTime> {
        self.died_at
    }

    pub fn habitat(&self) -> &HabitatConstraint {
        &self.habitat
    }

    pub fn scene(&self) -> SceneId {
        self.scene
    }

    /// Detection radius, enlarged while the creature is wary
    pub fn detection_radius(&self, config: &BehaviorConfig) -> f32 {
        if self.is_wary() {
            config.detection_radius * config.wary_detection_multiplier
        } else {
            config.detection_radius
        }
    }

    /// Mark the kill reward as paid. Returns false if it already was.
    pub(crate) fn claim_reward(&mut self) -> bool {
        if self.is_alive() || self.reward_claimed {
            return false;
        }
        self.reward_claimed = true;
        true
    }

    pub(crate) fn set_health(&mut self, health: f32) {
        self.health = health.clamp(0.0, self.max_health);
        self.injured = self.health < self.max_health;
        if self.health <= 0.0 {
            self.state = BehaviorState::Dead;
            self.speed = 0.0;
        }
    }

    /// Advance one tick. Returns an attack on the player if one landed.
    pub fn update(
        &mut self,
        def: &SpeciesDef,
        ctx: &TickContext<'_>,
        rng: &mut impl Rng,
    ) -> Option<PlayerAttack> {
        if ctx.dt <= 0.0 {
            return None;
        }
        if self.state == BehaviorState::Dead {
            self.speed = 0.0;
            return None;
        }

        self.state_timer -= ctx.dt;
        self.wary_timer = (self.wary_timer - ctx.dt).max(0.0);

        let perception = Perception::of(self, def, ctx.player, ctx.config);
        self.apply_policy(def, &perception, ctx, rng);

        let outcome = behavior::execute_state(self, def, &perception, ctx, rng);
        let attacked = self.apply_outcome(outcome, ctx);

        if self.speed > 0.0 {
            self.advance_movement(ctx.dt, ctx.terrain, ctx.config, rng);
        }

        attacked.then_some(PlayerAttack {
            source: self.id,
            species: self.species,
            damage: def.damage,
        })
    }

    fn apply_transition(&mut self, transition: Transition) {
        if self.state != transition.state {
            tracing::trace!(
                "creature {:?} {:?} -> {:?}",
                self.id,
                self.state,
                transition.state
            );
        }
        self.state = transition.state;
        self.state_timer = transition.timer;
        if let Some(target) = transition.target {
            self.target = target;
        }
        if self.state.is_stationary() {
            self.speed = 0.0;
        }
    }

    /// Apply a state function's result; returns true when an attack landed
    fn apply_outcome(&mut self, outcome: StateOutcome, ctx: &TickContext<'_>) -> bool {
        if outcome.heal > 0.0 {
            self.health = (self.health + outcome.heal).min(self.max_health);
            if self.health >= self.max_health {
                self.injured = false;
            }
        }
        if outcome.become_wary {
            self.wary_timer = ctx.config.wary_duration;
        }
        if let Some(transition) = outcome.transition {
            self.apply_transition(transition);
        }
        match outcome.intent {
            MovementIntent::Hold => self.speed = 0.0,
            MovementIntent::MoveTo { target, speed } => {
                self.target = target;
                self.speed = speed.max(0.0);
            }
        }
        if let Some(heading) = outcome.face {
            self.facing_deg = heading;
        }
        if outcome.attack {
            self.last_attack_at = Some(ctx.now);
        }
        outcome.attack
    }

    /// Data handed to the rendering layer
    pub fn view(&self, def: &SpeciesDef, config: &BehaviorConfig) -> CreatureView {
        CreatureView {
            id: self.id,
            species: self.species,
            species_name: def.name.clone(),
            position: self.position,
            facing_deg: self.facing_deg,
            state: self.state,
            health_fraction: self.health_fraction(),
            vision: VisionCone::of(self, def, config),
            territory: self.territory,
        }
    }
}

/// Read-only snapshot of a creature for drawing
#[derive(Debug, Clone, Serialize)]
pub struct CreatureView {
    pub id: CreatureId,
    pub species: SpeciesId,
    pub species_name: String,
    pub position: Vec2,
    pub facing_deg: f32,
    pub state: BehaviorState,
    pub health_fraction: f32,
    pub vision: VisionCone,
    pub territory: Option<Circle>,
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::core::types::Rect;
    use crate::species::SpeciesCatalog;
    use crate::terrain::{Habitat, TerrainClass, UniformTerrain};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    pub const GRASS: UniformTerrain = UniformTerrain(TerrainClass::Grass);

    pub fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(99)
    }

    pub fn def(name: &str) -> SpeciesDef {
        let catalog = SpeciesCatalog::builtin();
        let id = catalog.id_by_name(name).unwrap();
        catalog.get(id).unwrap().clone()
    }

    /// Creature of `name` at `pos` on an open grass field, facing east
    pub fn spawn(def: &SpeciesDef, pos: Vec2) -> Creature {
        let bounds = Rect::new(-5000.0, -5000.0, 5000.0, 5000.0);
        let habitat = HabitatConstraint {
            bounds,
            allowed: Habitat::Plains
                .terrain_mask()
                .with(TerrainClass::Forest)
                .with(TerrainClass::Hill)
                .with(TerrainClass::Water),
        };
        let mut c = Creature::new(
            CreatureId(1),
            SpeciesId(0),
            def,
            pos,
            habitat,
            SceneId(0),
            &mut rng(),
        );
        c.facing_deg = 0.0;
        c
    }

    pub fn ctx<'a>(config: &'a BehaviorConfig, player: Vec2, dt: f32) -> TickContext<'a> {
        TickContext {
            dt,
            now: 100.0,
            player,
            config,
            terrain: &GRASS,
        }
    }
}
