//! Damage intake and the reaction it provokes

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::movement::flee_target;
use super::{BehaviorState, Creature, Transition};
use crate::core::config::BehaviorConfig;
use crate::core::types::{CreatureId, SimTime, Vec2};
use crate::species::{BehaviorTag, RarityTier, SpeciesDef, ThreatLevel};

/// Who dealt the damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attacker {
    Player,
    Creature(CreatureId),
}

/// A single damage application, passed by value through the tick pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageEvent {
    pub source: Attacker,
    pub target: CreatureId,
    pub amount: f32,
    /// Where the damage came from; reactions aim toward or away from it
    pub origin: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DamageOutcome {
    /// Health actually removed
    pub dealt: f32,
    /// This application killed the creature
    pub killed: bool,
}

impl Creature {
    /// Apply damage and pick a reaction. Damage to a dead creature is ignored.
    pub fn take_damage(
        &mut self,
        def: &SpeciesDef,
        event: &DamageEvent,
        now: SimTime,
        config: &BehaviorConfig,
        rng: &mut impl Rng,
    ) -> DamageOutcome {
        if self.state == BehaviorState::Dead {
            return DamageOutcome::default();
        }

        // NaN and negative amounts heal nothing and hurt nothing
        let amount = if event.amount.is_finite() { event.amount.max(0.0) } else { 0.0 };
        let dealt = amount.min(self.health);
        self.health = (self.health - dealt).max(0.0);
        if dealt > 0.0 {
            self.injured = true;
        }

        if self.health <= 0.0 {
            self.health = 0.0;
            self.state = BehaviorState::Dead;
            self.state_timer = 0.0;
            self.speed = 0.0;
            self.killer = Some(event.source);
            self.died_at = Some(now);
            tracing::debug!("{} {:?} killed by {:?}", def.name, self.id, event.source);
            return DamageOutcome { dealt, killed: true };
        }

        let reaction = self.damage_reaction(def, event.origin, config, rng);
        self.apply_transition(reaction);

        DamageOutcome { dealt, killed: false }
    }

    fn damage_reaction(
        &self,
        def: &SpeciesDef,
        origin: Vec2,
        config: &BehaviorConfig,
        rng: &mut impl Rng,
    ) -> Transition {
        let counter_attack = match def.rarity {
            Some(RarityTier::Rare) => false,
            Some(RarityTier::SuperRare) => def.threat >= ThreatLevel::High,
            Some(RarityTier::Legendary) => true,
            None => {
                def.threat > ThreatLevel::Low
                    && matches!(def.behavior, BehaviorTag::Defensive | BehaviorTag::Territorial)
            }
        };

        if counter_attack {
            return Transition::to(BehaviorState::Attacking, 0.0).with_target(origin);
        }

        let duration = config.damage_flee_duration.roll(rng);
        let target = flee_target(self.position, origin, config.flee_distance, &self.habitat, rng);
        Transition::to(BehaviorState::Fleeing, duration).with_target(target)
    }
}
