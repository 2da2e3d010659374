//! Events emitted by the wildlife simulation, drained by the game loop

use serde::Serialize;

use crate::core::types::{CreatureId, Vec2};
use crate::creature::Attacker;
use crate::species::{LootDrop, SpeciesId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum WildlifeEvent {
    /// A creature landed an attack on the player
    PlayerAttacked {
        source: CreatureId,
        species: SpeciesId,
        damage: f32,
    },
    /// A creature took damage and survived
    CreatureDamaged {
        id: CreatureId,
        species: SpeciesId,
        amount: f32,
        remaining_health: f32,
    },
    /// A creature died; the reward and loot have already been credited
    CreatureKilled {
        id: CreatureId,
        species: SpeciesId,
        killer: Attacker,
        reward: u32,
        loot: Vec<LootDrop>,
        position: Vec2,
    },
    CreatureSpawned {
        id: CreatureId,
        species: SpeciesId,
        position: Vec2,
    },
    /// A corpse was purged from the population
    CreatureRemoved { id: CreatureId },
}
