//! Player hunting: hitscan shots, melee hunts and kill credit

use ordered_float::OrderedFloat;
use serde::Serialize;

use super::PopulationManager;
use crate::core::error::Result;
use crate::core::types::{point_segment_distance, CreatureId, Vec2};
use crate::creature::{Attacker, DamageEvent};
use crate::species::{LootDrop, SpeciesCatalog, SpeciesId};

/// Reward and loot for one kill, paid at most once per creature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KillCredit {
    pub reward: u32,
    pub loot: Vec<LootDrop>,
}

/// Outcome of a player shot or hunt. A miss is a normal result, not an error.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HitResult {
    pub creature: Option<CreatureId>,
    pub species: Option<SpeciesId>,
    pub damage_dealt: f32,
    pub killed: bool,
    pub reward: u32,
    pub loot: Vec<LootDrop>,
    pub impact: Option<Vec2>,
}

impl HitResult {
    pub fn missed() -> Self {
        Self::default()
    }

    pub fn is_hit(&self) -> bool {
        self.creature.is_some()
    }
}

impl PopulationManager {
    /// Hitscan from `shooter` toward `target`, truncated to `max_range`.
    /// The first live creature along the ray whose body intersects it is hit.
    pub fn resolve_ranged_hit(
        &mut self,
        catalog: &SpeciesCatalog,
        shooter: Vec2,
        target: Vec2,
        damage: f32,
        max_range: f32,
    ) -> Result<HitResult> {
        let aim = target - shooter;
        let length = aim.length();
        if length <= f32::EPSILON || max_range <= 0.0 {
            return Ok(HitResult::missed());
        }
        let end = shooter + aim.normalize() * length.min(max_range);

        let mut nearest: Option<(OrderedFloat<f32>, CreatureId)> = None;
        for creature in self.creatures.iter().filter(|c| c.is_alive()) {
            let def = catalog.get(creature.species())?;
            let (distance, along) = point_segment_distance(creature.position(), shooter, end);
            if distance <= def.body_radius() {
                let candidate = (OrderedFloat(along), creature.id());
                nearest = Some(nearest.map_or(candidate, |best| best.min(candidate)));
            }
        }

        match nearest {
            Some((_, id)) => self.strike(catalog, id, damage, shooter),
            None => Ok(HitResult::missed()),
        }
    }

    /// Close-range hunt: the nearest live creature within `range` of the
    /// player's body edge takes the configured hunt damage
    pub fn resolve_melee_hunt(
        &mut self,
        catalog: &SpeciesCatalog,
        position: Vec2,
        range: f32,
    ) -> Result<HitResult> {
        let mut nearest: Option<(OrderedFloat<f32>, CreatureId)> = None;
        for creature in self.creatures.iter().filter(|c| c.is_alive()) {
            let def = catalog.get(creature.species())?;
            let distance = creature.position().distance(&position);
            if distance <= range + def.body_radius() {
                let candidate = (OrderedFloat(distance), creature.id());
                nearest = Some(nearest.map_or(candidate, |best| best.min(candidate)));
            }
        }

        match nearest {
            Some((_, id)) => {
                let damage = self.config.population.hunt_damage;
                self.strike(catalog, id, damage, position)
            }
            None => Ok(HitResult::missed()),
        }
    }

    fn strike(
        &mut self,
        catalog: &SpeciesCatalog,
        id: CreatureId,
        damage: f32,
        origin: Vec2,
    ) -> Result<HitResult> {
        let Some(creature) = self.get(id) else {
            return Ok(HitResult::missed());
        };
        let species = creature.species();
        let impact = creature.position();

        let event = DamageEvent {
            source: Attacker::Player,
            target: id,
            amount: damage,
            origin,
        };
        let Some(outcome) = self.apply_damage(catalog, &event)? else {
            return Ok(HitResult::missed());
        };

        let mut result = HitResult {
            creature: Some(id),
            species: Some(species),
            damage_dealt: outcome.dealt,
            killed: outcome.killed,
            impact: Some(impact),
            ..HitResult::default()
        };
        if outcome.killed {
            if let Some(credit) = self.claim_kill(catalog, id)? {
                result.reward = credit.reward;
                result.loot = credit.loot;
            }
        }
        Ok(result)
    }

    /// Pay out a dead creature's reward and roll its loot. `None` if the
    /// creature is alive, gone, or already paid.
    pub fn claim_kill(&mut self, catalog: &SpeciesCatalog, id: CreatureId) -> Result<Option<KillCredit>> {
        let Some(creature) = self.slot_mut(id) else {
            return Ok(None);
        };
        if !creature.claim_reward() {
            return Ok(None);
        }
        let species = creature.species();
        let def = catalog.get(species)?;
        let credit = KillCredit {
            reward: catalog.reward_for_species(species)?,
            loot: def.roll_loot(&mut self.rng),
        };
        tracing::debug!("{} {:?} claimed for {} coins", def.name, id, credit.reward);
        Ok(Some(credit))
    }
}
