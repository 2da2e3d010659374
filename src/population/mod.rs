//! Population manager: owns every creature, spawns to quota, ticks the
//! active scene and purges corpses.
//!
//! Creatures live in a dense arena indexed by [`CreatureId`]. Removal is a
//! swap-remove, so ids stay stable while slots move. Ids are never reused.

pub mod hunting;
pub mod placement;
pub mod snapshot;

pub use hunting::{HitResult, KillCredit};
pub use snapshot::CreatureRecord;

use ahash::AHashMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::config::WildlifeConfig;
use crate::core::error::{Result, WildlifeError};
use crate::core::types::{CreatureId, Rect, SceneId, SimTime, Vec2};
use crate::creature::{
    Creature, CreatureView, DamageEvent, DamageOutcome, PlayerAttack, TickContext,
};
use crate::spatial::Grid;
use crate::species::{RarityTier, SpeciesCatalog, SpeciesId};
use crate::terrain::{Habitat, HabitatConstraint, HabitatRegion, TerrainOracle};

/// What happened to the population during one [`PopulationManager::update`]
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub attacks: Vec<PlayerAttack>,
    pub spawned: Vec<CreatureId>,
    pub purged: Vec<CreatureId>,
}

pub struct PopulationManager {
    creatures: Vec<Creature>,
    index: AHashMap<CreatureId, usize>,
    next_id: u64,

    regions: Vec<HabitatRegion>,
    /// Coarse occupancy grid used to spread spawns out
    spawn_grid: Grid<u32>,

    config: WildlifeConfig,
    rng: ChaCha8Rng,
    now: SimTime,
    since_restock: f32,
}

impl PopulationManager {
    pub fn new(config: WildlifeConfig, regions: Vec<HabitatRegion>) -> Self {
        let spawn_grid = Grid::covering(config.world_bounds, config.population.spawn_cell_size);
        Self {
            creatures: Vec::new(),
            index: AHashMap::new(),
            next_id: 1,
            regions,
            spawn_grid,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            now: 0.0,
            since_restock: 0.0,
        }
    }

    pub fn config(&self) -> &WildlifeConfig {
        &self.config
    }

    pub fn regions(&self) -> &[HabitatRegion] {
        &self.regions
    }

    /// Simulation clock, seconds since creation
    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn len(&self) -> usize {
        self.creatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty()
    }

    pub fn get(&self, id: CreatureId) -> Option<&Creature> {
        self.index.get(&id).map(|&slot| &self.creatures[slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Creature> {
        self.creatures.iter()
    }

    pub fn alive_count(&self) -> usize {
        self.creatures.iter().filter(|c| c.is_alive()).count()
    }

    /// Live creatures of a tier (`None` counts untiered species)
    pub fn live_count(&self, tier: Option<RarityTier>) -> usize {
        self.creatures
            .iter()
            .filter(|c| c.is_alive() && c.tier() == tier)
            .count()
    }

    pub fn quota_reached(&self, tier: Option<RarityTier>) -> bool {
        self.live_count(tier) >= self.config.population.quota(tier)
    }

    fn allocate_id(&mut self) -> CreatureId {
        let id = CreatureId(self.next_id);
        self.next_id += 1;
        id
    }

    fn insert(&mut self, creature: Creature) -> CreatureId {
        let id = creature.id();
        self.index.insert(id, self.creatures.len());
        self.creatures.push(creature);
        id
    }

    fn remove(&mut self, id: CreatureId) -> Option<Creature> {
        let slot = self.index.remove(&id)?;
        let removed = self.creatures.swap_remove(slot);
        if let Some(moved) = self.creatures.get(slot) {
            self.index.insert(moved.id(), slot);
        }
        Some(removed)
    }

    fn slot_mut(&mut self, id: CreatureId) -> Option<&mut Creature> {
        let slot = *self.index.get(&id)?;
        self.creatures.get_mut(slot)
    }

    /// Spawn one `species` creature inside region `region`.
    ///
    /// `Ok(None)` when the tier quota is already met or no valid spot could be
    /// found; the latter is logged, not returned.
    pub fn spawn(
        &mut self,
        catalog: &SpeciesCatalog,
        species: SpeciesId,
        region: usize,
        terrain: &dyn TerrainOracle,
    ) -> Result<Option<CreatureId>> {
        let def = catalog.get(species)?;
        let region = self
            .regions
            .get(region)
            .cloned()
            .ok_or(WildlifeError::UnknownRegion(region))?;

        if self.quota_reached(def.rarity) {
            return Ok(None);
        }

        let habitat = HabitatConstraint::new(def.habitat, region.bounds, def.can_traverse_water);
        let position = match self.find_spawn_point(&habitat, terrain, def) {
            Ok(position) => position,
            Err(err) => {
                tracing::warn!("{} in region '{}': {}", def.name, region.name, err);
                return Ok(None);
            }
        };

        let id = self.allocate_id();
        let creature = Creature::new(id, species, def, position, habitat, region.scene, &mut self.rng);
        tracing::debug!(
            "Spawned {} {:?} at ({:.0}, {:.0}) in '{}'",
            def.name,
            id,
            position.x,
            position.y,
            region.name
        );
        Ok(Some(self.insert(creature)))
    }

    /// Spawn at an exact position. The position must be valid terrain for
    /// the species; the quota still applies.
    pub fn spawn_at(
        &mut self,
        catalog: &SpeciesCatalog,
        species: SpeciesId,
        position: Vec2,
        scene: SceneId,
        terrain: &dyn TerrainOracle,
    ) -> Result<Option<CreatureId>> {
        let def = catalog.get(species)?;
        if self.quota_reached(def.rarity) {
            return Ok(None);
        }

        let bounds = self.bounds_for(def.habitat, position, scene);
        let habitat = HabitatConstraint::new(def.habitat, bounds, def.can_traverse_water);
        if !habitat.allows(terrain, position) {
            return Err(WildlifeError::InvalidHabitatPlacement {
                species: def.name.clone(),
                habitat: def.habitat,
            });
        }

        let id = self.allocate_id();
        let creature = Creature::new(id, species, def, position, habitat, scene, &mut self.rng);
        Ok(Some(self.insert(creature)))
    }

    /// Bounds of the scene's region of `habitat` holding `position`, or the
    /// whole world when no region matches
    fn bounds_for(&self, habitat: Habitat, position: Vec2, scene: SceneId) -> Rect {
        self.regions
            .iter()
            .find(|r| r.habitat == habitat && r.scene == scene && r.bounds.contains(position))
            .map(|r| r.bounds)
            .unwrap_or(self.config.world_bounds)
    }

    /// Stock every region (optionally only one habitat) up to the quotas.
    /// Returns the ids spawned.
    pub fn initialize_population(
        &mut self,
        catalog: &SpeciesCatalog,
        terrain: &dyn TerrainOracle,
        habitat_filter: Option<Habitat>,
    ) -> Vec<CreatureId> {
        let regions: Vec<usize> = self
            .regions
            .iter()
            .enumerate()
            .filter(|(_, r)| habitat_filter.map_or(true, |h| r.habitat == h))
            .map(|(i, _)| i)
            .collect();
        let spawned = self.fill_regions(catalog, terrain, &regions);
        tracing::info!(
            "Population initialized: {} spawned, {} alive",
            spawned.len(),
            self.alive_count()
        );
        spawned
    }

    /// Round-robin over `regions`, one weighted spawn per region per round,
    /// until a full round makes no progress
    fn fill_regions(
        &mut self,
        catalog: &SpeciesCatalog,
        terrain: &dyn TerrainOracle,
        regions: &[usize],
    ) -> Vec<CreatureId> {
        let mut spawned = Vec::new();
        if regions.is_empty() {
            return spawned;
        }

        loop {
            let mut progress = false;
            for &region in regions {
                let habitat = self.regions[region].habitat;
                let open: Vec<Option<RarityTier>> = [
                    Some(RarityTier::Rare),
                    Some(RarityTier::SuperRare),
                    Some(RarityTier::Legendary),
                    None,
                ]
                .into_iter()
                .filter(|tier| !self.quota_reached(*tier))
                .collect();

                let Some(species) = catalog.weighted_pick(&mut self.rng, |def| {
                    def.habitat == habitat && open.contains(&def.rarity)
                }) else {
                    continue;
                };

                match self.spawn(catalog, species, region, terrain) {
                    Ok(Some(id)) => {
                        spawned.push(id);
                        progress = true;
                    }
                    Ok(None) => {}
                    Err(err) => tracing::warn!("Spawn failed: {}", err),
                }
            }
            if !progress {
                break;
            }
        }
        spawned
    }

    /// Advance every live creature of `scene` by `dt`.
    ///
    /// A non-positive `dt` leaves everything untouched.
    pub fn update(
        &mut self,
        dt: f32,
        player: Vec2,
        scene: SceneId,
        terrain: &dyn TerrainOracle,
        catalog: &SpeciesCatalog,
    ) -> Result<TickReport> {
        let mut report = TickReport::default();
        if dt <= 0.0 {
            return Ok(report);
        }
        self.now += dt as f64;

        let ctx = TickContext {
            dt,
            now: self.now,
            player,
            config: &self.config.behavior,
            terrain,
        };
        for creature in self.creatures.iter_mut() {
            if !creature.is_alive() || creature.scene() != scene {
                continue;
            }
            let def = catalog.get(creature.species())?;
            if let Some(attack) = creature.update(def, &ctx, &mut self.rng) {
                report.attacks.push(attack);
            }
        }

        report.purged = self.purge_corpses();

        self.since_restock += dt;
        if self.since_restock >= self.config.population.restock_interval {
            self.since_restock = 0.0;
            let regions: Vec<usize> = self
                .regions
                .iter()
                .enumerate()
                .filter(|(_, r)| r.scene == scene)
                .map(|(i, _)| i)
                .collect();
            report.spawned = self.fill_regions(catalog, terrain, &regions);
            if !report.spawned.is_empty() {
                tracing::debug!("Restocked {} creatures in scene {:?}", report.spawned.len(), scene);
            }
        }

        Ok(report)
    }

    /// Remove creatures dead for longer than the grace period
    fn purge_corpses(&mut self) -> Vec<CreatureId> {
        let grace = self.config.population.corpse_grace_period as f64;
        let now = self.now;
        let expired: Vec<CreatureId> = self
            .creatures
            .iter()
            .filter(|c| c.died_at().is_some_and(|t| now - t >= grace))
            .map(|c| c.id())
            .collect();

        for &id in &expired {
            self.remove(id);
            tracing::debug!("Purged corpse {:?}", id);
        }
        expired
    }

    /// Deliver one damage event. `None` if the target no longer exists.
    pub fn apply_damage(
        &mut self,
        catalog: &SpeciesCatalog,
        event: &DamageEvent,
    ) -> Result<Option<DamageOutcome>> {
        let now = self.now;
        let Some(slot) = self.index.get(&event.target).copied() else {
            return Ok(None);
        };
        let creature = &mut self.creatures[slot];
        let def = catalog.get(creature.species())?;
        Ok(Some(creature.take_damage(
            def,
            event,
            now,
            &self.config.behavior,
            &mut self.rng,
        )))
    }

    /// Axis-aligned body box of every live creature
    pub fn live_bounds(&self, catalog: &SpeciesCatalog) -> Vec<(CreatureId, Rect)> {
        self.creatures
            .iter()
            .filter(|c| c.is_alive())
            .filter_map(|c| {
                let def = catalog.get(c.species()).ok()?;
                Some((c.id(), Rect::around(c.position(), def.body_radius())))
            })
            .collect()
    }

    pub fn views(&self, catalog: &SpeciesCatalog) -> Vec<CreatureView> {
        self.creatures
            .iter()
            .filter_map(|c| {
                let def = catalog.get(c.species()).ok()?;
                Some(c.view(def, &self.config.behavior))
            })
            .collect()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::creature::Attacker;

    #[test]
    fn test_swap_remove_keeps_index_consistent() {
        let catalog = SpeciesCatalog::builtin();
        let mut pm = manager(vec![meadow()]);
        let a = spawn_named(&mut pm, &catalog, "Hare", Vec2::new(100.0, 100.0));
        let b = spawn_named(&mut pm, &catalog, "Hare", Vec2::new(300.0, 100.0));
        let c = spawn_named(&mut pm, &catalog, "Bison", Vec2::new(500.0, 100.0));

        assert!(pm.remove(a).is_some());
        assert!(pm.get(a).is_none());
        assert_eq!(pm.get(b).unwrap().position(), Vec2::new(300.0, 100.0));
        assert_eq!(pm.get(c).unwrap().position(), Vec2::new(500.0, 100.0));
        assert_eq!(pm.len(), 2);
    }

    #[test]
    fn test_ids_are_never_reused() {
        let catalog = SpeciesCatalog::builtin();
        let mut pm = manager(vec![meadow()]);
        let a = spawn_named(&mut pm, &catalog, "Hare", Vec2::new(100.0, 100.0));
        pm.remove(a);
        let b = spawn_named(&mut pm, &catalog, "Hare", Vec2::new(100.0, 100.0));
        assert_ne!(a, b);
    }

    #[test]
    fn test_quota_stops_spawning() {
        let catalog = SpeciesCatalog::builtin();
        let mut pm = manager(vec![meadow()]);
        let bison = catalog.id_by_name("Bison").unwrap();
        let quota = pm.config().population.super_rare_quota;
        for _ in 0..quota + 5 {
            pm.spawn(&catalog, bison, 0, &GRASS).unwrap();
        }
        assert_eq!(pm.live_count(Some(RarityTier::SuperRare)), quota);
        assert!(pm.spawn(&catalog, bison, 0, &GRASS).unwrap().is_none());
    }

    #[test]
    fn test_spawn_unknown_region() {
        let catalog = SpeciesCatalog::builtin();
        let mut pm = manager(vec![meadow()]);
        let hare = catalog.id_by_name("Hare").unwrap();
        assert!(matches!(
            pm.spawn(&catalog, hare, 7, &GRASS),
            Err(WildlifeError::UnknownRegion(7))
        ));
    }

    #[test]
    fn test_spawn_at_rejects_wrong_terrain() {
        let catalog = SpeciesCatalog::builtin();
        let mut pm = manager(vec![meadow()]);
        let trout = catalog.id_by_name("Brook Trout").unwrap();
        let result = pm.spawn_at(&catalog, trout, Vec2::new(50.0, 50.0), SceneId(0), &GRASS);
        assert!(matches!(result, Err(WildlifeError::InvalidHabitatPlacement { .. })));
    }

    #[test]
    fn test_initialize_fills_plains_region() {
        let catalog = SpeciesCatalog::builtin();
        let mut pm = manager(vec![meadow()]);
        let spawned = pm.initialize_population(&catalog, &GRASS, None);
        assert!(!spawned.is_empty());
        assert!(pm.iter().all(|c| {
            catalog.get(c.species()).unwrap().habitat == Habitat::Plains
        }));
        for tier in [Some(RarityTier::Rare), Some(RarityTier::SuperRare), None] {
            assert!(pm.live_count(tier) <= pm.config().population.quota(tier));
        }
    }

    #[test]
    fn test_habitat_filter_skips_other_regions() {
        let catalog = SpeciesCatalog::builtin();
        let lake = HabitatRegion::new(
            "lake",
            Habitat::Water,
            Rect::new(2000.0, 0.0, 3000.0, 1000.0),
            SceneId(0),
        );
        let mut pm = manager(vec![meadow(), lake]);
        pm.initialize_population(&catalog, &GRASS, Some(Habitat::Water));
        // Grass-only terrain has no water to place fish on
        assert_eq!(pm.len(), 0);
    }

    #[test]
    fn test_update_zero_dt_is_noop() {
        let catalog = SpeciesCatalog::builtin();
        let mut pm = manager(vec![meadow()]);
        spawn_named(&mut pm, &catalog, "Bison", Vec2::new(500.0, 500.0));
        let before: Vec<_> = pm.iter().map(|c| (c.position(), c.health(), c.state())).collect();
        let report = pm
            .update(0.0, Vec2::new(510.0, 500.0), SceneId(0), &GRASS, &catalog)
            .unwrap();
        assert!(report.attacks.is_empty());
        let after: Vec<_> = pm.iter().map(|c| (c.position(), c.health(), c.state())).collect();
        assert_eq!(before, after);
        assert_eq!(pm.now(), 0.0);
    }

    #[test]
    fn test_inactive_scene_is_frozen() {
        let catalog = SpeciesCatalog::builtin();
        let mut pm = manager(vec![meadow()]);
        let id = spawn_named(&mut pm, &catalog, "Hare", Vec2::new(500.0, 500.0));
        for _ in 0..50 {
            pm.update(0.1, Vec2::new(3000.0, 3000.0), SceneId(9), &GRASS, &catalog)
                .unwrap();
        }
        assert_eq!(pm.get(id).unwrap().position(), Vec2::new(500.0, 500.0));
    }

    #[test]
    fn test_corpse_purged_after_grace_period() {
        let catalog = SpeciesCatalog::builtin();
        let mut pm = manager(vec![meadow()]);
        let id = spawn_named(&mut pm, &catalog, "Hare", Vec2::new(500.0, 500.0));
        let event = DamageEvent {
            source: Attacker::Player,
            target: id,
            amount: 1000.0,
            origin: Vec2::new(400.0, 500.0),
        };
        assert!(pm.apply_damage(&catalog, &event).unwrap().unwrap().killed);

        let far = Vec2::new(1900.0, 1900.0);
        pm.update(5.0, far, SceneId(0), &GRASS, &catalog).unwrap();
        assert!(pm.get(id).is_some());
        let report = pm.update(5.5, far, SceneId(0), &GRASS, &catalog).unwrap();
        assert_eq!(report.purged, vec![id]);
        assert!(pm.get(id).is_none());
    }
}
