//! `WildlifeSim`: the surface the game loop talks to.
//!
//! Owns the species catalog, terrain oracle, population and projectiles.
//! Per frame the caller runs [`WildlifeSim::update`] then
//! [`WildlifeSim::update_projectiles`] and drains events. Attacks on the
//! player are delivered through [`WildlifeSim::drain_events`] exactly once.

pub mod events;

pub use events::WildlifeEvent;

use crate::core::config::WildlifeConfig;
use crate::core::error::Result;
use crate::core::types::{CreatureId, ProjectileId, SceneId, Vec2};
use crate::creature::{Attacker, CreatureView};
use crate::population::{CreatureRecord, HitResult, PopulationManager};
use crate::projectile::{Projectile, ProjectileHit, ProjectileSystem};
use crate::species::SpeciesCatalog;
use crate::terrain::{Habitat, HabitatRegion, TerrainOracle};

pub struct WildlifeSim<T: TerrainOracle> {
    catalog: SpeciesCatalog,
    terrain: T,
    population: PopulationManager,
    projectiles: ProjectileSystem,
    events: Vec<WildlifeEvent>,
}

impl<T: TerrainOracle> WildlifeSim<T> {
    pub fn new(
        config: WildlifeConfig,
        catalog: SpeciesCatalog,
        terrain: T,
        regions: Vec<HabitatRegion>,
    ) -> Result<Self> {
        config.validate()?;
        let projectiles = ProjectileSystem::new(config.projectile.clone(), config.world_bounds);
        Ok(Self {
            catalog,
            terrain,
            population: PopulationManager::new(config, regions),
            projectiles,
            events: Vec::new(),
        })
    }

    pub fn catalog(&self) -> &SpeciesCatalog {
        &self.catalog
    }

    pub fn population(&self) -> &PopulationManager {
        &self.population
    }

    pub fn terrain(&self) -> &T {
        &self.terrain
    }

    pub fn config(&self) -> &WildlifeConfig {
        self.population.config()
    }

    /// Stock all regions, or only those of `habitat_filter`
    pub fn initialize_population(&mut self, habitat_filter: Option<Habitat>) -> usize {
        let spawned =
            self.population
                .initialize_population(&self.catalog, &self.terrain, habitat_filter);
        self.record_spawns(&spawned);
        spawned.len()
    }

    /// Place one creature of `species` (by name) at an exact spot, e.g. for
    /// scripted encounters. Quotas still apply.
    pub fn spawn_at(&mut self, species: &str, position: Vec2, scene: SceneId) -> Result<Option<CreatureId>> {
        let species = self.catalog.id_by_name(species)?;
        let spawned = self
            .population
            .spawn_at(&self.catalog, species, position, scene, &self.terrain)?;
        if let Some(id) = spawned {
            self.record_spawns(&[id]);
        }
        Ok(spawned)
    }

    /// Advance creatures of `active_scene` by `dt`
    pub fn update(&mut self, dt: f32, player_position: Vec2, active_scene: SceneId) -> Result<()> {
        let report = self.population.update(
            dt,
            player_position,
            active_scene,
            &self.terrain,
            &self.catalog,
        )?;

        self.events
            .extend(report.attacks.into_iter().map(|a| WildlifeEvent::PlayerAttacked {
                source: a.source,
                species: a.species,
                damage: a.damage,
            }));
        self.events
            .extend(report.purged.into_iter().map(|id| WildlifeEvent::CreatureRemoved { id }));
        self.record_spawns(&report.spawned);
        Ok(())
    }

    pub fn fire_projectile(&mut self, origin: Vec2, target: Vec2, damage: f32) -> Option<ProjectileId> {
        self.projectiles.fire(origin, target, damage)
    }

    /// Fly projectiles, resolve their hits and credit any kills
    pub fn update_projectiles(&mut self, dt: f32) -> Result<Vec<ProjectileHit>> {
        self.projectiles.advance_all(dt);
        let hits = self
            .projectiles
            .resolve_collisions(&mut self.population, &self.catalog)?;

        for hit in &hits {
            if hit.killed {
                self.credit_kill(hit.creature, hit.impact)?;
            } else {
                self.record_damage(hit.creature, hit.damage);
            }
        }
        Ok(hits)
    }

    /// Instant hitscan shot, e.g. for weapons without a visible projectile
    pub fn resolve_player_shot(
        &mut self,
        origin: Vec2,
        target: Vec2,
        damage: f32,
        range: f32,
    ) -> Result<HitResult> {
        let result = self
            .population
            .resolve_ranged_hit(&self.catalog, origin, target, damage, range)?;
        self.record_hit(&result);
        Ok(result)
    }

    pub fn resolve_melee_hunt(&mut self, position: Vec2, range: f32) -> Result<HitResult> {
        let result = self
            .population
            .resolve_melee_hunt(&self.catalog, position, range)?;
        self.record_hit(&result);
        Ok(result)
    }

    pub fn creatures(&self) -> Vec<CreatureView> {
        self.population.views(&self.catalog)
    }

    pub fn projectiles(&self) -> Vec<Projectile> {
        self.projectiles.iter().cloned().collect()
    }

    /// Hand every pending event to the caller
    pub fn drain_events(&mut self) -> Vec<WildlifeEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Vec<CreatureRecord> {
        self.population.snapshot(&self.catalog)
    }

    /// Replace the population with saved records; in-flight projectiles are
    /// discarded
    pub fn restore(&mut self, records: &[CreatureRecord]) -> Result<()> {
        self.population.restore(&self.catalog, records)?;
        self.projectiles.clear();
        Ok(())
    }

    fn record_spawns(&mut self, ids: &[CreatureId]) {
        for &id in ids {
            if let Some(c) = self.population.get(id) {
                self.events.push(WildlifeEvent::CreatureSpawned {
                    id,
                    species: c.species(),
                    position: c.position(),
                });
            }
        }
    }

    fn record_damage(&mut self, id: CreatureId, amount: f32) {
        if let Some(c) = self.population.get(id) {
            self.events.push(WildlifeEvent::CreatureDamaged {
                id,
                species: c.species(),
                amount,
                remaining_health: c.health(),
            });
        }
    }

    fn record_hit(&mut self, result: &HitResult) {
        let (Some(id), Some(species)) = (result.creature, result.species) else {
            return;
        };
        if result.killed {
            self.events.push(WildlifeEvent::CreatureKilled {
                id,
                species,
                killer: Attacker::Player,
                reward: result.reward,
                loot: result.loot.clone(),
                position: result.impact.unwrap_or_default(),
            });
        } else {
            self.record_damage(id, result.damage_dealt);
        }
    }

    fn credit_kill(&mut self, id: CreatureId, position: Vec2) -> Result<()> {
        let Some(credit) = self.population.claim_kill(&self.catalog, id)? else {
            return Ok(());
        };
        if let Some(c) = self.population.get(id) {
            self.events.push(WildlifeEvent::CreatureKilled {
                id,
                species: c.species(),
                killer: c.killer().unwrap_or(Attacker::Player),
                reward: credit.reward,
                loot: credit.loot,
                position,
            });
        }
        Ok(())
    }
}
