//! Save / restore of the live population
//!
//! Records carry the species by name so saves survive catalog reordering.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use super::PopulationManager;
use crate::core::error::{Result, WildlifeError};
use crate::core::types::{CreatureId, SceneId, Vec2};
use crate::creature::Creature;
use crate::species::SpeciesCatalog;
use crate::terrain::HabitatConstraint;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureRecord {
    pub id: CreatureId,
    pub species: String,
    pub position: Vec2,
    pub health: f32,
    #[serde(default)]
    pub scene: SceneId,
}

impl PopulationManager {
    /// Records for every live creature. Corpses are not saved.
    pub fn snapshot(&self, catalog: &SpeciesCatalog) -> Vec<CreatureRecord> {
        self.creatures
            .iter()
            .filter(|c| c.is_alive())
            .filter_map(|c| {
                let def = catalog.get(c.species()).ok()?;
                Some(CreatureRecord {
                    id: c.id(),
                    species: def.name.clone(),
                    position: c.position(),
                    health: c.health(),
                    scene: c.scene(),
                })
            })
            .collect()
    }

    /// Replace the population with `records`. Fails without touching the
    /// current population if any record names an unknown species or repeats
    /// an id. Records without positive health are skipped.
    pub fn restore(&mut self, catalog: &SpeciesCatalog, records: &[CreatureRecord]) -> Result<()> {
        let mut restored = Vec::with_capacity(records.len());
        let mut seen = AHashSet::with_capacity(records.len());
        for record in records {
            if !seen.insert(record.id) {
                return Err(WildlifeError::InvalidConfig(format!(
                    "duplicate creature id {:?} in snapshot",
                    record.id
                )));
            }
            if record.health.is_nan() || record.health <= 0.0 {
                tracing::warn!(
                    "Skipping {} {:?}: saved health {}",
                    record.species,
                    record.id,
                    record.health
                );
                continue;
            }
            let species = catalog.id_by_name(&record.species)?;
            let def = catalog.get(species)?;
            let bounds = self.bounds_for(def.habitat, record.position, record.scene);
            let habitat = HabitatConstraint::new(def.habitat, bounds, def.can_traverse_water);
            let mut creature = Creature::new(
                record.id,
                species,
                def,
                record.position,
                habitat,
                record.scene,
                &mut self.rng,
            );
            creature.set_health(record.health);
            restored.push(creature);
        }

        self.creatures.clear();
        self.index.clear();
        for creature in restored {
            self.next_id = self.next_id.max(creature.id().0 + 1);
            self.insert(creature);
        }
        tracing::info!("Restored {} creatures", self.creatures.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_snapshot_restore_preserves_creatures() {
        let catalog = SpeciesCatalog::builtin();
        let mut pm = manager(vec![meadow()]);
        let hare = spawn_named(&mut pm, &catalog, "Hare", Vec2::new(200.0, 300.0));
        spawn_named(&mut pm, &catalog, "Bison", Vec2::new(800.0, 300.0));
        pm.resolve_melee_hunt(&catalog, Vec2::new(800.0, 320.0), 10.0).unwrap();

        let records = pm.snapshot(&catalog);
        let json = serde_json::to_string(&records).unwrap();
        let loaded: Vec<CreatureRecord> = serde_json::from_str(&json).unwrap();

        let mut fresh = manager(vec![meadow()]);
        fresh.restore(&catalog, &loaded).unwrap();
        assert_eq!(fresh.snapshot(&catalog), records);
        assert_eq!(fresh.get(hare).unwrap().position(), Vec2::new(200.0, 300.0));

        // New ids continue past restored ones
        let next = spawn_named(&mut fresh, &catalog, "Hare", Vec2::new(1500.0, 1500.0));
        assert!(records.iter().all(|r| r.id < next));
    }

    #[test]
    fn test_restore_rejects_unknown_species() {
        let catalog = SpeciesCatalog::builtin();
        let mut pm = manager(vec![meadow()]);
        spawn_named(&mut pm, &catalog, "Hare", Vec2::new(200.0, 300.0));
        let records = vec![CreatureRecord {
            id: CreatureId(5),
            species: "Jackalope".to_string(),
            position: Vec2::ZERO,
            health: 10.0,
            scene: SceneId(0),
        }];
        assert!(matches!(
            pm.restore(&catalog, &records),
            Err(WildlifeError::UnknownSpecies(_))
        ));
        assert_eq!(pm.len(), 1);
    }

    fn record(id: u64, species: &str, x: f32, health: f32) -> CreatureRecord {
        CreatureRecord {
            id: CreatureId(id),
            species: species.to_string(),
            position: Vec2::new(x, 300.0),
            health,
            scene: SceneId(0),
        }
    }

    #[test]
    fn test_restore_skips_records_without_health() {
        let catalog = SpeciesCatalog::builtin();
        let mut pm = manager(vec![meadow()]);
        let records = vec![
            record(1, "Hare", 200.0, 12.0),
            record(2, "Hare", 600.0, 0.0),
            record(3, "Bison", 900.0, -4.0),
        ];
        pm.restore(&catalog, &records).unwrap();

        assert_eq!(pm.len(), 1);
        assert!(pm.get(CreatureId(1)).is_some());
        assert!(pm.get(CreatureId(2)).is_none());
        assert!(pm.iter().all(|c| c.is_alive()));
    }

    #[test]
    fn test_restore_rejects_duplicate_ids() {
        let catalog = SpeciesCatalog::builtin();
        let mut pm = manager(vec![meadow()]);
        spawn_named(&mut pm, &catalog, "Hare", Vec2::new(200.0, 300.0));
        let records = vec![record(7, "Hare", 200.0, 12.0), record(7, "Bison", 900.0, 50.0)];

        assert!(matches!(
            pm.restore(&catalog, &records),
            Err(WildlifeError::InvalidConfig(_))
        ));
        assert_eq!(pm.len(), 1);
    }
}
