//! Spawn point selection
//!
//! Cells of the coarse occupancy grid that overlap the habitat are tried
//! least-populated first, so a region fills evenly instead of clumping.

use rand::seq::SliceRandom;
use rand::Rng;

use super::PopulationManager;
use crate::core::error::{Result, WildlifeError};
use crate::core::types::{Rect, Vec2};
use crate::species::SpeciesDef;
use crate::terrain::{HabitatConstraint, TerrainOracle};

fn random_point_in(rect: &Rect, rng: &mut impl Rng) -> Vec2 {
    let x = if rect.width() > 0.0 { rng.gen_range(rect.min.x..rect.max.x) } else { rect.min.x };
    let y = if rect.height() > 0.0 { rng.gen_range(rect.min.y..rect.max.y) } else { rect.min.y };
    Vec2::new(x, y)
}

impl PopulationManager {
    /// Recount live creatures per grid cell
    fn refresh_spawn_grid(&mut self) {
        self.spawn_grid.fill(0);
        for creature in self.creatures.iter().filter(|c| c.is_alive()) {
            if let Some((x, y)) = self.spawn_grid.world_to_cell(creature.position()) {
                if let Some(count) = self.spawn_grid.get_mut(x, y) {
                    *count += 1;
                }
            }
        }
    }

    fn respects_separation(&self, p: Vec2) -> bool {
        let min_sq = self.config.population.min_spawn_separation.powi(2);
        self.creatures
            .iter()
            .filter(|c| c.is_alive())
            .all(|c| c.position().distance_squared(&p) >= min_sq)
    }

    /// Cell sub-rectangles overlapping `area`, emptiest first (ties shuffled)
    fn candidate_cells(&mut self, area: &Rect) -> Vec<Rect> {
        self.refresh_spawn_grid();
        let mut cells: Vec<(u32, Rect)> = self
            .spawn_grid
            .cells()
            .filter_map(|(x, y, &count)| {
                let bounds = self.spawn_grid.cell_bounds(x, y);
                bounds.intersection(area).map(|r| (count, r))
            })
            .filter(|(_, r)| r.width() > 0.0 && r.height() > 0.0)
            .collect();
        cells.shuffle(&mut self.rng);
        cells.sort_by_key(|(count, _)| *count);
        cells.into_iter().map(|(_, r)| r).collect()
    }

    /// Find a valid, well-separated spot for `def` inside `habitat`.
    ///
    /// Falls back to plain terrain matching anywhere in the habitat bounds
    /// when the separated search runs out of attempts.
    pub(crate) fn find_spawn_point(
        &mut self,
        habitat: &HabitatConstraint,
        terrain: &dyn TerrainOracle,
        def: &SpeciesDef,
    ) -> Result<Vec2> {
        let area = match habitat.bounds.intersection(&self.config.world_bounds) {
            Some(area) => area,
            None => habitat.bounds,
        };

        let cells = self.candidate_cells(&area);
        if !cells.is_empty() {
            for attempt in 0..self.config.population.max_placement_attempts as usize {
                let cell = cells[attempt % cells.len()];
                let p = random_point_in(&cell, &mut self.rng);
                if habitat.allows(terrain, p) && self.respects_separation(p) {
                    return Ok(p);
                }
            }
        }

        for _ in 0..self.config.population.fallback_placement_attempts {
            let p = random_point_in(&area, &mut self.rng);
            if habitat.allows(terrain, p) {
                tracing::trace!("{} placed by fallback at ({:.0}, {:.0})", def.name, p.x, p.y);
                return Ok(p);
            }
        }

        Err(WildlifeError::InvalidHabitatPlacement {
            species: def.name.clone(),
            habitat: def.habitat,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::core::types::SceneId;
    use crate::species::SpeciesCatalog;
    use crate::terrain::{Habitat, HabitatRegion, TerrainClass};

    fn river(x: f32, _y: f32) -> TerrainClass {
        if (900.0..1100.0).contains(&x) {
            TerrainClass::Water
        } else {
            TerrainClass::Grass
        }
    }

    #[test]
    fn test_spawns_land_on_habitat_terrain() {
        let catalog = SpeciesCatalog::builtin();
        let region = HabitatRegion::new(
            "river valley",
            Habitat::Water,
            Rect::new(0.0, 0.0, 2000.0, 2000.0),
            SceneId(0),
        );
        let mut pm = manager(vec![region]);
        pm.initialize_population(&catalog, &river, None);
        assert!(pm.len() > 0);
        for c in pm.iter() {
            assert_eq!(river(c.position().x, c.position().y), TerrainClass::Water);
        }
    }

    #[test]
    fn test_spawns_keep_their_distance() {
        let catalog = SpeciesCatalog::builtin();
        let mut pm = manager(vec![meadow()]);
        let hare = catalog.id_by_name("Hare").unwrap();
        for _ in 0..10 {
            pm.spawn(&catalog, hare, 0, &GRASS).unwrap();
        }
        let positions: Vec<Vec2> = pm.iter().map(|c| c.position()).collect();
        for (i, a) in positions.iter().enumerate() {
            for b in &positions[i + 1..] {
                assert!(a.distance(b) >= 100.0);
            }
        }
    }

    #[test]
    fn test_emptiest_cells_come_first() {
        let catalog = SpeciesCatalog::builtin();
        let mut pm = manager(vec![meadow()]);
        spawn_named(&mut pm, &catalog, "Hare", Vec2::new(100.0, 100.0));
        let area = Rect::new(0.0, 0.0, 400.0, 200.0);
        let cells = pm.candidate_cells(&area);
        assert_eq!(cells.len(), 2);
        // The occupied cell (0..200) sorts last
        assert_eq!(cells[1], Rect::new(0.0, 0.0, 200.0, 200.0));
    }

    #[test]
    fn test_no_valid_terrain_is_an_error() {
        let catalog = SpeciesCatalog::builtin();
        let mut pm = manager(vec![meadow()]);
        let trout = catalog.get(catalog.id_by_name("Brook Trout").unwrap()).unwrap().clone();
        let habitat = HabitatConstraint::new(Habitat::Water, Rect::new(0.0, 0.0, 500.0, 500.0), false);
        assert!(pm.find_spawn_point(&habitat, &GRASS, &trout).is_err());
    }
}
