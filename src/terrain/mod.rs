//! Terrain classes, habitats and the terrain oracle boundary
//!
//! Terrain generation lives outside this crate. The wildlife core only asks
//! "what terrain class is at (x, y)?" through [`TerrainOracle`], and decides
//! from the answer whether a creature may stand there.

use serde::{Deserialize, Serialize};

use crate::core::types::{Rect, SceneId, Vec2};
use crate::spatial::Grid;

/// Terrain class reported by the terrain oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TerrainClass {
    #[default]
    Grass,
    Forest,
    Water,
    Road,
    Residential,
    Commercial,
    Hill,
    Sand,
    /// Cliffs, walls and anything outside the known map
    Rock,
}

impl TerrainClass {
    #[inline]
    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// Set of terrain classes a creature may occupy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TerrainMask(u16);

impl TerrainMask {
    pub const EMPTY: TerrainMask = TerrainMask(0);

    pub fn of(classes: &[TerrainClass]) -> Self {
        classes.iter().fold(Self::EMPTY, |mask, &c| mask.with(c))
    }

    pub fn with(self, class: TerrainClass) -> Self {
        Self(self.0 | class.bit())
    }

    pub fn contains(&self, class: TerrainClass) -> bool {
        self.0 & class.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// Answers terrain queries for the playable world
pub trait TerrainOracle {
    fn terrain_class_at(&self, x: f32, y: f32) -> TerrainClass;

    fn terrain_at(&self, p: Vec2) -> TerrainClass {
        self.terrain_class_at(p.x, p.y)
    }
}

impl<F> TerrainOracle for F
where
    F: Fn(f32, f32) -> TerrainClass,
{
    fn terrain_class_at(&self, x: f32, y: f32) -> TerrainClass {
        self(x, y)
    }
}

/// Same terrain class everywhere
#[derive(Debug, Clone, Copy)]
pub struct UniformTerrain(pub TerrainClass);

impl TerrainOracle for UniformTerrain {
    fn terrain_class_at(&self, _x: f32, _y: f32) -> TerrainClass {
        self.0
    }
}

/// Rasterized terrain map; positions off the map read as [`TerrainClass::Rock`]
#[derive(Debug, Clone)]
pub struct TerrainGrid {
    grid: Grid<TerrainClass>,
}

impl TerrainGrid {
    /// Rasterize `classify` at every cell center of a grid covering `bounds`
    pub fn from_fn(bounds: Rect, cell_size: f32, classify: impl Fn(Vec2) -> TerrainClass) -> Self {
        let mut grid = Grid::covering(bounds, cell_size);
        for y in 0..grid.height {
            for x in 0..grid.width {
                let class = classify(grid.cell_center(x, y));
                grid.set(x, y, class);
            }
        }
        Self { grid }
    }

    pub fn set_cell(&mut self, p: Vec2, class: TerrainClass) {
        if let Some((x, y)) = self.grid.world_to_cell(p) {
            self.grid.set(x, y, class);
        }
    }

    /// Count cells of each class, for diagnostics
    pub fn class_count(&self, class: TerrainClass) -> usize {
        self.grid.cells().filter(|(_, _, c)| **c == class).count()
    }
}

impl TerrainOracle for TerrainGrid {
    fn terrain_class_at(&self, x: f32, y: f32) -> TerrainClass {
        self.grid
            .sample(Vec2::new(x, y))
            .copied()
            .unwrap_or(TerrainClass::Rock)
    }
}

/// Broad habitat a species lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Habitat {
    Forest,
    Plains,
    Water,
    Hills,
}

impl Habitat {
    pub const ALL: [Habitat; 4] = [Habitat::Forest, Habitat::Plains, Habitat::Water, Habitat::Hills];

    /// Terrain classes that count as this habitat
    pub fn terrain_mask(&self) -> TerrainMask {
        match self {
            Habitat::Forest => TerrainMask::of(&[TerrainClass::Forest, TerrainClass::Grass]),
            Habitat::Plains => TerrainMask::of(&[TerrainClass::Grass, TerrainClass::Sand]),
            Habitat::Water => TerrainMask::of(&[TerrainClass::Water]),
            Habitat::Hills => TerrainMask::of(&[TerrainClass::Hill, TerrainClass::Grass]),
        }
    }
}

/// A rectangle of the world stocked with creatures of one habitat.
///
/// Regions belong to a scene; only creatures of the active scene are updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitatRegion {
    pub name: String,
    pub habitat: Habitat,
    pub bounds: Rect,
    pub scene: SceneId,
}

impl HabitatRegion {
    pub fn new(name: impl Into<String>, habitat: Habitat, bounds: Rect, scene: SceneId) -> Self {
        Self {
            name: name.into(),
            habitat,
            bounds,
            scene,
        }
    }
}

/// Where a single creature may legally stand
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HabitatConstraint {
    pub bounds: Rect,
    pub allowed: TerrainMask,
}

impl HabitatConstraint {
    /// Constraint for a species of `habitat`; swimmers may also cross water
    pub fn new(habitat: Habitat, bounds: Rect, can_traverse_water: bool) -> Self {
        let mut allowed = habitat.terrain_mask();
        if can_traverse_water {
            allowed = allowed.with(TerrainClass::Water);
        }
        Self { bounds, allowed }
    }

    /// Inside the bounds and on allowed terrain
    pub fn allows(&self, terrain: &dyn TerrainOracle, p: Vec2) -> bool {
        self.bounds.contains(p) && self.allowed.contains(terrain.terrain_at(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_membership() {
        let mask = TerrainMask::of(&[TerrainClass::Grass, TerrainClass::Hill]);
        assert!(mask.contains(TerrainClass::Grass));
        assert!(mask.contains(TerrainClass::Hill));
        assert!(!mask.contains(TerrainClass::Water));
        assert!(TerrainMask::EMPTY.is_empty());
    }

    #[test]
    fn test_water_habitat_excludes_land() {
        let mask = Habitat::Water.terrain_mask();
        assert!(mask.contains(TerrainClass::Water));
        assert!(!mask.contains(TerrainClass::Grass));
        assert!(!Habitat::Forest.terrain_mask().contains(TerrainClass::Water));
    }

    #[test]
    fn test_swimmer_constraint_allows_water() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let lake = UniformTerrain(TerrainClass::Water);
        let walker = HabitatConstraint::new(Habitat::Forest, bounds, false);
        let swimmer = HabitatConstraint::new(Habitat::Forest, bounds, true);
        assert!(!walker.allows(&lake, Vec2::new(50.0, 50.0)));
        assert!(swimmer.allows(&lake, Vec2::new(50.0, 50.0)));
        assert!(!swimmer.allows(&lake, Vec2::new(150.0, 50.0)));
    }

    #[test]
    fn test_terrain_grid_sampling() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let grid = TerrainGrid::from_fn(bounds, 10.0, |p| {
            if p.x < 50.0 {
                TerrainClass::Water
            } else {
                TerrainClass::Forest
            }
        });
        assert_eq!(grid.terrain_class_at(5.0, 5.0), TerrainClass::Water);
        assert_eq!(grid.terrain_class_at(95.0, 5.0), TerrainClass::Forest);
        assert_eq!(grid.terrain_class_at(-1.0, 5.0), TerrainClass::Rock);
        assert_eq!(grid.class_count(TerrainClass::Water), 50);
    }

    #[test]
    fn test_closure_oracle() {
        let oracle = |x: f32, _y: f32| {
            if x > 0.0 {
                TerrainClass::Hill
            } else {
                TerrainClass::Road
            }
        };
        assert_eq!(oracle.terrain_at(Vec2::new(1.0, 0.0)), TerrainClass::Hill);
        assert_eq!(oracle.terrain_at(Vec2::new(-1.0, 0.0)), TerrainClass::Road);
    }
}
