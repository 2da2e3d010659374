//! Generic grid for spatial data

use crate::core::types::{Rect, Vec2};

/// Generic 2D grid with configurable cell size
#[derive(Debug, Clone)]
pub struct Grid<T: Clone + Default> {
    pub width: usize,
    pub height: usize,
    pub cell_size: f32,
    pub origin: Vec2,
    data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    pub fn new(width: usize, height: usize, cell_size: f32, origin: Vec2) -> Self {
        Self {
            width,
            height,
            cell_size,
            origin,
            data: vec![T::default(); width * height],
        }
    }

    /// Grid whose cells cover `bounds` (the last row/column may overhang)
    pub fn covering(bounds: Rect, cell_size: f32) -> Self {
        let width = (bounds.width() / cell_size).ceil().max(1.0) as usize;
        let height = (bounds.height() / cell_size).ceil().max(1.0) as usize;
        Self::new(width, height, cell_size, bounds.min)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x < self.width && y < self.height {
            Some(&self.data[y * self.width + x])
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        if x < self.width && y < self.height {
            Some(&mut self.data[y * self.width + x])
        } else {
            None
        }
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = value;
        }
    }

    /// Convert world position to cell coordinates, `None` outside the grid
    #[inline]
    pub fn world_to_cell(&self, pos: Vec2) -> Option<(usize, usize)> {
        let fx = ((pos.x - self.origin.x) / self.cell_size).floor();
        let fy = ((pos.y - self.origin.y) / self.cell_size).floor();
        if fx < 0.0 || fy < 0.0 || fx >= self.width as f32 || fy >= self.height as f32 {
            return None;
        }
        Some((fx as usize, fy as usize))
    }

    /// Sample grid at world position
    pub fn sample(&self, pos: Vec2) -> Option<&T> {
        let (x, y) = self.world_to_cell(pos)?;
        self.get(x, y)
    }

    /// Cell center in world coordinates
    pub fn cell_center(&self, x: usize, y: usize) -> Vec2 {
        Vec2::new(
            self.origin.x + (x as f32 + 0.5) * self.cell_size,
            self.origin.y + (y as f32 + 0.5) * self.cell_size,
        )
    }

    /// World-space rectangle covered by a cell
    pub fn cell_bounds(&self, x: usize, y: usize) -> Rect {
        let min = Vec2::new(
            self.origin.x + x as f32 * self.cell_size,
            self.origin.y + y as f32 * self.cell_size,
        );
        Rect {
            min,
            max: Vec2::new(min.x + self.cell_size, min.y + self.cell_size),
        }
    }

    /// Iterate `(x, y, value)` over every cell
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &T)> + '_ {
        self.data
            .iter()
            .enumerate()
            .map(move |(i, v)| (i % self.width, i / self.width, v))
    }

    pub fn fill(&mut self, value: T) {
        for cell in &mut self.data {
            *cell = value.clone();
        }
    }
}
