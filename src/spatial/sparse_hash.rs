//! Sparse hash grid for efficient spatial queries

use ahash::AHashMap;

use crate::core::types::Vec2;

/// Sparse hash grid keyed by cell; each cell keeps its items with positions
pub struct SparseHashGrid<T> {
    cell_size: f32,
    cells: AHashMap<(i32, i32), Vec<(T, Vec2)>>,
}

impl<T: Copy + PartialEq> SparseHashGrid<T> {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: AHashMap::new(),
        }
    }

    #[inline]
    fn cell_coord(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn insert(&mut self, item: T, pos: Vec2) {
        let coord = self.cell_coord(pos);
        self.cells.entry(coord).or_default().push((item, pos));
    }

    pub fn remove(&mut self, item: T, pos: Vec2) {
        let coord = self.cell_coord(pos);
        if let Some(cell) = self.cells.get_mut(&coord) {
            cell.retain(|(e, _)| *e != item);
        }
    }

    /// Query all items in the 3x3 neighborhood of `pos`
    pub fn query_neighbors(&self, pos: Vec2) -> impl Iterator<Item = T> + '_ {
        let (cx, cy) = self.cell_coord(pos);

        (-1..=1).flat_map(move |dx| {
            (-1..=1).flat_map(move |dy| {
                self.cells.get(&(cx + dx, cy + dy))
                    .into_iter()
                    .flatten()
                    .map(|(item, _)| *item)
            })
        })
    }

    /// Items within `radius` of `center`, with their distances, in no particular order
    pub fn query_radius(&self, center: Vec2, radius: f32) -> Vec<(T, f32)> {
        let min = self.cell_coord(Vec2::new(center.x - radius, center.y - radius));
        let max = self.cell_coord(Vec2::new(center.x + radius, center.y + radius));

        let mut found = Vec::new();
        for cx in min.0..=max.0 {
            for cy in min.1..=max.1 {
                let Some(cell) = self.cells.get(&(cx, cy)) else { continue };
                for (item, pos) in cell {
                    let d = center.distance(pos);
                    if d <= radius {
                        found.push((*item, d));
                    }
                }
            }
        }
        found
    }

    /// Rebuild grid from positions
    pub fn rebuild(&mut self, items: impl Iterator<Item = (T, Vec2)>) {
        self.clear();
        for (item, pos) in items {
            self.insert(item, pos);
        }
    }
}
