//! Breadth-first distance fields used for reachability checks.

use std::collections::VecDeque;

use oubliette_core::{CellCoord, Grid};

/// Dense step-count grid flooded outward from a set of origin cells.
///
/// Distances default to `u32::MAX` for walls and for open cells that cannot be
/// reached, so callers can tell disconnected pockets apart from traversable
/// tiles.
#[derive(Clone, Debug, Default)]
pub struct DistanceField {
    columns: u32,
    rows: u32,
    distances: Vec<u32>,
}

impl DistanceField {
    /// Floods the grid outward from `origin`.
    #[must_use]
    pub fn from_origin(grid: &Grid, origin: CellCoord) -> Self {
        let mut field = Self::default();
        field.rebuild(grid, &[origin]);
        field
    }

    /// Recomputes the distances using a breadth-first search from `origins`.
    ///
    /// Origins that are walls or lie outside the grid are ignored.
    pub fn rebuild(&mut self, grid: &Grid, origins: &[CellCoord]) {
        self.columns = grid.columns();
        self.rows = grid.rows();

        if self.distances.len() == grid.len() {
            self.distances.fill(u32::MAX);
        } else {
            self.distances = vec![u32::MAX; grid.len()];
        }

        let mut queue = VecDeque::new();

        for &origin in origins {
            if grid.is_wall(origin) {
                continue;
            }
            let Some(index) = grid.index(origin) else {
                continue;
            };
            if self.distances[index] == 0 {
                continue;
            }

            self.distances[index] = 0;
            queue.push_back(origin);
        }

        while let Some(cell) = queue.pop_front() {
            let Some(current_index) = grid.index(cell) else {
                continue;
            };
            let next_distance = self.distances[current_index].saturating_add(1);

            for neighbor in grid.open_neighbors(cell) {
                let Some(neighbor_index) = grid.index(neighbor) else {
                    continue;
                };

                if self.distances[neighbor_index] <= next_distance {
                    continue;
                }

                self.distances[neighbor_index] = next_distance;
                queue.push_back(neighbor);
            }
        }
    }

    /// Width of the field in cells.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Height of the field in cells.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Step count from the nearest origin, or `None` when unreachable.
    #[must_use]
    pub fn distance(&self, cell: CellCoord) -> Option<u32> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }

        let columns = usize::try_from(self.columns).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        let index = row.checked_mul(columns)?.checked_add(column)?;

        self.distances
            .get(index)
            .copied()
            .filter(|distance| *distance != u32::MAX)
    }

    /// Reports whether `cell` can be reached from any origin.
    #[must_use]
    pub fn is_reachable(&self, cell: CellCoord) -> bool {
        self.distance(cell).is_some()
    }

    /// Number of cells reachable from the origins, origins included.
    #[must_use]
    pub fn reachable_count(&self) -> usize {
        self.distances
            .iter()
            .filter(|distance| **distance != u32::MAX)
            .count()
    }
}

/// Reports whether every open cell of `grid` is reachable from `origin`.
#[must_use]
pub fn is_fully_connected(grid: &Grid, origin: CellCoord) -> bool {
    let field = DistanceField::from_origin(grid, origin);
    field.reachable_count() == grid.path_cells().count()
}
