#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid path search shared by every pursuer.
//!
//! A single best-first skeleton serves all [`SearchStrategy`] variants; the
//! strategy only decides how frontier entries are ranked. Search nodes live in
//! an arena owned by one call and are released when it returns.

use std::{cmp::Reverse, collections::BinaryHeap};

use oubliette_core::{CellCoord, Grid, Path, SearchError, SearchStrategy};

/// Finds a route from `start` to `goal`, returning an empty path on failure.
///
/// Callers treat the empty path as "hold position this tick".
#[must_use]
pub fn find_path(grid: &Grid, start: CellCoord, goal: CellCoord, strategy: SearchStrategy) -> Path {
    match try_find_path(grid, start, goal, strategy) {
        Ok(path) => path,
        Err(error) => {
            tracing::trace!(strategy = strategy.label(), %error, "search produced no path");
            Path::empty()
        }
    }
}

/// Finds a route from `start` to `goal`, reporting why none exists.
///
/// The returned path includes both endpoints. When `start == goal` the path
/// holds that single cell.
pub fn try_find_path(
    grid: &Grid,
    start: CellCoord,
    goal: CellCoord,
    strategy: SearchStrategy,
) -> Result<Path, SearchError> {
    for cell in [start, goal] {
        if !grid.is_valid_position(cell) {
            return Err(SearchError::InvalidPosition { cell });
        }
    }

    if start == goal {
        return Ok(Path::new(vec![start]));
    }

    let mut search = Search::new(grid, goal, strategy);
    search.open(start, 0, None);

    while let Some(Reverse(entry)) = search.frontier.pop() {
        let node = search.arena[entry.node];
        let Some(index) = grid.index(node.cell) else {
            continue;
        };
        if search.closed[index] {
            continue;
        }
        search.closed[index] = true;

        if node.cell == goal {
            let path = search.reconstruct(entry.node);
            tracing::trace!(
                strategy = strategy.label(),
                explored = search.arena.len(),
                length = path.len(),
                "path found"
            );
            return Ok(path);
        }

        let cost = node.cost.saturating_add(1);
        for neighbor in grid.open_neighbors(node.cell) {
            search.relax(neighbor, cost, entry.node);
        }
    }

    Err(SearchError::Unreachable { start, goal })
}

#[derive(Clone, Copy, Debug)]
struct SearchNode {
    cell: CellCoord,
    cost: u32,
    heuristic: u32,
    parent: Option<usize>,
}

/// Heap entry; ordering is by `key`, then insertion order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct FrontierEntry {
    key: (u32, u32),
    sequence: u64,
    node: usize,
}

struct Search<'a> {
    grid: &'a Grid,
    goal: CellCoord,
    strategy: SearchStrategy,
    arena: Vec<SearchNode>,
    frontier: BinaryHeap<Reverse<FrontierEntry>>,
    closed: Vec<bool>,
    open_lookup: Vec<Option<usize>>,
    sequence: u64,
}

impl<'a> Search<'a> {
    fn new(grid: &'a Grid, goal: CellCoord, strategy: SearchStrategy) -> Self {
        Self {
            grid,
            goal,
            strategy,
            arena: Vec::new(),
            frontier: BinaryHeap::new(),
            closed: vec![false; grid.len()],
            open_lookup: vec![None; grid.len()],
            sequence: 0,
        }
    }

    fn open(&mut self, cell: CellCoord, cost: u32, parent: Option<usize>) {
        let Some(index) = self.grid.index(cell) else {
            return;
        };
        let node = self.arena.len();
        self.arena.push(SearchNode {
            cell,
            cost,
            heuristic: cell.manhattan_distance(self.goal),
            parent,
        });
        self.open_lookup[index] = Some(node);
        self.push(node);
    }

    /// Offers `cell` a route through `parent` costing `cost`.
    fn relax(&mut self, cell: CellCoord, cost: u32, parent: usize) {
        let Some(index) = self.grid.index(cell) else {
            return;
        };
        if self.closed[index] {
            return;
        }

        let known = self.open_lookup[index];
        match known {
            None => self.open(cell, cost, Some(parent)),
            Some(existing) if cost < self.arena[existing].cost => {
                let node = &mut self.arena[existing];
                node.cost = cost;
                node.parent = Some(parent);
                self.push(existing);
            }
            Some(_) => {}
        }
    }

    fn push(&mut self, node: usize) {
        let SearchNode {
            cost, heuristic, ..
        } = self.arena[node];
        let key = match self.strategy {
            SearchStrategy::AStarCost => (cost.saturating_add(heuristic), heuristic),
            SearchStrategy::DijkstraCost => (cost, 0),
            SearchStrategy::GreedyHeuristic => (heuristic, 0),
        };
        self.frontier.push(Reverse(FrontierEntry {
            key,
            sequence: self.sequence,
            node,
        }));
        self.sequence += 1;
    }

    fn reconstruct(&self, goal: usize) -> Path {
        let mut cells = Vec::new();
        let mut current = Some(goal);
        while let Some(index) = current {
            let node = self.arena[index];
            cells.push(node.cell);
            current = node.parent;
        }
        cells.reverse();
        Path::new(cells)
    }
}
