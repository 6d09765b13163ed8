//! Randomized maze generation: backtracking carve, braiding, and exit carving.

use oubliette_core::{CellCoord, CellKind, Direction, Grid};
use rand::{seq::SliceRandom, Rng};
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

/// Default maze width measured in maze cells.
pub const DEFAULT_MAZE_COLUMNS: u32 = 21;
/// Default maze height measured in maze cells.
pub const DEFAULT_MAZE_ROWS: u32 = 21;

/// Tuning knobs for [`MazeGenerator`].
#[derive(Clone, Debug, PartialEq)]
pub struct MazeConfig {
    /// Maze width in maze cells; the grid spans `2 * columns + 1` cells.
    pub columns: u32,
    /// Maze height in maze cells; the grid spans `2 * rows + 1` cells.
    pub rows: u32,
    /// Chance of carving one extra wall from a cell after a backtrack returns to it.
    pub extra_carve_chance: f32,
    /// Number of braiding samples expressed as a fraction of all grid cells.
    pub braid_budget: f32,
    /// Chance that an eligible wall is actually removed during braiding.
    pub braid_chance: f32,
    /// Whether braiding leaves L-shaped corner walls intact.
    pub keep_corner_pieces: bool,
    /// Number of openings carved into the border.
    pub exit_count: usize,
}

impl MazeConfig {
    /// Grid dimensions derived from the configured maze size.
    ///
    /// Zero-sized mazes are promoted to a single maze cell.
    #[must_use]
    pub fn grid_dimensions(&self) -> (u32, u32) {
        (
            grid_length(self.columns.max(1)),
            grid_length(self.rows.max(1)),
        )
    }
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_MAZE_COLUMNS,
            rows: DEFAULT_MAZE_ROWS,
            extra_carve_chance: 0.10,
            braid_budget: 0.25,
            braid_chance: 0.25,
            keep_corner_pieces: true,
            exit_count: 2,
        }
    }
}

fn grid_length(maze_cells: u32) -> u32 {
    maze_cells.saturating_mul(2).saturating_add(1)
}

/// Builds fresh maze grids from an injected random source.
#[derive(Debug)]
pub struct MazeGenerator<R = ChaCha8Rng> {
    config: MazeConfig,
    rng: R,
}

impl MazeGenerator<ChaCha8Rng> {
    /// Creates a generator driven by a ChaCha stream seeded with `seed`.
    #[must_use]
    pub fn seeded(config: MazeConfig, seed: u64) -> Self {
        Self::new(config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> MazeGenerator<R> {
    /// Creates a generator that draws all randomness from `rng`.
    #[must_use]
    pub fn new(config: MazeConfig, rng: R) -> Self {
        Self { config, rng }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &MazeConfig {
        &self.config
    }

    /// Replaces the maze dimensions used by subsequent generations.
    pub fn resize(&mut self, columns: u32, rows: u32) {
        self.config.columns = columns;
        self.config.rows = rows;
    }

    /// Generates a brand new grid.
    pub fn generate(&mut self) -> Grid {
        generate(&self.config, &mut self.rng)
    }
}

/// Generates a maze grid from scratch.
///
/// The grid starts fully walled, is carved by a depth-first backtracker from
/// [`Grid::center`], braided to open some loops, and finally receives
/// `exit_count` openings on the border. Every path cell is reachable from the
/// center.
pub fn generate<R: Rng + ?Sized>(config: &MazeConfig, rng: &mut R) -> Grid {
    let (columns, rows) = config.grid_dimensions();
    let mut grid = Grid::filled(columns, rows, CellKind::Wall);
    let start = grid.center();

    carve_passages(&mut grid, start, config.extra_carve_chance, rng);
    let braided = braid(&mut grid, config, rng);
    let exits = carve_exits(&mut grid, config.exit_count, rng);

    tracing::debug!(
        columns,
        rows,
        braided,
        exits = ?exits,
        path_cells = grid.path_cells().count(),
        "generated maze"
    );

    grid
}

#[derive(Debug)]
struct Frame {
    cell: CellCoord,
    directions: [Direction; 4],
    next: usize,
    returned_from: Option<usize>,
    extra_carved: bool,
}

impl Frame {
    fn enter<R: Rng + ?Sized>(cell: CellCoord, rng: &mut R) -> Self {
        let mut directions = Direction::ALL;
        directions.shuffle(rng);
        Self {
            cell,
            directions,
            next: 0,
            returned_from: None,
            extra_carved: false,
        }
    }
}

fn carve_passages<R: Rng + ?Sized>(
    grid: &mut Grid,
    start: CellCoord,
    extra_carve_chance: f32,
    rng: &mut R,
) {
    grid.set(start, CellKind::Path);
    let mut stack = vec![Frame::enter(start, rng)];

    while let Some(frame) = stack.last_mut() {
        if let Some(index) = frame.returned_from.take() {
            if !frame.extra_carved && rng.gen::<f32>() < extra_carve_chance {
                if let Some(wall) = extra_passage(grid, frame, index) {
                    grid.set(wall, CellKind::Path);
                    frame.extra_carved = true;
                }
            }
        }

        let mut descend = None;
        while frame.next < frame.directions.len() {
            let index = frame.next;
            frame.next += 1;

            let direction = frame.directions[index];
            let Some(neighbor) = lattice_neighbor(grid, frame.cell, direction) else {
                continue;
            };
            if !grid.is_wall(neighbor) {
                continue;
            }
            let Some(wall) = frame.cell.step(direction) else {
                continue;
            };

            grid.set(wall, CellKind::Path);
            grid.set(neighbor, CellKind::Path);
            frame.returned_from = Some(index);
            descend = Some(neighbor);
            break;
        }

        match descend {
            Some(cell) => stack.push(Frame::enter(cell, rng)),
            None => {
                let _ = stack.pop();
            }
        }
    }
}

/// Wall between the frame's cell and an unvisited lattice neighbour in a later direction.
fn extra_passage(grid: &Grid, frame: &Frame, after: usize) -> Option<CellCoord> {
    frame.directions[after + 1..]
        .iter()
        .copied()
        .find(|direction| {
            lattice_neighbor(grid, frame.cell, *direction)
                .is_some_and(|neighbor| grid.is_wall(neighbor))
        })
        .and_then(|direction| frame.cell.step(direction))
}

/// Maze cell two steps away, provided it stays strictly inside the border.
fn lattice_neighbor(grid: &Grid, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
    let neighbor = cell.offset(direction, 2)?;
    is_interior(grid, neighbor).then_some(neighbor)
}

fn is_interior(grid: &Grid, cell: CellCoord) -> bool {
    cell.column() >= 1
        && cell.row() >= 1
        && cell.column() + 1 < grid.columns()
        && cell.row() + 1 < grid.rows()
}

fn braid<R: Rng + ?Sized>(grid: &mut Grid, config: &MazeConfig, rng: &mut R) -> usize {
    if grid.columns() < 3 || grid.rows() < 3 {
        return 0;
    }

    let samples = (grid.len() as f64 * f64::from(config.braid_budget.max(0.0))) as usize;
    let mut carved = 0;

    for _ in 0..samples {
        let cell = CellCoord::new(
            rng.gen_range(1..=grid.columns() - 2),
            rng.gen_range(1..=grid.rows() - 2),
        );

        if !grid.is_wall(cell) || open_sides(grid, cell) < 2 {
            continue;
        }
        if config.keep_corner_pieces && is_corner_piece(grid, cell) {
            continue;
        }
        if rng.gen::<f32>() < config.braid_chance {
            grid.set(cell, CellKind::Path);
            carved += 1;
        }
    }

    carved
}

fn open_sides(grid: &Grid, cell: CellCoord) -> usize {
    grid.open_neighbors(cell).count()
}

/// Wall with exactly two wall neighbours that meet at a right angle.
fn is_corner_piece(grid: &Grid, cell: CellCoord) -> bool {
    let blocked = |direction: Direction| cell.step(direction).map_or(true, |n| grid.is_wall(n));

    let vertical = usize::from(blocked(Direction::North)) + usize::from(blocked(Direction::South));
    let horizontal = usize::from(blocked(Direction::West)) + usize::from(blocked(Direction::East));

    vertical == 1 && horizontal == 1
}

fn carve_exits<R: Rng + ?Sized>(grid: &mut Grid, count: usize, rng: &mut R) -> Vec<CellCoord> {
    let columns = grid.columns();
    let rows = grid.rows();
    if columns < 3 || rows < 3 {
        return Vec::new();
    }

    let mut candidates = Vec::new();
    for column in (1..columns - 1).step_by(2) {
        candidates.push(CellCoord::new(column, 0));
        candidates.push(CellCoord::new(column, rows - 1));
    }
    for row in (1..rows - 1).step_by(2) {
        candidates.push(CellCoord::new(0, row));
        candidates.push(CellCoord::new(columns - 1, row));
    }

    candidates.shuffle(rng);
    candidates.truncate(count);
    for exit in &candidates {
        grid.set(*exit, CellKind::Path);
    }
    candidates
}
