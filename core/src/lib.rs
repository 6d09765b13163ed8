#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Oubliette maze chase engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots such as the [`Grid`] and [`PursuerView`], and respond exclusively
//! with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Oubliette.";

/// Smallest move delay any pursuer can reach regardless of the round number.
pub const MIN_MOVE_DELAY: Duration = Duration::from_millis(70);

/// Amount shaved off every pursuer's move delay for each completed round.
pub const ROUND_DELAY_STEP: Duration = Duration::from_millis(10);

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Regenerates the maze using the provided dimensions measured in maze cells.
    ConfigureMaze {
        /// Number of maze cell columns; the grid spans `2 * columns + 1` cells.
        columns: u32,
        /// Number of maze cell rows; the grid spans `2 * rows + 1` cells.
        rows: u32,
    },
    /// Starts a new round, replacing the maze and clearing the pursuer roster.
    StartRound {
        /// One-based round number.
        round: u32,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the chase target advance a single step.
    StepTarget {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests that a pursuer of the given kind be placed into the maze.
    SpawnPursuer {
        /// Variant of the pursuer to create.
        kind: PursuerKind,
        /// Cell the pursuer should occupy after spawning.
        cell: CellCoord,
    },
    /// Requests that a pursuer advance a single step in the specified direction.
    StepPursuer {
        /// Identifier of the pursuer attempting to move.
        pursuer: PursuerId,
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that a freshly generated maze replaced the previous one.
    MazeRegenerated {
        /// Width of the new grid measured in grid cells.
        columns: u32,
        /// Height of the new grid measured in grid cells.
        rows: u32,
    },
    /// Announces the start of a round after the maze was regenerated.
    RoundStarted {
        /// One-based round number.
        round: u32,
        /// Cell the chase target occupies at the start of the round.
        target: CellCoord,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the chase target moved between two cells.
    TargetMoved {
        /// Cell the target occupied before moving.
        from: CellCoord,
        /// Cell the target occupies after moving.
        to: CellCoord,
    },
    /// Confirms that a pursuer was placed into the maze.
    PursuerSpawned {
        /// Identifier assigned to the pursuer by the world.
        pursuer: PursuerId,
        /// Variant of the spawned pursuer.
        kind: PursuerKind,
        /// Cell the pursuer occupies after spawning.
        cell: CellCoord,
    },
    /// Confirms that a pursuer successfully moved between two cells.
    PursuerAdvanced {
        /// Identifier of the pursuer that advanced.
        pursuer: PursuerId,
        /// Cell the pursuer occupied before moving.
        from: CellCoord,
        /// Cell the pursuer occupies after moving.
        to: CellCoord,
    },
    /// Reports that a pursuer shares its cell with the chase target.
    TargetCaught {
        /// Identifier of the pursuer that caught the target.
        pursuer: PursuerId,
        /// Cell where the capture happened.
        cell: CellCoord,
    },
    /// Reports that the chase target stepped onto a border exit.
    TargetEscaped {
        /// Exit cell the target reached.
        cell: CellCoord,
    },
    /// Reports that a step request was rejected.
    StepRejected {
        /// Identifier of the pursuer whose step was rejected.
        pursuer: PursuerId,
        /// Specific reason the step failed.
        reason: StepRejection,
    },
    /// Reports that a spawn request was rejected.
    SpawnRejected {
        /// Variant requested for spawning.
        kind: PursuerKind,
        /// Cell provided in the spawn request.
        cell: CellCoord,
        /// Specific reason the spawn failed.
        reason: StepRejection,
    },
}

/// Reasons a movement or spawn request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepRejection {
    /// No pursuer with the provided identifier exists.
    MissingPursuer,
    /// The destination lies outside the grid.
    OutOfBounds,
    /// The destination is a wall cell.
    Blocked,
}

/// Cardinal movement directions available on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in a stable order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Column and row delta for a single step in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Resolves the direction that leads from `from` to an adjacent `to`.
    ///
    /// Returns `None` when the cells are not 4-adjacent.
    #[must_use]
    pub fn between(from: CellCoord, to: CellCoord) -> Option<Self> {
        let column_diff = from.column().abs_diff(to.column());
        let row_diff = from.row().abs_diff(to.row());
        if column_diff + row_diff != 1 {
            return None;
        }

        if column_diff == 1 {
            if to.column() > from.column() {
                Some(Self::East)
            } else {
                Some(Self::West)
            }
        } else if to.row() > from.row() {
            Some(Self::South)
        } else {
            Some(Self::North)
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Cell reached by moving `distance` cells in `direction`.
    ///
    /// Returns `None` when the step would leave the non-negative coordinate space.
    #[must_use]
    pub fn offset(self, direction: Direction, distance: u32) -> Option<CellCoord> {
        let (dx, dy) = direction.offset();
        let column = shift(self.column, dx, distance)?;
        let row = shift(self.row, dy, distance)?;
        Some(CellCoord::new(column, row))
    }

    /// Cell immediately adjacent in `direction`, if representable.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        self.offset(direction, 1)
    }

    /// Reports whether the two cells share an edge.
    #[must_use]
    pub fn is_adjacent_to(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }
}

fn shift(value: u32, delta: i32, distance: u32) -> Option<u32> {
    match delta {
        0 => Some(value),
        d if d > 0 => value.checked_add(distance),
        _ => value.checked_sub(distance),
    }
}

/// Content of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Impassable cell.
    Wall,
    /// Walkable cell.
    Path,
}

/// Rectangular wall/path lattice queried by search and agent logic.
///
/// Grids built by the maze generator have odd dimensions: maze cells sit on
/// odd coordinates and the cells between them are carvable walls. Out-of-bounds
/// coordinates always read as walls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    columns: u32,
    rows: u32,
    cells: Vec<CellKind>,
}

impl Grid {
    /// Creates a grid where every cell holds `kind`.
    #[must_use]
    pub fn filled(columns: u32, rows: u32, kind: CellKind) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![kind; capacity],
        }
    }

    /// Creates a grid from row-major cells.
    pub fn from_cells(columns: u32, rows: u32, cells: Vec<CellKind>) -> Result<Self, GridError> {
        let expected = u64::from(columns) * u64::from(rows);
        if cells.len() as u64 != expected {
            return Err(GridError::CellCountMismatch {
                columns,
                rows,
                actual: cells.len(),
            });
        }

        Ok(Self {
            columns,
            rows,
            cells,
        })
    }

    /// Parses a textual grid where `#` marks walls and `.` marks paths.
    ///
    /// Blank lines and surrounding whitespace are ignored; every remaining row
    /// must have the same width.
    pub fn parse(layout: &str) -> Result<Self, GridError> {
        let mut cells = Vec::new();
        let mut columns: Option<u32> = None;
        let mut rows = 0u32;

        for (line_index, line) in layout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .enumerate()
        {
            let mut width = 0u32;
            for symbol in line.chars() {
                let kind = match symbol {
                    '#' => CellKind::Wall,
                    '.' => CellKind::Path,
                    other => {
                        return Err(GridError::UnknownSymbol {
                            symbol: other,
                            row: line_index,
                        })
                    }
                };
                cells.push(kind);
                width += 1;
            }

            match columns {
                None => columns = Some(width),
                Some(expected) if expected != width => {
                    return Err(GridError::RaggedRow {
                        row: line_index,
                        expected,
                        actual: width,
                    })
                }
                Some(_) => {}
            }
            rows += 1;
        }

        let columns = columns.ok_or(GridError::Empty)?;
        Self::from_cells(columns, rows, cells)
    }

    /// Width of the grid in cells.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Height of the grid in cells.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of cells in the grid.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the grid holds no cells at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Reports whether the cell lies within the grid bounds.
    #[must_use]
    pub const fn is_valid_position(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Reports whether the cell is a wall. Out-of-bounds cells count as walls.
    #[must_use]
    pub fn is_wall(&self, cell: CellCoord) -> bool {
        self.kind(cell).map_or(true, |kind| kind == CellKind::Wall)
    }

    /// Reports whether the cell lies on the outermost ring of the grid.
    #[must_use]
    pub const fn is_border(&self, cell: CellCoord) -> bool {
        self.is_valid_position(cell)
            && (cell.column() == 0
                || cell.row() == 0
                || cell.column() + 1 == self.columns
                || cell.row() + 1 == self.rows)
    }

    /// Content of the cell, if it lies within the grid.
    #[must_use]
    pub fn kind(&self, cell: CellCoord) -> Option<CellKind> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Overwrites the content of a single cell. Out-of-bounds writes are ignored.
    pub fn set(&mut self, cell: CellCoord, kind: CellKind) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = kind;
            }
        }
    }

    /// Lattice center: the odd-indexed cell nearest the geometric center.
    ///
    /// For grids derived from an odd maze size this is the exact center.
    #[must_use]
    pub fn center(&self) -> CellCoord {
        CellCoord::new(lattice_center(self.columns), lattice_center(self.rows))
    }

    /// Row-major index of the cell within the dense storage.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.is_valid_position(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Cell stored at the provided row-major index.
    #[must_use]
    pub fn cell_at(&self, index: usize) -> Option<CellCoord> {
        if index >= self.cells.len() || self.columns == 0 {
            return None;
        }
        let width = usize::try_from(self.columns).ok()?;
        let column = u32::try_from(index % width).ok()?;
        let row = u32::try_from(index / width).ok()?;
        Some(CellCoord::new(column, row))
    }

    /// Dense cells stored in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[CellKind] {
        &self.cells
    }

    /// Iterates over every walkable cell in row-major order.
    pub fn path_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, kind)| **kind == CellKind::Path)
            .filter_map(|(index, _)| self.cell_at(index))
    }

    /// Walkable 4-neighbours of the cell in [`Direction::ALL`] order.
    pub fn open_neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| cell.step(direction))
            .filter(move |neighbor| !self.is_wall(*neighbor))
    }
}

fn lattice_center(length: u32) -> u32 {
    let middle = length / 2;
    if middle % 2 == 1 || middle + 1 >= length {
        middle
    } else {
        middle + 1
    }
}

/// Errors raised while building a [`Grid`] from external data.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// The layout contained no rows.
    #[error("grid layout is empty")]
    Empty,
    /// A row had a different width than the first row.
    #[error("row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width of the first row.
        expected: u32,
        /// Width of the offending row.
        actual: u32,
    },
    /// The layout used a symbol other than `#` or `.`.
    #[error("unknown grid symbol '{symbol}' in row {row}")]
    UnknownSymbol {
        /// Symbol that could not be interpreted.
        symbol: char,
        /// Zero-based index of the offending row.
        row: usize,
    },
    /// The number of cells does not match the declared dimensions.
    #[error("{actual} cells cannot fill a {columns}x{rows} grid")]
    CellCountMismatch {
        /// Declared grid width.
        columns: u32,
        /// Declared grid height.
        rows: u32,
        /// Number of cells supplied.
        actual: usize,
    },
}

/// Ordered sequence of cells from a search start (inclusive) to its goal.
///
/// An empty path means no route was found. A single-cell path means the start
/// already equals the goal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path {
    cells: Vec<CellCoord>,
}

impl Path {
    /// Creates a path from cells already ordered from start to goal.
    #[must_use]
    pub fn new(cells: Vec<CellCoord>) -> Self {
        Self { cells }
    }

    /// Path that denotes "no route".
    #[must_use]
    pub const fn empty() -> Self {
        Self { cells: Vec::new() }
    }

    /// Number of cells along the path, including both endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the path is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of steps needed to walk the path.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    /// First cell of the path.
    #[must_use]
    pub fn start(&self) -> Option<CellCoord> {
        self.cells.first().copied()
    }

    /// Last cell of the path.
    #[must_use]
    pub fn goal(&self) -> Option<CellCoord> {
        self.cells.last().copied()
    }

    /// Cell at the provided position along the path.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<CellCoord> {
        self.cells.get(index).copied()
    }

    /// Cells of the path in visit order.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }
}

/// Grid search algorithms offered by the pathfinding system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchStrategy {
    /// Best-first on accumulated cost plus Manhattan heuristic.
    AStarCost,
    /// Best-first on accumulated cost alone.
    DijkstraCost,
    /// Best-first on the Manhattan heuristic alone; not cost-optimal.
    GreedyHeuristic,
}

impl SearchStrategy {
    /// Short human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AStarCost => "A*",
            Self::DijkstraCost => "Dijkstra",
            Self::GreedyHeuristic => "Greedy",
        }
    }
}

/// Reasons a path search produced no route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The start or goal lies outside the grid.
    #[error("search endpoint {cell:?} lies outside the grid")]
    InvalidPosition {
        /// Offending endpoint.
        cell: CellCoord,
    },
    /// The frontier emptied without reaching the goal.
    #[error("goal {goal:?} is unreachable from {start:?}")]
    Unreachable {
        /// Start of the search.
        start: CellCoord,
        /// Goal of the search.
        goal: CellCoord,
    },
}

/// Reasons a spawn location could not be chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SpawnError {
    /// The grid contains no walkable cell at all.
    #[error("grid of {columns}x{rows} cells has no free cell to spawn into")]
    NoSpawnFound {
        /// Width of the grid that was searched.
        columns: u32,
        /// Height of the grid that was searched.
        rows: u32,
    },
}

/// Unique identifier assigned to a pursuer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PursuerId(u32);

impl PursuerId {
    /// Creates a new pursuer identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Visual appearance applied to a pursuer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PursuerColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl PursuerColor {
    /// Creates a new color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Pursuer variants that make up a round's roster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PursuerKind {
    /// Chases along A* routes.
    AStar,
    /// Chases along Dijkstra routes; the slowest variant.
    Dijkstra,
    /// Chases along greedy routes; the fastest variant and the only one that gets distracted.
    Greedy,
}

impl PursuerKind {
    /// Every variant in roster order.
    pub const ALL: [PursuerKind; 3] = [Self::AStar, Self::Dijkstra, Self::Greedy];

    /// Default behavioural profile of the variant.
    #[must_use]
    pub const fn profile(self) -> PursuerProfile {
        match self {
            Self::AStar => PursuerProfile {
                kind: self,
                color: PursuerColor::from_rgb(255, 0, 0),
                base_move_delay: Duration::from_millis(150),
                strategy: SearchStrategy::AStarCost,
                distractible: false,
            },
            Self::Dijkstra => PursuerProfile {
                kind: self,
                color: PursuerColor::from_rgb(0, 100, 255),
                base_move_delay: Duration::from_millis(220),
                strategy: SearchStrategy::DijkstraCost,
                distractible: false,
            },
            Self::Greedy => PursuerProfile {
                kind: self,
                color: PursuerColor::from_rgb(255, 165, 0),
                base_move_delay: Duration::from_millis(100),
                strategy: SearchStrategy::GreedyHeuristic,
                distractible: true,
            },
        }
    }
}

/// Per-variant configuration record looked up once when a pursuer spawns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PursuerProfile {
    /// Variant described by the profile.
    pub kind: PursuerKind,
    /// Appearance of the variant.
    pub color: PursuerColor,
    /// Move delay during the first round.
    pub base_move_delay: Duration,
    /// Search algorithm the variant uses to chase.
    pub strategy: SearchStrategy,
    /// Whether the variant supports the distraction overlay.
    pub distractible: bool,
}

impl PursuerProfile {
    /// Move delay for the given one-based round.
    ///
    /// Each round after the first removes [`ROUND_DELAY_STEP`], never dropping
    /// below [`MIN_MOVE_DELAY`].
    #[must_use]
    pub fn move_delay_for_round(&self, round: u32) -> Duration {
        let reduction = ROUND_DELAY_STEP.saturating_mul(round.saturating_sub(1));
        self.base_move_delay
            .saturating_sub(reduction)
            .max(MIN_MOVE_DELAY)
    }
}

/// Immutable representation of a single pursuer's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PursuerSnapshot {
    /// Unique identifier assigned to the pursuer.
    pub id: PursuerId,
    /// Variant of the pursuer.
    pub kind: PursuerKind,
    /// Grid cell currently occupied by the pursuer.
    pub cell: CellCoord,
}

/// Read-only snapshot describing all pursuers within the maze.
#[derive(Clone, Debug, Default)]
pub struct PursuerView {
    snapshots: Vec<PursuerSnapshot>,
}

impl PursuerView {
    /// Creates a new pursuer view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<PursuerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &PursuerSnapshot> {
        self.snapshots.iter()
    }

    /// Snapshot of the pursuer with the given identifier.
    #[must_use]
    pub fn get(&self, id: PursuerId) -> Option<&PursuerSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.id == id)
    }
}

/// Reports whether a pursuer standing on `pursuer` has caught a target on `target`.
#[must_use]
pub fn has_caught(pursuer: CellCoord, target: CellCoord) -> bool {
    pursuer == target
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn offset_refuses_negative_coordinates() {
        let origin = CellCoord::new(1, 0);
        assert_eq!(origin.step(Direction::North), None);
        assert_eq!(origin.offset(Direction::West, 2), None);
        assert_eq!(origin.offset(Direction::East, 2), Some(CellCoord::new(3, 0)));
    }

    #[test]
    fn direction_between_neighbors() {
        let origin = CellCoord::new(3, 3);
        for direction in Direction::ALL {
            let neighbor = origin.step(direction).expect("neighbor exists");
            assert_eq!(Direction::between(origin, neighbor), Some(direction));
            assert_eq!(
                Direction::between(neighbor, origin),
                Some(direction.opposite())
            );
        }
        assert_eq!(Direction::between(origin, origin), None);
        assert_eq!(Direction::between(origin, CellCoord::new(4, 4)), None);
    }

    #[test]
    fn parse_reads_walls_and_paths() {
        let grid = Grid::parse(
            "
            ###
            #..
            ###
            ",
        )
        .expect("layout parses");

        assert_eq!(grid.columns(), 3);
        assert_eq!(grid.rows(), 3);
        assert!(grid.is_wall(CellCoord::new(0, 1)));
        assert!(!grid.is_wall(CellCoord::new(2, 1)));
        assert_eq!(grid.path_cells().count(), 2);
    }

    #[test]
    fn parse_rejects_ragged_rows() {
        let error = Grid::parse("###\n##").expect_err("ragged rows are rejected");
        assert_eq!(
            error,
            GridError::RaggedRow {
                row: 1,
                expected: 3,
                actual: 2
            }
        );
        assert_eq!(Grid::parse("  \n"), Err(GridError::Empty));
        assert!(matches!(
            Grid::parse("#x#"),
            Err(GridError::UnknownSymbol { symbol: 'x', .. })
        ));
    }

    #[test]
    fn out_of_bounds_cells_read_as_walls() {
        let grid = Grid::filled(3, 3, CellKind::Path);
        assert!(!grid.is_wall(CellCoord::new(2, 2)));
        assert!(grid.is_wall(CellCoord::new(3, 0)));
        assert!(!grid.is_valid_position(CellCoord::new(0, 3)));
        assert_eq!(grid.kind(CellCoord::new(0, 3)), None);
    }

    #[test]
    fn center_snaps_to_odd_lattice() {
        assert_eq!(
            Grid::filled(43, 43, CellKind::Wall).center(),
            CellCoord::new(21, 21)
        );
        assert_eq!(
            Grid::filled(9, 5, CellKind::Wall).center(),
            CellCoord::new(5, 3)
        );
        assert_eq!(
            Grid::filled(3, 1, CellKind::Wall).center(),
            CellCoord::new(1, 0)
        );
    }

    #[test]
    fn open_neighbors_skip_walls() {
        let grid = Grid::parse(
            "
            .#.
            ...
            .#.
            ",
        )
        .expect("layout parses");

        let neighbors: Vec<_> = grid.open_neighbors(CellCoord::new(1, 1)).collect();
        assert_eq!(neighbors, vec![CellCoord::new(0, 1), CellCoord::new(2, 1)]);
    }

    #[test]
    fn cell_at_inverts_index() {
        let grid = Grid::filled(7, 5, CellKind::Wall);
        let cell = CellCoord::new(4, 3);
        let index = grid.index(cell).expect("cell inside grid");
        assert_eq!(grid.cell_at(index), Some(cell));
        assert_eq!(grid.cell_at(grid.len()), None);
    }

    #[test]
    fn move_delay_shrinks_per_round_with_floor() {
        let profile = PursuerKind::AStar.profile();
        assert_eq!(profile.move_delay_for_round(1), Duration::from_millis(150));
        assert_eq!(profile.move_delay_for_round(3), Duration::from_millis(130));
        assert_eq!(profile.move_delay_for_round(50), MIN_MOVE_DELAY);

        let greedy = PursuerKind::Greedy.profile();
        assert_eq!(greedy.move_delay_for_round(4), MIN_MOVE_DELAY);
        assert_eq!(greedy.move_delay_for_round(0), Duration::from_millis(100));
    }

    #[test]
    fn only_greedy_profile_is_distractible() {
        let distractible: Vec<_> = PursuerKind::ALL
            .into_iter()
            .filter(|kind| kind.profile().distractible)
            .collect();
        assert_eq!(distractible, vec![PursuerKind::Greedy]);
    }

    #[test]
    fn pursuer_view_orders_by_identifier() {
        let view = PursuerView::from_snapshots(vec![
            PursuerSnapshot {
                id: PursuerId::new(2),
                kind: PursuerKind::Greedy,
                cell: CellCoord::new(1, 1),
            },
            PursuerSnapshot {
                id: PursuerId::new(0),
                kind: PursuerKind::AStar,
                cell: CellCoord::new(3, 1),
            },
        ]);

        let ids: Vec<_> = view.iter().map(|snapshot| snapshot.id.get()).collect();
        assert_eq!(ids, vec![0, 2]);
        assert_eq!(
            view.get(PursuerId::new(2)).map(|snapshot| snapshot.kind),
            Some(PursuerKind::Greedy)
        );
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn cell_coord_round_trips_through_bincode() {
        assert_round_trip(&CellCoord::new(5, 7));
    }

    #[test]
    fn search_strategy_round_trips_through_bincode() {
        assert_round_trip(&SearchStrategy::GreedyHeuristic);
        assert_round_trip(&PursuerKind::Dijkstra);
    }
}
