#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Oubliette.
//!
//! The world owns the maze grid, the chase target, and the cells occupied by
//! every pursuer. Adapters and systems never mutate it directly; they submit
//! [`Command`]s through [`apply`] and observe the resulting [`Event`]s.

pub mod maze;
pub mod navigation;

use std::time::Duration;

use oubliette_core::{
    has_caught, CellCoord, Command, Event, Grid, PursuerId, PursuerKind, StepRejection,
};

pub use maze::{generate, MazeConfig, MazeGenerator};

/// Seed used by [`World::new`] when no explicit seed is provided.
pub const DEFAULT_WORLD_SEED: u64 = 0x0b11_e77e_5eed_2024;

/// Represents the authoritative Oubliette world state.
#[derive(Debug)]
pub struct World {
    generator: MazeGenerator,
    grid: Grid,
    round: u32,
    target: CellCoord,
    pursuers: Vec<Pursuer>,
    next_pursuer_id: u32,
    elapsed: Duration,
}

#[derive(Clone, Copy, Debug)]
struct Pursuer {
    id: PursuerId,
    kind: PursuerKind,
    cell: CellCoord,
}

impl World {
    /// Creates a world holding a default-sized maze generated from the default seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MazeConfig::default(), DEFAULT_WORLD_SEED)
    }

    /// Creates a world whose maze generation is driven by `seed`.
    #[must_use]
    pub fn with_config(config: MazeConfig, seed: u64) -> Self {
        let mut generator = MazeGenerator::seeded(config, seed);
        let grid = generator.generate();
        let target = grid.center();
        Self {
            generator,
            grid,
            round: 0,
            target,
            pursuers: Vec::new(),
            next_pursuer_id: 0,
            elapsed: Duration::ZERO,
        }
    }

    fn regenerate(&mut self, out_events: &mut Vec<Event>) {
        self.grid = self.generator.generate();
        self.target = self.grid.center();
        self.pursuers.clear();
        out_events.push(Event::MazeRegenerated {
            columns: self.grid.columns(),
            rows: self.grid.rows(),
        });
    }

    fn pursuer_mut(&mut self, id: PursuerId) -> Option<&mut Pursuer> {
        self.pursuers.iter_mut().find(|pursuer| pursuer.id == id)
    }

    fn validate_destination(&self, cell: Option<CellCoord>) -> Result<CellCoord, StepRejection> {
        let cell = cell.ok_or(StepRejection::OutOfBounds)?;
        if !self.grid.is_valid_position(cell) {
            return Err(StepRejection::OutOfBounds);
        }
        if self.grid.is_wall(cell) {
            return Err(StepRejection::Blocked);
        }
        Ok(cell)
    }

    fn report_catch(&self, pursuer: &Pursuer, out_events: &mut Vec<Event>) {
        if has_caught(pursuer.cell, self.target) {
            tracing::info!(pursuer = pursuer.id.get(), kind = ?pursuer.kind, "target caught");
            out_events.push(Event::TargetCaught {
                pursuer: pursuer.id,
                cell: pursuer.cell,
            });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureMaze { columns, rows } => {
            world.generator.resize(columns, rows);
            world.regenerate(out_events);
        }
        Command::StartRound { round } => {
            world.round = round;
            world.regenerate(out_events);
            tracing::info!(round, target = ?world.target, "round started");
            out_events.push(Event::RoundStarted {
                round,
                target: world.target,
            });
        }
        Command::Tick { dt } => {
            world.elapsed = world.elapsed.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::StepTarget { direction } => {
            let from = world.target;
            let Ok(to) = world.validate_destination(from.step(direction)) else {
                return;
            };
            world.target = to;
            out_events.push(Event::TargetMoved { from, to });

            for pursuer in &world.pursuers {
                world.report_catch(pursuer, out_events);
            }
            if world.grid.is_border(to) {
                tracing::info!(cell = ?to, "target escaped");
                out_events.push(Event::TargetEscaped { cell: to });
            }
        }
        Command::SpawnPursuer { kind, cell } => {
            if let Err(reason) = world.validate_destination(Some(cell)) {
                out_events.push(Event::SpawnRejected { kind, cell, reason });
                return;
            }

            let pursuer = Pursuer {
                id: PursuerId::new(world.next_pursuer_id),
                kind,
                cell,
            };
            world.next_pursuer_id = world.next_pursuer_id.saturating_add(1);
            world.pursuers.push(pursuer);
            out_events.push(Event::PursuerSpawned {
                pursuer: pursuer.id,
                kind,
                cell,
            });
            world.report_catch(&pursuer, out_events);
        }
        Command::StepPursuer { pursuer, direction } => {
            let Some(from) = world
                .pursuers
                .iter()
                .find(|candidate| candidate.id == pursuer)
                .map(|candidate| candidate.cell)
            else {
                out_events.push(Event::StepRejected {
                    pursuer,
                    reason: StepRejection::MissingPursuer,
                });
                return;
            };

            let to = match world.validate_destination(from.step(direction)) {
                Ok(to) => to,
                Err(reason) => {
                    out_events.push(Event::StepRejected { pursuer, reason });
                    return;
                }
            };

            let Some(moved) = world.pursuer_mut(pursuer).map(|entry| {
                entry.cell = to;
                *entry
            }) else {
                return;
            };
            out_events.push(Event::PursuerAdvanced { pursuer, from, to });
            world.report_catch(&moved, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{navigation::DistanceField, World};
    use oubliette_core::{has_caught, CellCoord, Grid, PursuerId, PursuerSnapshot, PursuerView};

    /// Provides read-only access to the current maze grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Number of the round currently in progress; zero before the first round.
    #[must_use]
    pub fn round(world: &World) -> u32 {
        world.round
    }

    /// Cell currently occupied by the chase target.
    #[must_use]
    pub fn target_cell(world: &World) -> CellCoord {
        world.target
    }

    /// Total simulated time accumulated through `Tick` commands.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Captures a read-only view of the pursuers inhabiting the maze.
    #[must_use]
    pub fn pursuer_view(world: &World) -> PursuerView {
        PursuerView::from_snapshots(
            world
                .pursuers
                .iter()
                .map(|pursuer| PursuerSnapshot {
                    id: pursuer.id,
                    kind: pursuer.kind,
                    cell: pursuer.cell,
                })
                .collect(),
        )
    }

    /// Lowest-numbered pursuer sharing the target's cell, if any.
    #[must_use]
    pub fn caught_by(world: &World) -> Option<PursuerId> {
        world
            .pursuers
            .iter()
            .filter(|pursuer| has_caught(pursuer.cell, world.target))
            .map(|pursuer| pursuer.id)
            .min()
    }

    /// Openings carved into the outer border of the maze.
    #[must_use]
    pub fn exits(world: &World) -> Vec<CellCoord> {
        world
            .grid
            .path_cells()
            .filter(|cell| world.grid.is_border(*cell))
            .collect()
    }

    /// Open cells not occupied by any pursuer, in row-major order.
    #[must_use]
    pub fn free_cells(world: &World) -> Vec<CellCoord> {
        world
            .grid
            .path_cells()
            .filter(|cell| world.pursuers.iter().all(|pursuer| pursuer.cell != *cell))
            .collect()
    }

    /// Breadth-first distances from the chase target across the current maze.
    #[must_use]
    pub fn reachable_from_target(world: &World) -> DistanceField {
        DistanceField::from_origin(&world.grid, world.target)
    }
}
