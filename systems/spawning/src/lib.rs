#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for placing each round's pursuers.

use oubliette_core::{CellCoord, Command, Event, Grid, PursuerKind, SpawnError};
use oubliette_world::navigation::DistanceField;
use rand::Rng;
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Minimum Manhattan distance between a spawn and the chase target.
    pub min_separation: u32,
    /// Random samples drawn before falling back to a linear scan.
    pub attempts: usize,
    /// Pursuer variants placed at the start of every round, in spawn order.
    pub roster: Vec<PursuerKind>,
    /// Seed of the system's random stream.
    pub rng_seed: u64,
}

impl Config {
    /// Creates a configuration with the default roster.
    #[must_use]
    pub fn new(min_separation: u32, rng_seed: u64) -> Self {
        Self {
            min_separation,
            rng_seed,
            ..Self::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_separation: 10,
            attempts: 100,
            roster: PursuerKind::ALL.to_vec(),
            rng_seed: 0x7a3c_11d0_9e5b_2f48,
        }
    }
}

/// Pure system that emits spawn commands whenever a round starts.
#[derive(Debug)]
pub struct Spawning<R = ChaCha8Rng> {
    config: Config,
    rng: R,
}

impl Spawning<ChaCha8Rng> {
    /// Creates a new spawning system seeded from the configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> Spawning<R> {
    /// Creates a new spawning system drawing randomness from `rng`.
    #[must_use]
    pub fn with_rng(config: Config, rng: R) -> Self {
        Self { config, rng }
    }

    /// Consumes events and the current grid to emit spawn commands.
    pub fn handle(&mut self, events: &[Event], grid: &Grid, out: &mut Vec<Command>) {
        for event in events {
            let Event::RoundStarted { round, target } = event else {
                continue;
            };

            let mut occupied = vec![*target];
            for &kind in &self.config.roster {
                match choose_spawn(
                    grid,
                    *target,
                    &occupied,
                    self.config.min_separation,
                    self.config.attempts,
                    &mut self.rng,
                ) {
                    Ok(cell) => {
                        occupied.push(cell);
                        out.push(Command::SpawnPursuer { kind, cell });
                    }
                    Err(error) => {
                        tracing::error!(round, kind = ?kind, %error, "pursuer could not be placed");
                    }
                }
            }
        }
    }
}

/// Picks a spawn cell for a pursuer.
///
/// Random interior cells reachable from `target` are sampled first; a sample is
/// accepted when it is open, unoccupied, and at least `min_separation` steps
/// away from `target` in Manhattan distance. When sampling fails the first free
/// interior cell other than the grid center is used, and the center itself as a
/// last resort.
pub fn choose_spawn<R: Rng + ?Sized>(
    grid: &Grid,
    target: CellCoord,
    occupied: &[CellCoord],
    min_separation: u32,
    attempts: usize,
    rng: &mut R,
) -> Result<CellCoord, SpawnError> {
    let is_free = |cell: CellCoord| !grid.is_wall(cell) && !occupied.contains(&cell);

    if grid.columns() >= 3 && grid.rows() >= 3 {
        let reachable = DistanceField::from_origin(grid, target);
        for _ in 0..attempts {
            let cell = CellCoord::new(
                rng.gen_range(1..=grid.columns() - 2),
                rng.gen_range(1..=grid.rows() - 2),
            );
            if is_free(cell)
                && reachable.is_reachable(cell)
                && cell.manhattan_distance(target) >= min_separation
            {
                return Ok(cell);
            }
        }
    }

    let center = grid.center();
    if let Some(cell) = grid
        .path_cells()
        .find(|cell| *cell != center && !grid.is_border(*cell) && is_free(*cell))
    {
        tracing::warn!(cell = ?cell, "random spawn search exhausted, using linear scan");
        return Ok(cell);
    }

    if !grid.is_wall(center) {
        tracing::warn!("no free cell left, spawning on the grid center");
        return Ok(center);
    }

    Err(SpawnError::NoSpawnFound {
        columns: grid.columns(),
        rows: grid.rows(),
    })
}
