#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic pursuit system that decides pursuer steps each tick.

pub mod controller;

use std::{collections::BTreeMap, time::Duration};

use oubliette_core::{
    CellCoord, Command, Direction, Event, Grid, PursuerId, PursuerKind, PursuerProfile,
    PursuerView,
};
use rand::Rng;
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

pub use controller::{Decision, Pursuer};

/// Settings for the distraction overlay of distractible variants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistractionConfig {
    /// How long a distraction lasts.
    pub duration: Duration,
    /// Time after a distraction ends before another may start.
    pub cooldown: Duration,
    /// Maximum Manhattan distance to the chase target that allows a distraction.
    pub trigger_distance: u32,
    /// Chance rolled on every eligible decision.
    pub chance: f32,
    /// Number of random cells sampled when looking for a temporary target.
    pub target_attempts: usize,
}

impl Default for DistractionConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(3),
            cooldown: Duration::from_secs(8),
            trigger_distance: 6,
            chance: 0.15,
            target_attempts: 50,
        }
    }
}

/// Configuration parameters required to construct the pursuit system.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Base chance of a random move, before per-pursuer jitter.
    pub random_move_chance: f32,
    /// Half-width of the range the per-pursuer random-move chance is drawn from.
    pub random_move_jitter: f32,
    /// Random moves are only rolled on every `random_move_period`-th decision.
    pub random_move_period: u32,
    /// Inclusive range the per-pursuer recalculation interval is drawn from.
    pub recalculation_interval: (u32, u32),
    /// Distraction overlay settings.
    pub distraction: DistractionConfig,
    /// Per-variant overrides of the built-in profiles.
    pub profiles: Vec<PursuerProfile>,
    /// Seed of the system's random stream.
    pub rng_seed: u64,
}

impl Config {
    /// Default configuration driven by the provided seed.
    #[must_use]
    pub fn with_seed(rng_seed: u64) -> Self {
        Self {
            rng_seed,
            ..Self::default()
        }
    }

    /// Profile used for `kind`, honouring overrides.
    #[must_use]
    pub fn profile(&self, kind: PursuerKind) -> PursuerProfile {
        self.profiles
            .iter()
            .rev()
            .find(|profile| profile.kind == kind)
            .copied()
            .unwrap_or_else(|| kind.profile())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            random_move_chance: 0.15,
            random_move_jitter: 0.05,
            random_move_period: 3,
            recalculation_interval: (2, 5),
            distraction: DistractionConfig::default(),
            profiles: Vec::new(),
            rng_seed: 0x00c4_a5e0_5eed,
        }
    }
}

/// Pure system that reacts to world events and emits pursuer step commands.
#[derive(Debug)]
pub struct Pursuit<R = ChaCha8Rng> {
    config: Config,
    rng: R,
    round: u32,
    pursuers: BTreeMap<PursuerId, Pursuer>,
}

impl Pursuit<ChaCha8Rng> {
    /// Creates a new pursuit system seeded from the configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        Self::with_rng(config, rng)
    }
}

impl Default for Pursuit<ChaCha8Rng> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl<R: Rng> Pursuit<R> {
    /// Creates a new pursuit system drawing randomness from `rng`.
    #[must_use]
    pub fn with_rng(config: Config, rng: R) -> Self {
        Self {
            config,
            rng,
            round: 0,
            pursuers: BTreeMap::new(),
        }
    }

    /// Controller driving the given pursuer, if it belongs to the current roster.
    #[must_use]
    pub fn pursuer(&self, id: PursuerId) -> Option<&Pursuer> {
        self.pursuers.get(&id)
    }

    /// Consumes world events and immutable views to emit step commands.
    ///
    /// Every pursuer decides against the same `target` snapshot.
    pub fn handle(
        &mut self,
        events: &[Event],
        grid: &Grid,
        target: CellCoord,
        pursuer_view: &PursuerView,
        out: &mut Vec<Command>,
    ) {
        let mut elapsed = Duration::ZERO;

        for event in events {
            match event {
                Event::MazeRegenerated { .. } => self.pursuers.clear(),
                Event::RoundStarted { round, .. } => self.start_round(*round),
                Event::PursuerSpawned { pursuer, kind, .. } => {
                    let controller =
                        Pursuer::spawn(*pursuer, *kind, self.round, &self.config, &mut self.rng);
                    tracing::debug!(
                        pursuer = pursuer.get(),
                        kind = ?kind,
                        interval = controller.recalculation_interval(),
                        random_move_chance = controller.random_move_chance(),
                        "pursuer controller created"
                    );
                    let _ = self.pursuers.insert(*pursuer, controller);
                }
                Event::TimeAdvanced { dt } => elapsed = elapsed.saturating_add(*dt),
                _ => {}
            }
        }

        if elapsed.is_zero() {
            return;
        }

        for snapshot in pursuer_view.iter() {
            let Some(controller) = self.pursuers.get_mut(&snapshot.id) else {
                continue;
            };

            controller.advance_timers(elapsed);
            let decision = controller.decide(snapshot.cell, target, grid, &mut self.rng);
            let Some(destination) = decision.destination() else {
                continue;
            };
            if let Some(direction) = Direction::between(snapshot.cell, destination) {
                out.push(Command::StepPursuer {
                    pursuer: snapshot.id,
                    direction,
                });
            }
        }
    }

    fn start_round(&mut self, round: u32) {
        self.round = round;
        self.pursuers.clear();

        for kind in PursuerKind::ALL {
            let profile = self.config.profile(kind);
            tracing::info!(
                round,
                kind = ?kind,
                delay_ms = profile.move_delay_for_round(round).as_millis() as u64,
                "pursuer move delay"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oubliette_core::{CellKind, PursuerSnapshot, SearchStrategy};

    #[test]
    fn profile_overrides_replace_builtin_values() {
        let mut config = Config::default();
        let mut slow = PursuerKind::AStar.profile();
        slow.base_move_delay = Duration::from_millis(400);
        slow.strategy = SearchStrategy::GreedyHeuristic;
        config.profiles.push(slow);

        assert_eq!(config.profile(PursuerKind::AStar), slow);
        assert_eq!(
            config.profile(PursuerKind::Dijkstra),
            PursuerKind::Dijkstra.profile()
        );
    }

    #[test]
    fn ignores_pursuers_without_controllers() {
        let mut pursuit: Pursuit = Pursuit::default();
        let grid = Grid::filled(5, 5, CellKind::Path);
        let view = PursuerView::from_snapshots(vec![PursuerSnapshot {
            id: PursuerId::new(3),
            kind: PursuerKind::AStar,
            cell: CellCoord::new(0, 0),
        }]);
        let mut out = Vec::new();

        pursuit.handle(
            &[Event::TimeAdvanced {
                dt: Duration::from_secs(1),
            }],
            &grid,
            CellCoord::new(4, 4),
            &view,
            &mut out,
        );

        assert!(out.is_empty());
    }

    #[test]
    fn new_round_drops_previous_controllers() {
        let mut pursuit: Pursuit = Pursuit::default();
        let grid = Grid::filled(5, 5, CellKind::Path);
        let view = PursuerView::default();
        let mut out = Vec::new();

        pursuit.handle(
            &[Event::PursuerSpawned {
                pursuer: PursuerId::new(0),
                kind: PursuerKind::Greedy,
                cell: CellCoord::new(0, 0),
            }],
            &grid,
            CellCoord::new(2, 2),
            &view,
            &mut out,
        );
        assert!(pursuit.pursuer(PursuerId::new(0)).is_some());

        pursuit.handle(
            &[Event::RoundStarted {
                round: 2,
                target: CellCoord::new(2, 2),
            }],
            &grid,
            CellCoord::new(2, 2),
            &view,
            &mut out,
        );
        assert!(pursuit.pursuer(PursuerId::new(0)).is_none());
        assert!(out.is_empty());
    }
}
