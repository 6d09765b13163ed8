use std::{collections::VecDeque, time::Duration};

use anyhow::Result;
use oubliette_core::{CellCoord, Command, Direction, Event, PursuerId, PursuerKind};
use oubliette_system_pursuit::Pursuit;
use oubliette_system_spawning::Spawning;
use oubliette_world::{self as world, query, World};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::settings::Settings;

/// Parameters of a headless chase session.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ChaseOptions {
    /// Simulated time after which the target survives the round.
    pub(crate) round_limit: Duration,
    /// Simulated time advanced by every tick.
    pub(crate) tick: Duration,
    /// When set, the target takes a random step whenever this much time passes.
    pub(crate) target_delay: Option<Duration>,
}

/// How a round ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Ending {
    /// A pursuer reached the target.
    Caught(PursuerId, PursuerKind),
    /// The target left the maze through an exit.
    Escaped(CellCoord),
    /// The round limit passed.
    Survived,
}

/// Result of a single round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RoundOutcome {
    pub(crate) round: u32,
    pub(crate) ending: Ending,
    pub(crate) elapsed: Duration,
}

/// Terminal event observed while dispatching.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Finish {
    Caught(PursuerId),
    Escaped(CellCoord),
}

/// World plus the systems that drive it, wired the way the game loop runs them.
#[derive(Debug)]
pub(crate) struct Chase {
    world: World,
    spawning: Spawning,
    pursuit: Pursuit,
    target_rng: ChaCha8Rng,
    target_timer: Duration,
}

impl Chase {
    pub(crate) fn new(settings: &Settings, seed: u64) -> Result<Self> {
        Ok(Self {
            world: World::with_config(settings.maze_config(), seed),
            spawning: Spawning::new(settings.spawning_config(seed.wrapping_add(1))),
            pursuit: Pursuit::new(settings.pursuit_config(seed.wrapping_add(2))?),
            target_rng: ChaCha8Rng::seed_from_u64(seed.wrapping_add(3)),
            target_timer: Duration::ZERO,
        })
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Plays one round until the target is caught, escapes, or the round limit passes.
    pub(crate) fn play_round(&mut self, round: u32, options: &ChaseOptions) -> RoundOutcome {
        self.target_timer = Duration::ZERO;
        let mut finish = self.dispatch(Command::StartRound { round });
        let started = query::elapsed(&self.world);

        loop {
            let elapsed = query::elapsed(&self.world).saturating_sub(started);
            if finish.is_some() || elapsed >= options.round_limit || options.tick.is_zero() {
                let ending = match finish {
                    Some(Finish::Caught(id)) => query::pursuer_view(&self.world)
                        .get(id)
                        .map_or(Ending::Survived, |snapshot| Ending::Caught(id, snapshot.kind)),
                    Some(Finish::Escaped(cell)) => Ending::Escaped(cell),
                    None => Ending::Survived,
                };
                tracing::info!(round, ending = ?ending, elapsed = ?elapsed, "round finished");
                return RoundOutcome {
                    round,
                    ending,
                    elapsed,
                };
            }

            if let Some(delay) = options.target_delay {
                self.target_timer = self.target_timer.saturating_add(options.tick);
                if self.target_timer >= delay {
                    self.target_timer = Duration::ZERO;
                    if let Some(direction) = self.roam_direction() {
                        finish = finish.or(self.dispatch(Command::StepTarget { direction }));
                    }
                }
            }

            if finish.is_none() {
                finish = self.dispatch(Command::Tick { dt: options.tick });
            }
        }
    }

    fn roam_direction(&mut self) -> Option<Direction> {
        let grid = query::grid(&self.world);
        let target = query::target_cell(&self.world);
        let options: Vec<CellCoord> = grid.open_neighbors(target).collect();
        options
            .choose(&mut self.target_rng)
            .and_then(|next| Direction::between(target, *next))
    }

    /// Applies `command` and every command the systems emit in response.
    ///
    /// Returns the first catch or escape reported along the way.
    fn dispatch(&mut self, command: Command) -> Option<Finish> {
        let mut finish = None;
        let mut queue = VecDeque::from([command]);

        while let Some(command) = queue.pop_front() {
            let mut events = Vec::new();
            world::apply(&mut self.world, command, &mut events);

            for event in &events {
                let observed = match event {
                    Event::TargetCaught { pursuer, .. } => Some(Finish::Caught(*pursuer)),
                    Event::TargetEscaped { cell } => Some(Finish::Escaped(*cell)),
                    _ => None,
                };
                finish = finish.or(observed);
            }

            let mut commands = Vec::new();
            let grid = query::grid(&self.world);
            self.spawning.handle(&events, grid, &mut commands);
            self.pursuit.handle(
                &events,
                grid,
                query::target_cell(&self.world),
                &query::pursuer_view(&self.world),
                &mut commands,
            );
            queue.extend(commands);
        }

        finish
    }
}
