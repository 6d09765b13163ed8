//! Per-pursuer decision loop.

use std::time::Duration;

use oubliette_core::{CellCoord, Grid, Path, PursuerId, PursuerKind, PursuerProfile};
use oubliette_system_pathfinding::find_path;
use oubliette_world::navigation::DistanceField;
use rand::{seq::SliceRandom, Rng};

use crate::{Config, DistractionConfig};

/// Outcome of a single [`Pursuer::decide`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// The move delay has not elapsed yet.
    Wait,
    /// The gate fired but the pursuer stays put.
    Hold,
    /// Random step to a neighbouring open cell.
    Wander(CellCoord),
    /// Step along the cached path.
    Advance(CellCoord),
}

impl Decision {
    /// Destination cell, if the decision moves the pursuer.
    #[must_use]
    pub const fn destination(self) -> Option<CellCoord> {
        match self {
            Self::Wander(cell) | Self::Advance(cell) => Some(cell),
            Self::Wait | Self::Hold => None,
        }
    }
}

/// State of the distraction overlay carried by distractible variants.
#[derive(Clone, Copy, Debug)]
struct Distraction {
    settings: DistractionConfig,
    target: Option<CellCoord>,
    remaining: Duration,
    cooldown: Duration,
}

impl Distraction {
    fn new(settings: DistractionConfig) -> Self {
        Self {
            settings,
            target: None,
            remaining: Duration::ZERO,
            cooldown: Duration::ZERO,
        }
    }

    fn is_active(&self) -> bool {
        self.target.is_some()
    }

    fn advance(&mut self, dt: Duration) {
        if self.is_active() {
            self.remaining = self.remaining.saturating_sub(dt);
            if self.remaining.is_zero() {
                self.target = None;
                self.cooldown = self.settings.cooldown;
                tracing::debug!("distraction expired");
            }
        } else {
            self.cooldown = self.cooldown.saturating_sub(dt);
        }
    }

    fn can_trigger(&self, cell: CellCoord, chase_target: CellCoord) -> bool {
        !self.is_active()
            && self.cooldown.is_zero()
            && cell.manhattan_distance(chase_target) <= self.settings.trigger_distance
    }
}

/// Per-agent controller deciding how a pursuer moves each tick.
#[derive(Clone, Debug)]
pub struct Pursuer {
    id: PursuerId,
    profile: PursuerProfile,
    move_delay: Duration,
    move_timer: Duration,
    path: Path,
    cursor: usize,
    ticks_since_recalculation: u32,
    recalculation_interval: u32,
    random_move_chance: f32,
    random_move_period: u32,
    attempts: u32,
    distraction: Option<Distraction>,
}

impl Pursuer {
    /// Creates the controller for a freshly spawned pursuer.
    ///
    /// The recalculation interval and random-move chance are sampled once here
    /// so that pursuers of the same kind drift out of lockstep.
    pub fn spawn<R: Rng + ?Sized>(
        id: PursuerId,
        kind: PursuerKind,
        round: u32,
        config: &Config,
        rng: &mut R,
    ) -> Self {
        let profile = config.profile(kind);
        let (low, high) = config.recalculation_interval;
        let (low, high) = (low.min(high).max(1), low.max(high).max(1));

        Self {
            id,
            profile,
            move_delay: profile.move_delay_for_round(round),
            move_timer: Duration::ZERO,
            path: Path::empty(),
            cursor: 0,
            ticks_since_recalculation: 0,
            recalculation_interval: rng.gen_range(low..=high),
            random_move_chance: sample_random_move_chance(config, rng),
            random_move_period: config.random_move_period.max(1),
            attempts: 0,
            distraction: profile
                .distractible
                .then(|| Distraction::new(config.distraction)),
        }
    }

    /// Identifier of the pursuer this controller drives.
    #[must_use]
    pub const fn id(&self) -> PursuerId {
        self.id
    }

    /// Variant of the pursuer.
    #[must_use]
    pub const fn kind(&self) -> PursuerKind {
        self.profile.kind
    }

    /// Delay between two decisions for the current round.
    #[must_use]
    pub const fn move_delay(&self) -> Duration {
        self.move_delay
    }

    /// Number of path steps taken between forced recalculations.
    #[must_use]
    pub const fn recalculation_interval(&self) -> u32 {
        self.recalculation_interval
    }

    /// Chance rolled on every random-move check.
    #[must_use]
    pub const fn random_move_chance(&self) -> f32 {
        self.random_move_chance
    }

    /// Cached path, including the cell it was planned from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Temporary target while distracted.
    #[must_use]
    pub fn distraction_target(&self) -> Option<CellCoord> {
        self.distraction.and_then(|distraction| distraction.target)
    }

    /// Time left before the pursuer may be distracted again.
    #[must_use]
    pub fn distraction_cooldown(&self) -> Duration {
        self.distraction
            .map_or(Duration::ZERO, |distraction| distraction.cooldown)
    }

    /// Accumulates elapsed time on the move timer and distraction clocks.
    pub fn advance_timers(&mut self, dt: Duration) {
        self.move_timer = self.move_timer.saturating_add(dt);
        if let Some(distraction) = self.distraction.as_mut() {
            distraction.advance(dt);
        }
    }

    /// Decides the pursuer's move for this tick.
    ///
    /// `cell` is the pursuer's current position and `chase_target` the
    /// snapshot of the target shared by every pursuer this tick.
    pub fn decide<R: Rng + ?Sized>(
        &mut self,
        cell: CellCoord,
        chase_target: CellCoord,
        grid: &Grid,
        rng: &mut R,
    ) -> Decision {
        if self.move_timer < self.move_delay {
            return Decision::Wait;
        }
        self.move_timer = Duration::ZERO;
        self.attempts = self.attempts.wrapping_add(1);

        if self.attempts % self.random_move_period == 0
            && rng.gen::<f32>() < self.random_move_chance
        {
            let options: Vec<CellCoord> = grid.open_neighbors(cell).collect();
            return options
                .choose(rng)
                .map_or(Decision::Hold, |next| Decision::Wander(*next));
        }

        let mut recalculate = self.path.is_empty()
            || self.cursor >= self.path.len()
            || self.ticks_since_recalculation >= self.recalculation_interval;

        if self.try_distract(cell, chase_target, grid, rng) {
            recalculate = true;
        }

        if let Some(next) = self.path.get(self.cursor) {
            if !cell.is_adjacent_to(next) {
                recalculate = true;
            }
        }

        if recalculate {
            let goal = self.distraction_target().unwrap_or(chase_target);
            self.path = find_path(grid, cell, goal, self.profile.strategy);
            self.cursor = 1;
            self.ticks_since_recalculation = 0;
            tracing::debug!(
                pursuer = self.id.get(),
                strategy = self.profile.strategy.label(),
                goal = ?goal,
                length = self.path.len(),
                "path recalculated"
            );
        }

        match self.path.get(self.cursor) {
            Some(next) => {
                self.cursor += 1;
                self.ticks_since_recalculation = self.ticks_since_recalculation.saturating_add(1);
                Decision::Advance(next)
            }
            None => Decision::Hold,
        }
    }

    fn try_distract<R: Rng + ?Sized>(
        &mut self,
        cell: CellCoord,
        chase_target: CellCoord,
        grid: &Grid,
        rng: &mut R,
    ) -> bool {
        let Some(distraction) = self.distraction.as_mut() else {
            return false;
        };
        if !distraction.can_trigger(cell, chase_target) {
            return false;
        }
        if rng.gen::<f32>() >= distraction.settings.chance {
            return false;
        }

        let Some(target) = pick_distraction_target(grid, cell, distraction.settings, rng) else {
            tracing::debug!(pursuer = self.id.get(), "no distraction target found");
            return false;
        };

        distraction.target = Some(target);
        distraction.remaining = distraction.settings.duration;
        tracing::debug!(pursuer = self.id.get(), target = ?target, "distracted");
        true
    }
}

fn sample_random_move_chance<R: Rng + ?Sized>(config: &Config, rng: &mut R) -> f32 {
    let low = (config.random_move_chance - config.random_move_jitter).clamp(0.0, 1.0);
    let high = (config.random_move_chance + config.random_move_jitter).clamp(0.0, 1.0);
    if high <= low {
        return low;
    }
    rng.gen_range(low..high)
}

fn pick_distraction_target<R: Rng + ?Sized>(
    grid: &Grid,
    from: CellCoord,
    settings: DistractionConfig,
    rng: &mut R,
) -> Option<CellCoord> {
    if grid.columns() < 3 || grid.rows() < 3 {
        return None;
    }

    let reachable = DistanceField::from_origin(grid, from);
    (0..settings.target_attempts)
        .map(|_| {
            CellCoord::new(
                rng.gen_range(1..=grid.columns() - 2),
                rng.gen_range(1..=grid.rows() - 2),
            )
        })
        .find(|candidate| !grid.is_wall(*candidate) && reachable.is_reachable(*candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

    fn calm_config() -> Config {
        Config {
            random_move_chance: 0.0,
            random_move_jitter: 0.0,
            recalculation_interval: (50, 50),
            ..Config::default()
        }
    }

    fn corridor() -> Grid {
        Grid::parse(
            "
            #######
            #.....#
            #######
            ",
        )
        .expect("layout parses")
    }

    fn ready(pursuer: &mut Pursuer) {
        pursuer.advance_timers(pursuer.move_delay());
    }

    #[test]
    fn waits_until_the_move_delay_elapses() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let grid = corridor();
        let mut pursuer = Pursuer::spawn(
            PursuerId::new(0),
            PursuerKind::AStar,
            1,
            &calm_config(),
            &mut rng,
        );
        assert_eq!(pursuer.move_delay(), Duration::from_millis(150));

        pursuer.advance_timers(Duration::from_millis(100));
        let decision = pursuer.decide(CellCoord::new(1, 1), CellCoord::new(5, 1), &grid, &mut rng);
        assert_eq!(decision, Decision::Wait);

        pursuer.advance_timers(Duration::from_millis(50));
        let decision = pursuer.decide(CellCoord::new(1, 1), CellCoord::new(5, 1), &grid, &mut rng);
        assert_eq!(decision, Decision::Advance(CellCoord::new(2, 1)));

        let decision = pursuer.decide(CellCoord::new(2, 1), CellCoord::new(5, 1), &grid, &mut rng);
        assert_eq!(decision, Decision::Wait, "timer re-arms after each decision");
    }

    #[test]
    fn later_rounds_shorten_the_delay_down_to_the_floor() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let config = calm_config();
        let round_three = Pursuer::spawn(PursuerId::new(0), PursuerKind::AStar, 3, &config, &mut rng);
        let round_fifty = Pursuer::spawn(PursuerId::new(1), PursuerKind::AStar, 50, &config, &mut rng);

        assert_eq!(round_three.move_delay(), Duration::from_millis(130));
        assert_eq!(round_fifty.move_delay(), Duration::from_millis(70));
    }

    #[test]
    fn exhausted_path_recalculates_on_the_next_tick() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let grid = corridor();
        let mut pursuer = Pursuer::spawn(
            PursuerId::new(0),
            PursuerKind::Dijkstra,
            1,
            &calm_config(),
            &mut rng,
        );

        let mut cell = CellCoord::new(1, 1);
        let first_target = CellCoord::new(3, 1);
        for expected in [CellCoord::new(2, 1), CellCoord::new(3, 1)] {
            ready(&mut pursuer);
            let decision = pursuer.decide(cell, first_target, &grid, &mut rng);
            assert_eq!(decision, Decision::Advance(expected));
            cell = expected;
        }
        assert_eq!(pursuer.cursor, pursuer.path().len());

        ready(&mut pursuer);
        let decision = pursuer.decide(cell, CellCoord::new(5, 1), &grid, &mut rng);
        assert_eq!(decision, Decision::Advance(CellCoord::new(4, 1)));
        assert_eq!(pursuer.path().goal(), Some(CellCoord::new(5, 1)));
    }

    #[test]
    fn unreachable_target_holds_position() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let grid = Grid::parse(
            "
            #####
            #.#.#
            #####
            ",
        )
        .expect("layout parses");
        let mut pursuer = Pursuer::spawn(
            PursuerId::new(0),
            PursuerKind::AStar,
            1,
            &calm_config(),
            &mut rng,
        );

        ready(&mut pursuer);
        let decision = pursuer.decide(CellCoord::new(1, 1), CellCoord::new(3, 1), &grid, &mut rng);
        assert_eq!(decision, Decision::Hold);
        assert!(pursuer.path().is_empty());

        let decision = pursuer.decide(CellCoord::new(1, 1), CellCoord::new(3, 1), &grid, &mut rng);
        assert_eq!(decision, Decision::Wait);
    }

    #[test]
    fn random_moves_fire_on_every_third_attempt() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let grid = Grid::filled(5, 5, oubliette_core::CellKind::Path);
        let config = Config {
            random_move_chance: 1.0,
            random_move_jitter: 0.0,
            recalculation_interval: (50, 50),
            ..Config::default()
        };
        let mut pursuer = Pursuer::spawn(PursuerId::new(0), PursuerKind::AStar, 1, &config, &mut rng);

        let mut cell = CellCoord::new(0, 0);
        let target = CellCoord::new(4, 4);
        for attempt in 1..=6 {
            ready(&mut pursuer);
            let decision = pursuer.decide(cell, target, &grid, &mut rng);
            match decision {
                Decision::Wander(_) => assert_eq!(attempt % 3, 0),
                Decision::Advance(_) => assert_ne!(attempt % 3, 0),
                other => panic!("unexpected decision {other:?}"),
            }
            let next = decision.destination().expect("open grid always moves");
            assert!(cell.is_adjacent_to(next));
            cell = next;
        }
    }

    #[test]
    fn distraction_respects_the_cooldown() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let grid = Grid::filled(9, 9, oubliette_core::CellKind::Path);
        let mut config = calm_config();
        config.distraction.chance = 1.0;
        config.distraction.trigger_distance = 100;
        let mut pursuer = Pursuer::spawn(PursuerId::new(0), PursuerKind::Greedy, 1, &config, &mut rng);

        if let Some(distraction) = pursuer.distraction.as_mut() {
            distraction.cooldown = Duration::from_secs(1);
        }

        let cell = CellCoord::new(1, 1);
        let target = CellCoord::new(7, 7);
        for _ in 0..5 {
            ready(&mut pursuer);
            let _ = pursuer.decide(cell, target, &grid, &mut rng);
            assert_eq!(pursuer.distraction_target(), None);
        }

        pursuer.advance_timers(Duration::from_secs(1));
        let _ = pursuer.decide(cell, target, &grid, &mut rng);
        let lure = pursuer.distraction_target().expect("cooldown elapsed");
        assert_eq!(pursuer.path().goal(), Some(lure));
    }

    #[test]
    fn distant_pursuers_are_never_distracted() {
        let mut rng = ChaCha8Rng::seed_from_u64(10);
        let grid = Grid::filled(15, 15, oubliette_core::CellKind::Path);
        let mut config = calm_config();
        config.distraction.chance = 1.0;
        let mut pursuer = Pursuer::spawn(PursuerId::new(0), PursuerKind::Greedy, 1, &config, &mut rng);

        let target = CellCoord::new(13, 13);
        for _ in 0..5 {
            ready(&mut pursuer);
            let _ = pursuer.decide(CellCoord::new(1, 1), target, &grid, &mut rng);
            assert_eq!(pursuer.distraction_target(), None);
        }
        assert_eq!(pursuer.path().goal(), Some(target));

        ready(&mut pursuer);
        let _ = pursuer.decide(CellCoord::new(10, 10), target, &grid, &mut rng);
        assert!(pursuer.distraction_target().is_some(), "within six cells");
    }

    #[test]
    fn path_is_replanned_once_the_interval_is_reached() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let grid = corridor();
        let config = Config {
            recalculation_interval: (2, 2),
            ..calm_config()
        };
        let mut pursuer = Pursuer::spawn(PursuerId::new(0), PursuerKind::AStar, 1, &config, &mut rng);
        assert_eq!(pursuer.recalculation_interval(), 2);

        let mut cell = CellCoord::new(1, 1);
        for expected in [CellCoord::new(2, 1), CellCoord::new(3, 1)] {
            ready(&mut pursuer);
            let decision = pursuer.decide(cell, CellCoord::new(5, 1), &grid, &mut rng);
            assert_eq!(decision, Decision::Advance(expected));
            cell = expected;
        }
        assert!(pursuer.cursor < pursuer.path().len(), "cached path not exhausted");

        ready(&mut pursuer);
        let moved = CellCoord::new(1, 1);
        let decision = pursuer.decide(cell, moved, &grid, &mut rng);
        assert_eq!(decision, Decision::Advance(CellCoord::new(2, 1)));
        assert_eq!(pursuer.path().goal(), Some(moved));
    }

    #[test]
    fn expired_distraction_starts_the_cooldown() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let grid = Grid::filled(9, 9, oubliette_core::CellKind::Path);
        let mut config = calm_config();
        config.distraction.chance = 1.0;
        let mut pursuer = Pursuer::spawn(PursuerId::new(0), PursuerKind::Greedy, 1, &config, &mut rng);

        ready(&mut pursuer);
        let _ = pursuer.decide(CellCoord::new(3, 3), CellCoord::new(4, 4), &grid, &mut rng);
        assert!(pursuer.distraction_target().is_some());

        pursuer.advance_timers(config.distraction.duration);
        assert_eq!(pursuer.distraction_target(), None);
        assert_eq!(pursuer.distraction_cooldown(), config.distraction.cooldown);
    }

    #[test]
    fn only_greedy_pursuers_get_distracted() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let grid = Grid::filled(9, 9, oubliette_core::CellKind::Path);
        let mut config = calm_config();
        config.distraction.chance = 1.0;

        for kind in [PursuerKind::AStar, PursuerKind::Dijkstra] {
            let mut pursuer = Pursuer::spawn(PursuerId::new(0), kind, 1, &config, &mut rng);
            ready(&mut pursuer);
            let _ = pursuer.decide(CellCoord::new(3, 3), CellCoord::new(4, 4), &grid, &mut rng);
            assert_eq!(pursuer.distraction_target(), None);
        }
    }

    #[test]
    fn sampled_parameters_stay_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let config = Config::default();
        for id in 0..64 {
            let pursuer = Pursuer::spawn(PursuerId::new(id), PursuerKind::Greedy, 1, &config, &mut rng);
            assert!((2..=5).contains(&pursuer.recalculation_interval()));
            assert!((0.099..0.201).contains(&pursuer.random_move_chance()));
        }
    }
}
