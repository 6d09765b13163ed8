use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use oubliette_core::{PursuerKind, SearchStrategy};
use oubliette_system_pursuit::{Config as PursuitConfig, DistractionConfig};
use oubliette_system_spawning::Config as SpawningConfig;
use oubliette_world::maze::MazeConfig;
use serde::Deserialize;

/// Tunables read from an optional TOML settings file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    maze: MazeSettings,
    pursuit: PursuitSettings,
    spawning: SpawningSettings,
    pursuers: Vec<PursuerSettings>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct MazeSettings {
    columns: u32,
    rows: u32,
    extra_carve_chance: f32,
    braid_budget: f32,
    braid_chance: f32,
    keep_corner_pieces: bool,
    exit_count: usize,
}

impl Default for MazeSettings {
    fn default() -> Self {
        let config = MazeConfig::default();
        Self {
            columns: config.columns,
            rows: config.rows,
            extra_carve_chance: config.extra_carve_chance,
            braid_budget: config.braid_budget,
            braid_chance: config.braid_chance,
            keep_corner_pieces: config.keep_corner_pieces,
            exit_count: config.exit_count,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PursuitSettings {
    random_move_chance: f32,
    random_move_jitter: f32,
    random_move_period: u32,
    recalculation_min: u32,
    recalculation_max: u32,
    distraction_duration: f32,
    distraction_cooldown: f32,
    distraction_distance: u32,
    distraction_chance: f32,
    distraction_attempts: usize,
}

impl Default for PursuitSettings {
    fn default() -> Self {
        let config = PursuitConfig::default();
        let distraction = config.distraction;
        Self {
            random_move_chance: config.random_move_chance,
            random_move_jitter: config.random_move_jitter,
            random_move_period: config.random_move_period,
            recalculation_min: config.recalculation_interval.0,
            recalculation_max: config.recalculation_interval.1,
            distraction_duration: distraction.duration.as_secs_f32(),
            distraction_cooldown: distraction.cooldown.as_secs_f32(),
            distraction_distance: distraction.trigger_distance,
            distraction_chance: distraction.chance,
            distraction_attempts: distraction.target_attempts,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SpawningSettings {
    min_separation: u32,
    attempts: usize,
    roster: Vec<PursuerKind>,
}

impl Default for SpawningSettings {
    fn default() -> Self {
        let config = SpawningConfig::default();
        Self {
            min_separation: config.min_separation,
            attempts: config.attempts,
            roster: config.roster,
        }
    }
}

/// Override of a single pursuer variant's profile.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
struct PursuerSettings {
    kind: PursuerKind,
    base_delay: Option<f32>,
    strategy: Option<SearchStrategy>,
}

impl Settings {
    /// Reads and validates the settings file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid settings in {}", path.display()))
    }

    /// Parses and validates settings from TOML text.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let settings: Self =
            toml::from_str(contents).context("failed to parse settings toml contents")?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.maze.columns == 0 || self.maze.rows == 0 {
            bail!(
                "maze size {}x{} must be at least 1x1",
                self.maze.columns,
                self.maze.rows
            );
        }
        for (name, value) in [
            ("maze.extra_carve_chance", self.maze.extra_carve_chance),
            ("maze.braid_chance", self.maze.braid_chance),
            ("pursuit.random_move_chance", self.pursuit.random_move_chance),
            ("pursuit.distraction_chance", self.pursuit.distraction_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{name} must lie within 0.0..=1.0, found {value}");
            }
        }
        if self.pursuit.recalculation_min > self.pursuit.recalculation_max {
            bail!(
                "pursuit.recalculation_min ({}) exceeds recalculation_max ({})",
                self.pursuit.recalculation_min,
                self.pursuit.recalculation_max
            );
        }
        if self.spawning.roster.is_empty() {
            bail!("spawning.roster must name at least one pursuer");
        }
        Ok(())
    }

    /// Maze generation settings.
    pub(crate) fn maze_config(&self) -> MazeConfig {
        MazeConfig {
            columns: self.maze.columns,
            rows: self.maze.rows,
            extra_carve_chance: self.maze.extra_carve_chance,
            braid_budget: self.maze.braid_budget,
            braid_chance: self.maze.braid_chance,
            keep_corner_pieces: self.maze.keep_corner_pieces,
            exit_count: self.maze.exit_count,
        }
    }

    /// Pursuit system configuration driven by `seed`.
    pub(crate) fn pursuit_config(&self, seed: u64) -> Result<PursuitConfig> {
        let pursuit = &self.pursuit;
        let distraction = DistractionConfig {
            duration: seconds("pursuit.distraction_duration", pursuit.distraction_duration)?,
            cooldown: seconds("pursuit.distraction_cooldown", pursuit.distraction_cooldown)?,
            trigger_distance: pursuit.distraction_distance,
            chance: pursuit.distraction_chance,
            target_attempts: pursuit.distraction_attempts,
        };

        let profiles = self
            .pursuers
            .iter()
            .map(|entry| {
                let mut profile = entry.kind.profile();
                if let Some(delay) = entry.base_delay {
                    profile.base_move_delay = seconds("pursuers.base_delay", delay)?;
                }
                if let Some(strategy) = entry.strategy {
                    profile.strategy = strategy;
                }
                Ok(profile)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(PursuitConfig {
            random_move_chance: pursuit.random_move_chance,
            random_move_jitter: pursuit.random_move_jitter,
            random_move_period: pursuit.random_move_period,
            recalculation_interval: (pursuit.recalculation_min, pursuit.recalculation_max),
            distraction,
            profiles,
            rng_seed: seed,
        })
    }

    /// Spawning system configuration driven by `seed`.
    pub(crate) fn spawning_config(&self, seed: u64) -> SpawningConfig {
        SpawningConfig {
            min_separation: self.spawning.min_separation,
            attempts: self.spawning.attempts,
            roster: self.spawning.roster.clone(),
            rng_seed: seed,
        }
    }
}

fn seconds(name: &str, value: f32) -> Result<Duration> {
    Duration::try_from_secs_f32(value)
        .with_context(|| format!("{name} must be a non-negative number of seconds, found {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let settings = Settings::parse("").expect("empty settings parse");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.maze_config(), MazeConfig::default());

        let pursuit = settings.pursuit_config(7).expect("defaults convert");
        assert_eq!(pursuit, PursuitConfig::with_seed(7));
        assert_eq!(settings.spawning_config(3), SpawningConfig::new(10, 3));
    }

    #[test]
    fn partial_sections_override_selected_fields() {
        let settings = Settings::parse(
            r#"
            [maze]
            columns = 11
            rows = 9

            [pursuit]
            distraction_duration = 1.5
            recalculation_max = 8

            [spawning]
            roster = ["Greedy", "Greedy"]

            [[pursuers]]
            kind = "AStar"
            base_delay = 0.25
            strategy = "DijkstraCost"
            "#,
        )
        .expect("settings parse");

        let maze = settings.maze_config();
        assert_eq!((maze.columns, maze.rows), (11, 9));
        assert_eq!(maze.exit_count, 2);

        let pursuit = settings.pursuit_config(1).expect("settings convert");
        assert_eq!(pursuit.distraction.duration, Duration::from_millis(1500));
        assert_eq!(pursuit.recalculation_interval, (2, 8));
        let astar = pursuit.profile(PursuerKind::AStar);
        assert_eq!(astar.base_move_delay, Duration::from_millis(250));
        assert_eq!(astar.strategy, SearchStrategy::DijkstraCost);

        let spawning = settings.spawning_config(1);
        assert_eq!(spawning.roster, vec![PursuerKind::Greedy, PursuerKind::Greedy]);
    }

    #[test]
    fn rejects_invalid_values() {
        let error = Settings::parse("[maze]\ncolumns = 0").expect_err("zero width rejected");
        assert!(error.to_string().contains("at least 1x1"));

        let error = Settings::parse("[pursuit]\nrandom_move_chance = 1.5")
            .expect_err("chance above one rejected");
        assert!(error.to_string().contains("random_move_chance"));

        assert!(Settings::parse("[maze]\ncolour = 3").is_err());

        let settings = Settings::parse("[pursuit]\ndistraction_cooldown = -1.0")
            .expect("negative seconds only fail on conversion");
        assert!(settings.pursuit_config(0).is_err());
    }
}
