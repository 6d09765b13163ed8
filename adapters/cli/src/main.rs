#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for Oubliette: prints mazes, answers path queries and
//! runs seeded headless chase rounds.

mod chase;
mod maze_transfer;
mod render;
mod settings;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use oubliette_core::{CellCoord, Grid, PursuerKind, SearchStrategy, WELCOME_BANNER};
use oubliette_system_pathfinding::try_find_path;
use oubliette_world::{query, MazeGenerator, World, DEFAULT_WORLD_SEED};
use tracing_subscriber::EnvFilter;

use crate::{
    chase::{Chase, ChaseOptions, Ending},
    render::{legend, render, Overlay},
    settings::Settings,
};

/// Oubliette maze and pursuit toolkit.
#[derive(Parser, Debug)]
#[command(name = "oubliette")]
#[command(about = "Generate mazes, search paths and run seeded chase rounds")]
struct Cli {
    /// Seed driving maze generation and every random decision.
    #[arg(long, default_value_t = DEFAULT_WORLD_SEED)]
    seed: u64,

    /// Optional TOML settings file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit debug-level logs.
    #[arg(long, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Print a freshly generated maze.
    Maze {
        /// Also print a transfer string that `path --maze` accepts.
        #[arg(long)]
        export: bool,
    },
    /// Search a route through a maze and draw it.
    Path {
        /// Maze transfer string; a maze is generated from the seed when omitted.
        #[arg(long)]
        maze: Option<String>,

        /// Start cell as `column,row`; defaults to the maze center.
        #[arg(long, value_parser = parse_cell)]
        from: Option<CellCoord>,

        /// Goal cell as `column,row`; defaults to the first exit.
        #[arg(long, value_parser = parse_cell)]
        to: Option<CellCoord>,

        /// Search strategy used to order the frontier.
        #[arg(long, value_enum, default_value_t = StrategyArg::Astar)]
        strategy: StrategyArg,
    },
    /// Run seeded chase rounds without a window.
    Chase {
        /// Number of rounds to play.
        #[arg(long, default_value_t = 3)]
        rounds: u32,

        /// Seconds of simulated time before the target survives a round.
        #[arg(long, default_value_t = 60.0)]
        round_limit: f32,

        /// Simulated milliseconds per tick.
        #[arg(long, default_value_t = 50)]
        tick_ms: u64,

        /// Let the target wander one cell every this many milliseconds.
        #[arg(long)]
        roam_ms: Option<u64>,

        /// Draw the final board of every round.
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    Astar,
    Dijkstra,
    Greedy,
}

impl From<StrategyArg> for SearchStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Astar => Self::AStarCost,
            StrategyArg::Dijkstra => Self::DijkstraCost,
            StrategyArg::Greedy => Self::GreedyHeuristic,
        }
    }
}

/// Entry point for the Oubliette command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    match cli.mode {
        Mode::Maze { export } => print_maze(&settings, cli.seed, export),
        Mode::Path {
            maze,
            from,
            to,
            strategy,
        } => {
            let grid = match maze {
                Some(encoded) => {
                    maze_transfer::decode(&encoded).context("failed to decode --maze")?
                }
                None => MazeGenerator::seeded(settings.maze_config(), cli.seed).generate(),
            };
            print_path(&grid, from, to, strategy.into())
        }
        Mode::Chase {
            rounds,
            round_limit,
            tick_ms,
            roam_ms,
            show,
        } => {
            let options = ChaseOptions {
                round_limit: Duration::try_from_secs_f32(round_limit)
                    .with_context(|| format!("invalid --round-limit {round_limit}"))?,
                tick: Duration::from_millis(tick_ms),
                target_delay: roam_ms.map(Duration::from_millis),
            };
            if options.tick.is_zero() {
                bail!("--tick-ms must be greater than zero");
            }
            run_chase(&settings, cli.seed, rounds, &options, show)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_maze(settings: &Settings, seed: u64, export: bool) -> Result<()> {
    let world = World::with_config(settings.maze_config(), seed);
    let grid = query::grid(&world);
    let overlay = Overlay {
        target: Some(query::target_cell(&world)),
        ..Overlay::default()
    };
    print!("{}", render(grid, &overlay));

    if export {
        println!("{}", maze_transfer::encode(grid)?);
    }
    Ok(())
}

fn print_path(
    grid: &Grid,
    from: Option<CellCoord>,
    to: Option<CellCoord>,
    strategy: SearchStrategy,
) -> Result<()> {
    let start = from.unwrap_or_else(|| grid.center());
    let goal = match to {
        Some(goal) => goal,
        None => grid
            .path_cells()
            .find(|cell| grid.is_border(*cell))
            .context("maze has no exit; pass --to explicitly")?,
    };

    let path = try_find_path(grid, start, goal, strategy)
        .with_context(|| format!("no {} route from {start:?} to {goal:?}", strategy.label()))?;

    let overlay = Overlay {
        target: Some(goal),
        trail: path.cells(),
        ..Overlay::default()
    };
    print!("{}", render(grid, &overlay));
    println!("{}: {} steps", strategy.label(), path.steps());
    Ok(())
}

fn run_chase(
    settings: &Settings,
    seed: u64,
    rounds: u32,
    options: &ChaseOptions,
    show: bool,
) -> Result<()> {
    println!("{WELCOME_BANNER}");
    let mut chase = Chase::new(settings, seed)?;
    if show {
        print!("{}", legend(&PursuerKind::ALL));
    }

    for round in 1..=rounds {
        let outcome = chase.play_round(round, options);
        match outcome.ending {
            Ending::Caught(pursuer, kind) => println!(
                "round {}: caught by {kind:?} #{} after {:.2}s",
                outcome.round,
                pursuer.get(),
                outcome.elapsed.as_secs_f32()
            ),
            Ending::Escaped(exit) => println!(
                "round {}: target escaped at {},{} after {:.2}s",
                outcome.round,
                exit.column(),
                exit.row(),
                outcome.elapsed.as_secs_f32()
            ),
            Ending::Survived => println!(
                "round {}: target survived {:.2}s",
                outcome.round,
                outcome.elapsed.as_secs_f32()
            ),
        }

        if show {
            let world = chase.world();
            let overlay = Overlay {
                target: Some(query::target_cell(world)),
                pursuers: query::pursuer_view(world)
                    .iter()
                    .map(|snapshot| (snapshot.kind, snapshot.cell))
                    .collect(),
                ..Overlay::default()
            };
            print!("{}", render(query::grid(world), &overlay));
        }
    }
    Ok(())
}

fn parse_cell(value: &str) -> Result<CellCoord, String> {
    let (column, row) = value
        .split_once(',')
        .ok_or_else(|| format!("expected `column,row`, found `{value}`"))?;
    let column = column
        .trim()
        .parse()
        .map_err(|_| format!("invalid column in `{value}`"))?;
    let row = row
        .trim()
        .parse()
        .map_err(|_| format!("invalid row in `{value}`"))?;
    Ok(CellCoord::new(column, row))
}
