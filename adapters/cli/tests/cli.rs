use std::process::{Command, Output};

use oubliette_core::{CellKind, Grid};

fn oubliette(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_oubliette"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to launch the oubliette binary")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "oubliette failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).expect("stdout is utf-8")
}

#[test]
fn maze_prints_a_square_default_grid() {
    let text = stdout(&oubliette(&["--seed", "7", "maze"]));
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 43);
    assert!(lines.iter().all(|line| line.chars().count() == 43));
    assert_eq!(text.matches('T').count(), 1);

    let plain = text.replace('T', ".");
    let grid = Grid::parse(&plain).expect("rendered maze parses");
    assert_eq!(grid.kind(grid.center()), Some(CellKind::Path));
}

#[test]
fn same_seed_prints_the_same_maze() {
    let first = stdout(&oubliette(&["--seed", "99", "maze"]));
    let second = stdout(&oubliette(&["--seed", "99", "maze"]));
    assert_eq!(first, second);
}

#[test]
fn exported_maze_feeds_path_queries() {
    let text = stdout(&oubliette(&["--seed", "3", "maze", "--export"]));
    let transfer = text
        .lines()
        .find(|line| line.starts_with("oubliette:v1:"))
        .expect("transfer string printed");

    for strategy in ["astar", "dijkstra", "greedy"] {
        let output = stdout(&oubliette(&[
            "path",
            "--maze",
            transfer,
            "--strategy",
            strategy,
        ]));
        assert!(output.contains(" steps"), "{strategy}: {output}");
        assert!(output.contains('*'), "{strategy} drew no trail");
    }
}

#[test]
fn path_to_a_wall_fails() {
    let output = oubliette(&["--seed", "3", "path", "--to", "0,0"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no"));
}

#[test]
fn chase_reports_every_round() {
    let text = stdout(&oubliette(&[
        "--seed",
        "5",
        "chase",
        "--rounds",
        "2",
        "--round-limit",
        "5",
    ]));

    assert!(text.starts_with("Welcome to Oubliette."));
    assert!(text.contains("round 1:"));
    assert!(text.contains("round 2:"));
}

#[test]
fn missing_settings_file_is_reported() {
    let output = oubliette(&["--config", "does/not/exist.toml", "maze"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read settings"));
}
