use std::collections::BTreeSet;

use oubliette_core::{Command, Event, PursuerKind};
use oubliette_system_spawning::{Config, Spawning};
use oubliette_world::{self as world, query, World};

fn start_round(world: &mut World, round: u32) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::StartRound { round }, &mut events);
    events
}

#[test]
fn round_start_places_the_full_roster() {
    let mut world = World::new();
    let events = start_round(&mut world, 1);

    let mut spawning = Spawning::new(Config::default());
    let mut commands = Vec::new();
    spawning.handle(&events, query::grid(&world), &mut commands);

    let target = query::target_cell(&world);
    let mut kinds = Vec::new();
    let mut cells = BTreeSet::new();
    for command in &commands {
        match command {
            Command::SpawnPursuer { kind, cell } => {
                kinds.push(*kind);
                assert!(cells.insert(*cell), "spawns must not overlap");
                assert!(cell.manhattan_distance(target) >= 10);
                assert!(!query::grid(&world).is_wall(*cell));
            }
            other => panic!("unexpected command emitted: {other:?}"),
        }
    }
    assert_eq!(kinds, PursuerKind::ALL.to_vec());

    for command in commands {
        let mut spawned = Vec::new();
        world::apply(&mut world, command, &mut spawned);
        assert!(matches!(spawned.as_slice(), [Event::PursuerSpawned { .. }]));
    }
    assert_eq!(query::pursuer_view(&world).iter().count(), 3);
    assert_eq!(query::caught_by(&world), None);
}

#[test]
fn ignores_events_other_than_round_start() {
    let world = World::new();
    let mut spawning = Spawning::new(Config::default());
    let mut commands = Vec::new();

    spawning.handle(
        &[Event::TimeAdvanced {
            dt: std::time::Duration::from_secs(1),
        }],
        query::grid(&world),
        &mut commands,
    );

    assert!(commands.is_empty());
}

#[test]
fn same_seed_places_pursuers_identically() {
    let placements = |seed: u64| {
        let mut world = World::new();
        let events = start_round(&mut world, 1);
        let mut spawning = Spawning::new(Config::new(10, seed));
        let mut commands = Vec::new();
        spawning.handle(&events, query::grid(&world), &mut commands);
        commands
    };

    assert_eq!(placements(0xabc), placements(0xabc));
}
