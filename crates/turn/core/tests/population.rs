mod common;

use common::{HostileSpawner, TestWorld, spawn};
use turn_core::{
    EntityRef, EntitySpec, Env, Faction, PcgRng, PopulationConfig, Position, Room, SpawnReport,
    SpeedTier, TurnReport, TurnScheduler, TurnSystemConfig, World,
};

const PLAYER_ROOM: Room = Room::new(0, 0, 0, 5, 5);
const OPEN_ROOM: Room = Room::new(1, 10, 0, 6, 6);
const NARROW_ROOM: Room = Room::new(2, 20, 0, 2, 8);

/// Player in its own room, `hostiles` hostiles lined up in a corridor.
fn setup(hostiles: u32) -> (TurnScheduler, TestWorld) {
    let mut world = TestWorld::new()
        .with_room(PLAYER_ROOM)
        .with_room(OPEN_ROOM)
        .with_room(NARROW_ROOM);

    let mut specs = vec![spawn(&mut world, EntityRef::player(0), (2, 2), SpeedTier::Normal)];
    specs.extend((0..hostiles).map(|i| {
        spawn(
            &mut world,
            EntityRef::hostile(100 + i),
            (i as i32, 20),
            SpeedTier::Normal,
        )
    }));

    let mut scheduler = TurnScheduler::with_defaults();
    scheduler.initialize(specs);
    (scheduler, world)
}

/// Runs turns 1 through 30 and returns the last report.
fn run_to_first_spawn_turn(
    scheduler: &mut TurnScheduler,
    world: &mut TestWorld,
    seed: u64,
) -> TurnReport {
    let mut rng = PcgRng::new(seed);
    let mut spawner = HostileSpawner::starting_at(1000);
    let mut env = Env::new(world).with_rng(&mut rng).with_spawner(&mut spawner);

    for _ in 1..30 {
        let report = scheduler.execute_turn(&mut env);
        assert_eq!(report.spawn, None, "turn {} is not a spawn turn", report.turn);
    }
    let report = scheduler.execute_turn(&mut env);
    assert_eq!(report.turn, 30);
    report
}

#[test]
fn spawns_below_the_population_cap() {
    let (mut scheduler, mut world) = setup(19);
    let report = run_to_first_spawn_turn(&mut scheduler, &mut world, 7);
    let spawn = report.spawn.unwrap();

    assert!(spawn.attempted);
    assert_eq!(spawn.hostiles_before, 19);
    assert!((2..=6).contains(&spawn.requested));
    // Only the open room qualifies, and it holds at most five hostiles.
    assert_eq!(spawn.spawned.len() as u32, spawn.requested.min(5));
    assert_eq!(
        spawn.spawned.len() as u32 + spawn.exhausted_units + spawn.declined_units,
        spawn.requested
    );

    for id in &spawn.spawned {
        let position = world.position_of(*id).unwrap();
        assert!(OPEN_ROOM.contains(position), "{id} spawned at {position}");
        assert!(scheduler.entity_state(*id).is_some());
    }
    assert_eq!(
        scheduler.manager().count(Faction::Hostile),
        19 + spawn.spawned.len()
    );
}

#[test]
fn no_spawn_at_the_population_cap() {
    let (mut scheduler, mut world) = setup(20);
    let bodies = world.bodies.len();
    let report = run_to_first_spawn_turn(&mut scheduler, &mut world, 7);

    assert_eq!(report.spawn, Some(SpawnReport::skipped(20)));
    assert_eq!(world.bodies.len(), bodies);
    assert_eq!(scheduler.manager().count(Faction::Hostile), 20);
}

#[test]
fn player_room_is_never_used_for_spawning() {
    // Only the player's room is large enough.
    let mut world = TestWorld::new()
        .with_room(PLAYER_ROOM)
        .with_room(NARROW_ROOM);
    let player = spawn(&mut world, EntityRef::player(0), (2, 2), SpeedTier::Normal);

    let config = TurnSystemConfig::default().with_population(PopulationConfig {
        spawn_interval: 1,
        ..PopulationConfig::default()
    });
    let mut scheduler = TurnScheduler::new(config).unwrap();
    scheduler.initialize([player]);

    let mut rng = PcgRng::new(3);
    let mut spawner = HostileSpawner::starting_at(50);
    let mut env = Env::new(&mut world)
        .with_rng(&mut rng)
        .with_spawner(&mut spawner);
    let spawn = scheduler.execute_turn(&mut env).spawn.unwrap();

    assert!(spawn.attempted);
    assert!(spawn.spawned.is_empty());
    assert_eq!(spawn.exhausted_units, spawn.requested);
}

#[test]
fn spawned_hostiles_join_later_turns() {
    let mut world = TestWorld::new().with_room(OPEN_ROOM);
    let player = spawn(&mut world, EntityRef::player(0), (0, 0), SpeedTier::Normal);

    let config = TurnSystemConfig::default().with_population(PopulationConfig {
        spawn_interval: 1,
        population_cap: 1,
        ..PopulationConfig::default()
    });
    let mut scheduler = TurnScheduler::new(config).unwrap();
    scheduler.initialize([player]);

    let mut rng = PcgRng::new(11);
    let mut spawner = HostileSpawner::starting_at(500);
    let mut env = Env::new(&mut world)
        .with_rng(&mut rng)
        .with_spawner(&mut spawner);

    let first = scheduler.execute_turn(&mut env).spawn.unwrap();
    assert!(!first.spawned.is_empty());
    assert_eq!(scheduler.manager().turn_order[0], EntityRef::player(0));

    // The cap is checked before spawning, so the batch may overshoot it, and
    // the next turn is then capped.
    let second = scheduler.execute_turn(&mut env).spawn.unwrap();
    assert!(!second.attempted);
    assert_eq!(second.hostiles_before, first.spawned.len());
}

#[test]
fn missing_spawn_collaborators_skip_the_spawn() {
    let mut world = TestWorld::new().with_room(OPEN_ROOM);
    let player: EntitySpec = spawn(&mut world, EntityRef::player(0), (0, 0), SpeedTier::Normal);

    let config = TurnSystemConfig::default().with_population(PopulationConfig {
        spawn_interval: 1,
        ..PopulationConfig::default()
    });
    let mut scheduler = TurnScheduler::new(config).unwrap();
    scheduler.initialize([player]);

    let mut rng = PcgRng::new(1);
    let mut env = Env::new(&mut world).with_rng(&mut rng);
    let spawn = scheduler.execute_turn(&mut env).spawn.unwrap();
    drop(env);

    assert_eq!(spawn, SpawnReport::skipped(0));
    assert!(world.entities_at(Position::new(10, 0)).is_empty());
    assert_eq!(world.bodies.len(), 1);
}

#[test]
fn blocked_tiles_in_an_eligible_room_exhaust_every_unit() {
    let walled = Room::new(1, 10, 0, 3, 3);
    let mut world = TestWorld::new().with_room(PLAYER_ROOM).with_room(walled);
    for x in 10..13 {
        for y in 0..3 {
            world.walls.insert(Position::new(x, y));
        }
    }
    let player = spawn(&mut world, EntityRef::player(0), (2, 2), SpeedTier::Normal);

    let config = TurnSystemConfig::default().with_population(PopulationConfig {
        spawn_interval: 1,
        ..PopulationConfig::default()
    });
    let mut scheduler = TurnScheduler::new(config).unwrap();
    scheduler.initialize([player]);

    let mut rng = PcgRng::new(5);
    let mut spawner = HostileSpawner::starting_at(700);
    let mut env = Env::new(&mut world)
        .with_rng(&mut rng)
        .with_spawner(&mut spawner);
    let spawn = scheduler.execute_turn(&mut env).spawn.unwrap();
    drop(env);

    assert!(spawn.attempted);
    assert!(spawn.requested > 0);
    assert!(spawn.spawned.is_empty());
    assert_eq!(spawn.exhausted_units, spawn.requested);
    assert_eq!(spawn.declined_units, 0);
    assert_eq!(spawner.next_id, 700);
    assert_eq!(world.bodies.len(), 1);
    assert_eq!(scheduler.current_turn(), 2);
}
