//! Owns a world and a scheduler and plays whole turns.

use tracing::{info, warn};
use turn_core::{
    EntityId, EntityRef, EntitySpec, Env, Faction, RngOracle, SpawnFactory, SpeedTier,
    TurnReport, TurnScheduler, TurnSystemConfig, World,
};

use crate::agents::{ChasePlanner, GridMovement, MeleeCombat, PotionItems};
use crate::config::SimConfig;
use crate::effects::{HungerDecay, SlipDamage, SpikeTraps, StatusRecovery};
use crate::error::{Result, SimError};
use crate::rng::SeededRng;
use crate::spawn::MonsterFactory;
use crate::world::GridWorld;

/// Totals for a [`Simulation::run`] call, plus every turn report.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub turns_played: u64,
    pub spawned: usize,
    pub removed: usize,
    pub player_alive: bool,
    pub hostiles_remaining: usize,
    pub reports: Vec<TurnReport>,
}

/// A dungeon, its inhabitants, and the collaborators that drive them.
pub struct Simulation {
    world: GridWorld,
    scheduler: TurnScheduler,
    planner: ChasePlanner,
    movement: GridMovement,
    combat: MeleeCombat,
    items: PotionItems,
    traps: SpikeTraps,
    recovery: StatusRecovery,
    slip: SlipDamage,
    hunger: HungerDecay,
    factory: MonsterFactory,
    spawn_rng: SeededRng,
    player: EntityId,
}

impl Simulation {
    pub const PLAYER_ID: u32 = 0;
    pub const FIRST_ALLY_ID: u32 = 1;
    pub const FIRST_HOSTILE_ID: u32 = 1000;

    /// Generates the map and places the party in the first room and the
    /// hostiles in the others.
    ///
    /// # Errors
    ///
    /// Fails on an invalid rule set, a map too small to generate, or when
    /// the requested creatures do not fit.
    pub fn new(settings: &SimConfig, rules: TurnSystemConfig) -> Result<Self> {
        let mut scheduler = TurnScheduler::new(rules)?;

        let mut root = SeededRng::new(settings.seed);
        let mut layout = root.fork();
        let planner = ChasePlanner::new(root.fork());
        let mut factory = MonsterFactory::new(Self::FIRST_HOSTILE_ID, root.fork());
        let spawn_rng = root.fork();

        let mut world = GridWorld::generate(settings.map_width, settings.map_height, &mut layout)?;
        let rooms = world.rooms();
        world.scatter_traps(rooms.len() as u32, &mut layout);

        let Some((home, others)) = rooms.split_first() else {
            return Err(SimError::NoFreeTile(Faction::Player));
        };

        let mut specs = Vec::new();
        let player = EntityRef::player(Self::PLAYER_ID);
        let party = std::iter::once((player, settings.player_speed)).chain(
            (0..settings.allies).map(|n| (EntityRef::ally(Self::FIRST_ALLY_ID + n), SpeedTier::Normal)),
        );
        for (entity, tier) in party {
            let tile = world
                .random_free_tile(home, &mut layout)
                .ok_or(SimError::NoFreeTile(entity.faction))?;
            world.add_entity(entity, tile);
            specs.push(EntitySpec::new(entity, tier));
        }

        for _ in 0..settings.hostiles {
            let room = &others[layout.below(others.len() as u32) as usize];
            let spec = world
                .random_free_tile(room, &mut layout)
                .and_then(|tile| factory.create_hostile(&mut world, tile))
                .ok_or(SimError::NoFreeTile(Faction::Hostile))?;
            specs.push(spec);
        }

        scheduler.initialize(specs);
        info!(
            seed = settings.seed,
            rooms = rooms.len(),
            traps = world.trap_count(),
            hostiles = settings.hostiles,
            allies = settings.allies,
            "simulation ready"
        );

        Ok(Self {
            world,
            scheduler,
            planner,
            movement: GridMovement,
            combat: MeleeCombat,
            items: PotionItems::default(),
            traps: SpikeTraps::default(),
            recovery: StatusRecovery::default(),
            slip: SlipDamage::default(),
            hunger: HungerDecay::default(),
            factory,
            spawn_rng,
            player: player.id,
        })
    }

    pub fn world(&self) -> &GridWorld {
        &self.world
    }

    pub fn scheduler(&self) -> &TurnScheduler {
        &self.scheduler
    }

    pub fn player(&self) -> EntityId {
        self.player
    }

    /// The player is alive while the scheduler still tracks it.
    pub fn player_alive(&self) -> bool {
        self.scheduler.entity_state(self.player).is_some()
    }

    /// Plays one turn. Entities the death check detached are removed from the
    /// map afterwards.
    pub fn step(&mut self) -> TurnReport {
        let mut env = Env::new(&mut self.world)
            .with_ai(&mut self.planner)
            .with_movement(&mut self.movement)
            .with_combat(&mut self.combat)
            .with_items(&mut self.items)
            .with_traps(&mut self.traps)
            .with_status(&mut self.recovery)
            .with_slip_damage(&mut self.slip)
            .with_hunger(&mut self.hunger)
            .with_spawner(&mut self.factory)
            .with_rng(&mut self.spawn_rng);
        let report = self.scheduler.execute_turn(&mut env);

        for &id in &report.removed {
            if !self.world.remove_entity(id) {
                warn!(entity = %id, "detached entity was already gone from the map");
            }
        }

        info!(
            turn = report.turn,
            hostiles = self.scheduler.manager().count(Faction::Hostile),
            removed = report.removed.len(),
            spawned = report.spawn.as_ref().map_or(0, |spawn| spawn.spawned.len()),
            player_health = self.world.health_of(self.player).unwrap_or(0),
            "turn summary"
        );
        report
    }

    /// Plays up to `turns` turns, stopping early once the player is gone.
    pub fn run(&mut self, turns: u64) -> RunSummary {
        let mut summary = RunSummary::default();
        for _ in 0..turns {
            let report = self.step();
            summary.turns_played += 1;
            summary.spawned += report.spawn.as_ref().map_or(0, |spawn| spawn.spawned.len());
            summary.removed += report.removed.len();
            summary.reports.push(report);

            if !self.player_alive() {
                info!(turn = self.scheduler.current_turn() - 1, "the player has fallen");
                break;
            }
        }

        summary.player_alive = self.player_alive();
        summary.hostiles_remaining = self.scheduler.manager().count(Faction::Hostile);
        summary
    }
}
