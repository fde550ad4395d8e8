//! In-memory world and instrumented collaborators shared by the scheduler tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use turn_core::{
    AiPlanner, AttackOutcome, CellKind, Combat, Decision, EffectProcessor, EntityId, EntityRef,
    EntitySpec, MoveOutcome, Movement, Position, Room, SpawnFactory, SpeedTier, Traps, World,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Body {
    pub entity: EntityRef,
    pub position: Position,
    pub health: i32,
}

/// Open grid with optional walls and rooms. Cells outside every room are
/// corridor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TestWorld {
    pub bodies: Vec<Body>,
    pub rooms: Vec<Room>,
    pub walls: BTreeSet<Position>,
}

impl TestWorld {
    pub const DEFAULT_HEALTH: i32 = 10;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_room(mut self, room: Room) -> Self {
        self.rooms.push(room);
        self
    }

    pub fn place(&mut self, entity: EntityRef, position: Position) {
        self.bodies.push(Body {
            entity,
            position,
            health: Self::DEFAULT_HEALTH,
        });
    }

    pub fn body_mut(&mut self, id: EntityId) -> Option<&mut Body> {
        self.bodies.iter_mut().find(|body| body.entity.id == id)
    }

    pub fn set_health(&mut self, id: EntityId, health: i32) {
        if let Some(body) = self.body_mut(id) {
            body.health = health;
        }
    }
}

impl World for TestWorld {
    fn all_entities(&self) -> Vec<EntityRef> {
        self.bodies.iter().map(|body| body.entity).collect()
    }

    fn entities_at(&self, position: Position) -> Vec<EntityRef> {
        self.bodies
            .iter()
            .filter(|body| body.position == position)
            .map(|body| body.entity)
            .collect()
    }

    fn is_walkable(&self, position: Position) -> bool {
        !self.walls.contains(&position)
    }

    fn cell_kind_at(&self, position: Position) -> CellKind {
        if self.walls.contains(&position) {
            CellKind::Wall
        } else if self.rooms.iter().any(|room| room.contains(position)) {
            CellKind::Room
        } else {
            CellKind::Corridor
        }
    }

    fn rooms(&self) -> Vec<Room> {
        self.rooms.clone()
    }

    fn position_of(&self, entity: EntityId) -> Option<Position> {
        self.bodies
            .iter()
            .find(|body| body.entity.id == entity)
            .map(|body| body.position)
    }

    fn health_of(&self, entity: EntityId) -> Option<i32> {
        self.bodies
            .iter()
            .find(|body| body.entity.id == entity)
            .map(|body| body.health)
    }

    fn add_entity(&mut self, entity: EntityRef, position: Position) -> bool {
        if self.is_occupied(position) || self.position_of(entity.id).is_some() {
            return false;
        }
        self.place(entity, position);
        true
    }

    fn remove_entity(&mut self, entity: EntityId) -> bool {
        let before = self.bodies.len();
        self.bodies.retain(|body| body.entity.id != entity);
        self.bodies.len() != before
    }
}

/// Fixed decision per entity (Wait when unplanned); records every call.
#[derive(Debug, Default)]
pub struct ScriptedAi {
    pub plans: HashMap<EntityId, Decision>,
    pub calls: Vec<EntityId>,
}

impl ScriptedAi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plan(mut self, id: u32, decision: Decision) -> Self {
        self.plans.insert(EntityId(id), decision);
        self
    }
}

impl AiPlanner<TestWorld> for ScriptedAi {
    fn decide(&mut self, _world: &TestWorld, entity: EntityRef) -> Decision {
        self.calls.push(entity.id);
        self.plans.get(&entity.id).copied().unwrap_or(Decision::Wait)
    }
}

/// Moves onto the destination when it is walkable and free.
#[derive(Debug, Default)]
pub struct StepMovement;

impl Movement<TestWorld> for StepMovement {
    fn try_move(
        &mut self,
        world: &mut TestWorld,
        entity: EntityRef,
        decision: &Decision,
    ) -> MoveOutcome {
        let Decision::Move(target) = *decision else {
            return MoveOutcome::BLOCKED;
        };
        if !world.is_walkable(target) || world.is_occupied(target) {
            return MoveOutcome::BLOCKED;
        }
        match world.body_mut(entity.id) {
            Some(body) => {
                body.position = target;
                MoveOutcome::MOVED
            }
            None => MoveOutcome::BLOCKED,
        }
    }
}

/// Adjacent attacks for a fixed amount of damage.
#[derive(Debug)]
pub struct FixedCombat {
    pub damage: i32,
}

impl Combat<TestWorld> for FixedCombat {
    fn can_attack(&self, world: &TestWorld, attacker: EntityRef, target: EntityId) -> bool {
        match (world.position_of(attacker.id), world.position_of(target)) {
            (Some(from), Some(to)) => from.is_adjacent(to),
            _ => false,
        }
    }

    fn try_attack(
        &mut self,
        world: &mut TestWorld,
        _entity: EntityRef,
        decision: &Decision,
    ) -> AttackOutcome {
        let Decision::Attack(target) = *decision else {
            return AttackOutcome::default();
        };
        match world.body_mut(target) {
            Some(body) => {
                body.health -= self.damage;
                AttackOutcome { attacked: true }
            }
            None => AttackOutcome::default(),
        }
    }
}

pub type CallLog = Rc<RefCell<Vec<String>>>;

/// Logs `label:id` for every entity it is asked to process.
#[derive(Debug)]
pub struct Recorder {
    pub label: &'static str,
    pub log: CallLog,
}

impl Recorder {
    pub fn new(label: &'static str, log: &CallLog) -> Self {
        Self {
            label,
            log: Rc::clone(log),
        }
    }
}

impl EffectProcessor<TestWorld> for Recorder {
    fn process(&mut self, _world: &mut TestWorld, entity: EntityRef) {
        self.log
            .borrow_mut()
            .push(format!("{}:{}", self.label, entity.id.0));
    }
}

/// Every call springs a trap.
#[derive(Debug, Default)]
pub struct AlwaysTrap {
    pub triggered: Vec<EntityId>,
}

impl Traps<TestWorld> for AlwaysTrap {
    fn trigger(&mut self, _world: &mut TestWorld, entity: EntityRef) -> bool {
        self.triggered.push(entity.id);
        true
    }
}

/// Creates normal-speed hostiles with increasing ids.
#[derive(Debug)]
pub struct HostileSpawner {
    pub next_id: u32,
}

impl HostileSpawner {
    pub fn starting_at(next_id: u32) -> Self {
        Self { next_id }
    }
}

impl SpawnFactory<TestWorld> for HostileSpawner {
    fn create_hostile(&mut self, world: &mut TestWorld, position: Position) -> Option<EntitySpec> {
        let entity = EntityRef::hostile(self.next_id);
        if !world.add_entity(entity, position) {
            return None;
        }
        self.next_id += 1;
        Some(EntitySpec::new(entity, SpeedTier::Normal))
    }
}

/// Places `entity` in the world and returns its tracking spec.
pub fn spawn(world: &mut TestWorld, entity: EntityRef, at: (i32, i32), tier: SpeedTier) -> EntitySpec {
    world.place(entity, Position::new(at.0, at.1));
    EntitySpec::new(entity, tier)
}
