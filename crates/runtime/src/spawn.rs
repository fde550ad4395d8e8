//! Hostile creation for initial placement and natural spawning.

use std::fmt;

use tracing::debug;
use turn_core::{EntityRef, EntitySpec, Position, RngOracle, SpawnFactory, SpeedTier};

use crate::rng::SeededRng;
use crate::world::{Creature, GridWorld};

/// Monster archetypes. Each maps to a speed tier and base stats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonsterKind {
    Ooze,
    Goblin,
    Bat,
}

impl MonsterKind {
    /// Picks a kind from a per-mille roll: 20% ooze, 60% goblin, 20% bat.
    pub fn from_roll(roll: u32) -> Self {
        match roll {
            0..200 => MonsterKind::Ooze,
            200..800 => MonsterKind::Goblin,
            _ => MonsterKind::Bat,
        }
    }

    pub const fn speed_tier(self) -> SpeedTier {
        match self {
            MonsterKind::Ooze => SpeedTier::Slow,
            MonsterKind::Goblin => SpeedTier::Normal,
            MonsterKind::Bat => SpeedTier::Fast,
        }
    }

    /// `(health, attack)`.
    pub const fn stats(self) -> (i32, i32) {
        match self {
            MonsterKind::Ooze => (16, 3),
            MonsterKind::Goblin => (10, 2),
            MonsterKind::Bat => (5, 1),
        }
    }
}

impl fmt::Display for MonsterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MonsterKind::Ooze => "ooze",
            MonsterKind::Goblin => "goblin",
            MonsterKind::Bat => "bat",
        })
    }
}

/// Rolls a monster kind, places it, and hands out increasing entity ids.
#[derive(Clone, Debug)]
pub struct MonsterFactory {
    next_id: u32,
    rng: SeededRng,
}

impl MonsterFactory {
    pub fn new(first_id: u32, rng: SeededRng) -> Self {
        Self {
            next_id: first_id,
            rng,
        }
    }

    pub fn next_id(&self) -> u32 {
        self.next_id
    }
}

impl SpawnFactory<GridWorld> for MonsterFactory {
    fn create_hostile(&mut self, world: &mut GridWorld, position: Position) -> Option<EntitySpec> {
        let kind = MonsterKind::from_roll(self.rng.roll_permille());
        let entity = EntityRef::hostile(self.next_id);
        let (health, attack) = kind.stats();

        if !world.spawn_creature(Creature::new(entity, position).with_stats(health, attack)) {
            return None;
        }
        self.next_id += 1;
        debug!(entity = %entity.id, %kind, %position, "hostile created");
        Some(EntitySpec::new(entity, kind.speed_tier()))
    }
}
