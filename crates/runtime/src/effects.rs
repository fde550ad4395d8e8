//! End-of-turn effects and trap resolution.

use tracing::{debug, info};
use turn_core::{EffectProcessor, EntityRef, Traps};

use crate::world::GridWorld;

/// Wears poison off one turn at a time; unpoisoned, fed creatures regenerate.
#[derive(Clone, Copy, Debug)]
pub struct StatusRecovery {
    pub regeneration: i32,
}

impl Default for StatusRecovery {
    fn default() -> Self {
        Self { regeneration: 1 }
    }
}

impl EffectProcessor<GridWorld> for StatusRecovery {
    fn process(&mut self, world: &mut GridWorld, entity: EntityRef) {
        let Some(creature) = world.creature_mut(entity.id) else {
            return;
        };
        if creature.poison_turns > 0 {
            creature.poison_turns -= 1;
        } else if creature.is_alive() && creature.satiety > 0 {
            creature.health = (creature.health + self.regeneration).min(creature.max_health);
        }
    }
}

/// Damage over time while poisoned.
#[derive(Clone, Copy, Debug)]
pub struct SlipDamage {
    pub damage: i32,
}

impl Default for SlipDamage {
    fn default() -> Self {
        Self { damage: 1 }
    }
}

impl EffectProcessor<GridWorld> for SlipDamage {
    fn process(&mut self, world: &mut GridWorld, entity: EntityRef) {
        let Some(creature) = world.creature_mut(entity.id) else {
            return;
        };
        if creature.poison_turns > 0 {
            creature.health -= self.damage;
            debug!(entity = %entity.id, health = creature.health, "poison");
        }
    }
}

/// Satiety drops every turn; starving creatures lose health instead.
#[derive(Clone, Copy, Debug)]
pub struct HungerDecay {
    pub starvation_damage: i32,
}

impl Default for HungerDecay {
    fn default() -> Self {
        Self {
            starvation_damage: 1,
        }
    }
}

impl EffectProcessor<GridWorld> for HungerDecay {
    fn process(&mut self, world: &mut GridWorld, entity: EntityRef) {
        let Some(creature) = world.creature_mut(entity.id) else {
            return;
        };
        if creature.satiety > 0 {
            creature.satiety -= 1;
        } else {
            creature.health -= self.starvation_damage;
            debug!(entity = %entity.id, health = creature.health, "starving");
        }
    }
}

/// Spike traps: damage plus poison for whoever stands on one.
#[derive(Clone, Copy, Debug)]
pub struct SpikeTraps {
    pub damage: i32,
    pub poison_turns: u32,
}

impl Default for SpikeTraps {
    fn default() -> Self {
        Self {
            damage: 3,
            poison_turns: 3,
        }
    }
}

impl Traps<GridWorld> for SpikeTraps {
    fn trigger(&mut self, world: &mut GridWorld, entity: EntityRef) -> bool {
        let Some(position) = world.creature(entity.id).map(|creature| creature.position) else {
            return false;
        };
        if !world.has_trap(position) {
            return false;
        }
        let Some(creature) = world.creature_mut(entity.id) else {
            return false;
        };

        creature.health -= self.damage;
        creature.poison_turns = creature.poison_turns.max(self.poison_turns);
        info!(entity = %entity.id, %position, health = creature.health, "spike trap");
        true
    }
}
