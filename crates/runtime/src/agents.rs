//! Decision making and action resolution for creatures on a [`GridWorld`].

use tracing::debug;
use turn_core::{
    AiPlanner, AttackOutcome, Combat, Decision, EntityId, EntityRef, Faction, Items, MoveOutcome,
    Movement, Position, RngOracle, World,
};

use crate::rng::SeededRng;
use crate::world::{Creature, GridWorld};

/// Item id of the healing potion, the only item in the game.
pub const POTION: u32 = 0;

/// Greedy planner shared by every faction.
///
/// Hostiles hunt the nearest player or ally. Allies fight adjacent hostiles
/// and otherwise keep close to the player. The player drinks a potion when
/// badly hurt, fights adjacent hostiles, and otherwise wanders.
#[derive(Clone, Debug)]
pub struct ChasePlanner {
    rng: SeededRng,
    /// Allies stop following once this close to the player.
    pub follow_distance: u32,
}

impl ChasePlanner {
    pub fn new(rng: SeededRng) -> Self {
        Self {
            rng,
            follow_distance: 2,
        }
    }

    fn hunt(&mut self, world: &GridWorld, me: &Creature) -> Decision {
        let Some(target) = nearest_opponent(world, me) else {
            return Decision::Wait;
        };
        if me.position.is_adjacent(target.position) {
            return Decision::Attack(target.entity.id);
        }
        step_toward(world, me.position, target.position).map_or(Decision::Wait, Decision::Move)
    }

    fn escort(&mut self, world: &GridWorld, me: &Creature) -> Decision {
        if let Some(enemy) = adjacent_opponent(world, me) {
            return Decision::Attack(enemy.entity.id);
        }
        let player = world
            .creatures()
            .find(|creature| creature.entity.faction == Faction::Player);
        match player {
            Some(player) if me.position.manhattan(player.position) > self.follow_distance => {
                step_toward(world, me.position, player.position)
                    .map_or(Decision::Wait, Decision::Move)
            }
            _ => Decision::Wait,
        }
    }

    fn explore(&mut self, world: &GridWorld, me: &Creature) -> Decision {
        if me.potions > 0 && me.health * 3 < me.max_health {
            return Decision::UseItem(POTION);
        }
        if let Some(enemy) = adjacent_opponent(world, me) {
            return Decision::Attack(enemy.entity.id);
        }

        let open: Vec<Position> = me
            .position
            .neighbors()
            .into_iter()
            .filter(|&tile| world.is_walkable(tile) && !world.is_occupied(tile))
            .collect();
        if open.is_empty() {
            return Decision::Wait;
        }
        Decision::Move(open[self.rng.below(open.len() as u32) as usize])
    }
}

impl AiPlanner<GridWorld> for ChasePlanner {
    fn decide(&mut self, world: &GridWorld, entity: EntityRef) -> Decision {
        let Some(me) = world.creature(entity.id).filter(|me| me.is_alive()) else {
            return Decision::Wait;
        };
        match entity.faction {
            Faction::Hostile => self.hunt(world, me),
            Faction::Ally => self.escort(world, me),
            Faction::Player => self.explore(world, me),
        }
    }
}

fn opponents<'w>(world: &'w GridWorld, me: &'w Creature) -> impl Iterator<Item = &'w Creature> {
    world.creatures().filter(move |other| {
        other.is_alive() && me.entity.faction.opposes(other.entity.faction)
    })
}

fn nearest_opponent<'w>(world: &'w GridWorld, me: &'w Creature) -> Option<&'w Creature> {
    opponents(world, me).min_by_key(|other| (me.position.manhattan(other.position), other.entity.id))
}

fn adjacent_opponent<'w>(world: &'w GridWorld, me: &'w Creature) -> Option<&'w Creature> {
    opponents(world, me).find(|other| me.position.is_adjacent(other.position))
}

/// Walkable neighbour that closes the distance to `to`, preferring free tiles.
/// An occupied tile is still chosen when nothing else gets closer; the move
/// then fails and the scheduler decides whether to retry it.
fn step_toward(world: &GridWorld, from: Position, to: Position) -> Option<Position> {
    let distance = from.manhattan(to);
    from.neighbors()
        .into_iter()
        .filter(|&tile| world.is_walkable(tile) && tile.manhattan(to) < distance)
        .min_by_key(|&tile| (world.is_occupied(tile), tile.manhattan(to)))
}

/// Single cardinal steps onto free walkable tiles.
#[derive(Clone, Copy, Debug, Default)]
pub struct GridMovement;

impl Movement<GridWorld> for GridMovement {
    fn try_move(
        &mut self,
        world: &mut GridWorld,
        entity: EntityRef,
        decision: &Decision,
    ) -> MoveOutcome {
        let Decision::Move(target) = *decision else {
            return MoveOutcome::BLOCKED;
        };
        let Some(from) = world.position_of(entity.id) else {
            return MoveOutcome::BLOCKED;
        };
        if !from.is_adjacent(target) || !world.is_walkable(target) || world.is_occupied(target) {
            return MoveOutcome::BLOCKED;
        }

        match world.creature_mut(entity.id) {
            Some(creature) => {
                creature.position = target;
                MoveOutcome::MOVED
            }
            None => MoveOutcome::BLOCKED,
        }
    }
}

/// Adjacent attacks dealing the attacker's `attack` stat.
#[derive(Clone, Copy, Debug, Default)]
pub struct MeleeCombat;

impl Combat<GridWorld> for MeleeCombat {
    fn can_attack(&self, world: &GridWorld, attacker: EntityRef, target: EntityId) -> bool {
        let (Some(attacker), Some(target)) = (world.creature(attacker.id), world.creature(target))
        else {
            return false;
        };
        attacker.is_alive()
            && target.is_alive()
            && attacker.entity.faction.opposes(target.entity.faction)
            && attacker.position.is_adjacent(target.position)
    }

    fn try_attack(
        &mut self,
        world: &mut GridWorld,
        entity: EntityRef,
        decision: &Decision,
    ) -> AttackOutcome {
        let Decision::Attack(target) = *decision else {
            return AttackOutcome::default();
        };
        if !self.can_attack(world, entity, target) {
            return AttackOutcome::default();
        }
        let damage = world.creature(entity.id).map_or(0, |attacker| attacker.attack);
        let Some(victim) = world.creature_mut(target) else {
            return AttackOutcome::default();
        };

        victim.health -= damage;
        debug!(attacker = %entity.id, target = %target, damage, health = victim.health, "hit");
        AttackOutcome { attacked: true }
    }
}

/// Healing potions: restore health and cure poison.
#[derive(Clone, Copy, Debug)]
pub struct PotionItems {
    pub heal: i32,
}

impl Default for PotionItems {
    fn default() -> Self {
        Self { heal: 10 }
    }
}

impl Items<GridWorld> for PotionItems {
    fn use_item(&mut self, world: &mut GridWorld, entity: EntityRef, item: u32) -> bool {
        if item != POTION {
            return false;
        }
        let Some(creature) = world.creature_mut(entity.id) else {
            return false;
        };
        if creature.potions == 0 {
            return false;
        }

        creature.potions -= 1;
        creature.health = (creature.health + self.heal).min(creature.max_health);
        creature.poison_turns = 0;
        debug!(entity = %entity.id, health = creature.health, "potion used");
        true
    }
}

#[cfg(test)]
mod tests {
    use turn_core::Room;

    use super::*;

    fn arena() -> GridWorld {
        let mut world = GridWorld::new(12, 12);
        world.carve_room(Room::new(0, 1, 1, 10, 10));
        world
    }

    fn planner() -> ChasePlanner {
        ChasePlanner::new(SeededRng::new(3))
    }

    #[test]
    fn hostiles_close_in_then_attack() {
        let mut world = arena();
        world.add_entity(EntityRef::player(0), Position::new(2, 2));
        world.add_entity(EntityRef::hostile(1), Position::new(5, 2));

        let mut ai = planner();
        assert_eq!(
            ai.decide(&world, EntityRef::hostile(1)),
            Decision::Move(Position::new(4, 2))
        );

        world.creature_mut(EntityId(1)).unwrap().position = Position::new(3, 2);
        assert_eq!(
            ai.decide(&world, EntityRef::hostile(1)),
            Decision::Attack(EntityId(0))
        );
    }

    #[test]
    fn allies_follow_the_player_and_defend() {
        let mut world = arena();
        world.add_entity(EntityRef::player(0), Position::new(2, 2));
        world.add_entity(EntityRef::ally(1), Position::new(2, 7));

        let mut ai = planner();
        assert_eq!(
            ai.decide(&world, EntityRef::ally(1)),
            Decision::Move(Position::new(2, 6))
        );

        world.creature_mut(EntityId(1)).unwrap().position = Position::new(2, 4);
        assert_eq!(ai.decide(&world, EntityRef::ally(1)), Decision::Wait);

        world.add_entity(EntityRef::hostile(2), Position::new(3, 4));
        assert_eq!(
            ai.decide(&world, EntityRef::ally(1)),
            Decision::Attack(EntityId(2))
        );
    }

    #[test]
    fn wounded_player_drinks_a_potion() {
        let mut world = arena();
        world.add_entity(EntityRef::player(0), Position::new(2, 2));
        world.creature_mut(EntityId(0)).unwrap().health = 5;

        let mut ai = planner();
        assert_eq!(
            ai.decide(&world, EntityRef::player(0)),
            Decision::UseItem(POTION)
        );

        let mut items = PotionItems::default();
        assert!(items.use_item(&mut world, EntityRef::player(0), POTION));
        let player = world.creature(EntityId(0)).unwrap();
        assert_eq!(player.health, 15);
        assert_eq!(player.potions, 2);
        assert!(!items.use_item(&mut world, EntityRef::player(0), 9));
    }

    #[test]
    fn movement_rejects_occupied_and_distant_tiles() {
        let mut world = arena();
        world.add_entity(EntityRef::player(0), Position::new(2, 2));
        world.add_entity(EntityRef::hostile(1), Position::new(3, 2));

        let mut movement = GridMovement;
        let hostile = EntityRef::hostile(1);
        assert!(!movement.try_move(&mut world, hostile, &Decision::Move(Position::new(2, 2))).moved);
        assert!(!movement.try_move(&mut world, hostile, &Decision::Move(Position::new(5, 2))).moved);
        assert!(movement.try_move(&mut world, hostile, &Decision::Move(Position::new(3, 3))).moved);
        assert_eq!(world.position_of(EntityId(1)), Some(Position::new(3, 3)));
    }

    #[test]
    fn melee_needs_adjacent_opponents() {
        let mut world = arena();
        world.add_entity(EntityRef::player(0), Position::new(2, 2));
        world.add_entity(EntityRef::ally(1), Position::new(2, 3));
        world.add_entity(EntityRef::hostile(2), Position::new(3, 2));

        let mut combat = MeleeCombat;
        assert!(!combat.can_attack(&world, EntityRef::player(0), EntityId(1)));
        assert!(!combat.can_attack(&world, EntityRef::ally(1), EntityId(2)));

        let outcome = combat.try_attack(
            &mut world,
            EntityRef::player(0),
            &Decision::Attack(EntityId(2)),
        );
        assert!(outcome.attacked);
        assert_eq!(world.health_of(EntityId(2)), Some(6));
    }
}
