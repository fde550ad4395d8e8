//! Collaborators that decide and carry out per-entity actions.
//!
//! Each trait is generic over the world type so a concrete simulation can hand
//! its collaborators full access to its own world, while the scheduler itself
//! only relies on [`super::World`].

use crate::state::{EntityId, EntityRef, Position};

/// What an entity wants to do with its current action slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Decision {
    Move(Position),
    Attack(EntityId),
    UseItem(u32),
    Wait,
}

/// Chooses a [`Decision`] for an entity. Called once per dispatch, including
/// the retry dispatch of a hostile whose first move failed.
pub trait AiPlanner<W: ?Sized> {
    fn decide(&mut self, world: &W, entity: EntityRef) -> Decision;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    pub moved: bool,
}

impl MoveOutcome {
    pub const MOVED: Self = Self { moved: true };
    pub const BLOCKED: Self = Self { moved: false };
}

/// Resolves movement and collisions.
pub trait Movement<W: ?Sized> {
    fn try_move(&mut self, world: &mut W, entity: EntityRef, decision: &Decision) -> MoveOutcome;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttackOutcome {
    pub attacked: bool,
}

/// Resolves attacks; damage is entirely the collaborator's business.
pub trait Combat<W: ?Sized> {
    fn can_attack(&self, world: &W, attacker: EntityRef, target: EntityId) -> bool;
    fn try_attack(&mut self, world: &mut W, entity: EntityRef, decision: &Decision)
    -> AttackOutcome;
}

/// Applies an inventory item. Returns whether the item was used.
pub trait Items<W: ?Sized> {
    fn use_item(&mut self, world: &mut W, entity: EntityRef, item: u32) -> bool;
}
