use crate::state::{EntitySpec, EntityRef, Position};

/// Per-entity end-of-turn effect (status recovery, slip damage, hunger).
///
/// The scheduler calls `process` once per tracked entity and expects no result.
pub trait EffectProcessor<W: ?Sized> {
    fn process(&mut self, world: &mut W, entity: EntityRef);
}

/// Trap resolution for entities that moved during an action slot.
pub trait Traps<W: ?Sized> {
    /// Returns true if a trap fired for this entity.
    fn trigger(&mut self, world: &mut W, entity: EntityRef) -> bool;
}

/// Creates and places natural-spawn hostiles.
pub trait SpawnFactory<W: ?Sized> {
    /// Creates a hostile at `position` and adds it to the world.
    ///
    /// Returns the tracking spec of the new entity, or `None` if the factory
    /// declined (the unit is then counted as not spawned).
    fn create_hostile(&mut self, world: &mut W, position: Position) -> Option<EntitySpec>;
}
