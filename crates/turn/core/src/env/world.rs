use crate::state::{EntityId, EntityRef, Position};

/// Mutable view of the dungeon the scheduler runs against.
///
/// The world owns entities, geometry, and health; the scheduler only reads it
/// (positions for adjacency and distance ordering, health for the death sweep,
/// rooms and cells for natural spawning). Collaborators receive the same world
/// and may mutate it.
pub trait World {
    fn all_entities(&self) -> Vec<EntityRef>;
    fn entities_at(&self, position: Position) -> Vec<EntityRef>;
    fn is_walkable(&self, position: Position) -> bool;
    fn cell_kind_at(&self, position: Position) -> CellKind;
    fn rooms(&self) -> Vec<Room>;

    fn room_containing(&self, position: Position) -> Option<Room> {
        self.rooms().into_iter().find(|room| room.contains(position))
    }

    fn position_of(&self, entity: EntityId) -> Option<Position>;

    /// Current health, or `None` when the world no longer knows the entity.
    fn health_of(&self, entity: EntityId) -> Option<i32>;

    fn add_entity(&mut self, entity: EntityRef, position: Position) -> bool;
    fn remove_entity(&mut self, entity: EntityId) -> bool;

    fn is_occupied(&self, position: Position) -> bool {
        !self.entities_at(position).is_empty()
    }
}

/// Structural class of a map cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    Room,
    Corridor,
    Door,
    Wall,
    Void,
}

/// Axis-aligned rectangular room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Room {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Room {
    pub const fn new(id: u32, x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            id,
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= self.x
            && position.y >= self.y
            && position.x < self.x + self.width as i32
            && position.y < self.y + self.height as i32
    }

    pub fn center(&self) -> Position {
        Position::new(
            self.x + (self.width / 2) as i32,
            self.y + (self.height / 2) as i32,
        )
    }
}
