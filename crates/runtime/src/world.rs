//! Tile-map dungeon used by the simulation.

use std::collections::{BTreeMap, BTreeSet};

use turn_core::{CellKind, EntityId, EntityRef, Faction, Position, RngOracle, Room, World};

use crate::error::{Result, SimError};

/// A living thing on the map together with the stats the collaborators use.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Creature {
    pub entity: EntityRef,
    pub position: Position,
    pub health: i32,
    pub max_health: i32,
    pub attack: i32,
    pub satiety: u32,
    /// Remaining turns of poison; slip damage applies while non-zero.
    pub poison_turns: u32,
    pub potions: u32,
}

impl Creature {
    pub const FULL_SATIETY: u32 = 300;

    pub fn new(entity: EntityRef, position: Position) -> Self {
        let (health, attack, potions) = match entity.faction {
            Faction::Player => (30, 4, 3),
            Faction::Ally => (20, 3, 0),
            Faction::Hostile => (10, 2, 0),
        };
        Self {
            entity,
            position,
            health,
            max_health: health,
            attack,
            satiety: Self::FULL_SATIETY,
            poison_turns: 0,
            potions,
        }
    }

    pub fn with_stats(mut self, health: i32, attack: i32) -> Self {
        self.health = health;
        self.max_health = health;
        self.attack = attack;
        self
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

/// Rectangular grid of cells with rooms, traps and creatures.
///
/// Creatures are keyed by id in a `BTreeMap`, so every query that walks them
/// is ordered and repeatable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridWorld {
    width: u32,
    height: u32,
    cells: Vec<CellKind>,
    rooms: Vec<Room>,
    traps: BTreeSet<Position>,
    creatures: BTreeMap<EntityId, Creature>,
}

impl GridWorld {
    /// Each generated room lives in its own block of this size.
    pub const BLOCK_WIDTH: u32 = 12;
    pub const BLOCK_HEIGHT: u32 = 10;
    pub const MIN_WIDTH: u32 = Self::BLOCK_WIDTH * 2;
    pub const MIN_HEIGHT: u32 = Self::BLOCK_HEIGHT;
    pub const MAX_SIDE: u32 = 1024;

    /// Solid rock of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![CellKind::Wall; width as usize * height as usize],
            rooms: Vec::new(),
            traps: BTreeSet::new(),
            creatures: BTreeMap::new(),
        }
    }

    /// Lays out one room per block and joins consecutive rooms with
    /// L-shaped corridors. Blocks are visited in serpentine order so
    /// consecutive rooms are always neighbours.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MapTooSmall`] when fewer than two blocks fit and
    /// [`SimError::MapTooLarge`] when a side exceeds [`Self::MAX_SIDE`].
    pub fn generate(width: u32, height: u32, rng: &mut dyn RngOracle) -> Result<Self> {
        if width < Self::MIN_WIDTH || height < Self::MIN_HEIGHT {
            return Err(SimError::MapTooSmall {
                width,
                height,
                min_width: Self::MIN_WIDTH,
                min_height: Self::MIN_HEIGHT,
            });
        }
        if width > Self::MAX_SIDE || height > Self::MAX_SIDE {
            return Err(SimError::MapTooLarge {
                width,
                height,
                max_side: Self::MAX_SIDE,
            });
        }

        let mut world = Self::new(width, height);
        let columns = width / Self::BLOCK_WIDTH;
        let rows = height / Self::BLOCK_HEIGHT;

        for row in 0..rows {
            for step in 0..columns {
                let column = if row % 2 == 0 { step } else { columns - 1 - step };
                let room_width = 4 + rng.below(5);
                let room_height = 3 + rng.below(4);
                let x = column * Self::BLOCK_WIDTH + 1 + rng.below(Self::BLOCK_WIDTH - room_width - 1);
                let y = row * Self::BLOCK_HEIGHT + 1 + rng.below(Self::BLOCK_HEIGHT - room_height - 1);

                let room = Room::new(
                    world.rooms.len() as u32,
                    x as i32,
                    y as i32,
                    room_width,
                    room_height,
                );
                world.carve_room(room);
            }
        }

        let centers: Vec<Position> = world.rooms.iter().map(Room::center).collect();
        for pair in centers.windows(2) {
            world.carve_corridor(pair[0], pair[1]);
        }

        Ok(world)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn in_bounds(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && (position.x as u32) < self.width
            && (position.y as u32) < self.height
    }

    fn index(&self, position: Position) -> Option<usize> {
        self.in_bounds(position)
            .then(|| position.y as usize * self.width as usize + position.x as usize)
    }

    /// Cell at `position`; everything outside the map is void.
    pub fn cell(&self, position: Position) -> CellKind {
        self.index(position)
            .map_or(CellKind::Void, |index| self.cells[index])
    }

    pub fn set_cell(&mut self, position: Position, kind: CellKind) {
        if let Some(index) = self.index(position) {
            self.cells[index] = kind;
        }
    }

    pub fn carve_room(&mut self, room: Room) {
        for y in room.y..room.y + room.height as i32 {
            for x in room.x..room.x + room.width as i32 {
                self.set_cell(Position::new(x, y), CellKind::Room);
            }
        }
        self.rooms.push(room);
    }

    /// Horizontal leg first, then vertical. Only rock is turned into corridor.
    pub fn carve_corridor(&mut self, from: Position, to: Position) {
        let mut cursor = from;
        while cursor != to {
            if cursor.x != to.x {
                cursor.x += (to.x - cursor.x).signum();
            } else {
                cursor.y += (to.y - cursor.y).signum();
            }
            if self.cell(cursor) == CellKind::Wall {
                self.set_cell(cursor, CellKind::Corridor);
            }
        }
    }

    /// Room tiles nobody stands on, in row-major order.
    pub fn free_tiles_in(&self, room: &Room) -> Vec<Position> {
        (room.y..room.y + room.height as i32)
            .flat_map(|y| (room.x..room.x + room.width as i32).map(move |x| Position::new(x, y)))
            .filter(|&tile| self.cell(tile) == CellKind::Room && !self.is_occupied(tile))
            .collect()
    }

    pub fn random_free_tile(&self, room: &Room, rng: &mut dyn RngOracle) -> Option<Position> {
        let tiles = self.free_tiles_in(room);
        if tiles.is_empty() {
            return None;
        }
        Some(tiles[rng.below(tiles.len() as u32) as usize])
    }

    /// Hides `count` spike traps on random room tiles.
    pub fn scatter_traps(&mut self, count: u32, rng: &mut dyn RngOracle) {
        if self.rooms.is_empty() {
            return;
        }
        for _ in 0..count {
            let room = self.rooms[rng.below(self.rooms.len() as u32) as usize];
            if let Some(tile) = self.random_free_tile(&room, rng) {
                self.traps.insert(tile);
            }
        }
    }

    pub fn place_trap(&mut self, position: Position) {
        self.traps.insert(position);
    }

    pub fn has_trap(&self, position: Position) -> bool {
        self.traps.contains(&position)
    }

    pub fn trap_count(&self) -> usize {
        self.traps.len()
    }

    /// Adds a fully specified creature. Fails on blocked or taken tiles and
    /// on duplicate ids.
    pub fn spawn_creature(&mut self, creature: Creature) -> bool {
        if !self.is_walkable(creature.position)
            || self.is_occupied(creature.position)
            || self.creatures.contains_key(&creature.entity.id)
        {
            return false;
        }
        self.creatures.insert(creature.entity.id, creature);
        true
    }

    pub fn creature(&self, id: EntityId) -> Option<&Creature> {
        self.creatures.get(&id)
    }

    pub fn creature_mut(&mut self, id: EntityId) -> Option<&mut Creature> {
        self.creatures.get_mut(&id)
    }

    pub fn creatures(&self) -> impl Iterator<Item = &Creature> {
        self.creatures.values()
    }

    pub fn count(&self, faction: Faction) -> usize {
        self.creatures()
            .filter(|creature| creature.entity.faction == faction)
            .count()
    }
}

impl World for GridWorld {
    fn all_entities(&self) -> Vec<EntityRef> {
        self.creatures().map(|creature| creature.entity).collect()
    }

    fn entities_at(&self, position: Position) -> Vec<EntityRef> {
        self.creatures()
            .filter(|creature| creature.position == position)
            .map(|creature| creature.entity)
            .collect()
    }

    fn is_walkable(&self, position: Position) -> bool {
        matches!(
            self.cell(position),
            CellKind::Room | CellKind::Corridor | CellKind::Door
        )
    }

    fn cell_kind_at(&self, position: Position) -> CellKind {
        self.cell(position)
    }

    fn rooms(&self) -> Vec<Room> {
        self.rooms.clone()
    }

    fn position_of(&self, entity: EntityId) -> Option<Position> {
        self.creature(entity).map(|creature| creature.position)
    }

    fn health_of(&self, entity: EntityId) -> Option<i32> {
        self.creature(entity).map(|creature| creature.health)
    }

    fn add_entity(&mut self, entity: EntityRef, position: Position) -> bool {
        self.spawn_creature(Creature::new(entity, position))
    }

    fn remove_entity(&mut self, entity: EntityId) -> bool {
        self.creatures.remove(&entity).is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use turn_core::PcgRng;

    use super::*;

    fn reachable_from(world: &GridWorld, start: Position) -> BTreeSet<Position> {
        let mut seen = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(tile) = queue.pop_front() {
            for next in tile.neighbors() {
                if world.is_walkable(next) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    #[test]
    fn generated_rooms_are_connected() {
        let mut rng = PcgRng::new(5);
        let world = GridWorld::generate(48, 30, &mut rng).unwrap();
        let rooms = world.rooms();
        assert_eq!(rooms.len(), 12);

        let reachable = reachable_from(&world, rooms[0].center());
        for room in &rooms {
            assert!(room.width >= 4 && room.height >= 3);
            assert!(reachable.contains(&room.center()), "room {} is cut off", room.id);
            assert_eq!(world.cell_kind_at(room.center()), CellKind::Room);
        }
    }

    #[test]
    fn small_maps_are_rejected() {
        let mut rng = PcgRng::new(1);
        assert!(matches!(
            GridWorld::generate(20, 30, &mut rng),
            Err(SimError::MapTooSmall { .. })
        ));
    }

    #[test]
    fn oversized_maps_are_rejected() {
        let mut rng = PcgRng::new(1);
        assert!(matches!(
            GridWorld::generate(u32::MAX, u32::MAX, &mut rng),
            Err(SimError::MapTooLarge { max_side: GridWorld::MAX_SIDE, .. })
        ));
        assert!(matches!(
            GridWorld::generate(GridWorld::MAX_SIDE + 1, 30, &mut rng),
            Err(SimError::MapTooLarge { .. })
        ));
    }

    #[test]
    fn creatures_need_a_free_walkable_tile() {
        let mut world = GridWorld::new(10, 10);
        world.carve_room(Room::new(0, 1, 1, 4, 4));

        assert!(!world.add_entity(EntityRef::player(0), Position::new(0, 0)));
        assert!(world.add_entity(EntityRef::player(0), Position::new(2, 2)));
        assert!(!world.add_entity(EntityRef::hostile(1), Position::new(2, 2)));
        assert!(!world.add_entity(EntityRef::hostile(0), Position::new(3, 3)));

        assert_eq!(world.health_of(EntityId(0)), Some(30));
        assert_eq!(world.free_tiles_in(&world.rooms()[0]).len(), 15);
        assert!(world.remove_entity(EntityId(0)));
        assert_eq!(world.position_of(EntityId(0)), None);
        assert_eq!(world.cell(Position::new(-1, 4)), CellKind::Void);
    }
}
