use std::fmt;

/// Unique identifier for any entity the scheduler can track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Discrete grid position expressed in tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan (taxicab) distance between two tiles.
    pub fn manhattan(self, other: Position) -> u32 {
        (self.x - other.x).unsigned_abs() + (self.y - other.y).unsigned_abs()
    }

    /// True when `other` shares an edge with this tile.
    pub fn is_adjacent(self, other: Position) -> bool {
        self.manhattan(other) == 1
    }

    /// The four edge-sharing neighbours, in north/east/south/west order.
    pub fn neighbors(self) -> [Position; 4] {
        [
            Position::new(self.x, self.y - 1),
            Position::new(self.x + 1, self.y),
            Position::new(self.x, self.y + 1),
            Position::new(self.x - 1, self.y),
        ]
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Allegiance that decides which phases an entity participates in.
///
/// Resolved once when the entity starts being tracked; the scheduler never
/// re-derives it from entity types.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Faction {
    Player,
    Ally,
    Hostile,
}

impl Faction {
    /// Player and allies stand against hostiles.
    pub fn opposes(self, other: Faction) -> bool {
        matches!(
            (self, other),
            (Faction::Hostile, Faction::Player | Faction::Ally)
                | (Faction::Player | Faction::Ally, Faction::Hostile)
        )
    }

    /// Rank used for the initial turn order: player, allies, hostiles.
    pub const fn order_rank(self) -> u8 {
        match self {
            Faction::Player => 0,
            Faction::Ally => 1,
            Faction::Hostile => 2,
        }
    }
}

/// Speed classification controlling how many action slots an entity gets.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SpeedTier {
    Slow,
    #[default]
    Normal,
    Fast,
}

/// Handle to an externally owned entity plus its faction tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityRef {
    pub id: EntityId,
    pub faction: Faction,
}

impl EntityRef {
    pub const fn new(id: EntityId, faction: Faction) -> Self {
        Self { id, faction }
    }

    pub const fn player(id: u32) -> Self {
        Self::new(EntityId(id), Faction::Player)
    }

    pub const fn ally(id: u32) -> Self {
        Self::new(EntityId(id), Faction::Ally)
    }

    pub const fn hostile(id: u32) -> Self {
        Self::new(EntityId(id), Faction::Hostile)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.id, self.faction)
    }
}
