use std::collections::HashMap;

use bitflags::bitflags;

use super::{EntityId, EntityRef, Faction, SpeedTier};
use crate::phase::Slot;

bitflags! {
    /// Actions committed within a single action slot.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct SlotActions: u8 {
        const MOVED     = 1 << 0;
        const ATTACKED  = 1 << 1;
        const USED_ITEM = 1 << 2;
        const WAITED    = 1 << 3;
    }
}

/// Eligibility snapshot plus the actions taken in one slot this turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlotState {
    pub can_act: bool,
    pub actions: SlotActions,
}

impl SlotState {
    pub fn acted(&self) -> bool {
        !self.actions.is_empty()
    }

    pub fn moved(&self) -> bool {
        self.actions.contains(SlotActions::MOVED)
    }

    pub fn attacked(&self) -> bool {
        self.actions.contains(SlotActions::ATTACKED)
    }

    pub fn used_item(&self) -> bool {
        self.actions.contains(SlotActions::USED_ITEM)
    }
}

/// Per-entity overrides for one slot. `None` defers to the tier config.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SlotOverride {
    pub enabled: Option<bool>,
    pub can_move: Option<bool>,
    pub can_attack: Option<bool>,
    pub can_use_item: Option<bool>,
}

/// Per-entity override of both slot configurations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SpeedOverride {
    pub slot1: SlotOverride,
    pub slot2: SlotOverride,
}

impl SpeedOverride {
    pub const fn slot(&self, slot: Slot) -> &SlotOverride {
        match slot {
            Slot::First => &self.slot1,
            Slot::Second => &self.slot2,
        }
    }
}

/// Scheduling state kept for every tracked entity across turns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityTurnState {
    pub speed_tier: SpeedTier,
    pub slot1: SlotState,
    pub slot2: SlotState,
    /// Set once slot 1 resolves: the entity ended it next to an opposing faction.
    pub was_adjacent_after_slot1: bool,
    /// First-slot cooldown for slow entities.
    pub turns_until_next_action: u32,
    pub overrides: Option<SpeedOverride>,
}

impl EntityTurnState {
    pub fn new(speed_tier: SpeedTier, overrides: Option<SpeedOverride>) -> Self {
        Self {
            speed_tier,
            slot1: SlotState::default(),
            slot2: SlotState::default(),
            was_adjacent_after_slot1: false,
            turns_until_next_action: 0,
            overrides,
        }
    }

    pub const fn slot(&self, slot: Slot) -> &SlotState {
        match slot {
            Slot::First => &self.slot1,
            Slot::Second => &self.slot2,
        }
    }

    pub fn slot_mut(&mut self, slot: Slot) -> &mut SlotState {
        match slot {
            Slot::First => &mut self.slot1,
            Slot::Second => &mut self.slot2,
        }
    }

    /// Number of slots consumed this turn (never more than two).
    pub fn slots_acted(&self) -> usize {
        usize::from(self.slot1.acted()) + usize::from(self.slot2.acted())
    }
}

/// Per-turn flags, cleared at the start of every turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhaseEntityState {
    pub has_moved_this_phase: bool,
    pub has_acted_this_phase: bool,
    pub trap_triggered: bool,
}

impl PhaseEntityState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Everything the scheduler needs to start tracking an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntitySpec {
    pub entity: EntityRef,
    pub speed_tier: SpeedTier,
    pub overrides: Option<SpeedOverride>,
}

impl EntitySpec {
    pub const fn new(entity: EntityRef, speed_tier: SpeedTier) -> Self {
        Self {
            entity,
            speed_tier,
            overrides: None,
        }
    }

    pub const fn with_override(mut self, overrides: SpeedOverride) -> Self {
        self.overrides = Some(overrides);
        self
    }
}

/// Aggregate root for scheduling state.
///
/// `entity_states` and `phase_states` hold an entry for exactly the entities
/// in `turn_order`; [`TurnManager::track`] and [`TurnManager::untrack`] keep
/// the three in step. Iteration always follows `turn_order` so results never
/// depend on map ordering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnManager {
    pub current_turn: u64,
    pub turn_order: Vec<EntityRef>,
    pub current_phase_index: usize,
    pub entity_states: HashMap<EntityId, EntityTurnState>,
    pub phase_states: HashMap<EntityId, PhaseEntityState>,
}

impl TurnManager {
    pub const FIRST_TURN: u64 = 1;

    pub fn new() -> Self {
        Self {
            current_turn: Self::FIRST_TURN,
            turn_order: Vec::new(),
            current_phase_index: 0,
            entity_states: HashMap::new(),
            phase_states: HashMap::new(),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn is_tracked(&self, id: EntityId) -> bool {
        self.entity_states.contains_key(&id)
    }

    pub fn entity(&self, id: EntityId) -> Option<EntityRef> {
        self.turn_order.iter().copied().find(|entity| entity.id == id)
    }

    /// The first tracked player entity, if any.
    pub fn player(&self) -> Option<EntityRef> {
        self.turn_order
            .iter()
            .copied()
            .find(|entity| entity.faction == Faction::Player)
    }

    pub fn count(&self, faction: Faction) -> usize {
        self.turn_order
            .iter()
            .filter(|entity| entity.faction == faction)
            .count()
    }

    /// Starts tracking an entity. Returns false if it is already tracked.
    pub fn track(&mut self, entity: EntityRef, state: EntityTurnState) -> bool {
        if self.is_tracked(entity.id) {
            return false;
        }
        self.turn_order.push(entity);
        self.entity_states.insert(entity.id, state);
        self.phase_states
            .insert(entity.id, PhaseEntityState::default());
        true
    }

    /// Stops tracking an entity and drops both of its state records.
    pub fn untrack(&mut self, id: EntityId) -> Option<EntityRef> {
        let index = self.turn_order.iter().position(|entity| entity.id == id)?;
        let entity = self.turn_order.remove(index);
        self.entity_states.remove(&id);
        self.phase_states.remove(&id);
        Some(entity)
    }

    /// Player first, then allies, then hostiles; stable within a faction.
    pub fn sort_turn_order(&mut self) {
        self.turn_order
            .sort_by_key(|entity| entity.faction.order_rank());
    }

    pub fn reset_phase_states(&mut self) {
        for state in self.phase_states.values_mut() {
            state.reset();
        }
    }

    pub fn entity_state(&self, id: EntityId) -> Option<&EntityTurnState> {
        self.entity_states.get(&id)
    }

    pub fn entity_state_mut(&mut self, id: EntityId) -> Option<&mut EntityTurnState> {
        self.entity_states.get_mut(&id)
    }

    pub fn phase_state(&self, id: EntityId) -> Option<&PhaseEntityState> {
        self.phase_states.get(&id)
    }

    pub fn phase_state_mut(&mut self, id: EntityId) -> Option<&mut PhaseEntityState> {
        self.phase_states.get_mut(&id)
    }
}

impl Default for TurnManager {
    fn default() -> Self {
        Self::new()
    }
}
