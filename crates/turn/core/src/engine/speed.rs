//! Speed tiers and the two-slot action economy.
//!
//! Slot eligibility is a pure function of the tier's slot config, the entity's
//! override, the slow-tier cooldown, and whether slot 1 ended next to an enemy.
//! The policy never mutates on its own; the scheduler commits its answers at
//! well-defined points (tracking, end of slot 1, end of turn).

use tracing::warn;

use crate::action::ActionKind;
use crate::config::{ActionSlotConfig, SpeedSystemConfig, TierSlots};
use crate::phase::Slot;
use crate::state::{EntitySpec, EntityTurnState, SpeedTier};

/// Slots used when a tier has no configuration entry: first slot fully
/// enabled, second slot disabled.
pub static FALLBACK_SLOTS: TierSlots =
    TierSlots::new(ActionSlotConfig::FULL, ActionSlotConfig::DISABLED);

#[derive(Clone, Copy, Debug)]
pub struct SpeedTierPolicy<'a> {
    config: &'a SpeedSystemConfig,
}

impl<'a> SpeedTierPolicy<'a> {
    pub fn new(config: &'a SpeedSystemConfig) -> Self {
        Self { config }
    }

    /// Slot table for a tier, falling back to [`FALLBACK_SLOTS`] on a gap.
    pub fn tier_slots(&self, tier: SpeedTier) -> &'a TierSlots {
        self.config.tier(tier).unwrap_or(&FALLBACK_SLOTS)
    }

    pub fn slot_config(&self, tier: SpeedTier, slot: Slot) -> &'a ActionSlotConfig {
        self.tier_slots(tier).slot(slot)
    }

    /// Whether the slot can be used at all this turn, ignoring action kind and
    /// whether it has already been consumed.
    pub fn is_eligible(&self, state: &EntityTurnState, slot: Slot) -> bool {
        let config = self.slot_config(state.speed_tier, slot);
        let enabled = state
            .overrides
            .as_ref()
            .and_then(|overrides| overrides.slot(slot).enabled)
            .unwrap_or(config.enabled);

        if !enabled {
            return false;
        }

        match slot {
            Slot::First => {
                state.speed_tier != SpeedTier::Slow || state.turns_until_next_action == 0
            }
            Slot::Second => !(config.adjacency_skip_rule && state.was_adjacent_after_slot1),
        }
    }

    /// Whether the slot's config (or the entity override) allows this kind.
    pub fn permits(&self, state: &EntityTurnState, slot: Slot, kind: ActionKind) -> bool {
        let config = self.slot_config(state.speed_tier, slot);
        let overrides = state.overrides.as_ref().map(|o| *o.slot(slot));

        match kind {
            ActionKind::Move => overrides
                .and_then(|o| o.can_move)
                .unwrap_or(config.can_move),
            ActionKind::Attack => overrides
                .and_then(|o| o.can_attack)
                .unwrap_or(config.can_attack),
            ActionKind::UseItem => overrides
                .and_then(|o| o.can_use_item)
                .unwrap_or(config.can_use_item),
            ActionKind::Wait => true,
        }
    }

    /// Full query: eligible, not yet consumed, and the kind is allowed.
    pub fn can_act(&self, state: &EntityTurnState, slot: Slot, kind: ActionKind) -> bool {
        !state.slot(slot).acted() && self.is_eligible(state, slot) && self.permits(state, slot, kind)
    }

    /// Builds the state for a newly tracked entity. Slow entities start with
    /// the first slot on cooldown for the configured number of turns.
    pub fn initial_state(&self, spec: &EntitySpec) -> EntityTurnState {
        if self.config.tier(spec.speed_tier).is_none() {
            warn!(
                entity = %spec.entity.id,
                tier = %spec.speed_tier,
                "speed tier has no slot configuration; using permissive defaults"
            );
        }

        let mut state = EntityTurnState::new(spec.speed_tier, spec.overrides);
        if spec.speed_tier == SpeedTier::Slow {
            state.turns_until_next_action = self.slot_config(SpeedTier::Slow, Slot::First).skip_turns;
        }
        self.refresh(&mut state);
        state
    }

    /// Re-snapshots `can_act` for both slots.
    pub fn refresh(&self, state: &mut EntityTurnState) {
        state.slot1.can_act = self.is_eligible(state, Slot::First);
        state.slot2.can_act = self.is_eligible(state, Slot::Second);
    }

    /// Records where slot 1 left the entity and re-evaluates slot 2.
    pub fn commit_slot1(&self, state: &mut EntityTurnState, adjacent_to_enemy: bool) {
        state.was_adjacent_after_slot1 = adjacent_to_enemy;
        state.slot2.can_act = self.is_eligible(state, Slot::Second);
    }

    /// Rolls an entity over to the next turn.
    ///
    /// The slow cooldown ticks once per completed turn whether or not the
    /// entity acted: a turn on which the slot was open re-arms it with the
    /// configured skip count.
    pub fn advance_turn(&self, state: &mut EntityTurnState) {
        if state.speed_tier == SpeedTier::Slow {
            state.turns_until_next_action = match state.turns_until_next_action {
                0 => self.slot_config(SpeedTier::Slow, Slot::First).skip_turns,
                remaining => remaining - 1,
            };
        }

        state.slot1.actions = Default::default();
        state.slot2.actions = Default::default();
        state.was_adjacent_after_slot1 = false;
        self.refresh(state);
    }
}
