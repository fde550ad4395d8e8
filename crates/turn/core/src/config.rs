//! Declarative turn-system configuration.
//!
//! Everything the scheduler needs to know about phase order, speed tiers,
//! end-of-turn processing, and natural spawning is supplied by the caller as a
//! [`TurnSystemConfig`]. The `Default` implementation reproduces the stock
//! dungeon rules.

use std::collections::HashSet;

use crate::error::ConfigError;
use crate::phase::{Phase, Slot};
use crate::state::SpeedTier;

/// Gate evaluated per entity before a phase dispatches it.
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
    serde(try_from = "String", into = "String")
)]
#[strum(serialize_all = "kebab-case")]
pub enum PhaseCondition {
    /// Only entities of the fast tier take part.
    FastEntitiesOnly,
    /// The phase runs only while the tracked player is fast.
    PlayerIsFast,
    /// Slow entities sit the phase out.
    ExcludeSlow,
    /// Attacks and item use are not dispatched (or accepted) in this phase.
    MovementOnly,
}

impl TryFrom<String> for PhaseCondition {
    type Error = ConfigError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse().map_err(|_| ConfigError::UnknownCondition(name))
    }
}

impl From<PhaseCondition> for String {
    fn from(condition: PhaseCondition) -> Self {
        condition.as_ref().to_owned()
    }
}

/// A phase plus the conditions gating its participants.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseConfig {
    pub phase: Phase,
    #[cfg_attr(feature = "serde", serde(default))]
    pub conditions: Vec<PhaseCondition>,
}

impl PhaseConfig {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            conditions: Vec::new(),
        }
    }

    pub fn with_condition(mut self, condition: PhaseCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn is_movement_only(&self) -> bool {
        self.conditions.contains(&PhaseCondition::MovementOnly)
    }
}

/// What a single action slot of a speed tier allows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ActionSlotConfig {
    pub enabled: bool,
    pub can_move: bool,
    pub can_attack: bool,
    pub can_use_item: bool,
    /// Suppress this slot when the entity ended its first slot next to an enemy.
    pub adjacency_skip_rule: bool,
    /// Turns to sit out between first-slot actions (slow tier only).
    pub skip_turns: u32,
}

impl ActionSlotConfig {
    pub const DISABLED: Self = Self {
        enabled: false,
        can_move: false,
        can_attack: false,
        can_use_item: false,
        adjacency_skip_rule: false,
        skip_turns: 0,
    };

    pub const FULL: Self = Self {
        enabled: true,
        can_move: true,
        can_attack: true,
        can_use_item: true,
        adjacency_skip_rule: false,
        skip_turns: 0,
    };

    pub const fn with_adjacency_skip(mut self) -> Self {
        self.adjacency_skip_rule = true;
        self
    }

    pub const fn with_skip_turns(mut self, turns: u32) -> Self {
        self.skip_turns = turns;
        self
    }
}

impl Default for ActionSlotConfig {
    fn default() -> Self {
        Self::DISABLED
    }
}

/// The two slot configurations of one speed tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TierSlots {
    pub slot1: ActionSlotConfig,
    pub slot2: ActionSlotConfig,
}

impl TierSlots {
    pub const fn new(slot1: ActionSlotConfig, slot2: ActionSlotConfig) -> Self {
        Self { slot1, slot2 }
    }

    pub const fn slot(&self, slot: Slot) -> &ActionSlotConfig {
        match slot {
            Slot::First => &self.slot1,
            Slot::Second => &self.slot2,
        }
    }
}

/// Per-tier slot tables. A missing tier is a configuration gap and resolves to
/// [`crate::engine::FALLBACK_SLOTS`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeedSystemConfig {
    pub slow: Option<TierSlots>,
    pub normal: Option<TierSlots>,
    pub fast: Option<TierSlots>,
}

impl SpeedSystemConfig {
    pub const DEFAULT_SLOW_SKIP_TURNS: u32 = 1;

    pub fn tier(&self, tier: SpeedTier) -> Option<&TierSlots> {
        match tier {
            SpeedTier::Slow => self.slow.as_ref(),
            SpeedTier::Normal => self.normal.as_ref(),
            SpeedTier::Fast => self.fast.as_ref(),
        }
    }

    pub fn set_tier(&mut self, tier: SpeedTier, slots: Option<TierSlots>) {
        match tier {
            SpeedTier::Slow => self.slow = slots,
            SpeedTier::Normal => self.normal = slots,
            SpeedTier::Fast => self.fast = slots,
        }
    }
}

impl Default for SpeedSystemConfig {
    fn default() -> Self {
        Self {
            slow: Some(TierSlots::new(
                ActionSlotConfig::FULL.with_skip_turns(Self::DEFAULT_SLOW_SKIP_TURNS),
                ActionSlotConfig::DISABLED,
            )),
            normal: Some(TierSlots::new(
                ActionSlotConfig::FULL,
                ActionSlotConfig::DISABLED,
            )),
            fast: Some(TierSlots::new(
                ActionSlotConfig::FULL,
                ActionSlotConfig::FULL.with_adjacency_skip(),
            )),
        }
    }
}

/// Post-turn effect run by the end-of-turn pipeline.
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
    serde(try_from = "String", into = "String")
)]
#[strum(serialize_all = "kebab-case")]
pub enum EndTurnProcess {
    DeathCheck,
    StatusRecovery,
    SlipDamage,
    HungerDecrease,
}

impl TryFrom<String> for EndTurnProcess {
    type Error = ConfigError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse().map_err(|_| ConfigError::UnknownEndTurnProcess(name))
    }
}

impl From<EndTurnProcess> for String {
    fn from(process: EndTurnProcess) -> Self {
        process.as_ref().to_owned()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EndTurnStep {
    pub process: EndTurnProcess,
    pub order: u32,
}

impl EndTurnStep {
    pub const fn new(process: EndTurnProcess, order: u32) -> Self {
        Self { process, order }
    }
}

/// One band of the cumulative spawn-count table.
///
/// Thresholds are expressed in per-mille so sampling stays in integer
/// arithmetic: a roll in `0..1000` selects the first band whose threshold
/// exceeds it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpawnCountBand {
    pub count: u32,
    pub cumulative_permille: u32,
}

impl SpawnCountBand {
    pub const fn new(count: u32, cumulative_permille: u32) -> Self {
        Self {
            count,
            cumulative_permille,
        }
    }
}

/// Natural-spawn tuning for the population controller.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct PopulationConfig {
    /// Spawning is considered on turns divisible by this value (0 disables it).
    pub spawn_interval: u64,
    /// No spawns while this many hostiles are tracked.
    pub population_cap: usize,
    /// Rooms already holding this many hostiles are skipped.
    pub room_capacity: usize,
    pub min_room_width: u32,
    pub min_room_height: u32,
    /// Tile picks per spawn unit before the unit is abandoned.
    pub max_tile_attempts: u32,
    pub spawn_count_table: Vec<SpawnCountBand>,
}

impl PopulationConfig {
    pub const DEFAULT_SPAWN_INTERVAL: u64 = 30;
    pub const DEFAULT_POPULATION_CAP: usize = 20;
    pub const DEFAULT_ROOM_CAPACITY: usize = 5;
    pub const DEFAULT_MIN_ROOM_SIZE: u32 = 3;
    pub const DEFAULT_MAX_TILE_ATTEMPTS: u32 = 10;

    /// P(2)=0.05, P(3)=0.20, P(4)=0.50, P(5)=0.20, P(6)=0.05.
    pub const DEFAULT_SPAWN_COUNT_TABLE: [SpawnCountBand; 5] = [
        SpawnCountBand::new(2, 50),
        SpawnCountBand::new(3, 250),
        SpawnCountBand::new(4, 750),
        SpawnCountBand::new(5, 950),
        SpawnCountBand::new(6, 1000),
    ];
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            spawn_interval: Self::DEFAULT_SPAWN_INTERVAL,
            population_cap: Self::DEFAULT_POPULATION_CAP,
            room_capacity: Self::DEFAULT_ROOM_CAPACITY,
            min_room_width: Self::DEFAULT_MIN_ROOM_SIZE,
            min_room_height: Self::DEFAULT_MIN_ROOM_SIZE,
            max_tile_attempts: Self::DEFAULT_MAX_TILE_ATTEMPTS,
            spawn_count_table: Self::DEFAULT_SPAWN_COUNT_TABLE.to_vec(),
        }
    }
}

/// Complete configuration consumed by [`crate::TurnScheduler`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct TurnSystemConfig {
    pub phases: Vec<PhaseConfig>,
    pub speed: SpeedSystemConfig,
    pub end_turn: Vec<EndTurnStep>,
    pub population: PopulationConfig,
}

impl TurnSystemConfig {
    pub fn default_phases() -> Vec<PhaseConfig> {
        Phase::DEFAULT_ORDER
            .iter()
            .map(|&phase| {
                let config = PhaseConfig::new(phase);
                match phase {
                    Phase::PlayerAction(Slot::Second) => {
                        config.with_condition(PhaseCondition::PlayerIsFast)
                    }
                    Phase::EnemyAction(Slot::Second) | Phase::AllyAction(Slot::Second) => {
                        config.with_condition(PhaseCondition::FastEntitiesOnly)
                    }
                    _ => config,
                }
            })
            .collect()
    }

    pub fn default_end_turn() -> Vec<EndTurnStep> {
        vec![
            EndTurnStep::new(EndTurnProcess::DeathCheck, 1),
            EndTurnStep::new(EndTurnProcess::StatusRecovery, 2),
            EndTurnStep::new(EndTurnProcess::SlipDamage, 3),
            EndTurnStep::new(EndTurnProcess::HungerDecrease, 4),
        ]
    }

    pub fn with_phases(mut self, phases: Vec<PhaseConfig>) -> Self {
        self.phases = phases;
        self
    }

    pub fn with_end_turn(mut self, steps: Vec<EndTurnStep>) -> Self {
        self.end_turn = steps;
        self
    }

    pub fn with_population(mut self, population: PopulationConfig) -> Self {
        self.population = population;
        self
    }

    /// End-turn steps in ascending `order`, independent of declaration order.
    pub fn sorted_end_turn(&self) -> Vec<EndTurnStep> {
        let mut steps = self.end_turn.clone();
        steps.sort_by_key(|step| step.order);
        steps
    }

    pub fn phase(&self, index: usize) -> Option<&PhaseConfig> {
        self.phases.get(index)
    }

    /// Checks structural invariants the scheduler relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an empty phase list, a repeated phase, or a
    /// repeated end-turn `order` value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.phases.is_empty() {
            return Err(ConfigError::EmptyPhaseList);
        }

        let mut phases = HashSet::new();
        for config in &self.phases {
            if !phases.insert(config.phase) {
                return Err(ConfigError::DuplicatePhase {
                    phase: config.phase,
                });
            }
        }

        let mut orders = HashSet::new();
        for step in &self.end_turn {
            if !orders.insert(step.order) {
                return Err(ConfigError::DuplicateEndTurnOrder { order: step.order });
            }
        }

        Ok(())
    }
}

impl Default for TurnSystemConfig {
    fn default() -> Self {
        Self {
            phases: Self::default_phases(),
            speed: SpeedSystemConfig::default(),
            end_turn: Self::default_end_turn(),
            population: PopulationConfig::default(),
        }
    }
}
