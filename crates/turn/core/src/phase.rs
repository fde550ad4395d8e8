//! Closed vocabulary of turn phases.
//!
//! Configuration files name phases with kebab-case strings such as
//! `enemy-action-1`; they are parsed once into [`Phase`] so every handler
//! match is checked for exhaustiveness at compile time.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::state::Faction;

/// One of the two action opportunities an entity gets per turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    First,
    Second,
}

impl Slot {
    pub const fn number(self) -> u8 {
        match self {
            Slot::First => 1,
            Slot::Second => 2,
        }
    }

    pub const fn from_number(number: u8) -> Option<Slot> {
        match number {
            1 => Some(Slot::First),
            2 => Some(Slot::Second),
            _ => None,
        }
    }
}

/// A named stage of a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum Phase {
    TurnStart,
    PlayerAction(Slot),
    EnemyAction(Slot),
    AllyAction(Slot),
    TrapProcessing(Slot),
    EndTurnRecovery,
    EndTurn,
}

impl Phase {
    /// Phase order used unless the configuration overrides it.
    pub const DEFAULT_ORDER: [Phase; 11] = [
        Phase::TurnStart,
        Phase::PlayerAction(Slot::First),
        Phase::EnemyAction(Slot::First),
        Phase::AllyAction(Slot::First),
        Phase::TrapProcessing(Slot::First),
        Phase::PlayerAction(Slot::Second),
        Phase::EnemyAction(Slot::Second),
        Phase::AllyAction(Slot::Second),
        Phase::TrapProcessing(Slot::Second),
        Phase::EndTurnRecovery,
        Phase::EndTurn,
    ];

    /// Faction addressed by this phase; `None` means every faction.
    pub const fn faction(self) -> Option<Faction> {
        match self {
            Phase::PlayerAction(_) => Some(Faction::Player),
            Phase::EnemyAction(_) => Some(Faction::Hostile),
            Phase::AllyAction(_) => Some(Faction::Ally),
            Phase::TurnStart
            | Phase::TrapProcessing(_)
            | Phase::EndTurnRecovery
            | Phase::EndTurn => None,
        }
    }

    /// Action slot consumed by this phase, for phases that dispatch actions.
    pub const fn action_slot(self) -> Option<Slot> {
        match self {
            Phase::PlayerAction(slot) | Phase::EnemyAction(slot) | Phase::AllyAction(slot) => {
                Some(slot)
            }
            Phase::TurnStart
            | Phase::TrapProcessing(_)
            | Phase::EndTurnRecovery
            | Phase::EndTurn => None,
        }
    }

    pub const fn dispatches_actions(self) -> bool {
        self.action_slot().is_some()
    }

    pub const fn is_hostile_phase(self) -> bool {
        matches!(self, Phase::EnemyAction(_))
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::TurnStart => f.write_str("turn-start"),
            Phase::PlayerAction(slot) => write!(f, "player-action-{}", slot.number()),
            Phase::EnemyAction(slot) => write!(f, "enemy-action-{}", slot.number()),
            Phase::AllyAction(slot) => write!(f, "ally-action-{}", slot.number()),
            Phase::TrapProcessing(slot) => write!(f, "trap-processing-{}", slot.number()),
            Phase::EndTurnRecovery => f.write_str("end-turn-recovery"),
            Phase::EndTurn => f.write_str("end-turn"),
        }
    }
}

impl FromStr for Phase {
    type Err = ConfigError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "turn-start" => return Ok(Phase::TurnStart),
            "end-turn-recovery" => return Ok(Phase::EndTurnRecovery),
            "end-turn" => return Ok(Phase::EndTurn),
            _ => {}
        }

        let unknown = || ConfigError::UnknownPhase(name.to_owned());
        let (stem, number) = name.rsplit_once('-').ok_or_else(unknown)?;
        let slot = number
            .parse::<u8>()
            .ok()
            .and_then(Slot::from_number)
            .ok_or_else(unknown)?;

        match stem {
            "player-action" => Ok(Phase::PlayerAction(slot)),
            "enemy-action" => Ok(Phase::EnemyAction(slot)),
            "ally-action" => Ok(Phase::AllyAction(slot)),
            "trap-processing" => Ok(Phase::TrapProcessing(slot)),
            _ => Err(unknown()),
        }
    }
}

impl TryFrom<String> for Phase {
    type Error = ConfigError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl From<Phase> for String {
    fn from(phase: Phase) -> Self {
        phase.to_string()
    }
}
