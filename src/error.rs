//! Rejections surfaced by the battle engine.
//!
//! None of these are fatal: the battle is left exactly as it was and the
//! caller may inspect [`crate::state::BattleState::phase`] and resubmit.

use crate::combatant::CombatantId;
use crate::state::TurnPhase;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("the battle is over")]
    BattleOver,

    #[error("action not allowed while {phase:?}; a switch is required")]
    WrongPhase { phase: TurnPhase },

    #[error("no combatant {0:?} on the player's roster")]
    UnknownCombatant(CombatantId),

    #[error("combatant {0:?} is already active")]
    AlreadyActive(CombatantId),

    #[error("combatant {0:?} has fainted")]
    Fainted(CombatantId),

    #[error("move slot {index} does not exist (combatants carry {slots} moves)")]
    UnknownMove { index: usize, slots: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartError {
    #[error("the player roster is empty")]
    EmptyPlayerRoster,

    #[error("the opponent roster is empty")]
    EmptyOpponentRoster,
}
