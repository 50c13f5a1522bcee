//! Single-turn resolution: action ordering, attacks, faints and forced switches.

use crate::combatant::{Move, MOVE_SLOTS};
use crate::damage::roll_damage;
use crate::error::ActionError;
use crate::state::{BattleOutcome, BattleState, PlayerAction, Side, TurnPhase};
use crate::types::Effectiveness;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

/// Everything that happened during one call to [`resolve_turn`], in order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum BattleEvent {
    Switched {
        side: Side,
        name: String,
        forced: bool,
    },
    SentOut {
        side: Side,
        name: String,
    },
    MoveUsed {
        side: Side,
        user: String,
        move_name: String,
    },
    Missed {
        side: Side,
        user: String,
    },
    Hit {
        side: Side,
        target: String,
        damage: u32,
        remaining: u32,
        /// `None` for non-damaging moves.
        effectiveness: Option<Effectiveness>,
    },
    Fainted {
        side: Side,
        name: String,
    },
    ForcedSwitchRequired,
    BattleEnded {
        outcome: BattleOutcome,
    },
}

/// A player action that passed [`validate`], with the switch target resolved
/// to a roster index.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ValidatedAction {
    UseMove(usize),
    Switch(usize),
}

#[derive(Copy, Clone, Debug)]
struct QueuedAction {
    side: Side,
    // roster slot of the combatant that queued the action
    slot: usize,
    intent: ValidatedAction,
}

/// Checks `action` against the current phase and roster without touching state.
pub fn validate(state: &BattleState, action: &PlayerAction) -> Result<ValidatedAction, ActionError> {
    match state.phase {
        TurnPhase::Ended => return Err(ActionError::BattleOver),
        TurnPhase::Resolving => return Err(ActionError::WrongPhase { phase: state.phase }),
        TurnPhase::AwaitingForcedSwitch if matches!(action, PlayerAction::UseMove(_)) => {
            return Err(ActionError::WrongPhase { phase: state.phase })
        }
        TurnPhase::AwaitingForcedSwitch | TurnPhase::AwaitingPlayerInput => {}
    }
    match *action {
        PlayerAction::UseMove(index) if index >= MOVE_SLOTS => Err(ActionError::UnknownMove {
            index,
            slots: MOVE_SLOTS,
        }),
        PlayerAction::UseMove(index) => Ok(ValidatedAction::UseMove(index)),
        PlayerAction::Switch(id) => {
            let idx = state
                .player_roster
                .iter()
                .position(|c| c.id == id)
                .ok_or(ActionError::UnknownCombatant(id))?;
            if state.player_roster[idx].is_fainted() {
                return Err(ActionError::Fainted(id));
            }
            if idx == state.player_active {
                return Err(ActionError::AlreadyActive(id));
            }
            Ok(ValidatedAction::Switch(idx))
        }
    }
}

/// Resolves one player action. A rejected action leaves `state` untouched.
pub fn resolve_turn<R: Rng + ?Sized>(
    state: &mut BattleState,
    action: PlayerAction,
    rng: &mut R,
) -> Result<Vec<BattleEvent>, ActionError> {
    let validated = validate(state, &action)?;
    let mut events = Vec::new();

    if state.phase == TurnPhase::AwaitingForcedSwitch {
        // validate() only lets switches through here
        if let ValidatedAction::Switch(idx) = validated {
            state.set_active_index(Side::Player, idx);
            events.push(BattleEvent::Switched {
                side: Side::Player,
                name: state.player_active().name.clone(),
                forced: true,
            });
            state.phase = TurnPhase::AwaitingPlayerInput;
        }
        return Ok(events);
    }

    state.phase = TurnPhase::Resolving;
    state.turn = state.turn.saturating_add(1);

    let player = QueuedAction {
        side: Side::Player,
        slot: state.player_active,
        intent: validated,
    };
    let opponent = QueuedAction {
        side: Side::Opponent,
        slot: state.opponent_active,
        intent: ValidatedAction::UseMove(rng.gen_range(0..MOVE_SLOTS)),
    };

    let order = if player_moves_first(state, &player) {
        [player, opponent]
    } else {
        [opponent, player]
    };
    debug!(turn = state.turn, first = ?order[0].side, "resolving turn");

    for queued in order {
        if state.active_index(queued.side) != queued.slot
            || state.roster(queued.side)[queued.slot].is_fainted()
        {
            debug!(side = ?queued.side, slot = queued.slot, "queued actor no longer able to act");
            continue;
        }
        match queued.intent {
            ValidatedAction::Switch(idx) => {
                state.set_active_index(queued.side, idx);
                events.push(BattleEvent::Switched {
                    side: queued.side,
                    name: state.active(queued.side).name.clone(),
                    forced: false,
                });
            }
            ValidatedAction::UseMove(move_index) => {
                let Some(fainted_side) = execute_attack(state, queued.side, move_index, rng, &mut events)
                else {
                    continue;
                };
                if handle_faint(state, fainted_side, &mut events) {
                    return Ok(events);
                }
            }
        }
    }

    state.phase = TurnPhase::AwaitingPlayerInput;
    Ok(events)
}

fn player_moves_first(state: &BattleState, player: &QueuedAction) -> bool {
    match player.intent {
        ValidatedAction::Switch(_) => true,
        // speed ties go to the player
        ValidatedAction::UseMove(_) => {
            state.player_active().stats.speed >= state.opponent_active().stats.speed
        }
    }
}

pub fn roll_accuracy<R: Rng + ?Sized>(move_def: &Move, rng: &mut R) -> bool {
    if move_def.accuracy >= 100 {
        return true;
    }
    let roll: f64 = rng.gen_range(0.0..100.0);
    roll < move_def.accuracy as f64
}

/// Returns the side whose active combatant fainted from this attack, if any.
fn execute_attack<R: Rng + ?Sized>(
    state: &mut BattleState,
    side: Side,
    move_index: usize,
    rng: &mut R,
    events: &mut Vec<BattleEvent>,
) -> Option<Side> {
    let attacker = state.active(side).clone();
    let move_def = &attacker.moves[move_index];
    events.push(BattleEvent::MoveUsed {
        side,
        user: attacker.name.clone(),
        move_name: move_def.name.clone(),
    });
    if !roll_accuracy(move_def, rng) {
        events.push(BattleEvent::Missed {
            side,
            user: attacker.name.clone(),
        });
        return None;
    }

    let defending = side.opponent();
    let roll = roll_damage(&attacker, state.active(defending), move_def, rng);
    let target = state.active_mut(defending);
    let fainted = target.take_damage(roll.damage);
    debug!(
        attacker = %attacker.name,
        target = %target.name,
        damage = roll.damage,
        multiplier = roll.type_multiplier,
        "attack landed"
    );
    events.push(BattleEvent::Hit {
        side: defending,
        target: target.name.clone(),
        damage: roll.damage,
        remaining: target.current_health,
        effectiveness: move_def
            .is_damaging()
            .then(|| Effectiveness::from_multiplier(roll.type_multiplier)),
    });
    if fainted {
        events.push(BattleEvent::Fainted {
            side: defending,
            name: target.name.clone(),
        });
        return Some(defending);
    }
    None
}

/// Applies the faint cascade for `side`. Returns true when resolution must stop.
fn handle_faint(state: &mut BattleState, side: Side, events: &mut Vec<BattleEvent>) -> bool {
    let Some(next) = state.next_standing(side) else {
        let outcome = match side {
            Side::Opponent => BattleOutcome::Victory,
            Side::Player => BattleOutcome::Defeat,
        };
        state.outcome = outcome;
        state.phase = TurnPhase::Ended;
        events.push(BattleEvent::BattleEnded { outcome });
        return true;
    };
    match side {
        Side::Opponent => {
            state.set_active_index(Side::Opponent, next);
            events.push(BattleEvent::SentOut {
                side,
                name: state.opponent_active().name.clone(),
            });
            false
        }
        Side::Player => {
            state.phase = TurnPhase::AwaitingForcedSwitch;
            events.push(BattleEvent::ForcedSwitchRequired);
            true
        }
    }
}
