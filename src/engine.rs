//! Step-based battle engine driven one player action at a time.
//!
//! The main entry point is [`Battle`]. It owns the single [`BattleState`] of a
//! battle and hands each submitted action to [`crate::resolver`]. Resulting
//! events are narrated into the bounded battle log.

use crate::advice::{AdviceRequest, Coach, Recommendation};
use crate::combatant::{normalize, Combatant, CombatantId};
use crate::error::{ActionError, StartError};
use crate::log::{BattleLog, DEFAULT_LOG_RETENTION};
use crate::model::CreatureRecord;
use crate::resolver::{resolve_turn, BattleEvent};
use crate::state::{BattleOutcome, BattleState, PlayerAction, Side, TurnPhase};
use crate::types::Effectiveness;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

pub const START_MESSAGE: &str = "The battle begins!";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BattleOptions {
    /// How many narrated lines the log keeps.
    pub log_retention: usize,
}

impl Default for BattleOptions {
    fn default() -> Self {
        BattleOptions {
            log_retention: DEFAULT_LOG_RETENTION,
        }
    }
}

type VictoryHook = Box<dyn FnMut(&BattleState) + Send>;

pub struct Battle<R = SmallRng> {
    state: BattleState,
    // shared by the damage roll, the accuracy check and the opponent's move choice
    rng: R,
    last_events: Vec<BattleEvent>,
    on_victory: Option<VictoryHook>,
}

impl Battle<SmallRng> {
    /// Starts a battle with default options and a seeded generator.
    pub fn start(
        player: &[CreatureRecord],
        opponent: &[CreatureRecord],
        seed: u64,
    ) -> Result<Self, StartError> {
        Battle::start_with(
            player,
            opponent,
            &BattleOptions::default(),
            SmallRng::seed_from_u64(seed),
        )
    }
}

impl<R: Rng> Battle<R> {
    pub fn start_with(
        player: &[CreatureRecord],
        opponent: &[CreatureRecord],
        options: &BattleOptions,
        rng: R,
    ) -> Result<Self, StartError> {
        if player.is_empty() {
            return Err(StartError::EmptyPlayerRoster);
        }
        if opponent.is_empty() {
            return Err(StartError::EmptyOpponentRoster);
        }
        let mut state = BattleState {
            player_roster: build_roster(Side::Player, player),
            opponent_roster: build_roster(Side::Opponent, opponent),
            player_active: 0,
            opponent_active: 0,
            phase: TurnPhase::AwaitingPlayerInput,
            outcome: BattleOutcome::Undecided,
            turn: 0,
            log: BattleLog::new(options.log_retention),
        };
        // fresh combatants always stand, so both sides have someone to send out
        state.player_active = state.next_standing(Side::Player).unwrap_or(0);
        state.opponent_active = state.next_standing(Side::Opponent).unwrap_or(0);
        state.log.push(START_MESSAGE);
        info!(
            player = %state.player_active().name,
            opponent = %state.opponent_active().name,
            player_roster = state.player_roster.len(),
            opponent_roster = state.opponent_roster.len(),
            "battle started"
        );

        Ok(Battle {
            state,
            rng,
            last_events: Vec::new(),
            on_victory: None,
        })
    }

    /// Registers the hook invoked once, when the outcome becomes a victory.
    pub fn on_victory(&mut self, hook: impl FnMut(&BattleState) + Send + 'static) {
        self.on_victory = Some(Box::new(hook));
    }

    pub fn submit_action(&mut self, action: PlayerAction) -> Result<&BattleState, ActionError> {
        let events = match resolve_turn(&mut self.state, action, &mut self.rng) {
            Ok(events) => events,
            Err(err) => {
                debug!(?action, phase = ?self.state.phase, %err, "action rejected");
                return Err(err);
            }
        };

        for event in &events {
            if let Some(line) = narrate(event) {
                self.state.log.push(line);
            }
        }
        if self.state.is_over() {
            info!(outcome = ?self.state.outcome, turns = self.state.turn, "battle ended");
            if self.state.outcome == BattleOutcome::Victory {
                if let Some(hook) = self.on_victory.as_mut() {
                    hook(&self.state);
                }
            }
        }
        self.last_events = events;
        Ok(&self.state)
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    /// Events produced by the most recent accepted action, for callers that
    /// pace their presentation step by step.
    pub fn last_events(&self) -> &[BattleEvent] {
        &self.last_events
    }

    /// Asks an external coach for a move suggestion for the current matchup.
    pub fn request_advice(&self, coach: &dyn Coach) -> Result<Recommendation, ActionError> {
        match self.state.phase {
            TurnPhase::AwaitingPlayerInput => {}
            TurnPhase::Ended => return Err(ActionError::BattleOver),
            phase => return Err(ActionError::WrongPhase { phase }),
        }
        Ok(AdviceRequest::from_state(&self.state).consult(coach))
    }

    pub fn into_state(self) -> BattleState {
        self.state
    }
}

/// Normalizes a roster and makes every [`CombatantId`] in it unique. The first
/// member carrying a record id keeps it; later repeats (including records
/// that had no id at all) get fresh ids above the roster's largest.
fn build_roster(side: Side, records: &[CreatureRecord]) -> Vec<Combatant> {
    let mut roster: Vec<Combatant> = records.iter().map(normalize).collect();
    let mut next_free = roster.iter().map(|c| c.record_id).max().unwrap_or(0);
    let mut seen = HashSet::new();
    for combatant in &mut roster {
        if !seen.insert(combatant.id) {
            next_free += 1;
            let reassigned = CombatantId(next_free);
            warn!(
                ?side,
                record_id = combatant.record_id,
                id = next_free,
                name = %combatant.name,
                "repeated creature id; assigned a battle id"
            );
            combatant.id = reassigned;
            seen.insert(reassigned);
        }
    }
    roster
}

pub fn narrate(event: &BattleEvent) -> Option<String> {
    let line = match event {
        BattleEvent::MoveUsed { user, move_name, .. } => format!("{user} used {move_name}!"),
        BattleEvent::Missed { user, .. } => format!("{user}'s attack missed!"),
        BattleEvent::Hit {
            target,
            effectiveness,
            ..
        } => match effectiveness {
            Some(Effectiveness::SuperEffective) => "It's super effective!".to_string(),
            Some(Effectiveness::NotVeryEffective) => "It's not very effective...".to_string(),
            Some(Effectiveness::Immune) => format!("It doesn't affect {target}..."),
            Some(Effectiveness::Neutral) | None => return None,
        },
        BattleEvent::Fainted { name, .. } => format!("{name} fainted!"),
        BattleEvent::SentOut { name, .. } => format!("Opponent sent out {name}!"),
        BattleEvent::Switched {
            name, forced: true, ..
        } => format!("Go, {name}!"),
        BattleEvent::Switched { name, .. } => format!("You switched to {name}!"),
        BattleEvent::ForcedSwitchRequired => return None,
        BattleEvent::BattleEnded { outcome } => match outcome {
            BattleOutcome::Victory => "Victory! The opposing squad has been defeated.".to_string(),
            BattleOutcome::Defeat => "Defeat... Your squad can no longer fight.".to_string(),
            BattleOutcome::Undecided => return None,
        },
    };
    Some(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narration_covers_effectiveness_qualifiers() {
        let hit = |effectiveness| BattleEvent::Hit {
            side: Side::Opponent,
            target: "Pebble".into(),
            damage: 10,
            remaining: 5,
            effectiveness,
        };
        assert_eq!(
            narrate(&hit(Some(Effectiveness::SuperEffective))).as_deref(),
            Some("It's super effective!")
        );
        assert_eq!(
            narrate(&hit(Some(Effectiveness::Immune))).as_deref(),
            Some("It doesn't affect Pebble...")
        );
        assert_eq!(narrate(&hit(Some(Effectiveness::Neutral))), None);
        assert_eq!(narrate(&hit(None)), None);
    }

    #[test]
    fn narration_distinguishes_switch_kinds() {
        let voluntary = BattleEvent::Switched {
            side: Side::Player,
            name: "Fern".into(),
            forced: false,
        };
        let forced = BattleEvent::Switched {
            side: Side::Player,
            name: "Fern".into(),
            forced: true,
        };
        assert_eq!(narrate(&voluntary).as_deref(), Some("You switched to Fern!"));
        assert_eq!(narrate(&forced).as_deref(), Some("Go, Fern!"));
    }

    #[test]
    fn repeated_record_ids_get_unique_battle_ids() {
        let records = [
            CreatureRecord::named(0, "A"),
            CreatureRecord::named(0, "B"),
            CreatureRecord::named(7, "C"),
            CreatureRecord::named(7, "D"),
        ];
        let roster = build_roster(Side::Player, &records);
        let ids: Vec<i64> = roster.iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![0, 8, 7, 9]);
        let record_ids: Vec<i64> = roster.iter().map(|c| c.record_id).collect();
        assert_eq!(record_ids, vec![0, 0, 7, 7]);
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let opts: BattleOptions = serde_json::from_str("{}").expect("json");
        assert_eq!(opts, BattleOptions::default());
        let opts: BattleOptions = serde_json::from_str(r#"{"log_retention": 4}"#).expect("json");
        assert_eq!(opts.log_retention, 4);
    }
}
