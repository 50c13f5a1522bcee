//! Headless battles: an auto-pilot plays the player's side to completion.

use crate::combatant::MOVE_SLOTS;
use crate::damage::expected_damage;
use crate::engine::{Battle, BattleOptions};
use crate::error::StartError;
use crate::model::CreatureRecord;
use crate::state::{BattleOutcome, BattleState, PlayerAction, Side, TurnPhase};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

// Decorrelates the auto-pilot's draws from the engine's own generator.
const POLICY_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BattlePolicy {
    /// Uniform choice among the four move slots, like the opponent AI.
    Random,
    /// Highest expected damage against the current opponent.
    Greedy,
}

#[derive(Clone, Debug)]
pub struct SimulationOptions {
    pub policy: BattlePolicy,
    pub battle: BattleOptions,
    /// Safety cap on submitted actions, e.g. for squads of zero-power moves.
    pub max_turns: u32,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        SimulationOptions {
            policy: BattlePolicy::Random,
            battle: BattleOptions::default(),
            max_turns: 500,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SimulationResult {
    PlayerWins,
    OpponentWins,
    Stalemate,
}

/// Picks the auto-pilot's next action, or `None` once the battle is over.
pub fn choose_action<R: Rng + ?Sized>(
    state: &BattleState,
    policy: BattlePolicy,
    rng: &mut R,
) -> Option<PlayerAction> {
    match state.phase {
        TurnPhase::Ended | TurnPhase::Resolving => None,
        TurnPhase::AwaitingForcedSwitch => state
            .player_roster
            .iter()
            .enumerate()
            .find(|(idx, c)| *idx != state.player_active && !c.is_fainted())
            .map(|(_, c)| PlayerAction::Switch(c.id)),
        TurnPhase::AwaitingPlayerInput => Some(PlayerAction::UseMove(match policy {
            BattlePolicy::Random => rng.gen_range(0..MOVE_SLOTS),
            BattlePolicy::Greedy => greedy_move(state),
        })),
    }
}

fn greedy_move(state: &BattleState) -> usize {
    let attacker = state.active(Side::Player);
    let defender = state.active(Side::Opponent);
    let mut best = 0;
    let mut best_score = f64::MIN;
    for (idx, mv) in attacker.moves.iter().enumerate() {
        let score = expected_damage(attacker, defender, mv);
        if score > best_score {
            best = idx;
            best_score = score;
        }
    }
    best
}

pub fn simulate_battle(
    player: &[CreatureRecord],
    opponent: &[CreatureRecord],
    seed: u64,
    options: &SimulationOptions,
) -> Result<SimulationResult, StartError> {
    let mut battle = Battle::start_with(
        player,
        opponent,
        &options.battle,
        SmallRng::seed_from_u64(seed),
    )?;
    let mut policy_rng = SmallRng::seed_from_u64(seed ^ POLICY_SEED_SALT);

    for _ in 0..options.max_turns {
        let Some(action) = choose_action(battle.state(), options.policy, &mut policy_rng) else {
            break;
        };
        if let Err(err) = battle.submit_action(action) {
            warn!(%err, ?action, "auto-pilot produced an invalid action");
            return Ok(SimulationResult::Stalemate);
        }
    }

    Ok(match battle.state().outcome {
        BattleOutcome::Victory => SimulationResult::PlayerWins,
        BattleOutcome::Defeat => SimulationResult::OpponentWins,
        BattleOutcome::Undecided => SimulationResult::Stalemate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::normalize;
    use serde_json::json;

    fn record(id: i64, value: serde_json::Value) -> CreatureRecord {
        let mut record: CreatureRecord = serde_json::from_value(value).expect("record json");
        record.id = id;
        record
    }

    #[test]
    fn greedy_prefers_super_effective_move() {
        let player = record(
            1,
            json!({
                "name": "Tidal",
                "types": ["Water"],
                "attacks": [
                    { "name": "Tackle", "type": "Normal", "category": "Physical", "power": 40, "accuracy": 100 },
                    { "name": "Surf", "type": "Water", "category": "Special", "power": 90, "accuracy": 100 }
                ]
            }),
        );
        let opponent = record(2, json!({ "name": "Kindle", "types": ["Fire"] }));
        let battle = Battle::start(&[player], &[opponent], 0).expect("start");
        let mut rng = SmallRng::seed_from_u64(0);
        assert_eq!(
            choose_action(battle.state(), BattlePolicy::Greedy, &mut rng),
            Some(PlayerAction::UseMove(1))
        );
    }

    #[test]
    fn forced_switch_picks_first_standing_member() {
        let mut state = Battle::start(
            &[
                CreatureRecord::named(1, "A"),
                CreatureRecord::named(2, "B"),
                CreatureRecord::named(3, "C"),
            ],
            &[CreatureRecord::named(9, "Z")],
            0,
        )
        .expect("start")
        .into_state();
        state.player_roster[0].current_health = 0;
        state.player_roster[1].current_health = 0;
        state.phase = TurnPhase::AwaitingForcedSwitch;
        let mut rng = SmallRng::seed_from_u64(0);
        assert_eq!(
            choose_action(&state, BattlePolicy::Random, &mut rng),
            Some(PlayerAction::Switch(normalize(&CreatureRecord::named(3, "C")).id))
        );
    }

    #[test]
    fn same_seed_same_result() {
        let squad: Vec<CreatureRecord> = (1..=3).map(|i| CreatureRecord::named(i, format!("P{i}"))).collect();
        let foes: Vec<CreatureRecord> = (4..=6).map(|i| CreatureRecord::named(i, format!("O{i}"))).collect();
        let opts = SimulationOptions::default();
        let first = simulate_battle(&squad, &foes, 1234, &opts).expect("start");
        let second = simulate_battle(&squad, &foes, 1234, &opts).expect("start");
        assert_eq!(first, second);
        assert_ne!(first, SimulationResult::Stalemate);
    }

    #[test]
    fn zero_power_squads_stalemate() {
        let inert = json!({
            "name": "Pacifist",
            "attacks": [
                { "name": "Growl", "category": "Status", "power": 0 },
                { "name": "Growl", "category": "Status", "power": 0 },
                { "name": "Growl", "category": "Status", "power": 0 },
                { "name": "Growl", "category": "Status", "power": 0 }
            ]
        });
        let opts = SimulationOptions {
            max_turns: 25,
            ..SimulationOptions::default()
        };
        let result = simulate_battle(&[record(1, inert.clone())], &[record(2, inert)], 5, &opts);
        assert_eq!(result, Ok(SimulationResult::Stalemate));
    }

    #[test]
    fn empty_rosters_are_rejected() {
        let opts = SimulationOptions::default();
        assert_eq!(
            simulate_battle(&[], &[CreatureRecord::named(1, "X")], 0, &opts),
            Err(StartError::EmptyPlayerRoster)
        );
    }
}
