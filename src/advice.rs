//! Optional coaching hook.
//!
//! The engine never talks to a coaching service itself. The caller supplies a
//! [`Coach`] (typically a client for the generative content service) and the
//! engine only shapes the request and interprets the answer.

use crate::state::{BattleState, Side};
use crate::types::ElementType;
use tracing::warn;

pub const FALLBACK_ADVICE: &str = "Professor is analyzing data...";

#[derive(Clone, Debug, PartialEq)]
pub struct AdviceRequest {
    pub player_name: String,
    pub player_types: Vec<ElementType>,
    pub opponent_name: String,
    pub opponent_types: Vec<ElementType>,
    pub moves: Vec<String>,
    pub log: Vec<String>,
}

/// Raw answer from a coach.
#[derive(Clone, Debug, PartialEq)]
pub struct Advice {
    pub text: String,
    pub recommended_move: Option<String>,
}

/// Advice resolved against the active combatant's move slots.
#[derive(Clone, Debug, PartialEq)]
pub struct Recommendation {
    pub text: String,
    pub move_index: Option<usize>,
}

pub trait Coach {
    fn advise(&self, request: &AdviceRequest) -> anyhow::Result<Advice>;
}

impl AdviceRequest {
    pub fn from_state(state: &BattleState) -> Self {
        let player = state.active(Side::Player);
        let opponent = state.active(Side::Opponent);
        AdviceRequest {
            player_name: player.name.clone(),
            player_types: player.element_types.clone(),
            opponent_name: opponent.name.clone(),
            opponent_types: opponent.element_types.clone(),
            moves: player.moves.iter().map(|m| m.name.clone()).collect(),
            log: state.log.to_vec(),
        }
    }

    /// Matchup summary handed to text-generating coaches.
    pub fn context(&self) -> String {
        format!(
            "Your specimen: {} ({})\nOpponent: {} ({})\nMoves available: {}",
            self.player_name,
            join_types(&self.player_types),
            self.opponent_name,
            join_types(&self.opponent_types),
            self.moves.join(", ")
        )
    }

    pub fn consult(&self, coach: &dyn Coach) -> Recommendation {
        match coach.advise(self) {
            Ok(advice) => {
                let move_index = advice.recommended_move.as_deref().and_then(|wanted| {
                    self.moves
                        .iter()
                        .position(|name| name.eq_ignore_ascii_case(wanted.trim()))
                });
                Recommendation {
                    text: advice.text,
                    move_index,
                }
            }
            Err(err) => {
                warn!(error = %err, "coach unavailable");
                Recommendation {
                    text: FALLBACK_ADVICE.to_string(),
                    move_index: None,
                }
            }
        }
    }
}

fn join_types(types: &[ElementType]) -> String {
    types
        .iter()
        .map(|t| t.name())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Option<&'static str>);

    impl Coach for Fixed {
        fn advise(&self, request: &AdviceRequest) -> anyhow::Result<Advice> {
            match self.0 {
                Some(name) => Ok(Advice {
                    text: format!("Use {name} against {}", request.opponent_name),
                    recommended_move: Some(name.to_string()),
                }),
                None => anyhow::bail!("service offline"),
            }
        }
    }

    fn request() -> AdviceRequest {
        AdviceRequest {
            player_name: "Cinder".into(),
            player_types: vec![ElementType::Fire, ElementType::Flying],
            opponent_name: "Moss".into(),
            opponent_types: vec![ElementType::Grass],
            moves: vec!["Ember".into(), "Gust".into(), "Tackle".into(), "Tackle".into()],
            log: vec![],
        }
    }

    #[test]
    fn recommended_move_matches_case_insensitively() {
        let rec = request().consult(&Fixed(Some("eMBER")));
        assert_eq!(rec.move_index, Some(0));
        assert_eq!(rec.text, "Use eMBER against Moss");
    }

    #[test]
    fn unknown_recommendation_has_no_index() {
        assert_eq!(request().consult(&Fixed(Some("Hyper Beam"))).move_index, None);
    }

    #[test]
    fn failures_fall_back_to_placeholder_text() {
        let rec = request().consult(&Fixed(None));
        assert_eq!(rec.text, FALLBACK_ADVICE);
        assert_eq!(rec.move_index, None);
    }

    #[test]
    fn context_lists_matchup() {
        assert_eq!(
            request().context(),
            "Your specimen: Cinder (Fire/Flying)\nOpponent: Moss (Grass)\nMoves available: Ember, Gust, Tackle, Tackle"
        );
    }
}
