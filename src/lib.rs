pub mod advice;
pub mod battle;
pub mod combatant;
pub mod damage;
pub mod engine;
pub mod error;
pub mod log;
pub mod matrix;
pub mod model;
pub mod resolver;
pub mod state;
pub mod types;

pub use crate::advice::{Advice, AdviceRequest, Coach, Recommendation};
pub use crate::battle::{simulate_battle, BattlePolicy, SimulationOptions, SimulationResult};
pub use crate::combatant::{normalize, Combatant, CombatantId, Move, MoveCategory};
pub use crate::engine::{Battle, BattleOptions};
pub use crate::error::{ActionError, StartError};
pub use crate::model::{CreatureRecord, TeamsFile};
pub use crate::state::{BattleOutcome, BattleState, PlayerAction, Side, TurnPhase};
pub use crate::types::{type_effectiveness, ElementType};

use crate::battle::choose_action;
use crate::engine::{narrate, START_MESSAGE};
use crate::matrix::{compute_matrix, validate_team_sizes};
use anyhow::Context;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// One narrated battle between the full teams.
    Duel,
    /// Win-rate matrix over every squad pairing.
    Matrix,
}

#[derive(Debug, Clone)]
pub struct CliOptions {
    pub teams_path: PathBuf,
    pub mode: RunMode,
    pub sims_per_cell: usize,
    pub seed: u64,
    pub output_path: PathBuf,
    pub squad_size: usize,
    pub policy: BattlePolicy,
}

pub fn load_teams(path: &Path) -> anyhow::Result<TeamsFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read teams file at {}", path.display()))?;
    let parsed: TeamsFile = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;
    validate_team_sizes(&parsed)?;
    Ok(parsed)
}

/// Plays the full teams against each other and returns every narrated line,
/// unbounded by the log's retention.
pub fn run_duel(
    teams: &TeamsFile,
    seed: u64,
    policy: BattlePolicy,
) -> anyhow::Result<(BattleOutcome, Vec<String>)> {
    let mut battle = Battle::start_with(
        &teams.player,
        &teams.opponent,
        &teams.options,
        SmallRng::seed_from_u64(seed),
    )?;
    let mut policy_rng = SmallRng::seed_from_u64(seed.rotate_left(17));
    let mut transcript = vec![START_MESSAGE.to_string()];
    let max_turns = SimulationOptions::default().max_turns;

    for _ in 0..max_turns {
        let Some(action) = choose_action(battle.state(), policy, &mut policy_rng) else {
            break;
        };
        battle
            .submit_action(action)
            .with_context(|| format!("auto-pilot action {action:?} was rejected"))?;
        transcript.extend(battle.last_events().iter().filter_map(narrate));
    }
    Ok((battle.state().outcome, transcript))
}

pub fn run(opts: CliOptions) -> anyhow::Result<()> {
    let teams = load_teams(&opts.teams_path)?;
    match opts.mode {
        RunMode::Duel => {
            let (outcome, transcript) = run_duel(&teams, opts.seed, opts.policy)?;
            for line in &transcript {
                println!("{line}");
            }
            info!(?outcome, lines = transcript.len(), "duel finished");
        }
        RunMode::Matrix => {
            if opts.sims_per_cell == 0 {
                anyhow::bail!("--sims-per-cell must be > 0");
            }
            let smallest = teams.player.len().min(teams.opponent.len());
            if opts.squad_size == 0 || opts.squad_size > smallest {
                anyhow::bail!(
                    "--squad-size must be between 1 and {smallest} for these teams, got {}",
                    opts.squad_size
                );
            }
            let sim_options = SimulationOptions {
                policy: opts.policy,
                battle: teams.options.clone(),
                ..SimulationOptions::default()
            };
            let matrix = compute_matrix(
                &teams,
                opts.squad_size,
                opts.sims_per_cell,
                opts.seed,
                &sim_options,
            )?;
            matrix::write_csv(&matrix, &opts.output_path)?;
            println!(
                "Wrote {}x{} matrix to {}",
                matrix.len(),
                matrix.first().map(|r| r.len()).unwrap_or(0),
                opts.output_path.display()
            );
        }
    }
    Ok(())
}
