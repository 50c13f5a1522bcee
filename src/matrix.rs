//! Win-rate matrices between every squad the player and the opponent can field.

use crate::battle::{simulate_battle, SimulationOptions, SimulationResult};
use crate::error::StartError;
use crate::model::{CreatureRecord, TeamsFile};
use anyhow::Context;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

pub const MAX_SQUAD_SIZE: usize = 6;

/// All `k`-element index subsets of `0..len`, in lexicographic order.
pub fn choose_indices(len: usize, k: usize) -> Vec<Vec<usize>> {
    let mut combos = Vec::new();
    if k == 0 || k > len {
        return combos;
    }
    let mut current: Vec<usize> = (0..k).collect();
    loop {
        combos.push(current.clone());
        // rightmost slot that can still advance
        let Some(pos) = (0..k).rev().find(|&i| current[i] < len - k + i) else {
            break;
        };
        current[pos] += 1;
        for i in (pos + 1)..k {
            current[i] = current[i - 1] + 1;
        }
    }
    combos
}

fn selection_from_indices(team: &[CreatureRecord], indices: &[usize]) -> Vec<CreatureRecord> {
    indices.iter().map(|&idx| team[idx].clone()).collect()
}

/// Rows are player squads and columns opponent squads, both in
/// [`choose_indices`] order. A cell is the player's win rate, stalemates
/// counting half.
pub fn compute_matrix(
    teams: &TeamsFile,
    squad_size: usize,
    sims_per_cell: usize,
    seed: u64,
    options: &SimulationOptions,
) -> Result<Vec<Vec<f64>>, StartError> {
    let selections_a: Vec<Vec<CreatureRecord>> = choose_indices(teams.player.len(), squad_size)
        .iter()
        .map(|idx| selection_from_indices(&teams.player, idx))
        .collect();
    let selections_b: Vec<Vec<CreatureRecord>> = choose_indices(teams.opponent.len(), squad_size)
        .iter()
        .map(|idx| selection_from_indices(&teams.opponent, idx))
        .collect();
    if selections_a.is_empty() {
        return Err(StartError::EmptyPlayerRoster);
    }
    if selections_b.is_empty() {
        return Err(StartError::EmptyOpponentRoster);
    }
    debug!(
        rows = selections_a.len(),
        cols = selections_b.len(),
        sims_per_cell,
        "computing matrix"
    );

    let tasks: Vec<(usize, usize)> = (0..selections_a.len())
        .flat_map(|a| (0..selections_b.len()).map(move |b| (a, b)))
        .collect();
    let cell_results = tasks
        .par_iter()
        .map(|&(a_idx, b_idx)| {
            let mut cell_rng =
                SmallRng::seed_from_u64(seed ^ ((a_idx as u64) << 32) ^ (b_idx as u64));
            let a_sel = &selections_a[a_idx];
            let b_sel = &selections_b[b_idx];
            let mut wins = 0u64;
            let mut stalemates = 0u64;
            for _ in 0..sims_per_cell {
                let battle_seed = cell_rng.gen();
                match simulate_battle(a_sel, b_sel, battle_seed, options)? {
                    SimulationResult::PlayerWins => wins += 1,
                    SimulationResult::OpponentWins => {}
                    SimulationResult::Stalemate => stalemates += 1,
                }
            }
            let total = sims_per_cell.max(1) as f64;
            Ok(CellResult {
                a_idx,
                b_idx,
                win_rate: (wins as f64 + 0.5 * stalemates as f64) / total,
            })
        })
        .collect::<Result<Vec<CellResult>, StartError>>()?;

    let mut matrix = vec![vec![0.0; selections_b.len()]; selections_a.len()];
    for cell in cell_results {
        matrix[cell.a_idx][cell.b_idx] = cell.win_rate;
    }
    Ok(matrix)
}

pub fn write_csv(matrix: &[Vec<f64>], path: &std::path::Path) -> anyhow::Result<()> {
    std::fs::write(path, to_csv(matrix))
        .with_context(|| format!("Failed to write matrix CSV to {}", path.display()))?;
    Ok(())
}

fn to_csv(matrix: &[Vec<f64>]) -> String {
    matrix
        .iter()
        .map(|row| {
            row.iter()
                .map(|value| format!("{value:.4}"))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

struct CellResult {
    a_idx: usize,
    b_idx: usize,
    win_rate: f64,
}

pub fn validate_team_sizes(teams: &TeamsFile) -> anyhow::Result<()> {
    for (side, team) in [("player", &teams.player), ("opponent", &teams.opponent)] {
        if team.is_empty() || team.len() > MAX_SQUAD_SIZE {
            anyhow::bail!(
                "Expected 1 to {MAX_SQUAD_SIZE} creatures on the {side} team, found {}",
                team.len()
            );
        }
    }
    Ok(())
}
