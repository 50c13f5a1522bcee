use specimen_battle::{run, BattlePolicy, CliOptions, RunMode};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn usage() -> ! {
    eprintln!(
        "Usage: specimen-battle [--teams teams.json] [--mode duel|matrix] [--seed SEED] \
[--policy random|greedy] [--sims-per-cell N] [--squad-size K] [--output matrix.csv]"
    );
    std::process::exit(1);
}

fn parse_args() -> anyhow::Result<CliOptions> {
    let mut teams_path = PathBuf::from("teams.json");
    let mut mode = RunMode::Duel;
    let mut sims_per_cell = 100usize;
    let mut seed = 0u64;
    let mut output_path = PathBuf::from("matrix.csv");
    let mut squad_size = 3usize;
    let mut policy = BattlePolicy::Random;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--teams" => {
                teams_path = args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--teams requires a path (e.g. --teams teams.json)")
                })?;
            }
            "--mode" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--mode requires duel or matrix"))?;
                mode = match val.to_ascii_lowercase().as_str() {
                    "duel" => RunMode::Duel,
                    "matrix" => RunMode::Matrix,
                    other => anyhow::bail!("Unknown mode {other} (use duel or matrix)"),
                };
            }
            "--sims-per-cell" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--sims-per-cell requires a number"))?;
                sims_per_cell = val.parse()?;
            }
            "--squad-size" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--squad-size requires a number"))?;
                squad_size = val.parse()?;
            }
            "--seed" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--seed requires a number"))?;
                seed = val.parse()?;
            }
            "--output" => {
                output_path = args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--output requires a path (e.g. --output matrix.csv)")
                })?;
            }
            "--policy" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--policy requires random or greedy"))?;
                policy = match val.to_ascii_lowercase().as_str() {
                    "random" => BattlePolicy::Random,
                    "greedy" => BattlePolicy::Greedy,
                    other => anyhow::bail!("Unknown policy {other} (use random or greedy)"),
                };
            }
            "--help" | "-h" => usage(),
            other => return Err(anyhow::anyhow!("Unknown argument {other}")),
        }
    }

    Ok(CliOptions {
        teams_path,
        mode,
        sims_per_cell,
        seed,
        output_path,
        squad_size,
        policy,
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let opts = parse_args()?;
    run(opts)
}
