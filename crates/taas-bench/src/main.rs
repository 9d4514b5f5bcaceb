use std::path::PathBuf;

use clap::Parser;

use taas_bench::config::{ResolvedOutputs, SimulationConfig};
use taas_bench::logging::init_logging;
use taas_bench::runner::SimulationRunner;

/// Seeded simulation harness for the dice game.
#[derive(Debug, Parser)]
#[command(
    name = "taas-bench",
    author,
    version,
    about = "Deterministic dice-game simulation harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of games to play.
    #[arg(long, value_name = "GAMES")]
    games: Option<usize>,

    /// Override the master seed.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Exit after validating the configuration (no games are played).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = SimulationConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(games) = cli.games {
        config.games.count = games;
    }

    if let Some(seed) = cli.seed {
        config.games.seed = Some(seed);
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let games = config.games.count;
    let humans = config.table.num_players;

    println!(
        "Loaded configuration '{run_id}' ({games} game{}, {humans} autopiloted human seat{}, ruleset {})",
        if games == 1 { "" } else { "s" },
        if humans == 1 { "" } else { "s" },
        config.table.ruleset.version()
    );

    let logging_guard = init_logging(&config.logging, &outputs, &run_id)?;
    let runner = SimulationRunner::new(config, outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: simulation skipped.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Simulation complete for '{run_id}': {} games → {} rows at {}",
        summary.games_played,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    for seat in &summary.summary.seats {
        println!(
            "  Seat {} ({}): {:.1}% wins, mean score {:.2}",
            seat.seat,
            seat.kind,
            seat.win_share * 100.0,
            seat.mean_score
        );
    }
    if let Some(guard) = logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }

    Ok(())
}
