mod autopilot;

pub use autopilot::Autopilot;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use taas_core::game::vote::VoteTally;
use taas_core::{Game, GameError, GameServices, SettingsError, TimerQueue, WinCondition};
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{ResolvedOutputs, SimulationConfig};
use crate::stats::{SimulationSummary, StatsCollector, StatsError};

/// Timers drained between two autopilot steps.
const TIMER_BATCH: usize = 1_000;
const AUTOPILOT_SALT: u64 = 0xA070_9110_7000_0001;

/// Plays seeded games and streams one JSONL row per game.
pub struct SimulationRunner {
    config: SimulationConfig,
    outputs: ResolvedOutputs,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub games_played: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub summary: SimulationSummary,
}

impl SimulationRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: SimulationConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        config.table.settings().validate()?;
        Ok(Self { config, outputs })
    }

    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.games.seed.unwrap_or(0));
        let mut stats = StatsCollector::new();
        let mut rows_written = 0usize;

        for game_index in 0..self.config.games.count {
            let seed = rng.next_u64();
            let record = self.play_game(game_index, seed)?;
            stats.record(&record);
            serde_json::to_writer(&mut writer, &record)?;
            writer.write_all(b"\n")?;
            rows_written += 1;
        }
        writer.flush()?;

        let summary = stats.finalize()?;
        summary.write_markdown(
            &self.outputs.summary_md,
            &self.config.run_id,
            self.config.table.ruleset.version(),
        )?;

        Ok(RunSummary {
            games_played: self.config.games.count,
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            summary,
        })
    }

    /// Plays one game to completion with zero-delay pacing.
    pub fn play_game(&self, game_index: usize, seed: u64) -> Result<GameRecord, RunnerError> {
        let services = GameServices::seeded(seed).with_policy(self.config.cpu.policy());
        let mut queue = TimerQueue::new();
        let mut game = Game::start(self.config.table.settings(), services, &mut queue)
            .map_err(|source| RunnerError::Start { game_index, source })?;
        let mut autopilot = Autopilot::new(self.config.autopilot.policy(), seed ^ AUTOPILOT_SALT);

        let max_steps = self.config.games.max_steps;
        let mut steps = 0usize;
        while !game.is_game_over() {
            if steps >= max_steps {
                return Err(RunnerError::Stalled { game_index, steps });
            }
            steps += 1;
            let _ = autopilot.step(&mut game, &mut queue);
            game.run_timers(&mut queue, TIMER_BATCH);
        }

        let record = GameRecord::from_game(&self.config.run_id, game_index, seed, steps, &game);
        event!(
            target: "taas_bench::game",
            Level::INFO,
            run_id = %self.config.run_id,
            game_index = game_index as u32,
            seed,
            rounds = record.rounds,
            winners = ?record.winners,
            votes = record.votes.requested,
            steps = steps as u32
        );
        Ok(record)
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// One JSONL row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub run_id: String,
    pub game_index: usize,
    pub seed: u64,
    pub ruleset: String,
    pub win_condition: WinCondition,
    pub win_value: u32,
    pub rounds: u32,
    pub steps: usize,
    /// Zero-based seat indices.
    pub winners: Vec<usize>,
    pub votes: VoteTally,
    pub seats: Vec<SeatRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatRecord {
    pub seat: usize,
    pub name: String,
    pub is_cpu: bool,
    pub score: i32,
    pub bonus: i32,
    pub turns: usize,
    pub gambles: usize,
    pub gamble_wins: u32,
    /// Sum of the points gambles moved the score by.
    pub gamble_net: i32,
}

impl GameRecord {
    fn from_game(run_id: &str, game_index: usize, seed: u64, steps: usize, game: &Game) -> Self {
        let settings = game.settings();
        Self {
            run_id: run_id.to_string(),
            game_index,
            seed,
            ruleset: settings.ruleset.version().to_string(),
            win_condition: settings.win_condition,
            win_value: settings.win_value,
            rounds: game.turn().current_round,
            steps,
            winners: game.winners().iter().map(|seat| seat.index()).collect(),
            votes: game.vote_tally(),
            seats: game
                .players()
                .iter()
                .enumerate()
                .map(|(seat, player)| SeatRecord {
                    seat,
                    name: player.name.clone(),
                    is_cpu: player.is_cpu,
                    score: player.score,
                    bonus: player.total_bonus(),
                    turns: player.turns_completed(),
                    gambles: player.second_chance_history.len(),
                    gamble_wins: player.second_chance_wins,
                    gamble_net: player.second_chance_history.iter().sum(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("invalid table settings: {0}")]
    Settings(#[from] SettingsError),
    #[error("game {game_index} could not start: {source}")]
    Start {
        game_index: usize,
        #[source]
        source: GameError,
    },
    #[error("game {game_index} did not finish within {steps} steps")]
    Stalled { game_index: usize, steps: usize },
    #[error("statistics error: {0}")]
    Stats(#[from] StatsError),
}
