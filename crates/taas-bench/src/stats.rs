use std::fs;
use std::path::Path;

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use statrs::statistics::Statistics;
use taas_core::Seat;
use taas_core::game::vote::VoteTally;
use thiserror::Error;

use crate::runner::GameRecord;

const CONFIDENCE: f64 = 0.975; // two-sided 95%

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("no games recorded")]
    Empty,
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Folds finished games into per-seat and per-run aggregates.
#[derive(Debug, Default)]
pub struct StatsCollector {
    games: usize,
    ties: usize,
    win_share: [f64; Seat::COUNT],
    scores: [Vec<f64>; Seat::COUNT],
    is_cpu: [bool; Seat::COUNT],
    winning_scores: Vec<f64>,
    rounds: Vec<f64>,
    gambles: usize,
    gamble_wins: u32,
    votes: VoteTally,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, game: &GameRecord) {
        self.games += 1;
        if game.winners.len() > 1 {
            self.ties += 1;
        }
        let share = if game.winners.is_empty() {
            0.0
        } else {
            1.0 / game.winners.len() as f64
        };
        for &seat in &game.winners {
            if let Some(slot) = self.win_share.get_mut(seat) {
                *slot += share;
            }
        }

        for seat in &game.seats {
            let Some(scores) = self.scores.get_mut(seat.seat) else {
                continue;
            };
            scores.push(f64::from(seat.score));
            self.is_cpu[seat.seat] = seat.is_cpu;
            self.gambles += seat.gambles;
            self.gamble_wins += seat.gamble_wins;
        }

        if let Some(best) = game.seats.iter().map(|s| s.score).max() {
            self.winning_scores.push(f64::from(best));
        }
        self.rounds.push(f64::from(game.rounds));

        self.votes.requested += game.votes.requested;
        self.votes.accepted += game.votes.accepted;
        self.votes.rejected += game.votes.rejected;
    }

    pub fn finalize(self) -> Result<SimulationSummary, StatsError> {
        if self.games == 0 {
            return Err(StatsError::Empty);
        }
        let games = self.games as f64;

        let seats = Seat::LOOP
            .iter()
            .map(|seat| {
                let i = seat.index();
                let (mean_score, std_score) = mean_and_std(&self.scores[i]);
                SeatReport {
                    seat: i + 1,
                    kind: if self.is_cpu[i] { "cpu" } else { "human" },
                    win_share: self.win_share[i] / games,
                    mean_score,
                    std_score,
                }
            })
            .collect();

        let (winning_mean, winning_std) = mean_and_std(&self.winning_scores);
        let (rounds_mean, _) = mean_and_std(&self.rounds);

        Ok(SimulationSummary {
            games: self.games,
            seats,
            winning_score_mean: winning_mean,
            winning_score_std: winning_std,
            winning_score_ci95: confidence_interval(&self.winning_scores),
            rounds_mean,
            tie_rate: self.ties as f64 / games,
            gambles: self.gambles,
            gamble_success_rate: ratio(self.gamble_wins as usize, self.gambles),
            votes: self.votes,
            vote_accept_rate: ratio(self.votes.accepted as usize, self.votes.requested as usize),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeatReport {
    pub seat: usize,
    pub kind: &'static str,
    pub win_share: f64,
    pub mean_score: f64,
    pub std_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub games: usize,
    pub seats: Vec<SeatReport>,
    pub winning_score_mean: f64,
    pub winning_score_std: f64,
    pub winning_score_ci95: (f64, f64),
    pub rounds_mean: f64,
    pub tie_rate: f64,
    pub gambles: usize,
    pub gamble_success_rate: f64,
    pub votes: VoteTally,
    pub vote_accept_rate: f64,
}

impl SimulationSummary {
    pub fn write_markdown(&self, path: impl AsRef<Path>, run_id: &str, ruleset: &str) -> Result<(), StatsError> {
        let mut out = String::new();
        out.push_str(&format!("# Simulation Summary: {run_id}\n\n"));
        out.push_str(&format!(
            "Ruleset `{ruleset}`, {games} games, {rounds:.1} rounds on average, {ties:.1}% ties.\n\n",
            games = self.games,
            rounds = self.rounds_mean,
            ties = self.tie_rate * 100.0,
        ));
        out.push_str("| Seat | Kind | Win share | Mean score | Std dev |\n");
        out.push_str("|------|------|-----------|------------|---------|\n");
        for seat in &self.seats {
            out.push_str(&format!(
                "| {seat} | {kind} | {win:.1}% | {mean:.2} | {std:.2} |\n",
                seat = seat.seat,
                kind = seat.kind,
                win = seat.win_share * 100.0,
                mean = seat.mean_score,
                std = seat.std_score,
            ));
        }
        out.push_str(&format!(
            "\nWinning score: {mean:.2} ± {std:.2} (95% CI [{low:.2}, {high:.2}])\n",
            mean = self.winning_score_mean,
            std = self.winning_score_std,
            low = self.winning_score_ci95.0,
            high = self.winning_score_ci95.1,
        ));
        out.push_str(&format!(
            "\nSecond chances: {count} taken, {rate:.1}% won\n",
            count = self.gambles,
            rate = self.gamble_success_rate * 100.0,
        ));
        out.push_str(&format!(
            "\nVotes: {requested} requested, {accepted} accepted, {rejected} rejected ({rate:.1}% accepted)\n",
            requested = self.votes.requested,
            accepted = self.votes.accepted,
            rejected = self.votes.rejected,
            rate = self.vote_accept_rate * 100.0,
        ));

        fs::write(path.as_ref(), out).map_err(|source| StatsError::Io {
            context: "writing summary markdown",
            source,
        })
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn mean_and_std(values: &[f64]) -> (f64, f64) {
    match values.len() {
        0 => (0.0, 0.0),
        1 => (values[0], 0.0),
        _ => (values.iter().mean(), values.iter().std_dev()),
    }
}

fn confidence_interval(values: &[f64]) -> (f64, f64) {
    let (mean, std) = mean_and_std(values);
    if values.len() < 2 {
        return (mean, mean);
    }
    let z = Normal::new(0.0, 1.0)
        .map(|normal| normal.inverse_cdf(CONFIDENCE))
        .unwrap_or(1.96);
    let margin = z * std / (values.len() as f64).sqrt();
    (mean - margin, mean + margin)
}
