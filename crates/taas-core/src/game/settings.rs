use crate::model::player::Seat;
use crate::names::random_names;
use crate::scoring::ScoringVariant;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_PLAYERS: usize = Seat::COUNT;
pub const MAX_DICE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinCondition {
    /// Play a fixed number of rounds.
    Rounds,
    /// Play until someone reaches a target score.
    Score,
}

/// How a lost gamble is applied to the score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GambleFloor {
    /// Scores may go negative.
    #[default]
    Unfloored,
    /// Scores never drop below zero.
    FloorAtZero,
}

impl GambleFloor {
    pub fn apply(self, score: i32) -> i32 {
        match self {
            GambleFloor::Unfloored => score,
            GambleFloor::FloorAtZero => score.max(0),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ruleset {
    #[serde(default)]
    pub scoring: ScoringVariant,
    #[serde(default)]
    pub gamble_floor: GambleFloor,
}

impl Ruleset {
    /// Every six pays, gambles can go negative.
    pub const SECOND_CHANCE: Ruleset = Ruleset {
        scoring: ScoringVariant::BonusRich,
        gamble_floor: GambleFloor::Unfloored,
    };

    /// Only a lone six pays, scores floor at zero.
    pub const CLASSIC: Ruleset = Ruleset {
        scoring: ScoringVariant::SingleSix,
        gamble_floor: GambleFloor::FloorAtZero,
    };

    pub fn version(self) -> &'static str {
        match (self.scoring, self.gamble_floor) {
            (ScoringVariant::BonusRich, GambleFloor::Unfloored) => "second-chance-v3",
            (ScoringVariant::SingleSix, GambleFloor::FloorAtZero) => "classic-v1",
            (ScoringVariant::BonusRich, GambleFloor::FloorAtZero) => "custom-bonus-rich-floored",
            (ScoringVariant::SingleSix, GambleFloor::Unfloored) => "custom-single-six-unfloored",
        }
    }
}

/// Table setup chosen before a game starts. Immutable once the game runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    /// Human players, seated first. The remaining seats are CPU players.
    pub num_players: usize,
    pub player_names: Vec<String>,
    pub num_dice: usize,
    pub win_condition: WinCondition,
    pub win_value: u32,
    #[serde(default)]
    pub ruleset: Ruleset,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            num_players: 1,
            player_names: default_names(1),
            num_dice: 2,
            win_condition: WinCondition::Rounds,
            win_value: 10,
            ruleset: Ruleset::default(),
        }
    }
}

impl GameSettings {
    /// Seats `human_names` first and fills the other seats with generated CPU names.
    pub fn new<R: Rng + ?Sized>(
        human_names: &[&str],
        num_dice: usize,
        win_condition: WinCondition,
        win_value: u32,
        rng: &mut R,
    ) -> Self {
        let mut settings = Self {
            num_players: human_names.len(),
            player_names: human_names.iter().map(|n| n.trim().to_string()).collect(),
            num_dice,
            win_condition,
            win_value,
            ruleset: Ruleset::default(),
        };
        settings.fill_cpu_names(rng);
        settings
    }

    pub fn with_ruleset(mut self, ruleset: Ruleset) -> Self {
        self.ruleset = ruleset;
        self
    }

    /// Pads the roster to four names with random CPU names not already taken.
    pub fn fill_cpu_names<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.player_names.truncate(MAX_PLAYERS);
        let missing = MAX_PLAYERS.saturating_sub(self.player_names.len());
        if missing == 0 {
            return;
        }
        let candidates = random_names(MAX_PLAYERS + missing, rng);
        let fresh: Vec<String> = candidates
            .into_iter()
            .filter(|name| !self.player_names.contains(name))
            .take(missing)
            .collect();
        self.player_names.extend(fresh);
        let start = self.player_names.len();
        for index in start..MAX_PLAYERS {
            self.player_names.push(format!("CPU {}", index + 1));
        }
    }

    pub fn is_cpu(&self, seat: Seat) -> bool {
        seat.index() >= self.num_players
    }

    /// Score at which the automatic second chance switches on in score mode.
    pub fn second_chance_threshold_reached(&self, score: i32) -> bool {
        // 80% of the target without floating point.
        self.win_condition == WinCondition::Score
            && i64::from(score) * 5 >= i64::from(self.win_value) * 4
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(1..=MAX_PLAYERS).contains(&self.num_players) {
            return Err(SettingsError::invalid(
                "num_players",
                format!("must be between 1 and {MAX_PLAYERS}, got {}", self.num_players),
            ));
        }

        if self.player_names.len() != MAX_PLAYERS {
            return Err(SettingsError::invalid(
                "player_names",
                format!(
                    "exactly {MAX_PLAYERS} names are required, got {}",
                    self.player_names.len()
                ),
            ));
        }

        if let Some(index) = self.player_names.iter().position(|n| n.trim().is_empty()) {
            return Err(SettingsError::invalid(
                format!("player_names[{index}]"),
                "name must not be empty",
            ));
        }

        if !(1..=MAX_DICE).contains(&self.num_dice) {
            return Err(SettingsError::invalid(
                "num_dice",
                format!("must be between 1 and {MAX_DICE}, got {}", self.num_dice),
            ));
        }

        if self.win_value == 0 {
            return Err(SettingsError::invalid(
                "win_value",
                "must be greater than zero",
            ));
        }

        Ok(())
    }
}

/// Names the settings form shows before the user edits them.
pub fn default_names(num_players: usize) -> Vec<String> {
    (0..MAX_PLAYERS)
        .map(|i| {
            if i < num_players {
                format!("Player {}", i + 1)
            } else {
                format!("CPU {}", i + 1)
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

impl SettingsError {
    fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        SettingsError::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            SettingsError::InvalidField { field, .. } => field,
        }
    }
}
