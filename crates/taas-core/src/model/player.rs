use core::fmt;
use serde::{Deserialize, Serialize};

/// Rounds a player has to wait between two second-chance vote requests.
pub const VOTE_COOLDOWN_ROUNDS: u32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Seat {
    One = 0,
    Two = 1,
    Three = 2,
    Four = 3,
}

impl Seat {
    pub const COUNT: usize = 4;

    pub const LOOP: [Seat; 4] = [Seat::One, Seat::Two, Seat::Three, Seat::Four];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Seat::One),
            1 => Some(Seat::Two),
            2 => Some(Seat::Three),
            3 => Some(Seat::Four),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn next(self) -> Seat {
        match self {
            Seat::One => Seat::Two,
            Seat::Two => Seat::Three,
            Seat::Three => Seat::Four,
            Seat::Four => Seat::One,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seat {}", self.index() + 1)
    }
}

/// Base score and bonus of the first roll of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub score: u32,
    pub bonus: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub score: i32,
    pub is_cpu: bool,
    pub history: Vec<TurnRecord>,
    /// Signed points each resolved gamble moved the score by.
    pub second_chance_history: Vec<i32>,
    pub second_chance_wins: u32,
    /// Score at the end of each completed turn, seeded with the opening 0.
    pub score_history: Vec<i32>,
    /// Round of the last vote this player opened, 0 if never.
    pub last_vote_initiated_round: u32,
}

impl Player {
    pub fn new(name: impl Into<String>, is_cpu: bool) -> Self {
        Self {
            name: name.into(),
            score: 0,
            is_cpu,
            history: Vec::new(),
            second_chance_history: Vec::new(),
            second_chance_wins: 0,
            score_history: vec![0],
            last_vote_initiated_round: 0,
        }
    }

    pub fn total_bonus(&self) -> i32 {
        self.history.iter().map(|h| h.bonus as i32).sum()
    }

    /// Score without the bonus points earned on first rolls.
    pub fn main_score(&self) -> i32 {
        self.score - self.total_bonus()
    }

    pub fn turns_completed(&self) -> usize {
        self.score_history.len().saturating_sub(1)
    }

    pub fn vote_cooldown_elapsed(&self, current_round: u32) -> bool {
        self.last_vote_initiated_round == 0
            || current_round.saturating_sub(self.last_vote_initiated_round) >= VOTE_COOLDOWN_ROUNDS
    }

    pub fn rounds_until_vote(&self, current_round: u32) -> u32 {
        if self.vote_cooldown_elapsed(current_round) {
            0
        } else {
            VOTE_COOLDOWN_ROUNDS - (current_round - self.last_vote_initiated_round)
        }
    }
}
