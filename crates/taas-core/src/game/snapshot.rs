use crate::game::second_chance::SecondChanceInfo;
use crate::game::state::{Phase, TurnState};
use crate::game::vote::VoteInfo;
use crate::model::player::{Player, Seat};
use core::fmt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Status line shown to the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameMessage {
    Turn { name: String, final_round: bool },
    Rolled { name: String, total: i32 },
    ChoseSecondChance { name: String },
    GambleWon { name: String, points: i32 },
    GambleLost { name: String, points: i32 },
    VoteRequested { name: String },
    VoteAccepted,
    VoteRejected,
    GameOver { winners: Vec<String> },
    Exited,
}

impl fmt::Display for GameMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameMessage::Turn {
                name,
                final_round: true,
            } => write!(f, "Final round! {name}'s turn"),
            GameMessage::Turn { name, .. } => write!(f, "{name}'s turn"),
            GameMessage::Rolled { name, total } => write!(f, "{name} scored {total}!"),
            GameMessage::ChoseSecondChance { name } => {
                write!(f, "{name} takes the second chance!")
            }
            GameMessage::GambleWon { name, points } => {
                write!(f, "{name} won {points} points with the second chance!")
            }
            GameMessage::GambleLost { name, points } => {
                write!(f, "{name} lost {points} points with the second chance!")
            }
            GameMessage::VoteRequested { name } => {
                write!(f, "{name} asked the table for a second chance.")
            }
            GameMessage::VoteAccepted => f.write_str("Second chance request accepted!"),
            GameMessage::VoteRejected => f.write_str("Second chance request rejected."),
            GameMessage::GameOver { winners } => match winners.as_slice() {
                [] => f.write_str("The game ended in a draw!"),
                [single] => write!(f, "{single} wins!"),
                many => write!(f, "Tie between {}!", many.join(" and ")),
            },
            GameMessage::Exited => f.write_str("Game exited."),
        }
    }
}

/// Input the table is waiting on, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "prompt", rename_all = "snake_case")]
pub enum PendingPrompt {
    None,
    SecondChance(SecondChanceInfo),
    Vote(VoteInfo),
}

/// Read-only view of a game at one instant.
///
/// Players are shared with the live game until the game next changes them,
/// at which point the game copies its roster and this snapshot keeps the old one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub ruleset_version: String,
    pub players: Arc<Vec<Player>>,
    pub turn: TurnState,
    pub phase: Phase,
    pub game_over: bool,
    pub winners: Vec<Seat>,
    pub message: GameMessage,
    pub pending_prompt: PendingPrompt,
    pub bonus_message: Option<String>,
    pub second_chance_active: bool,
    pub automatic_second_chance: bool,
}

impl GameSnapshot {
    pub fn player(&self, seat: Seat) -> &Player {
        &self.players[seat.index()]
    }

    pub fn current_player(&self) -> &Player {
        self.player(self.turn.current_player)
    }

    pub fn winner_names(&self) -> Vec<&str> {
        self.winners
            .iter()
            .map(|seat| self.player(*seat).name.as_str())
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::GameMessage;

    #[test]
    fn game_over_message_lists_ties() {
        let single = GameMessage::GameOver {
            winners: vec!["Sara".into()],
        };
        assert_eq!(single.to_string(), "Sara wins!");

        let tie = GameMessage::GameOver {
            winners: vec!["Sara".into(), "Kian".into()],
        };
        assert_eq!(tie.to_string(), "Tie between Sara and Kian!");
    }

    #[test]
    fn gamble_messages_report_points_unsigned() {
        let lost = GameMessage::GambleLost {
            name: "Reza".into(),
            points: 4,
        };
        assert_eq!(lost.to_string(), "Reza lost 4 points with the second chance!");
    }

    #[test]
    fn turn_message_flags_final_round() {
        let msg = GameMessage::Turn {
            name: "Ava".into(),
            final_round: true,
        };
        assert_eq!(msg.to_string(), "Final round! Ava's turn");
    }
}
