use crate::game::settings::GambleFloor;
use crate::model::player::Seat;
use serde::{Deserialize, Serialize};

/// Multiplier applied to the reroll total, won or lost.
pub const GAMBLE_MULTIPLIER: i32 = 2;

/// Offer made after a first roll while a second chance is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondChanceInfo {
    /// Total (base + bonus) of the first roll.
    pub initial_score: i32,
    pub seat: Seat,
    /// Score before this turn's first roll; the gamble is settled against it.
    pub score_before_turn: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GambleOutcome {
    pub reroll: i32,
    pub won: bool,
    /// `+2 * reroll` on a win, `-2 * reroll` on a loss.
    pub delta: i32,
    pub final_score: i32,
}

impl GambleOutcome {
    /// Points the score actually moved relative to the pre-turn score.
    pub fn applied_delta(&self, info: &SecondChanceInfo) -> i32 {
        self.final_score - info.score_before_turn
    }
}

impl SecondChanceInfo {
    /// Settles the reroll. Only a strictly higher total wins.
    pub fn resolve(&self, reroll: i32, floor: GambleFloor) -> GambleOutcome {
        let won = reroll > self.initial_score;
        let delta = if won {
            GAMBLE_MULTIPLIER * reroll
        } else {
            -GAMBLE_MULTIPLIER * reroll
        };
        GambleOutcome {
            reroll,
            won,
            delta,
            final_score: floor.apply(self.score_before_turn + delta),
        }
    }
}
