//! Dice scoring: the face sum plus a combination bonus.
//!
//! Two bonus rules exist. [`BonusRich`] pays +1 for every six and rewards
//! every other repeated face; [`SingleSix`] only pays the six bonus when
//! exactly one six shows, and treats sixes like any other repeated face.

use crate::model::die::Die;
use core::fmt;
use serde::{Deserialize, Serialize};

/// One contribution to the bonus of a roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BonusPart {
    /// Sixes paid at +1 each.
    Sixes { count: u8, bonus: u32 },
    /// A face shown two to five times, paid at `face * (count - 1)`.
    Match { face: u8, count: u8, bonus: u32 },
}

impl BonusPart {
    pub const fn bonus(self) -> u32 {
        match self {
            BonusPart::Sixes { bonus, .. } | BonusPart::Match { bonus, .. } => bonus,
        }
    }
}

impl fmt::Display for BonusPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            BonusPart::Sixes { count: 1, bonus } => write!(f, "six bonus: +{bonus}"),
            BonusPart::Sixes { count, bonus } => write!(f, "{count} sixes: +{bonus}"),
            BonusPart::Match { face, count, bonus } => {
                let group = match count {
                    2 => "pair of",
                    3 => "three",
                    4 => "four",
                    _ => "five",
                };
                write!(f, "{group} {face}s: +{bonus}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base: u32,
    pub bonus: u32,
    pub parts: Vec<BonusPart>,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.base + self.bonus
    }

    /// Bonus description, groups separated by `" | "`; empty without bonus.
    pub fn message(&self) -> String {
        self.parts
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" | ")
    }

    fn push(&mut self, part: BonusPart) {
        self.bonus += part.bonus();
        self.parts.push(part);
    }
}

/// A bonus strategy. Implementations must be pure.
pub trait ScoringRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn score(&self, dice: &[Die]) -> ScoreBreakdown;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BonusRich;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SingleSix;

impl ScoringRule for BonusRich {
    fn name(&self) -> &'static str {
        "bonus_rich"
    }

    fn score(&self, dice: &[Die]) -> ScoreBreakdown {
        let mut breakdown = base_only(dice);
        let counts = face_counts(dice);
        let sixes = counts[5];

        if dice.len() == 1 {
            if sixes == 1 {
                breakdown.push(BonusPart::Sixes { count: 1, bonus: 1 });
            }
            return breakdown;
        }

        if sixes > 0 {
            breakdown.push(BonusPart::Sixes {
                count: sixes,
                bonus: sixes as u32,
            });
        }
        for die in Die::ALL.iter().copied().filter(|d| !d.is_six()) {
            if let Some(part) = match_part(die, counts[die.value() as usize - 1]) {
                breakdown.push(part);
            }
        }
        breakdown
    }
}

impl ScoringRule for SingleSix {
    fn name(&self) -> &'static str {
        "single_six"
    }

    fn score(&self, dice: &[Die]) -> ScoreBreakdown {
        let mut breakdown = base_only(dice);
        let counts = face_counts(dice);

        if counts[5] == 1 {
            breakdown.push(BonusPart::Sixes { count: 1, bonus: 1 });
        }
        for die in Die::ALL {
            if let Some(part) = match_part(die, counts[die.value() as usize - 1]) {
                breakdown.push(part);
            }
        }
        breakdown
    }
}

/// Selects which [`ScoringRule`] a game uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringVariant {
    #[default]
    BonusRich,
    SingleSix,
}

impl ScoringVariant {
    pub fn rule(self) -> &'static dyn ScoringRule {
        match self {
            ScoringVariant::BonusRich => &BonusRich,
            ScoringVariant::SingleSix => &SingleSix,
        }
    }

    pub fn score(self, dice: &[Die]) -> ScoreBreakdown {
        self.rule().score(dice)
    }
}

fn base_only(dice: &[Die]) -> ScoreBreakdown {
    ScoreBreakdown {
        base: dice.iter().map(|d| d.value() as u32).sum(),
        bonus: 0,
        parts: Vec::new(),
    }
}

fn face_counts(dice: &[Die]) -> [u8; 6] {
    let mut counts = [0u8; 6];
    for die in dice {
        let slot = &mut counts[die.value() as usize - 1];
        *slot = slot.saturating_add(1);
    }
    counts
}

fn match_part(die: Die, count: u8) -> Option<BonusPart> {
    if !(2..=5).contains(&count) {
        return None;
    }
    Some(BonusPart::Match {
        face: die.value(),
        count,
        bonus: die.value() as u32 * (count as u32 - 1),
    })
}
