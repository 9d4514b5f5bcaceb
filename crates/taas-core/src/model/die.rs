use core::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single six-sided die face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Die(u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("die face must be between 1 and 6, got {0}")]
pub struct InvalidFace(pub u8);

impl Die {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;
    pub const SIX: Die = Die(6);

    pub const ALL: [Die; 6] = [Die(1), Die(2), Die(3), Die(4), Die(5), Die(6)];

    pub const fn new(value: u8) -> Option<Self> {
        if value >= Self::MIN && value <= Self::MAX {
            Some(Die(value))
        } else {
            None
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    pub const fn is_six(self) -> bool {
        self.0 == Self::MAX
    }

    /// Converts raw face values, failing on the first value outside 1..=6.
    pub fn parse_all(values: &[u8]) -> Result<Vec<Die>, InvalidFace> {
        values.iter().map(|&v| Die::try_from(v)).collect()
    }
}

impl TryFrom<u8> for Die {
    type Error = InvalidFace;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Die::new(value).ok_or(InvalidFace(value))
    }
}

impl From<Die> for u8 {
    fn from(die: Die) -> Self {
        die.0
    }
}

impl Default for Die {
    fn default() -> Self {
        Die(1)
    }
}

impl fmt::Display for Die {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{Die, InvalidFace};

    #[test]
    fn accepts_only_six_faces() {
        assert_eq!(Die::new(0), None);
        assert_eq!(Die::new(7), None);
        for value in 1..=6 {
            assert_eq!(Die::new(value).map(Die::value), Some(value));
        }
    }

    #[test]
    fn parse_all_reports_offending_value() {
        assert_eq!(Die::parse_all(&[1, 9, 3]), Err(InvalidFace(9)));
        assert_eq!(Die::parse_all(&[6, 6]).unwrap(), vec![Die::SIX, Die::SIX]);
    }

    #[test]
    fn serde_rejects_out_of_range_faces() {
        let die: Die = serde_json::from_str("4").unwrap();
        assert_eq!(die.value(), 4);
        assert!(serde_json::from_str::<Die>("8").is_err());
    }
}
