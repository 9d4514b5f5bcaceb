//! Sources of dice randomness.
//!
//! Player-facing draws (die faces, the opening seat) go through a
//! [`DiceSource`]. Games use [`SecureDice`]; [`SeededDice`] and
//! [`LoadedDice`] exist for simulation and tests.

use crate::model::die::Die;
use rand::rngs::{OsRng, StdRng};
use rand::{Rng, RngCore, SeedableRng};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RngError {
    #[error("secure random source unavailable: {0}")]
    Unavailable(#[from] rand::Error),
}

pub trait DiceSource: Send {
    /// Uniform integer in `[min, max]`, both inclusive.
    fn random_int(&mut self, min: u32, max: u32) -> u32;

    fn roll_die(&mut self) -> Die {
        let value = self.random_int(Die::MIN as u32, Die::MAX as u32);
        Die::new(value as u8).unwrap_or_default()
    }

    fn roll(&mut self, count: usize) -> Vec<Die> {
        (0..count).map(|_| self.roll_die()).collect()
    }
}

/// Dice backed by the operating system CSPRNG.
#[derive(Debug)]
pub struct SecureDice {
    rng: OsRng,
}

impl SecureDice {
    /// Probes the OS source once so a missing one fails here rather than mid-game.
    pub fn new() -> Result<Self, RngError> {
        let mut rng = OsRng;
        let mut probe = [0u8; 8];
        rng.try_fill_bytes(&mut probe)?;
        Ok(Self { rng })
    }
}

impl DiceSource for SecureDice {
    fn random_int(&mut self, min: u32, max: u32) -> u32 {
        sample(&mut self.rng, min, max)
    }
}

/// Reproducible dice for simulations. Not suitable for real games.
#[derive(Debug, Clone)]
pub struct SeededDice {
    rng: StdRng,
}

impl SeededDice {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl DiceSource for SeededDice {
    fn random_int(&mut self, min: u32, max: u32) -> u32 {
        sample(&mut self.rng, min, max)
    }
}

/// Replays a fixed script of values, cycling once exhausted.
///
/// Values are clamped into the requested range, so a script of faces can
/// also drive the opening-seat draw.
#[derive(Debug, Clone)]
pub struct LoadedDice {
    script: Vec<u32>,
    cursor: usize,
}

impl LoadedDice {
    pub fn new(script: impl Into<Vec<u32>>) -> Self {
        Self {
            script: script.into(),
            cursor: 0,
        }
    }

    pub fn drawn(&self) -> usize {
        self.cursor
    }
}

impl DiceSource for LoadedDice {
    fn random_int(&mut self, min: u32, max: u32) -> u32 {
        if self.script.is_empty() {
            return min;
        }
        let value = self.script[self.cursor % self.script.len()];
        self.cursor += 1;
        value.clamp(min, max.max(min))
    }
}

fn sample<R: RngCore + ?Sized>(rng: &mut R, min: u32, max: u32) -> u32 {
    if min >= max {
        return min;
    }
    rng.gen_range(min..=max)
}
