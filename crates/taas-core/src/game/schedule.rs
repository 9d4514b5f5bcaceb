//! Deferred state-machine inputs.
//!
//! The game never sleeps. It hands a [`Timer`] to a [`Scheduler`] and the
//! host feeds it back through `Game::fire` when the delay has passed. Every
//! timer carries the epoch it was scheduled in, so a timer that outlived its
//! turn or vote is dropped on arrival.

use crate::model::player::Seat;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "timer", rename_all = "snake_case")]
pub enum Timer {
    /// A CPU player acts on its turn (roll, gamble decision, vote request).
    CpuTurn { seat: Seat, turn: u64 },
    /// Rolled dice come to rest and are scored.
    DiceSettle { turn: u64 },
    /// The scored roll has been shown; the turn ends.
    ScoreReveal { turn: u64 },
    /// The bonus toast disappears.
    BonusExpire { toast: u64 },
    /// A CPU player casts its ballot.
    CpuVote { seat: Seat, vote: u64 },
}

pub trait Scheduler {
    fn after(&mut self, delay: Duration, timer: Timer);
}

/// Delays used to pace the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pacing {
    pub cpu_think: Duration,
    pub dice_settle: Duration,
    pub score_reveal: Duration,
    pub bonus_toast: Duration,
    pub cpu_vote_min: Duration,
    pub cpu_vote_max: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            cpu_think: Duration::from_millis(1_500),
            dice_settle: Duration::from_millis(700),
            score_reveal: Duration::from_millis(1_000),
            bonus_toast: Duration::from_millis(2_000),
            cpu_vote_min: Duration::from_millis(1_000),
            cpu_vote_max: Duration::from_millis(2_500),
        }
    }
}

impl Pacing {
    /// Zero delays, for simulations.
    pub const fn instant() -> Self {
        Self {
            cpu_think: Duration::ZERO,
            dice_settle: Duration::ZERO,
            score_reveal: Duration::ZERO,
            bonus_toast: Duration::ZERO,
            cpu_vote_min: Duration::ZERO,
            cpu_vote_max: Duration::ZERO,
        }
    }

    pub fn cpu_vote_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let min = self.cpu_vote_min.as_millis() as u64;
        let max = (self.cpu_vote_max.as_millis() as u64).max(min);
        Duration::from_millis(rng.gen_range(min..=max))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Pending {
    due: Duration,
    seq: u64,
    timer: Timer,
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on (due, seq): earliest first, ties in scheduling order.
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Virtual-clock timer queue. Popping a timer advances the clock to its due time.
#[derive(Debug, Default)]
pub struct TimerQueue {
    now: Duration,
    seq: u64,
    pending: BinaryHeap<Pending>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pop(&mut self) -> Option<Timer> {
        let next = self.pending.pop()?;
        self.now = self.now.max(next.due);
        Some(next.timer)
    }

    pub fn peek(&self) -> Option<&Timer> {
        self.pending.peek().map(|p| &p.timer)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

impl Scheduler for TimerQueue {
    fn after(&mut self, delay: Duration, timer: Timer) {
        self.seq += 1;
        self.pending.push(Pending {
            due: self.now + delay,
            seq: self.seq,
            timer,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::{Pacing, Scheduler, Timer, TimerQueue};
    use crate::model::player::Seat;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::time::Duration;

    #[test]
    fn pops_in_due_order_and_advances_clock() {
        let mut queue = TimerQueue::new();
        queue.after(Duration::from_millis(700), Timer::DiceSettle { turn: 1 });
        queue.after(Duration::from_millis(200), Timer::BonusExpire { toast: 1 });

        assert_eq!(queue.pop(), Some(Timer::BonusExpire { toast: 1 }));
        assert_eq!(queue.now(), Duration::from_millis(200));

        queue.after(Duration::from_millis(100), Timer::ScoreReveal { turn: 1 });
        assert_eq!(queue.pop(), Some(Timer::ScoreReveal { turn: 1 }));
        assert_eq!(queue.pop(), Some(Timer::DiceSettle { turn: 1 }));
        assert_eq!(queue.now(), Duration::from_millis(700));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn equal_deadlines_keep_scheduling_order() {
        let mut queue = TimerQueue::new();
        queue.after(Duration::ZERO, Timer::CpuTurn { seat: Seat::Two, turn: 3 });
        queue.after(Duration::ZERO, Timer::DiceSettle { turn: 3 });
        queue.after(Duration::ZERO, Timer::ScoreReveal { turn: 3 });
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop(), Some(Timer::CpuTurn { seat: Seat::Two, turn: 3 }));
        assert_eq!(queue.pop(), Some(Timer::DiceSettle { turn: 3 }));
        assert_eq!(queue.pop(), Some(Timer::ScoreReveal { turn: 3 }));
    }

    #[test]
    fn vote_delay_stays_in_window() {
        let pacing = Pacing::default();
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..100 {
            let delay = pacing.cpu_vote_delay(&mut rng);
            assert!(delay >= Duration::from_millis(1_000));
            assert!(delay <= Duration::from_millis(2_500));
        }
        assert_eq!(Pacing::instant().cpu_vote_delay(&mut rng), Duration::ZERO);
    }
}
