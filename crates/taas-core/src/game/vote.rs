use crate::model::player::Seat;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Yes-votes needed to switch the second chance on.
pub const ACCEPT_THRESHOLD: usize = 3;
/// No-votes that sink a request.
pub const REJECT_THRESHOLD: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteChoice {
    Yes,
    No,
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VoteChoice::Yes => "yes",
            VoteChoice::No => "no",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteOutcome {
    Pending,
    Accepted,
    Rejected,
}

/// An open request to switch on the second chance, tallied over all four seats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteInfo {
    pub requester: Seat,
    pub votes: [Option<VoteChoice>; Seat::COUNT],
}

impl VoteInfo {
    /// Opens a vote with the requester's own yes already recorded.
    pub fn open(requester: Seat) -> Self {
        let mut votes = [None; Seat::COUNT];
        votes[requester.index()] = Some(VoteChoice::Yes);
        Self { requester, votes }
    }

    pub fn vote_of(&self, seat: Seat) -> Option<VoteChoice> {
        self.votes[seat.index()]
    }

    pub fn has_voted(&self, seat: Seat) -> bool {
        self.vote_of(seat).is_some()
    }

    /// Records a first vote. Returns false, leaving the tally alone, if the
    /// seat already voted or the vote is already decided.
    pub fn cast(&mut self, seat: Seat, choice: VoteChoice) -> bool {
        if self.has_voted(seat) || self.outcome() != VoteOutcome::Pending {
            return false;
        }
        self.votes[seat.index()] = Some(choice);
        true
    }

    pub fn count(&self, choice: VoteChoice) -> usize {
        self.votes.iter().filter(|v| **v == Some(choice)).count()
    }

    pub fn outcome(&self) -> VoteOutcome {
        if self.count(VoteChoice::Yes) >= ACCEPT_THRESHOLD {
            VoteOutcome::Accepted
        } else if self.count(VoteChoice::No) >= REJECT_THRESHOLD {
            VoteOutcome::Rejected
        } else {
            VoteOutcome::Pending
        }
    }

    pub fn waiting_on(&self) -> Vec<Seat> {
        Seat::LOOP
            .iter()
            .copied()
            .filter(|seat| !self.has_voted(*seat))
            .collect()
    }
}

/// Running count of votes over a game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub requested: u32,
    pub accepted: u32,
    pub rejected: u32,
}

impl VoteTally {
    pub fn record(&mut self, outcome: VoteOutcome) {
        match outcome {
            VoteOutcome::Pending => {}
            VoteOutcome::Accepted => self.accepted += 1,
            VoteOutcome::Rejected => self.rejected += 1,
        }
    }
}
