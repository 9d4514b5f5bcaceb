mod casual;

pub use casual::CasualPolicy;

use crate::game::vote::{VoteChoice, VoteInfo};
use crate::model::player::{Player, Seat};
use rand::RngCore;

/// Read-only view handed to a CPU player for one decision.
pub struct PolicyContext<'a> {
    pub seat: Seat,
    pub players: &'a [Player],
    pub current_round: u32,
    pub second_chance_active: bool,
    pub vote: Option<&'a VoteInfo>,
    /// First-roll total while a gamble offer is open.
    pub offered_score: Option<i32>,
}

impl PolicyContext<'_> {
    pub fn player(&self) -> &Player {
        &self.players[self.seat.index()]
    }

    pub fn leader_score(&self) -> i32 {
        self.players.iter().map(|p| p.score).max().unwrap_or(0)
    }

    pub fn is_behind_leader(&self) -> bool {
        self.player().score < self.leader_score()
    }

    /// Cooldown elapsed, no second chance running and no vote open.
    pub fn may_request_vote(&self) -> bool {
        self.player().vote_cooldown_elapsed(self.current_round)
            && !self.second_chance_active
            && self.vote.is_none()
    }
}

/// Decisions a computer-controlled seat makes. The game supplies the RNG so
/// runs can be reseeded.
pub trait CpuPolicy: Send {
    fn name(&self) -> &'static str;

    fn accept_second_chance(&mut self, ctx: &PolicyContext, rng: &mut dyn RngCore) -> bool;

    /// Asked once per CPU turn before rolling.
    fn request_vote(&mut self, ctx: &PolicyContext, rng: &mut dyn RngCore) -> bool;

    fn cast_vote(&mut self, ctx: &PolicyContext, rng: &mut dyn RngCore) -> VoteChoice;
}
