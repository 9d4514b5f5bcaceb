use super::{CpuPolicy, PolicyContext};
use crate::game::vote::VoteChoice;
use rand::{Rng, RngCore};
use tracing::{Level, event};

/// Coin-flip player: gambles half the time, asks for a vote now and then
/// when trailing, and tends to agree with others.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CasualPolicy {
    accept_probability: f64,
    request_probability: f64,
    yes_probability: f64,
}

impl CasualPolicy {
    pub const ACCEPT_PROBABILITY: f64 = 0.5;
    pub const REQUEST_PROBABILITY: f64 = 0.15;
    pub const YES_PROBABILITY: f64 = 0.6;

    /// Probabilities are clamped into `[0, 1]`; NaN counts as 0.
    pub fn new(accept_probability: f64, request_probability: f64, yes_probability: f64) -> Self {
        Self {
            accept_probability: unit(accept_probability),
            request_probability: unit(request_probability),
            yes_probability: unit(yes_probability),
        }
    }

    pub fn accept_probability(&self) -> f64 {
        self.accept_probability
    }

    pub fn request_probability(&self) -> f64 {
        self.request_probability
    }

    pub fn yes_probability(&self) -> f64 {
        self.yes_probability
    }
}

impl Default for CasualPolicy {
    fn default() -> Self {
        Self::new(
            Self::ACCEPT_PROBABILITY,
            Self::REQUEST_PROBABILITY,
            Self::YES_PROBABILITY,
        )
    }
}

impl CpuPolicy for CasualPolicy {
    fn name(&self) -> &'static str {
        "casual"
    }

    fn accept_second_chance(&mut self, ctx: &PolicyContext, rng: &mut dyn RngCore) -> bool {
        let accept = rng.gen_bool(self.accept_probability);
        log_decision(ctx, "second_chance", accept);
        accept
    }

    fn request_vote(&mut self, ctx: &PolicyContext, rng: &mut dyn RngCore) -> bool {
        if !ctx.may_request_vote() || !ctx.is_behind_leader() {
            return false;
        }
        let request = rng.gen_bool(self.request_probability);
        log_decision(ctx, "request_vote", request);
        request
    }

    fn cast_vote(&mut self, ctx: &PolicyContext, rng: &mut dyn RngCore) -> VoteChoice {
        let choice = if rng.gen_bool(self.yes_probability) {
            VoteChoice::Yes
        } else {
            VoteChoice::No
        };
        log_decision(ctx, "cast_vote", choice == VoteChoice::Yes);
        choice
    }
}

fn unit(p: f64) -> f64 {
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}

fn log_decision(ctx: &PolicyContext, decision: &'static str, yes: bool) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }
    event!(
        target: "taas_core::cpu",
        Level::DEBUG,
        seat = %ctx.seat,
        round = ctx.current_round,
        score = ctx.player().score,
        leader = ctx.leader_score(),
        offered = ?ctx.offered_score,
        decision,
        yes
    );
}
