#![allow(dead_code)]

use rand::RngCore;
use taas_core::game::settings::default_names;
use taas_core::policy::{CpuPolicy, PolicyContext};
use taas_core::rng::LoadedDice;
use taas_core::{
    Game, GameServices, GameSettings, Pacing, Phase, Ruleset, Seat, TimerQueue, VoteChoice,
    WinCondition,
};

pub const TIMER_LIMIT: usize = 10_000;

/// Always answers the same way.
#[derive(Debug, Clone, Copy)]
pub struct FixedPolicy {
    pub accept: bool,
    pub request: bool,
    pub vote: VoteChoice,
}

impl FixedPolicy {
    pub fn quiet() -> Self {
        Self {
            accept: false,
            request: false,
            vote: VoteChoice::Yes,
        }
    }
}

impl CpuPolicy for FixedPolicy {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn accept_second_chance(&mut self, _ctx: &PolicyContext, _rng: &mut dyn RngCore) -> bool {
        self.accept
    }

    fn request_vote(&mut self, _ctx: &PolicyContext, _rng: &mut dyn RngCore) -> bool {
        self.request
    }

    fn cast_vote(&mut self, _ctx: &PolicyContext, _rng: &mut dyn RngCore) -> VoteChoice {
        self.vote
    }
}

pub fn table(humans: usize, num_dice: usize, win_condition: WinCondition, win_value: u32) -> GameSettings {
    GameSettings {
        num_players: humans,
        player_names: default_names(humans),
        num_dice,
        win_condition,
        win_value,
        ruleset: Ruleset::default(),
    }
}

/// First value picks the opening seat, the rest are die faces in roll order.
pub fn script(opener: Seat, faces: &[u32]) -> Vec<u32> {
    let mut script = vec![opener.index() as u32];
    script.extend_from_slice(faces);
    script
}

pub fn start(settings: GameSettings, script: Vec<u32>, policy: FixedPolicy) -> (Game, TimerQueue) {
    let services = GameServices::seeded(7)
        .with_dice(LoadedDice::new(script))
        .with_policy(policy)
        .with_pacing(Pacing::instant());
    let mut queue = TimerQueue::new();
    let game = Game::start(settings, services, &mut queue).expect("valid settings");
    (game, queue)
}

/// Plays one human first roll and lets the turn settle.
pub fn roll(game: &mut Game, queue: &mut TimerQueue) {
    assert!(game.request_roll(queue).is_applied(), "roll refused in {:?}", game.phase());
    game.run_timers(queue, TIMER_LIMIT);
}

/// Plays a human turn, declining any gamble offer.
pub fn play_turn(game: &mut Game, queue: &mut TimerQueue) {
    roll(game, queue);
    if game.phase() == Phase::SecondChanceOffered {
        assert!(game.decide_second_chance(false, queue).is_applied());
        game.run_timers(queue, TIMER_LIMIT);
    }
}

/// Drives human seats with a fixed routine until the game ends.
pub fn autopilot(game: &mut Game, queue: &mut TimerQueue, max_steps: usize) -> usize {
    let mut steps = 0;
    while !game.is_game_over() && steps < max_steps {
        steps += 1;
        if let Some(vote) = game.vote().cloned() {
            for seat in vote.waiting_on() {
                if !game.player(seat).is_cpu {
                    let _ = game.cast_vote(seat, VoteChoice::Yes, queue);
                }
            }
        } else if !game.player(game.current_seat()).is_cpu {
            let _ = match game.phase() {
                Phase::AwaitingRoll | Phase::AwaitingSecondRoll => game.request_roll(queue),
                Phase::SecondChanceOffered => game.decide_second_chance(steps % 2 == 0, queue),
                _ => taas_core::Ack::Ignored,
            };
        }
        game.run_timers(queue, TIMER_LIMIT);
    }
    steps
}
