use crate::game::schedule::{Pacing, Scheduler, Timer, TimerQueue};
use crate::game::second_chance::{GambleOutcome, SecondChanceInfo};
use crate::game::settings::{GameSettings, SettingsError, WinCondition};
use crate::game::snapshot::{GameMessage, GameSnapshot, PendingPrompt};
use crate::game::vote::{VoteChoice, VoteInfo, VoteOutcome, VoteTally};
use crate::model::die::Die;
use crate::model::player::{Player, Seat, TurnRecord};
use crate::policy::{CasualPolicy, CpuPolicy, PolicyContext};
use crate::rng::{DiceSource, RngError, SecureDice, SeededDice};
use crate::scoring::ScoreBreakdown;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{Level, event};

#[derive(Debug, Error)]
pub enum GameError {
    #[error("invalid settings: {0}")]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Rng(#[from] RngError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    AwaitingRoll,
    Rolling { gamble: bool },
    SecondChanceOffered,
    AwaitingSecondRoll,
    /// Score applied; the turn ends when the reveal timer fires.
    Revealing,
    GameOver,
    Exited,
}

impl Phase {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Phase::GameOver | Phase::Exited)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    pub current_player: Seat,
    pub dice: Vec<Die>,
    pub is_rolling: bool,
    pub current_round: u32,
    /// Seat whose turn opens a round. In score mode it moves to the first
    /// player to reach the target, giving everyone else one last lap.
    pub round_start: Seat,
}

/// Whether a command or timer changed the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Ack {
    Applied,
    Ignored,
}

impl Ack {
    pub const fn is_applied(self) -> bool {
        matches!(self, Ack::Applied)
    }
}

/// Randomness, CPU brains and pacing a game runs with.
pub struct GameServices {
    pub dice: Box<dyn DiceSource>,
    pub policy: Box<dyn CpuPolicy>,
    pub cpu_rng: SmallRng,
    pub pacing: Pacing,
}

impl GameServices {
    /// Production setup: OS-backed dice, entropy-seeded CPU decisions, table pacing.
    pub fn secure() -> Result<Self, RngError> {
        Ok(Self {
            dice: Box::new(SecureDice::new()?),
            policy: Box::new(CasualPolicy::default()),
            cpu_rng: SmallRng::from_entropy(),
            pacing: Pacing::default(),
        })
    }

    /// Fully reproducible setup with zero delays.
    pub fn seeded(seed: u64) -> Self {
        Self {
            dice: Box::new(SeededDice::with_seed(seed)),
            policy: Box::new(CasualPolicy::default()),
            cpu_rng: SmallRng::seed_from_u64(seed ^ 0x5EED),
            pacing: Pacing::instant(),
        }
    }

    pub fn with_dice(mut self, dice: impl DiceSource + 'static) -> Self {
        self.dice = Box::new(dice);
        self
    }

    pub fn with_policy(mut self, policy: impl CpuPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub fn with_cpu_seed(mut self, seed: u64) -> Self {
        self.cpu_rng = SmallRng::seed_from_u64(seed);
        self
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }
}

/// The turn and round state machine.
///
/// Every public command is safe to call at any time: a command that does not
/// fit the current phase returns [`Ack::Ignored`] and changes nothing.
pub struct Game {
    settings: GameSettings,
    players: Arc<Vec<Player>>,
    turn: TurnState,
    phase: Phase,
    rolled: Vec<Die>,
    second_chance: Option<SecondChanceInfo>,
    automatic_second_chance: bool,
    /// Seat at which a voted second chance closes again.
    voted_second_chance_until: Option<Seat>,
    vote: Option<VoteInfo>,
    vote_tally: VoteTally,
    winners: Vec<Seat>,
    message: GameMessage,
    bonus_message: Option<String>,
    last_breakdown: Option<ScoreBreakdown>,
    last_gamble: Option<GambleOutcome>,
    turn_epoch: u64,
    vote_epoch: u64,
    toast_epoch: u64,
    services: GameServices,
}

impl Game {
    pub fn start(
        settings: GameSettings,
        mut services: GameServices,
        scheduler: &mut dyn Scheduler,
    ) -> Result<Self, GameError> {
        settings.validate()?;

        let players: Vec<Player> = Seat::LOOP
            .iter()
            .map(|seat| {
                Player::new(
                    settings.player_names[seat.index()].trim(),
                    settings.is_cpu(*seat),
                )
            })
            .collect();

        let opener = services.dice.random_int(0, (Seat::COUNT - 1) as u32);
        let opener = Seat::from_index(opener as usize).unwrap_or(Seat::One);

        let mut game = Self {
            turn: TurnState {
                current_player: opener,
                dice: vec![Die::default(); settings.num_dice],
                is_rolling: false,
                current_round: 1,
                round_start: opener,
            },
            message: GameMessage::Turn {
                name: players[opener.index()].name.clone(),
                final_round: false,
            },
            settings,
            players: Arc::new(players),
            phase: Phase::AwaitingRoll,
            rolled: Vec::new(),
            second_chance: None,
            automatic_second_chance: false,
            voted_second_chance_until: None,
            vote: None,
            vote_tally: VoteTally::default(),
            winners: Vec::new(),
            bonus_message: None,
            last_breakdown: None,
            last_gamble: None,
            turn_epoch: 1,
            vote_epoch: 0,
            toast_epoch: 0,
            services,
        };

        game.refresh_automatic_second_chance();
        event!(
            target: "taas_core::turn",
            Level::INFO,
            opener = %opener,
            humans = game.settings.num_players,
            dice = game.settings.num_dice,
            win_condition = ?game.settings.win_condition,
            win_value = game.settings.win_value,
            ruleset = game.settings.ruleset.version(),
            "game started"
        );
        game.begin_turn(scheduler);
        Ok(game)
    }

    /// Validates the settings, then starts with [`GameServices::secure`].
    pub fn start_secure(
        settings: GameSettings,
        scheduler: &mut dyn Scheduler,
    ) -> Result<Self, GameError> {
        settings.validate()?;
        let services = GameServices::secure()?;
        Self::start(settings, services, scheduler)
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn players(&self) -> &[Player] {
        self.players.as_slice()
    }

    pub fn player(&self, seat: Seat) -> &Player {
        &self.players[seat.index()]
    }

    pub fn turn(&self) -> &TurnState {
        &self.turn
    }

    pub fn current_seat(&self) -> Seat {
        self.turn.current_player
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn winners(&self) -> &[Seat] {
        &self.winners
    }

    pub fn message(&self) -> &GameMessage {
        &self.message
    }

    pub fn bonus_message(&self) -> Option<&str> {
        self.bonus_message.as_deref()
    }

    pub fn vote(&self) -> Option<&VoteInfo> {
        self.vote.as_ref()
    }

    pub fn vote_tally(&self) -> VoteTally {
        self.vote_tally
    }

    pub fn second_chance_offer(&self) -> Option<&SecondChanceInfo> {
        self.second_chance.as_ref()
    }

    pub fn automatic_second_chance(&self) -> bool {
        self.automatic_second_chance
    }

    pub fn voted_second_chance(&self) -> bool {
        self.voted_second_chance_until.is_some()
    }

    /// Either the automatic or the voted second chance is on.
    pub fn second_chance_active(&self) -> bool {
        self.automatic_second_chance || self.voted_second_chance_until.is_some()
    }

    pub fn last_breakdown(&self) -> Option<&ScoreBreakdown> {
        self.last_breakdown.as_ref()
    }

    pub fn last_gamble(&self) -> Option<&GambleOutcome> {
        self.last_gamble.as_ref()
    }

    pub fn pending_prompt(&self) -> PendingPrompt {
        if let Some(vote) = &self.vote {
            return PendingPrompt::Vote(vote.clone());
        }
        match (self.phase, self.second_chance) {
            (Phase::SecondChanceOffered, Some(info)) => PendingPrompt::SecondChance(info),
            _ => PendingPrompt::None,
        }
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            ruleset_version: self.settings.ruleset.version().to_string(),
            players: Arc::clone(&self.players),
            turn: self.turn.clone(),
            phase: self.phase,
            game_over: self.is_game_over(),
            winners: self.winners.clone(),
            message: self.message.clone(),
            pending_prompt: self.pending_prompt(),
            bonus_message: self.bonus_message.clone(),
            second_chance_active: self.second_chance_active(),
            automatic_second_chance: self.automatic_second_chance,
        }
    }

    /// Human roll request for the current seat.
    pub fn request_roll(&mut self, scheduler: &mut dyn Scheduler) -> Ack {
        if self.current().is_cpu {
            return self.ignored("request_roll");
        }
        self.roll(scheduler)
    }

    /// Human answer to an open gamble offer.
    pub fn decide_second_chance(&mut self, accept: bool, scheduler: &mut dyn Scheduler) -> Ack {
        if self.current().is_cpu {
            return self.ignored("decide_second_chance");
        }
        self.apply_second_chance_decision(accept, scheduler)
    }

    /// Human request to put the second chance to a vote.
    pub fn request_vote(&mut self, seat: Seat, scheduler: &mut dyn Scheduler) -> Ack {
        if self.player(seat).is_cpu {
            return self.ignored("request_vote");
        }
        self.open_vote(seat, scheduler)
    }

    /// Human ballot in the open vote.
    pub fn cast_vote(&mut self, seat: Seat, choice: VoteChoice, scheduler: &mut dyn Scheduler) -> Ack {
        if self.player(seat).is_cpu {
            return self.ignored("cast_vote");
        }
        self.record_vote(seat, choice, scheduler)
    }

    /// Leaves the table. A finished game keeps its `GameOver` result.
    pub fn exit_game(&mut self) -> GameSnapshot {
        if !self.phase.is_terminal() {
            self.phase = Phase::Exited;
            self.vote = None;
            self.turn.is_rolling = false;
            self.message = GameMessage::Exited;
            event!(
                target: "taas_core::turn",
                Level::INFO,
                round = self.turn.current_round,
                "game exited"
            );
        }
        self.snapshot()
    }

    /// Delivers a timer previously handed to the scheduler.
    pub fn fire(&mut self, timer: Timer, scheduler: &mut dyn Scheduler) -> Ack {
        match timer {
            Timer::CpuTurn { seat, turn } => self.on_cpu_turn(seat, turn, scheduler),
            Timer::DiceSettle { turn } => self.on_dice_settle(turn, scheduler),
            Timer::ScoreReveal { turn } => self.on_score_reveal(turn, scheduler),
            Timer::BonusExpire { toast } => {
                if toast != self.toast_epoch || self.bonus_message.is_none() {
                    return Ack::Ignored;
                }
                self.bonus_message = None;
                Ack::Applied
            }
            Timer::CpuVote { seat, vote } => self.on_cpu_vote(seat, vote, scheduler),
        }
    }

    /// Fires queued timers until the queue drains or `limit` timers ran.
    /// Returns how many timers were delivered.
    pub fn run_timers(&mut self, queue: &mut TimerQueue, limit: usize) -> usize {
        let mut fired = 0;
        while fired < limit {
            let Some(timer) = queue.pop() else {
                break;
            };
            let _ = self.fire(timer, queue);
            fired += 1;
        }
        fired
    }

    fn current(&self) -> &Player {
        self.player(self.turn.current_player)
    }

    fn player_mut(&mut self, seat: Seat) -> &mut Player {
        &mut Arc::make_mut(&mut self.players)[seat.index()]
    }

    fn ignored(&self, command: &'static str) -> Ack {
        event!(
            target: "taas_core::turn",
            Level::DEBUG,
            command,
            phase = ?self.phase,
            seat = %self.turn.current_player,
            vote_open = self.vote.is_some(),
            "command ignored"
        );
        Ack::Ignored
    }

    fn begin_turn(&mut self, scheduler: &mut dyn Scheduler) {
        self.phase = Phase::AwaitingRoll;
        self.second_chance = None;
        self.turn.is_rolling = false;
        self.message = GameMessage::Turn {
            name: self.current().name.clone(),
            final_round: self.automatic_second_chance,
        };
        self.schedule_cpu_turn(scheduler);
    }

    fn schedule_cpu_turn(&mut self, scheduler: &mut dyn Scheduler) {
        if self.phase.is_terminal() || !self.current().is_cpu {
            return;
        }
        scheduler.after(
            self.services.pacing.cpu_think,
            Timer::CpuTurn {
                seat: self.turn.current_player,
                turn: self.turn_epoch,
            },
        );
    }

    fn roll(&mut self, scheduler: &mut dyn Scheduler) -> Ack {
        let gamble = match self.phase {
            Phase::AwaitingRoll => false,
            Phase::AwaitingSecondRoll => true,
            _ => return self.ignored("roll"),
        };
        if self.vote.is_some() {
            return self.ignored("roll");
        }

        self.rolled = self.services.dice.roll(self.settings.num_dice);
        self.phase = Phase::Rolling { gamble };
        self.turn.is_rolling = true;
        scheduler.after(
            self.services.pacing.dice_settle,
            Timer::DiceSettle {
                turn: self.turn_epoch,
            },
        );
        Ack::Applied
    }

    fn on_dice_settle(&mut self, turn: u64, scheduler: &mut dyn Scheduler) -> Ack {
        let Phase::Rolling { gamble } = self.phase else {
            return Ack::Ignored;
        };
        if turn != self.turn_epoch {
            return Ack::Ignored;
        }

        let dice = std::mem::take(&mut self.rolled);
        let breakdown = self.settings.ruleset.scoring.score(&dice);
        self.turn.dice = dice;
        self.turn.is_rolling = false;
        self.show_bonus(&breakdown, scheduler);

        let seat = self.turn.current_player;
        let total = breakdown.total() as i32;
        let target_reached_before = self.anyone_at_target();
        let offer = !gamble && self.second_chance_active();

        if gamble {
            self.settle_gamble(seat, total);
        } else {
            let score_before_turn = self.player(seat).score;
            let player = self.player_mut(seat);
            player.score += total;
            player.history.push(TurnRecord {
                score: breakdown.base,
                bonus: breakdown.bonus,
            });
            self.message = GameMessage::Rolled {
                name: self.current().name.clone(),
                total,
            };
            if offer {
                self.second_chance = Some(SecondChanceInfo {
                    initial_score: total,
                    seat,
                    score_before_turn,
                });
            }
        }

        let faces: Vec<u8> = self.turn.dice.iter().map(|d| d.value()).collect();
        event!(
            target: "taas_core::turn",
            Level::INFO,
            seat = %seat,
            round = self.turn.current_round,
            dice = ?faces,
            base = breakdown.base,
            bonus = breakdown.bonus,
            gamble,
            score = self.player(seat).score,
            "dice settled"
        );

        self.note_target_reached(seat, target_reached_before);
        self.refresh_automatic_second_chance();
        self.last_breakdown = Some(breakdown);

        if offer {
            self.phase = Phase::SecondChanceOffered;
            self.schedule_cpu_turn(scheduler);
        } else {
            self.phase = Phase::Revealing;
            scheduler.after(
                self.services.pacing.score_reveal,
                Timer::ScoreReveal {
                    turn: self.turn_epoch,
                },
            );
        }
        Ack::Applied
    }

    fn settle_gamble(&mut self, seat: Seat, reroll: i32) {
        let Some(info) = self.second_chance else {
            return;
        };
        let outcome = info.resolve(reroll, self.settings.ruleset.gamble_floor);
        let applied = outcome.applied_delta(&info);

        let player = self.player_mut(seat);
        player.score = outcome.final_score;
        player.second_chance_history.push(applied);
        if outcome.won {
            player.second_chance_wins += 1;
        }

        let name = self.current().name.clone();
        self.message = if outcome.won {
            GameMessage::GambleWon {
                name,
                points: outcome.delta,
            }
        } else {
            GameMessage::GambleLost {
                name,
                points: -outcome.delta,
            }
        };

        event!(
            target: "taas_core::gamble",
            Level::INFO,
            seat = %seat,
            initial = info.initial_score,
            reroll,
            won = outcome.won,
            delta = applied,
            score = outcome.final_score,
            "second chance resolved"
        );
        self.last_gamble = Some(outcome);
    }

    fn show_bonus(&mut self, breakdown: &ScoreBreakdown, scheduler: &mut dyn Scheduler) {
        if breakdown.bonus == 0 {
            return;
        }
        self.toast_epoch += 1;
        self.bonus_message = Some(breakdown.message());
        scheduler.after(
            self.services.pacing.bonus_toast,
            Timer::BonusExpire {
                toast: self.toast_epoch,
            },
        );
    }

    fn on_score_reveal(&mut self, turn: u64, scheduler: &mut dyn Scheduler) -> Ack {
        if self.phase != Phase::Revealing || turn != self.turn_epoch {
            return Ack::Ignored;
        }
        self.end_turn(scheduler);
        Ack::Applied
    }

    fn apply_second_chance_decision(&mut self, accept: bool, scheduler: &mut dyn Scheduler) -> Ack {
        if self.phase != Phase::SecondChanceOffered {
            return self.ignored("decide_second_chance");
        }
        if accept {
            self.phase = Phase::AwaitingSecondRoll;
            self.message = GameMessage::ChoseSecondChance {
                name: self.current().name.clone(),
            };
            self.schedule_cpu_turn(scheduler);
        } else {
            self.end_turn(scheduler);
        }
        Ack::Applied
    }

    fn end_turn(&mut self, scheduler: &mut dyn Scheduler) {
        let seat = self.turn.current_player;
        let player = self.player_mut(seat);
        let score = player.score;
        player.score_history.push(score);

        self.second_chance = None;
        self.turn.is_rolling = false;

        let next = seat.next();
        if self.voted_second_chance_until == Some(next) {
            self.voted_second_chance_until = None;
            event!(
                target: "taas_core::vote",
                Level::INFO,
                seat = %next,
                "voted second chance closed"
            );
        }

        if next == self.turn.round_start {
            if self.win_condition_met() {
                self.finish();
                return;
            }
            self.turn.current_round += 1;
            event!(
                target: "taas_core::turn",
                Level::INFO,
                round = self.turn.current_round,
                "round started"
            );
        }

        self.refresh_automatic_second_chance();
        self.turn.current_player = next;
        self.turn_epoch += 1;
        self.begin_turn(scheduler);
    }

    fn win_condition_met(&self) -> bool {
        match self.settings.win_condition {
            WinCondition::Rounds => {
                self.automatic_second_chance
                    && self.turn.current_round >= self.settings.win_value
            }
            WinCondition::Score => self.anyone_at_target(),
        }
    }

    fn finish(&mut self) {
        let best = self.players.iter().map(|p| p.score).max().unwrap_or(0);
        self.winners = Seat::LOOP
            .iter()
            .copied()
            .filter(|seat| self.player(*seat).score == best)
            .collect();
        self.phase = Phase::GameOver;
        self.vote = None;
        self.message = GameMessage::GameOver {
            winners: self
                .winners
                .iter()
                .map(|seat| self.player(*seat).name.clone())
                .collect(),
        };
        event!(
            target: "taas_core::turn",
            Level::INFO,
            round = self.turn.current_round,
            winners = ?self.winners,
            best,
            "game over"
        );
    }

    fn anyone_at_target(&self) -> bool {
        self.settings.win_condition == WinCondition::Score
            && self
                .players
                .iter()
                .any(|p| i64::from(p.score) >= i64::from(self.settings.win_value))
    }

    fn note_target_reached(&mut self, seat: Seat, reached_before: bool) {
        if reached_before || !self.anyone_at_target() {
            return;
        }
        if i64::from(self.player(seat).score) < i64::from(self.settings.win_value) {
            return;
        }
        self.turn.round_start = seat;
        event!(
            target: "taas_core::turn",
            Level::INFO,
            seat = %seat,
            score = self.player(seat).score,
            "target reached, final lap"
        );
    }

    fn refresh_automatic_second_chance(&mut self) {
        let active = match self.settings.win_condition {
            // Sticky once the last round starts.
            WinCondition::Rounds => {
                self.automatic_second_chance
                    || self.turn.current_round >= self.settings.win_value
            }
            WinCondition::Score => self
                .players
                .iter()
                .any(|p| self.settings.second_chance_threshold_reached(p.score)),
        };
        if active != self.automatic_second_chance {
            self.automatic_second_chance = active;
            event!(
                target: "taas_core::turn",
                Level::INFO,
                active,
                round = self.turn.current_round,
                "automatic second chance changed"
            );
        }
    }

    fn open_vote(&mut self, seat: Seat, scheduler: &mut dyn Scheduler) -> Ack {
        if self.phase != Phase::AwaitingRoll
            || self.vote.is_some()
            || seat != self.turn.current_player
            || self.second_chance_active()
        {
            return self.ignored("request_vote");
        }
        let round = self.turn.current_round;
        if !self.player(seat).vote_cooldown_elapsed(round) {
            return self.ignored("request_vote");
        }

        self.player_mut(seat).last_vote_initiated_round = round;
        self.vote_epoch += 1;
        self.vote_tally.requested += 1;
        self.vote = Some(VoteInfo::open(seat));
        self.message = GameMessage::VoteRequested {
            name: self.player(seat).name.clone(),
        };

        for voter in Seat::LOOP {
            if voter == seat || !self.player(voter).is_cpu {
                continue;
            }
            let delay = self.services.pacing.cpu_vote_delay(&mut self.services.cpu_rng);
            scheduler.after(
                delay,
                Timer::CpuVote {
                    seat: voter,
                    vote: self.vote_epoch,
                },
            );
        }

        event!(
            target: "taas_core::vote",
            Level::INFO,
            requester = %seat,
            round,
            "vote opened"
        );
        Ack::Applied
    }

    fn record_vote(&mut self, seat: Seat, choice: VoteChoice, scheduler: &mut dyn Scheduler) -> Ack {
        let Some(vote) = self.vote.as_mut() else {
            return self.ignored("cast_vote");
        };
        if !vote.cast(seat, choice) {
            return self.ignored("cast_vote");
        }
        let outcome = vote.outcome();
        let requester = vote.requester;

        event!(
            target: "taas_core::vote",
            Level::INFO,
            voter = %seat,
            choice = %choice,
            outcome = ?outcome,
            "vote cast"
        );

        self.vote_tally.record(outcome);
        match outcome {
            VoteOutcome::Pending => return Ack::Applied,
            VoteOutcome::Accepted => {
                self.voted_second_chance_until = Some(requester);
                self.message = GameMessage::VoteAccepted;
            }
            VoteOutcome::Rejected => {
                self.message = GameMessage::VoteRejected;
            }
        }
        self.vote = None;
        // A CPU whose turn was held by the vote acts again.
        self.schedule_cpu_turn(scheduler);
        Ack::Applied
    }

    fn on_cpu_vote(&mut self, seat: Seat, vote_id: u64, scheduler: &mut dyn Scheduler) -> Ack {
        let Some(vote) = &self.vote else {
            return Ack::Ignored;
        };
        if vote_id != self.vote_epoch || vote.has_voted(seat) || !self.player(seat).is_cpu {
            return Ack::Ignored;
        }
        let choice = self.decide(seat, |policy, ctx, rng| policy.cast_vote(ctx, rng));
        self.record_vote(seat, choice, scheduler)
    }

    fn on_cpu_turn(&mut self, seat: Seat, turn: u64, scheduler: &mut dyn Scheduler) -> Ack {
        if self.phase.is_terminal()
            || turn != self.turn_epoch
            || seat != self.turn.current_player
            || !self.current().is_cpu
            || self.vote.is_some()
        {
            return Ack::Ignored;
        }

        match self.phase {
            Phase::SecondChanceOffered => {
                let accept =
                    self.decide(seat, |policy, ctx, rng| policy.accept_second_chance(ctx, rng));
                self.apply_second_chance_decision(accept, scheduler)
            }
            Phase::AwaitingRoll => {
                let wants_vote =
                    self.decide(seat, |policy, ctx, rng| policy.request_vote(ctx, rng));
                if wants_vote && self.open_vote(seat, scheduler).is_applied() {
                    return Ack::Applied;
                }
                self.roll(scheduler)
            }
            Phase::AwaitingSecondRoll => self.roll(scheduler),
            _ => Ack::Ignored,
        }
    }

    fn decide<T>(
        &mut self,
        seat: Seat,
        decide: impl FnOnce(&mut dyn CpuPolicy, &PolicyContext<'_>, &mut dyn RngCore) -> T,
    ) -> T {
        let ctx = PolicyContext {
            seat,
            players: self.players.as_slice(),
            current_round: self.turn.current_round,
            second_chance_active: self.automatic_second_chance
                || self.voted_second_chance_until.is_some(),
            vote: self.vote.as_ref(),
            offered_score: self.second_chance.map(|info| info.initial_score),
        };
        let services = &mut self.services;
        decide(services.policy.as_mut(), &ctx, &mut services.cpu_rng)
    }
}
