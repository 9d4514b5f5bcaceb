use rand::SeedableRng;
use rand::rngs::SmallRng;
use taas_core::policy::{CasualPolicy, CpuPolicy, PolicyContext};
use taas_core::{Ack, Game, Phase, Scheduler, Seat};

/// Plays the human seats through the public command interface, one command
/// per step, the way a UI shell would forward clicks.
pub struct Autopilot {
    policy: CasualPolicy,
    rng: SmallRng,
}

impl Autopilot {
    pub fn new(policy: CasualPolicy, seed: u64) -> Self {
        Self {
            policy,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn step(&mut self, game: &mut Game, scheduler: &mut dyn Scheduler) -> Ack {
        if game.vote().is_some() {
            let Some(voter) = pending_human_voter(game) else {
                return Ack::Ignored;
            };
            let choice = self.policy.cast_vote(&context(game, voter), &mut self.rng);
            return game.cast_vote(voter, choice, scheduler);
        }

        let seat = game.current_seat();
        if game.player(seat).is_cpu {
            return Ack::Ignored;
        }

        match game.phase() {
            Phase::AwaitingRoll => {
                let wants_vote = self.policy.request_vote(&context(game, seat), &mut self.rng);
                if wants_vote && game.request_vote(seat, scheduler).is_applied() {
                    return Ack::Applied;
                }
                game.request_roll(scheduler)
            }
            Phase::AwaitingSecondRoll => game.request_roll(scheduler),
            Phase::SecondChanceOffered => {
                let accept = self
                    .policy
                    .accept_second_chance(&context(game, seat), &mut self.rng);
                game.decide_second_chance(accept, scheduler)
            }
            _ => Ack::Ignored,
        }
    }
}

fn pending_human_voter(game: &Game) -> Option<Seat> {
    let vote = game.vote()?;
    vote.waiting_on()
        .into_iter()
        .find(|seat| !game.player(*seat).is_cpu)
}

fn context(game: &Game, seat: Seat) -> PolicyContext<'_> {
    PolicyContext {
        seat,
        players: game.players(),
        current_round: game.turn().current_round,
        second_chance_active: game.second_chance_active(),
        vote: game.vote(),
        offered_score: game.second_chance_offer().map(|offer| offer.initial_score),
    }
}

#[cfg(test)]
mod tests {
    use super::Autopilot;
    use taas_core::game::settings::default_names;
    use taas_core::policy::CasualPolicy;
    use taas_core::{Game, GameServices, GameSettings, Phase, Ruleset, TimerQueue, WinCondition};

    #[test]
    fn drives_a_human_only_table_to_the_end() {
        let settings = GameSettings {
            num_players: 4,
            player_names: default_names(4),
            num_dice: 2,
            win_condition: WinCondition::Rounds,
            win_value: 4,
            ruleset: Ruleset::default(),
        };
        let mut queue = TimerQueue::new();
        let mut game = Game::start(settings, GameServices::seeded(3), &mut queue).expect("start");
        let mut pilot = Autopilot::new(CasualPolicy::new(0.5, 1.0, 0.5), 11);

        for _ in 0..1_000 {
            if game.is_game_over() {
                break;
            }
            let _ = pilot.step(&mut game, &mut queue);
            game.run_timers(&mut queue, 100);
        }
        assert_eq!(game.phase(), Phase::GameOver);
        assert!(game.players().iter().all(|p| p.history.len() == 4));
    }
}
