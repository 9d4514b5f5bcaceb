mod common;

use common::{autopilot, table};
use taas_core::{Game, GameServices, Phase, TimerQueue, WinCondition};

fn play_seeded(seed: u64, humans: usize, win_condition: WinCondition, win_value: u32) -> Game {
    let mut queue = TimerQueue::new();
    let mut game = Game::start(
        table(humans, 3, win_condition, win_value),
        GameServices::seeded(seed),
        &mut queue,
    )
    .expect("valid settings");
    autopilot(&mut game, &mut queue, 100_000);
    game
}

#[test]
fn seeded_round_games_finish_on_the_target_round() {
    for seed in 0..20 {
        let game = play_seeded(seed, 1, WinCondition::Rounds, 6);
        assert_eq!(game.phase(), Phase::GameOver, "seed {seed}");
        assert_eq!(game.turn().current_round, 6);
        assert!(!game.winners().is_empty());

        let turns: Vec<usize> = game.players().iter().map(|p| p.history.len()).collect();
        assert!(turns.iter().all(|t| *t == 6), "seed {seed}: {turns:?}");
        for player in game.players() {
            assert_eq!(player.score_history.len(), player.history.len() + 1);
            assert_eq!(player.score_history.last().copied(), Some(player.score));
        }
    }
}

#[test]
fn seeded_score_games_end_with_a_winner_at_or_above_the_leaders() {
    for seed in 0..20 {
        let game = play_seeded(seed, 2, WinCondition::Score, 60);
        assert_eq!(game.phase(), Phase::GameOver, "seed {seed}");

        let best = game.players().iter().map(|p| p.score).max().unwrap_or(0);
        assert!(best >= 60, "seed {seed}: best {best}");
        for seat in game.winners() {
            assert_eq!(game.player(*seat).score, best);
        }
        for player in game.players() {
            assert_eq!(player.turns_completed(), player.history.len());
            let gambles = player.second_chance_history.len() as u32;
            assert!(player.second_chance_wins <= gambles);
        }
    }
}

#[test]
fn equal_seeds_replay_the_same_game() {
    let a = play_seeded(99, 1, WinCondition::Score, 80);
    let b = play_seeded(99, 1, WinCondition::Score, 80);
    assert_eq!(a.players(), b.players());
    assert_eq!(a.winners(), b.winners());
    assert_eq!(a.turn(), b.turn());
}
