mod common;

use common::{FixedPolicy, TIMER_LIMIT, autopilot, play_turn, roll, script, start, table};
use taas_core::model::player::TurnRecord;
use taas_core::{
    Game, GameError, GameMessage, Phase, Seat, Timer, TimerQueue, VoteChoice, WinCondition,
};

#[test]
fn rounds_mode_plays_the_final_round_with_gamble_offers() {
    let (mut game, mut queue) = start(
        table(4, 1, WinCondition::Rounds, 2),
        script(Seat::One, &[3; 16]),
        FixedPolicy::quiet(),
    );
    assert_eq!(game.current_seat(), Seat::One);
    assert_eq!(game.turn().current_round, 1);
    assert!(!game.automatic_second_chance());

    for _ in 0..4 {
        roll(&mut game, &mut queue);
        assert_eq!(game.phase(), Phase::AwaitingRoll);
    }
    assert_eq!(game.turn().current_round, 2);
    assert!(game.automatic_second_chance());
    assert!(matches!(
        game.message(),
        GameMessage::Turn {
            final_round: true,
            ..
        }
    ));

    for _ in 0..3 {
        roll(&mut game, &mut queue);
        assert_eq!(game.phase(), Phase::SecondChanceOffered);
        assert!(game.decide_second_chance(false, &mut queue).is_applied());
        game.run_timers(&mut queue, common::TIMER_LIMIT);
    }
    assert!(!game.is_game_over());
    play_turn(&mut game, &mut queue);

    assert!(game.is_game_over());
    assert_eq!(game.turn().current_round, 2);
    assert_eq!(game.winners(), &Seat::LOOP);
    assert_eq!(game.message().to_string(), "Tie between Player 1 and Player 2 and Player 3 and Player 4!");
    for player in game.players() {
        assert_eq!(player.score, 6);
        assert_eq!(player.history, vec![TurnRecord { score: 3, bonus: 0 }; 2]);
        assert_eq!(player.score_history, vec![0, 3, 6]);
    }
}

#[test]
fn round_counter_moves_once_per_lap_from_the_opening_seat() {
    let (mut game, mut queue) = start(
        table(4, 2, WinCondition::Rounds, 20),
        script(Seat::Three, &[1, 2]),
        FixedPolicy::quiet(),
    );
    assert_eq!(game.current_seat(), Seat::Three);
    assert_eq!(game.turn().round_start, Seat::Three);

    let mut rounds_seen = vec![game.turn().current_round];
    for turn in 1..=12 {
        play_turn(&mut game, &mut queue);
        if turn % 4 == 0 {
            assert_eq!(game.current_seat(), Seat::Three);
        } else {
            assert_ne!(game.current_seat(), Seat::Three);
        }
        rounds_seen.push(game.turn().current_round);
    }
    assert_eq!(rounds_seen, vec![1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4]);

    for player in game.players() {
        assert_eq!(player.history.len(), 3);
        assert_eq!(player.score_history.len(), 4);
        assert_eq!(player.turns_completed(), 3);
    }
}

#[test]
fn score_mode_grants_everyone_a_final_turn_after_the_target_is_hit() {
    let low = [1u32; 5];
    let high = [6u32; 5];
    let mut faces = Vec::new();
    // One, Two, Three, Four, then One, Two, Three (hits 70), Four, One, Two.
    for seat_faces in [low, low, high, low, low, low, high, low, low, low] {
        faces.extend_from_slice(&seat_faces);
    }
    let (mut game, mut queue) = start(
        table(4, 5, WinCondition::Score, 50),
        script(Seat::One, &faces),
        FixedPolicy::quiet(),
    );

    for _ in 0..6 {
        play_turn(&mut game, &mut queue);
    }
    assert_eq!(game.current_seat(), Seat::Three);
    assert_eq!(game.player(Seat::Three).score, 35);
    assert!(!game.automatic_second_chance());

    roll(&mut game, &mut queue);
    assert_eq!(game.player(Seat::Three).score, 70);
    assert_eq!(game.turn().round_start, Seat::Three);
    assert!(game.automatic_second_chance());
    assert!(!game.is_game_over());

    for seat in [Seat::Four, Seat::One, Seat::Two] {
        assert!(!game.is_game_over(), "ended before {seat} played");
        assert_eq!(game.current_seat(), seat);
        roll(&mut game, &mut queue);
        assert_eq!(game.phase(), Phase::SecondChanceOffered);
        assert!(game.decide_second_chance(false, &mut queue).is_applied());
        game.run_timers(&mut queue, common::TIMER_LIMIT);
    }

    assert!(game.is_game_over());
    assert_eq!(game.winners(), &[Seat::Three]);
    assert_eq!(game.message().to_string(), "Player 3 wins!");
    assert_eq!(game.player(Seat::One).score, 27);
    assert_eq!(game.player(Seat::Four).score, 18);
}

#[test]
fn a_winning_gamble_that_reaches_the_target_starts_the_final_lap() {
    let mut faces = vec![1, 2, 1, 2, 1, 2];
    // One rolls 3, gambles and rerolls 14 for 0 + 28.
    faces.extend_from_slice(&[1, 2, 6, 6]);
    faces.extend_from_slice(&[1, 2, 1, 2, 1, 2]);
    let (mut game, mut queue) = start(
        table(4, 2, WinCondition::Score, 20),
        script(Seat::Two, &faces),
        FixedPolicy::quiet(),
    );

    for _ in 0..3 {
        play_turn(&mut game, &mut queue);
    }
    assert_eq!(game.current_seat(), Seat::One);
    assert_eq!(game.turn().round_start, Seat::Two);

    assert!(game.request_vote(Seat::One, &mut queue).is_applied());
    assert!(game.cast_vote(Seat::Two, VoteChoice::Yes, &mut queue).is_applied());
    assert!(game.cast_vote(Seat::Three, VoteChoice::Yes, &mut queue).is_applied());
    assert!(game.voted_second_chance());

    roll(&mut game, &mut queue);
    assert_eq!(game.phase(), Phase::SecondChanceOffered);
    assert_eq!(game.player(Seat::One).score, 3);
    assert_eq!(game.turn().round_start, Seat::Two);
    assert!(game.decide_second_chance(true, &mut queue).is_applied());
    game.run_timers(&mut queue, TIMER_LIMIT);
    roll(&mut game, &mut queue);

    assert_eq!(game.player(Seat::One).score, 28);
    assert_eq!(game.player(Seat::One).second_chance_history, vec![28]);
    assert_eq!(game.turn().round_start, Seat::One);
    assert!(!game.is_game_over());

    let mut final_lap = Vec::new();
    while !game.is_game_over() {
        let seat = game.current_seat();
        final_lap.push(seat);
        roll(&mut game, &mut queue);
        assert_eq!(game.phase(), Phase::SecondChanceOffered);
        assert!(game.decide_second_chance(false, &mut queue).is_applied());
        game.run_timers(&mut queue, TIMER_LIMIT);
    }

    assert_eq!(final_lap, vec![Seat::Two, Seat::Three, Seat::Four]);
    assert_eq!(game.winners(), &[Seat::One]);
    assert_eq!(game.turn().current_round, 1);
}

#[test]
fn bonus_toast_clears_when_its_timer_fires() {
    let (mut game, mut queue) = start(
        table(4, 4, WinCondition::Rounds, 10),
        script(Seat::One, &[6, 6, 3, 3]),
        FixedPolicy::quiet(),
    );
    assert!(game.request_roll(&mut queue).is_applied());
    assert_eq!(game.phase(), Phase::Rolling { gamble: false });
    assert!(game.snapshot().turn.is_rolling);

    let settle = queue.pop().expect("settle timer");
    assert!(game.fire(settle, &mut queue).is_applied());
    assert_eq!(game.bonus_message(), Some("2 sixes: +2 | pair of 3s: +3"));
    assert_eq!(game.player(Seat::One).score, 23);
    assert_eq!(game.last_breakdown().map(|b| b.total()), Some(23));

    game.run_timers(&mut queue, common::TIMER_LIMIT);
    assert_eq!(game.bonus_message(), None);
    assert_eq!(game.current_seat(), Seat::Two);
}

#[test]
fn stale_and_duplicate_inputs_are_ignored() {
    let (mut game, mut queue) = start(
        table(4, 2, WinCondition::Rounds, 10),
        script(Seat::One, &[2, 5]),
        FixedPolicy::quiet(),
    );

    assert!(!game.fire(Timer::DiceSettle { turn: 1 }, &mut queue).is_applied());
    assert!(!game.fire(Timer::ScoreReveal { turn: 1 }, &mut queue).is_applied());
    assert!(!game.fire(Timer::BonusExpire { toast: 3 }, &mut queue).is_applied());
    assert!(!game.fire(Timer::CpuVote { seat: Seat::Two, vote: 1 }, &mut queue).is_applied());
    assert!(!game.fire(Timer::CpuTurn { seat: Seat::One, turn: 1 }, &mut queue).is_applied());
    assert!(!game.decide_second_chance(true, &mut queue).is_applied());

    assert!(game.request_roll(&mut queue).is_applied());
    assert!(!game.request_roll(&mut queue).is_applied());

    let settle = queue.pop().expect("settle timer");
    assert!(game.fire(settle, &mut queue).is_applied());
    assert!(!game.fire(settle, &mut queue).is_applied());
    assert_eq!(game.player(Seat::One).history.len(), 1);

    let reveal = queue.pop().expect("reveal timer");
    assert!(game.fire(reveal, &mut queue).is_applied());
    assert!(!game.fire(reveal, &mut queue).is_applied());
    assert_eq!(game.current_seat(), Seat::Two);
    assert_eq!(game.player(Seat::One).score_history, vec![0, 7]);
}

#[test]
fn exit_stops_the_table() {
    let (mut game, mut queue) = start(
        table(4, 1, WinCondition::Rounds, 10),
        script(Seat::One, &[4]),
        FixedPolicy::quiet(),
    );
    assert!(game.request_roll(&mut queue).is_applied());

    let snapshot = game.exit_game();
    assert_eq!(snapshot.phase, Phase::Exited);
    assert_eq!(snapshot.message, GameMessage::Exited);
    assert!(!snapshot.game_over);

    assert_eq!(game.run_timers(&mut queue, common::TIMER_LIMIT), 1);
    assert!(!game.request_roll(&mut queue).is_applied());
    assert!(!game.request_vote(Seat::One, &mut queue).is_applied());
    assert_eq!(game.player(Seat::One).score, 0);
    assert_eq!(game.phase(), Phase::Exited);
}

#[test]
fn exiting_a_finished_game_keeps_the_result() {
    let (mut game, mut queue) = start(
        table(4, 1, WinCondition::Rounds, 1),
        script(Seat::One, &[4, 4, 4, 4]),
        FixedPolicy::quiet(),
    );
    autopilot(&mut game, &mut queue, 100);
    assert!(game.is_game_over());
    let winners = game.winners().to_vec();

    let snapshot = game.exit_game();
    assert_eq!(snapshot.phase, Phase::GameOver);
    assert!(snapshot.game_over);
    assert_eq!(snapshot.winners, winners);
    assert!(matches!(snapshot.message, GameMessage::GameOver { .. }));
    assert_eq!(game.phase(), Phase::GameOver);
}

#[test]
fn secure_game_plays_a_human_turn() {
    let mut queue = TimerQueue::new();
    let mut game =
        Game::start_secure(table(4, 2, WinCondition::Rounds, 10), &mut queue).expect("os rng available");
    let opener = game.current_seat();
    assert_eq!(game.turn().round_start, opener);

    play_turn(&mut game, &mut queue);

    let player = game.player(opener);
    assert_eq!(player.history.len(), 1);
    assert!((2..=12).contains(&player.history[0].score));
    assert_eq!(player.score_history, vec![0, player.score]);
    assert_eq!(game.current_seat(), opener.next());
    assert_eq!(game.phase(), Phase::AwaitingRoll);
}

#[test]
fn snapshots_keep_their_roster_while_play_continues() {
    let (mut game, mut queue) = start(
        table(4, 1, WinCondition::Rounds, 10),
        script(Seat::One, &[5, 2]),
        FixedPolicy::quiet(),
    );
    let before = game.snapshot();
    play_turn(&mut game, &mut queue);
    let after = game.snapshot();

    assert_eq!(before.player(Seat::One).score, 0);
    assert_eq!(before.player(Seat::One).score_history, vec![0]);
    assert_eq!(after.player(Seat::One).score, 5);
    assert_eq!(after.current_player().name, "Player 2");
    assert_eq!(after.ruleset_version, "second-chance-v3");

    let json = after.to_json().expect("serialize");
    let parsed = taas_core::GameSnapshot::from_json(&json).expect("parse");
    assert_eq!(parsed, after);
}

#[test]
fn invalid_settings_are_rejected_before_play() {
    let mut settings = table(2, 0, WinCondition::Score, 50);
    let services = taas_core::GameServices::seeded(1);
    let mut queue = taas_core::TimerQueue::new();
    match taas_core::Game::start(settings.clone(), services, &mut queue) {
        Err(GameError::Settings(err)) => assert_eq!(err.field(), "num_dice"),
        Err(other) => panic!("unexpected error {other}"),
        Ok(_) => panic!("zero dice accepted"),
    }
    assert!(queue.is_empty());

    settings.num_dice = 2;
    settings.win_value = 0;
    let result = taas_core::Game::start(settings, taas_core::GameServices::seeded(1), &mut queue);
    assert!(matches!(result, Err(GameError::Settings(_))));
}
