//! Integration tests for the Snap engine.
//!
//! These tests drive whole games through the public API, firing scheduled
//! computer calls the way a host would.

use proptest::prelude::*;
use snap_core::*;

/// Fire every pending scheduled call, including ones queued while firing
fn run_scheduled(engine: &mut GameEngine<ManualScheduler>) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let mut fired = 0;
    while let Some(pending) = engine.scheduler_mut().pop_next() {
        events.extend(engine.fire(pending.call));
        fired += 1;
        assert!(fired < 1000, "scheduler should go quiet");
    }
    events
}

fn assert_invariants(engine: &GameEngine<ManualScheduler>) {
    assert!(engine.deck().is_canonical(), "deck lost or duplicated a card");
    assert_eq!(engine.deck().len(), DECK_SIZE);
    if let Some(cursor) = engine.cursor() {
        assert!(cursor < DECK_SIZE);
    }
    let snapshot = engine.snapshot();
    assert!((-1..=51).contains(&snapshot.cursor));
    for card in engine.played_cards() {
        assert_eq!(card.owner, None, "played cards belong to nobody");
    }
}

#[test]
fn test_full_game_with_computer_opponent() {
    let mut engine = GameEngine::with_seed(EngineConfig::default(), ManualScheduler::new(), 11);
    run_scheduled(&mut engine);

    let mut rounds = 0;
    let mut iterations = 0;
    while rounds < 5 && iterations < 10_000 {
        iterations += 1;

        if engine.winner().is_some() {
            engine.apply(GameAction::Next);
            rounds += 1;
        } else if engine.is_snap() && iterations % 2 == 0 {
            // Human is quick half the time
            engine.apply(GameAction::Snap);
        } else if engine.turn() == Player::Human && !engine.is_snap() {
            engine.apply(GameAction::Play);
        } else {
            run_scheduled(&mut engine);
        }

        assert_invariants(&engine);
    }

    assert_eq!(rounds, 5, "five rounds should complete");
}

#[test]
fn test_stale_scheduled_calls_are_harmless() {
    let mut engine = GameEngine::with_seed(EngineConfig::default(), ManualScheduler::new(), 5);
    run_scheduled(&mut engine);
    engine.apply(GameAction::Play);
    engine.apply(GameAction::Snap);
    assert!(engine.winner().is_some());

    let before = engine.snapshot();
    for _ in 0..3 {
        assert!(engine.fire(ScheduledCall::ComputerPlay).is_empty());
    }
    run_scheduled(&mut engine);
    assert_eq!(engine.snapshot(), before);
}

#[test]
fn test_auto_continue_keeps_game_running() {
    let config = EngineConfig {
        auto_continue: true,
        ..EngineConfig::for_difficulty(Difficulty::Hard)
    };
    let mut engine = GameEngine::with_seed(config, ManualScheduler::new(), 21);

    let mut rounds = 0;
    for _ in 0..500 {
        if engine.turn() == Player::Human && engine.winner().is_none() && !engine.is_snap() {
            engine.apply(GameAction::Play);
        }
        let events = run_scheduled(&mut engine);
        rounds += events
            .iter()
            .filter(|e| matches!(e, GameEvent::SpoilsCollected { .. }))
            .count();
        assert_invariants(&engine);
    }

    assert!(rounds > 0, "rounds should roll over without the human");
}

#[test]
fn test_events_serialize_for_clients() {
    let mut engine = GameEngine::with_seed(EngineConfig::default(), ManualScheduler::new(), 8);
    let events = engine.reset();
    let json = serde_json::to_value(&events).unwrap();
    assert_eq!(json[0]["type"], "RoundStarted");

    let action: GameAction = serde_json::from_str(r#"{"type":"Snap"}"#).unwrap();
    assert_eq!(action, GameAction::Snap);
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Reset,
    HumanPlay,
    ComputerPlay,
    Snap,
    Next,
    FireScheduled,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => Just(Op::Reset),
        6 => Just(Op::HumanPlay),
        6 => Just(Op::ComputerPlay),
        2 => Just(Op::Snap),
        3 => Just(Op::Next),
        4 => Just(Op::FireScheduled),
    ]
}

proptest! {
    #[test]
    fn prop_deck_and_cursor_invariants(seed in any::<u64>(), ops in prop::collection::vec(op_strategy(), 0..300)) {
        let mut engine = GameEngine::with_seed(EngineConfig::default(), ManualScheduler::new(), seed);

        for op in ops {
            let decided = engine.winner().is_some();
            let before = engine.snapshot();

            let events = match op {
                Op::Reset => engine.reset(),
                Op::HumanPlay => engine.play(false),
                Op::ComputerPlay => engine.play(true),
                Op::Snap => engine.call_snap(),
                Op::Next => engine.next(),
                Op::FireScheduled => match engine.scheduler_mut().pop_next() {
                    Some(pending) => engine.fire(pending.call),
                    None => Vec::new(),
                },
            };

            // Once a round is decided, only reset and next may change anything
            if decided && matches!(op, Op::HumanPlay | Op::ComputerPlay | Op::Snap) {
                prop_assert!(events.is_empty());
                prop_assert_eq!(engine.snapshot(), before);
            }

            prop_assert!(engine.deck().is_canonical());
            let cursor = engine.snapshot().cursor;
            prop_assert!((-1..=51).contains(&cursor));
        }
    }

    #[test]
    fn prop_is_snap_matches_top_two_values(seed in any::<u64>(), plays in 0usize..40) {
        let mut engine = GameEngine::with_seed(EngineConfig::default(), ManualScheduler::new(), seed);
        for _ in 0..plays {
            if engine.winner().is_some() {
                break;
            }
            engine.play(true);
        }

        let expected = match engine.cursor() {
            Some(i) if i >= 1 => engine.deck()[i].value == engine.deck()[i - 1].value,
            _ => false,
        };
        prop_assert_eq!(engine.is_snap(), expected);
    }
}
