use super::*;
use crate::human_player::HumanPlayer;
use std::time::Duration;
use reversi_core::Square;

/// Plays the lowest-indexed legal move, or a pass when that is all there is.
struct FirstLegalPlayer {
    name: &'static str,
}

impl Player for FirstLegalPlayer {
    fn name(&self) -> &str {
        self.name
    }

    fn generate_move(&self, pos: &Position) -> Option<Move> {
        pos.legal_moves().first().copied()
    }

    fn quit(&self) {}
}

/// Always answers with the same move, legal or not.
struct StubbornPlayer {
    mv: Option<Move>,
}

impl Player for StubbornPlayer {
    fn name(&self) -> &str {
        "Stubborn"
    }

    fn generate_move(&self, _pos: &Position) -> Option<Move> {
        self.mv
    }

    fn quit(&self) {}
}

fn first_legal(name: &'static str) -> Arc<dyn Player> {
    Arc::new(FirstLegalPlayer { name })
}

fn config() -> GameManagerConfig {
    GameManagerConfig {
        suspend_timeout_ms: 2_000,
    }
}

fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        thread::sleep(Duration::from_millis(2));
    }
    panic!("condition not reached in time");
}

#[test]
fn test_scripted_game_ends_once_with_correct_winner() {
    let manager = GameManager::new(first_legal("Alpha"), first_legal("Beta"), config());
    let rx = manager.events();
    manager.start().unwrap();

    let result = manager.join().unwrap().expect("game should reach a terminal position");
    assert_eq!(manager.status(), GameStatus::GameOver);
    assert!(!manager.is_running());

    let events: Vec<_> = rx.try_iter().collect();
    let ended: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::Ended { result, winner } => Some((*result, winner.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(ended.len(), 1);

    let (ended_result, winner) = &ended[0];
    assert_eq!(*ended_result, result);
    let pos = manager.position();
    assert_eq!(result.black_discs, pos.disc_count(DiscColor::Black));
    assert_eq!(result.white_discs, pos.disc_count(DiscColor::White));
    let expected = match result.black_discs.cmp(&result.white_discs) {
        std::cmp::Ordering::Greater => Some("Alpha".to_string()),
        std::cmp::Ordering::Less => Some("Beta".to_string()),
        std::cmp::Ordering::Equal => None,
    };
    assert_eq!(*winner, expected);
}

#[test]
fn test_side_to_move_alternates_per_accepted_move() {
    let manager = GameManager::new(first_legal("Alpha"), first_legal("Beta"), config());
    let rx = manager.events();
    manager.start().unwrap();
    manager.join().unwrap();

    let mut expected = DiscColor::Black;
    let mut played = 0;
    for event in rx.try_iter() {
        match event {
            GameEvent::Played { color, .. } => {
                assert_eq!(color, expected);
                played += 1;
            }
            GameEvent::SideToMoveChanged { side } => {
                assert_eq!(side, expected.opponent());
                expected = side;
            }
            _ => {}
        }
    }
    assert_eq!(played, manager.move_count());
    assert_eq!(manager.moves().len() as u32, manager.move_count());
}

#[test]
fn test_illegal_move_aborts_with_player_and_move() {
    let a1: Move = "a1".parse().unwrap();
    let manager = GameManager::new(
        Arc::new(StubbornPlayer { mv: Some(a1) }),
        first_legal("Beta"),
        config(),
    );
    let rx = manager.events();
    manager.start().unwrap();

    let err = manager.join().unwrap_err();
    assert_eq!(
        err,
        GameError::IllegalMove {
            player: "Stubborn".to_string(),
            mv: Some(a1),
        }
    );
    assert_eq!(err.to_string(), "Stubborn sent move a1 but it was an illegal move");
    assert_eq!(manager.status(), GameStatus::Aborted);
    assert_eq!(manager.move_count(), 0);
    assert_eq!(manager.position(), Position::new());

    let events: Vec<_> = rx.try_iter().collect();
    assert_eq!(
        events,
        vec![GameEvent::Aborted {
            player: "Stubborn".to_string(),
            mv: Some(a1),
        }]
    );
}

#[test]
fn test_missing_move_aborts() {
    let manager = GameManager::new(
        Arc::new(StubbornPlayer { mv: None }),
        first_legal("Beta"),
        config(),
    );
    manager.start().unwrap();
    let err = manager.join().unwrap_err();
    assert_eq!(err.to_string(), "Stubborn sent move null but it was an illegal move");
}

#[test]
fn test_start_twice_is_rejected() {
    let manager = GameManager::new(first_legal("Alpha"), first_legal("Beta"), config());
    manager.start().unwrap();
    assert_eq!(manager.start(), Err(GameError::AlreadyStarted));
    manager.join().unwrap();
}

#[test]
fn test_pause_holds_returned_move_until_resume() {
    let human = Arc::new(HumanPlayer::new("Human"));
    let manager = GameManager::new(human.clone(), first_legal("Beta"), config());
    manager.start().unwrap();

    wait_until(|| human.is_waiting());
    manager.pause();
    assert!(human.set_input("f5".parse().unwrap()));

    thread::sleep(Duration::from_millis(30));
    assert_eq!(manager.move_count(), 0);
    assert!(manager.is_paused());

    manager.resume();
    // f5 by the human, then the reply, then the human waits again
    wait_until(|| manager.move_count() == 2 && human.is_waiting());
    assert_eq!(manager.side_to_move(), DiscColor::Black);
    assert_eq!(manager.current_player().name(), "Human");

    assert!(manager.suspend());
    assert_eq!(manager.status(), GameStatus::Suspended);
    assert_eq!(manager.join(), Ok(None));

    let record = manager.record();
    assert_eq!(record.black, "Human");
    assert_eq!(record.moves.len(), 2);
    assert_eq!(record.moves[0], "f5");
}

#[test]
fn test_suspend_releases_blocked_human() {
    let human = Arc::new(HumanPlayer::new("Human"));
    let manager = GameManager::new(human.clone(), first_legal("Beta"), config());
    let rx = manager.events();
    manager.start().unwrap();

    wait_until(|| human.is_waiting());
    assert!(manager.suspend());
    assert!(!manager.is_running());
    assert_eq!(manager.status(), GameStatus::Suspended);

    // suspension is not an abort
    assert!(rx.try_iter().all(|e| !matches!(e, GameEvent::Aborted { .. })));
}

#[test]
fn test_suspend_before_start_is_noop() {
    let manager = GameManager::new(first_legal("Alpha"), first_legal("Beta"), config());
    assert!(manager.suspend());
    assert_eq!(manager.status(), GameStatus::NotStarted);
}

#[test]
fn test_record_of_game_from_custom_position_replays() {
    let mut start = Position::new();
    start.update(Move::Place(Square::F5)).unwrap();
    let manager = GameManager::with_position(
        first_legal("Alpha"),
        first_legal("Beta"),
        start.clone(),
        config(),
    );
    manager.start().unwrap();
    manager.join().unwrap().expect("game should finish");

    let record = manager.record();
    assert_eq!(record.start, start.to_encoded());
    assert_eq!(record.replay().unwrap(), manager.position());
}

#[test]
fn test_callback_can_subscribe_to_its_own_game() {
    let manager = Arc::new(GameManager::new(first_legal("Alpha"), first_legal("Beta"), config()));
    let late = Arc::new(Mutex::new(None));

    let weak = Arc::downgrade(&manager);
    let slot = Arc::clone(&late);
    manager.subscribe(move |event| {
        if let (GameEvent::Played { .. }, Some(manager)) = (event, weak.upgrade()) {
            *slot.lock() = Some(manager.events());
            return false;
        }
        true
    });

    manager.start().unwrap();
    manager.join().unwrap().expect("game should finish");

    let rx = late.lock().take().expect("callback should have run");
    let events: Vec<_> = rx.try_iter().collect();
    assert!(matches!(events.first(), Some(GameEvent::SideToMoveChanged { .. })));
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::Ended { .. }))
            .count(),
        1
    );
}
