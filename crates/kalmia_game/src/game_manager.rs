//! Authoritative game loop between two players.
//!
//! The loop runs on its own thread, owns the only mutable [`Position`] and
//! asks the player whose turn it is for a move. Every move is checked for
//! legality before it is applied; an illegal move aborts the game. Pause and
//! suspend requests are honoured before and after each move request.

use parking_lot::{Condvar, Mutex, RwLock};
use reversi_core::{DiscColor, GameResult, Move, Position};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::GameManagerConfig;
use crate::error::GameError;
use crate::events::{EventHub, SubscriptionId};
use crate::player::Player;
use crate::record::GameRecord;

/// Lifecycle of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    NotStarted,
    Running,
    /// Stopped on request before reaching a terminal position
    Suspended,
    GameOver,
    /// Stopped by an illegal move
    Aborted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// `color` played `mv`, already applied to the position
    Played { color: DiscColor, mv: Move },
    SideToMoveChanged { side: DiscColor },
    /// Terminal position reached; `winner` is the winning player's name, None on a draw
    Ended {
        result: GameResult,
        winner: Option<String>,
    },
    /// `player` offered an illegal move (or none at all)
    Aborted { player: String, mv: Option<Move> },
}

/// Outcome of the loop: the final result, or None if it was suspended.
pub type GameOutcome = Result<Option<GameResult>, GameError>;

struct Control {
    status: GameStatus,
    running: bool,
    paused: bool,
    suspend_requested: bool,
}

struct Shared {
    position: RwLock<Position>,
    moves: Mutex<Vec<Move>>,
    control: Mutex<Control>,
    changed: Condvar,
    move_count: AtomicU32,
    events: EventHub<GameEvent>,
}

impl Shared {
    /// Wait out a pause. Returns false if the loop should stop.
    fn checkpoint(&self) -> bool {
        let mut control = self.control.lock();
        loop {
            if control.suspend_requested {
                return false;
            }
            if !control.paused {
                return true;
            }
            self.changed.wait(&mut control);
        }
    }

    fn finish(&self, status: GameStatus) {
        let mut control = self.control.lock();
        control.status = status;
        control.running = false;
        self.changed.notify_all();
    }
}

fn player_for<'a>(
    color: DiscColor,
    black: &'a Arc<dyn Player>,
    white: &'a Arc<dyn Player>,
) -> &'a Arc<dyn Player> {
    match color {
        DiscColor::Black => black,
        DiscColor::White => white,
    }
}

fn play(shared: &Shared, black: &Arc<dyn Player>, white: &Arc<dyn Player>) -> GameOutcome {
    let side = shared.position.read().side_to_move();
    let mut current = player_for(side, black, white);
    let mut opponent = player_for(side.opponent(), black, white);

    loop {
        if let Some(result) = shared.position.read().game_result() {
            return Ok(Some(result));
        }
        if !shared.checkpoint() {
            return Ok(None);
        }

        let snapshot = shared.position.read().clone();
        let color = snapshot.side_to_move();
        let mv = current.generate_move(&snapshot);

        // a blocking move request can outlive a suspend request
        if !shared.checkpoint() {
            return Ok(None);
        }

        let accepted = match mv {
            Some(mv) if snapshot.is_legal(mv) => mv,
            _ => {
                return Err(GameError::IllegalMove {
                    player: current.name().to_string(),
                    mv,
                })
            }
        };

        shared.position.write().update(accepted)?;
        shared.moves.lock().push(accepted);
        debug!(%color, mv = %accepted, player = current.name(), "move played");

        shared.events.publish(&GameEvent::Played {
            color,
            mv: accepted,
        });
        std::mem::swap(&mut current, &mut opponent);
        shared.events.publish(&GameEvent::SideToMoveChanged {
            side: color.opponent(),
        });
        shared.move_count.fetch_add(1, Ordering::SeqCst);
    }
}

fn game_loop(shared: Arc<Shared>, black: Arc<dyn Player>, white: Arc<dyn Player>) -> GameOutcome {
    let outcome = play(&shared, &black, &white);

    match &outcome {
        Ok(Some(result)) => {
            shared.finish(GameStatus::GameOver);
            let winner = result
                .winner
                .map(|color| player_for(color, &black, &white).name().to_string());
            info!(
                black = result.black_discs,
                white = result.white_discs,
                winner = winner.as_deref().unwrap_or("draw"),
                "game over"
            );
            shared.events.publish(&GameEvent::Ended {
                result: *result,
                winner,
            });
            black.game_over(DiscColor::Black, result);
            white.game_over(DiscColor::White, result);
        }
        Ok(None) => {
            shared.finish(GameStatus::Suspended);
            info!("game suspended");
        }
        Err(GameError::IllegalMove { player, mv }) => {
            shared.finish(GameStatus::Aborted);
            warn!(%player, mv = %reversi_core::move_text(mv), "illegal move, game aborted");
            shared.events.publish(&GameEvent::Aborted {
                player: player.clone(),
                mv: *mv,
            });
        }
        Err(e) => {
            shared.finish(GameStatus::Aborted);
            warn!(error = %e, "game aborted");
        }
    }

    black.quit();
    white.quit();
    outcome
}

/// Runs one game between two players on a background thread.
pub struct GameManager {
    black: Arc<dyn Player>,
    white: Arc<dyn Player>,
    config: GameManagerConfig,
    start_position: Position,
    shared: Arc<Shared>,
    handle: Mutex<Option<JoinHandle<GameOutcome>>>,
}

impl GameManager {
    /// A game from the standard initial position.
    pub fn new(black: Arc<dyn Player>, white: Arc<dyn Player>, config: GameManagerConfig) -> Self {
        Self::with_position(black, white, Position::new(), config)
    }

    /// A game continuing from `position`.
    pub fn with_position(
        black: Arc<dyn Player>,
        white: Arc<dyn Player>,
        position: Position,
        config: GameManagerConfig,
    ) -> Self {
        Self {
            black,
            white,
            config,
            start_position: position.clone(),
            shared: Arc::new(Shared {
                position: RwLock::new(position),
                moves: Mutex::new(Vec::new()),
                control: Mutex::new(Control {
                    status: GameStatus::NotStarted,
                    running: false,
                    paused: false,
                    suspend_requested: false,
                }),
                changed: Condvar::new(),
                move_count: AtomicU32::new(0),
                events: EventHub::new(),
            }),
            handle: Mutex::new(None),
        }
    }

    /// Spawn the game loop. A game can only be started once.
    pub fn start(&self) -> Result<(), GameError> {
        {
            let mut control = self.shared.control.lock();
            if control.status != GameStatus::NotStarted {
                return Err(GameError::AlreadyStarted);
            }
            control.status = GameStatus::Running;
            control.running = true;
        }

        self.black.new_game();
        self.white.new_game();

        let shared = Arc::clone(&self.shared);
        let black = Arc::clone(&self.black);
        let white = Arc::clone(&self.white);
        let spawned = thread::Builder::new()
            .name("game-loop".to_string())
            .spawn(move || game_loop(shared, black, white));

        match spawned {
            Ok(handle) => {
                info!(black = self.black.name(), white = self.white.name(), "game started");
                *self.handle.lock() = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.shared.finish(GameStatus::Aborted);
                Err(GameError::Spawn(e.to_string()))
            }
        }
    }

    /// Stop the loop before its next move request is applied.
    ///
    /// Quits both players to release a blocked move request, then waits up to
    /// the configured timeout. Returns true if the loop has stopped.
    pub fn suspend(&self) -> bool {
        {
            let mut control = self.shared.control.lock();
            if !control.running {
                return true;
            }
            control.suspend_requested = true;
            self.shared.changed.notify_all();
        }

        self.black.quit();
        self.white.quit();

        let deadline = Instant::now() + self.config.suspend_timeout();
        let mut control = self.shared.control.lock();
        while control.running {
            if self
                .shared
                .changed
                .wait_until(&mut control, deadline)
                .timed_out()
            {
                break;
            }
        }
        if control.running {
            warn!("game loop did not stop within the suspend timeout");
        }
        !control.running
    }

    /// Hold the loop before its next move request, or before applying a returned move.
    pub fn pause(&self) {
        self.shared.control.lock().paused = true;
    }

    pub fn resume(&self) {
        let mut control = self.shared.control.lock();
        control.paused = false;
        self.shared.changed.notify_all();
    }

    pub fn is_paused(&self) -> bool {
        self.shared.control.lock().paused
    }

    pub fn is_running(&self) -> bool {
        self.shared.control.lock().running
    }

    pub fn status(&self) -> GameStatus {
        self.shared.control.lock().status
    }

    /// Wait for the loop to finish and return its outcome.
    ///
    /// Returns `Ok(None)` if the game was never started or has already been joined.
    pub fn join(&self) -> GameOutcome {
        let handle = self.handle.lock().take();
        match handle {
            Some(handle) => handle.join().map_err(|_| GameError::LoopPanicked)?,
            None => Ok(None),
        }
    }

    /// Snapshot of the authoritative position.
    pub fn position(&self) -> Position {
        self.shared.position.read().clone()
    }

    pub fn side_to_move(&self) -> DiscColor {
        self.shared.position.read().side_to_move()
    }

    pub fn disc_count(&self, color: DiscColor) -> u32 {
        self.shared.position.read().disc_count(color)
    }

    pub fn move_count(&self) -> u32 {
        self.shared.move_count.load(Ordering::SeqCst)
    }

    /// Moves applied so far, oldest first.
    pub fn moves(&self) -> Vec<Move> {
        self.shared.moves.lock().clone()
    }

    pub fn player(&self, color: DiscColor) -> &Arc<dyn Player> {
        player_for(color, &self.black, &self.white)
    }

    /// The player whose turn it is.
    pub fn current_player(&self) -> &Arc<dyn Player> {
        self.player(self.side_to_move())
    }

    pub fn events(&self) -> Receiver<GameEvent> {
        self.shared.events.subscribe()
    }

    /// Register a callback run on the game loop thread. It may call back into
    /// this manager, including `subscribe` and `unsubscribe`.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: FnMut(&GameEvent) -> bool + Send + 'static,
    {
        self.shared.events.subscribe_fn(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.events.unsubscribe(id)
    }

    /// Record of the game so far.
    pub fn record(&self) -> GameRecord {
        GameRecord::new(
            self.black.name(),
            self.white.name(),
            &self.start_position,
            &self.moves(),
            &self.position(),
        )
    }

    /// Suspend a running game and quit both players.
    pub fn dispose(&self) {
        self.suspend();
        self.black.quit();
        self.white.quit();
    }
}

impl Drop for GameManager {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
#[path = "game_manager_tests.rs"]
mod tests;
