//! Player backed by an engine subprocess.

use parking_lot::Mutex;
use reversi_core::{DiscColor, GameResult, Move, Position, Square};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::{EngineConfig, EngineOptions};
use crate::engine::{EngineEvent, EngineProcess};
use crate::error::EngineError;
use crate::events::EventHub;
use crate::player::Player;
use crate::protocol::GameOverKind;
use crate::session::TerminationKind;

/// Name used when the engine does not identify itself.
const DEFAULT_NAME: &str = "Kalmia";

/// Events raised by an [`EnginePlayer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePlayerEvent {
    /// The engine exited while the player was still in use
    UnexpectedShutdown,
}

enum Wake {
    BestMove(Option<Move>),
    Quit,
    EngineExited,
}

#[derive(Debug, Clone, Copy, Default)]
struct MoveContext {
    color: Option<DiscColor>,
    move_num: u32,
}

/// A [`Player`] that forwards positions to an engine and waits for `bestmove`.
pub struct EnginePlayer {
    name: String,
    engine: EngineProcess,
    quit: Arc<AtomicBool>,
    /// One-shot slot for whichever call is waiting on the next `bestmove`
    waiter: Arc<Mutex<Option<Sender<Wake>>>>,
    pondering: AtomicBool,
    context: Mutex<MoveContext>,
    events: Arc<EventHub<EnginePlayerEvent>>,
}

impl EnginePlayer {
    /// Launch the engine, complete the handshake and send `options`.
    pub fn launch(config: EngineConfig, options: &EngineOptions) -> Result<Self, EngineError> {
        let engine = EngineProcess::new(config);
        engine.run()?;
        for (name, value) in options.to_pairs() {
            engine.set_option(name, value)?;
        }
        Ok(Self::from_engine(engine))
    }

    /// Wrap an engine that is already running.
    pub(crate) fn from_engine(engine: EngineProcess) -> Self {
        let name = engine
            .session()
            .name()
            .unwrap_or(DEFAULT_NAME)
            .to_string();
        let quit = Arc::new(AtomicBool::new(false));
        let waiter: Arc<Mutex<Option<Sender<Wake>>>> = Arc::new(Mutex::new(None));
        let events = Arc::new(EventHub::new());

        {
            let quit = Arc::clone(&quit);
            let waiter = Arc::clone(&waiter);
            let events = Arc::clone(&events);
            let name = name.clone();
            engine.subscribe(move |event| {
                match event {
                    EngineEvent::BestMove(mv) => {
                        if let Some(tx) = waiter.lock().take() {
                            tx.send(Wake::BestMove(*mv)).ok();
                        }
                    }
                    EngineEvent::Terminated(kind) => {
                        if let Some(tx) = waiter.lock().take() {
                            tx.send(Wake::EngineExited).ok();
                        }
                        if *kind == TerminationKind::Unexpected && !quit.load(Ordering::SeqCst) {
                            warn!(player = %name, "engine shut down unexpectedly");
                            events.publish(&EnginePlayerEvent::UnexpectedShutdown);
                        }
                    }
                    EngineEvent::Info { .. } => {}
                }
                true
            });
        }

        Self {
            name,
            engine,
            quit,
            waiter,
            pondering: AtomicBool::new(false),
            context: Mutex::new(MoveContext::default()),
            events,
        }
    }

    pub fn engine(&self) -> &EngineProcess {
        &self.engine
    }

    /// Side the engine was last asked to move for.
    pub fn current_move_color(&self) -> Option<DiscColor> {
        self.context.lock().color
    }

    /// Move number of the last position the engine was asked to move in.
    pub fn last_move_num(&self) -> u32 {
        self.context.lock().move_num
    }

    pub fn is_pondering(&self) -> bool {
        self.pondering.load(Ordering::SeqCst)
    }

    pub fn has_quit_unexpectedly(&self) -> bool {
        self.engine.session().has_quit_unexpectedly()
    }

    pub fn events(&self) -> Receiver<EnginePlayerEvent> {
        self.events.subscribe()
    }

    /// Start a speculative search on `pos`, the position the opponent is thinking in.
    pub fn start_ponder(&self, pos: &Position) -> Result<(), EngineError> {
        if self.quit.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.stop_ponder();
        self.set_context(pos);
        self.engine.set_position(pos)?;
        self.engine.go_ponder()?;
        self.pondering.store(true, Ordering::SeqCst);
        debug!(player = %self.name, "ponder started");
        Ok(())
    }

    /// Stop pondering and wait, bounded, for the search's closing `bestmove`.
    pub fn stop_ponder(&self) {
        if !self.pondering.swap(false, Ordering::SeqCst) || self.engine.has_exited() {
            return;
        }

        let (tx, rx) = mpsc::channel();
        *self.waiter.lock() = Some(tx);
        if let Err(e) = self.engine.stop_go() {
            warn!(player = %self.name, error = %e, "failed to stop ponder");
            self.waiter.lock().take();
            return;
        }

        let timeout = self.engine.config().ponder_stop_timeout();
        match rx.recv_timeout(timeout) {
            Ok(_) => debug!(player = %self.name, "ponder stopped"),
            Err(RecvTimeoutError::Timeout) => {
                warn!(player = %self.name, ?timeout, "engine did not answer stop");
            }
            Err(RecvTimeoutError::Disconnected) => {}
        }
        self.waiter.lock().take();
    }

    fn set_context(&self, pos: &Position) {
        *self.context.lock() = MoveContext {
            color: Some(pos.side_to_move()),
            move_num: pos.move_number(),
        };
    }

    fn request_move(&self, pos: &Position) -> Option<Move> {
        let (tx, rx) = mpsc::channel();
        *self.waiter.lock() = Some(tx);

        if self.quit.load(Ordering::SeqCst) || self.engine.has_exited() {
            self.waiter.lock().take();
            return None;
        }

        let sent = self
            .engine
            .set_position(pos)
            .and_then(|()| self.engine.go());
        if let Err(e) = sent {
            warn!(player = %self.name, error = %e, "failed to request move");
            self.waiter.lock().take();
            return None;
        }

        match rx.recv() {
            Ok(Wake::BestMove(mv)) => mv,
            Ok(Wake::Quit) | Ok(Wake::EngineExited) | Err(_) => None,
        }
    }
}

impl Player for EnginePlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate_move(&self, pos: &Position) -> Option<Move> {
        self.set_context(pos);

        if *pos == Position::new() {
            return Some(Move::Place(Square::F5));
        }

        self.stop_ponder();
        self.request_move(pos)
    }

    fn quit(&self) {
        if self.quit.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(tx) = self.waiter.lock().take() {
            tx.send(Wake::Quit).ok();
        }
        self.pondering.store(false, Ordering::SeqCst);
        if self.engine.quit() {
            info!(player = %self.name, "engine quit");
        } else if !self.engine.has_exited() {
            self.engine.kill();
        }
    }

    fn new_game(&self) {
        if let Err(e) = self.engine.new_game() {
            warn!(player = %self.name, error = %e, "failed to send usinewgame");
        }
    }

    fn game_over(&self, color: DiscColor, result: &GameResult) {
        let kind = match result.winner {
            None => GameOverKind::Draw,
            Some(winner) if winner == color => GameOverKind::Win,
            Some(_) => GameOverKind::Lose,
        };
        if let Err(e) = self.engine.game_over(kind) {
            debug!(player = %self.name, error = %e, "failed to send gameover");
        }
    }
}

impl Drop for EnginePlayer {
    fn drop(&mut self) {
        self.quit();
    }
}

#[cfg(test)]
#[path = "engine_player_tests.rs"]
mod tests;
