//! Player fed by an external caller, typically a UI click handler.

use parking_lot::{Condvar, Mutex};
use reversi_core::{Move, Position};
use tracing::debug;

use crate::player::Player;

#[derive(Default)]
struct Mailbox {
    waiting: bool,
    input: Option<Move>,
    quit: bool,
}

/// A player whose moves are supplied through [`HumanPlayer::set_input`].
pub struct HumanPlayer {
    name: String,
    mailbox: Mutex<Mailbox>,
    delivered: Condvar,
}

impl HumanPlayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mailbox: Mutex::new(Mailbox::default()),
            delivered: Condvar::new(),
        }
    }

    /// Offer a move to a pending `generate_move`.
    ///
    /// Returns false if nobody is waiting; the move is dropped in that case.
    pub fn set_input(&self, mv: Move) -> bool {
        let mut mailbox = self.mailbox.lock();
        if !mailbox.waiting {
            return false;
        }
        mailbox.input = Some(mv);
        self.delivered.notify_all();
        true
    }

    /// True while a `generate_move` call is blocked waiting for input.
    pub fn is_waiting(&self) -> bool {
        self.mailbox.lock().waiting
    }
}

impl Player for HumanPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate_move(&self, pos: &Position) -> Option<Move> {
        if !pos.has_legal_move() {
            return Some(Move::Pass);
        }

        let mut mailbox = self.mailbox.lock();
        if mailbox.quit {
            return None;
        }
        mailbox.waiting = true;
        mailbox.input = None;

        let result = loop {
            if mailbox.quit {
                break None;
            }
            if let Some(mv) = mailbox.input.take() {
                if pos.is_legal(mv) {
                    break Some(mv);
                }
                debug!(player = %self.name, %mv, "discarding illegal input");
                continue;
            }
            self.delivered.wait(&mut mailbox);
        };

        mailbox.waiting = false;
        result
    }

    fn quit(&self) {
        let mut mailbox = self.mailbox.lock();
        mailbox.quit = true;
        self.delivered.notify_all();
    }

    fn new_game(&self) {
        let mut mailbox = self.mailbox.lock();
        mailbox.quit = false;
        mailbox.input = None;
    }
}

#[cfg(test)]
#[path = "human_player_tests.rs"]
mod tests;
