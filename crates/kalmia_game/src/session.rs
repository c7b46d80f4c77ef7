//! Protocol state of one engine subprocess.

use crate::protocol::{EngineMessage, IdField, ScoreScale};

/// Engine protocol state. Transitions only move forward; `Quit` is absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EngineState {
    StartUp,
    UsiOk,
    Ready,
    Playing,
    GameOver,
    WaitForQuit,
    Quit,
}

/// How an engine process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationKind {
    /// Exited after a quit request
    Quit,
    /// Forcibly terminated by `kill`
    Killed,
    /// Exited on its own without being asked to
    Unexpected,
}

/// Identity, protocol state and termination flags of an engine.
#[derive(Debug, Clone, Default)]
pub struct EngineSession {
    name: Option<String>,
    author: Option<String>,
    state: Option<EngineState>,
    score_scale: ScoreScale,
    quit_succeeded: bool,
    quit_unexpectedly: bool,
    was_killed: bool,
    pub(crate) kill_requested: bool,
    pub(crate) exited: bool,
}

impl EngineSession {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    /// None until the process has been launched.
    pub fn state(&self) -> Option<EngineState> {
        self.state
    }

    pub fn score_scale(&self) -> ScoreScale {
        self.score_scale
    }

    pub fn has_quit_successfully(&self) -> bool {
        self.quit_succeeded
    }

    pub fn has_quit_unexpectedly(&self) -> bool {
        self.quit_unexpectedly
    }

    pub fn was_killed(&self) -> bool {
        self.was_killed
    }

    pub fn has_exited(&self) -> bool {
        self.exited
    }

    pub(crate) fn is_launched(&self) -> bool {
        self.state.is_some()
    }

    /// Move to `next` if it lies ahead of the current state.
    pub(crate) fn advance(&mut self, next: EngineState) -> bool {
        match self.state {
            Some(current) if current >= next => false,
            _ => {
                self.state = Some(next);
                true
            }
        }
    }

    /// Apply a parsed message. Returns true if the state machine moved.
    pub(crate) fn apply(&mut self, message: &EngineMessage) -> bool {
        match message {
            EngineMessage::Id { field, value } => {
                match field {
                    IdField::Name => self.name = Some(value.clone()),
                    IdField::Author => self.author = Some(value.clone()),
                }
                false
            }
            EngineMessage::UsiOk => self.advance(EngineState::UsiOk),
            EngineMessage::ReadyOk => self.advance(EngineState::Ready),
            EngineMessage::ScoreType { kind, min, max } => {
                self.score_scale.kind = *kind;
                if let Some(min) = min {
                    self.score_scale.min = *min;
                }
                if let Some(max) = max {
                    self.score_scale.max = *max;
                }
                false
            }
            EngineMessage::BestMove(_) | EngineMessage::Info(_) | EngineMessage::Option => false,
        }
    }

    /// Record process exit and classify it.
    pub(crate) fn mark_exited(&mut self) -> TerminationKind {
        self.exited = true;
        if self.kill_requested {
            self.was_killed = true;
            TerminationKind::Killed
        } else if matches!(
            self.state,
            Some(EngineState::WaitForQuit) | Some(EngineState::Quit)
        ) {
            self.quit_succeeded = true;
            self.state = Some(EngineState::Quit);
            TerminationKind::Quit
        } else {
            self.quit_unexpectedly = true;
            TerminationKind::Unexpected
        }
    }

    pub(crate) fn mark_killed(&mut self) {
        self.was_killed = true;
    }
}
