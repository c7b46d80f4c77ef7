use std::path::PathBuf;

use reversi_core::{move_text, Move, PositionError};
use thiserror::Error;

/// Errors raised while driving an engine subprocess.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to launch engine {path}: {source}")]
    Launch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("engine process has not been started")]
    NotRunning,

    #[error("engine exited before reaching {expected}")]
    ExitedDuringHandshake { expected: &'static str },

    #[error("failed to write to engine: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that end a game.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("{player} sent move {} but it was an illegal move", move_text(.mv))]
    IllegalMove { player: String, mv: Option<Move> },

    #[error("game has already been started")]
    AlreadyStarted,

    #[error("failed to spawn game loop: {0}")]
    Spawn(String),

    #[error("game loop panicked")]
    LoopPanicked,

    #[error(transparent)]
    Position(#[from] PositionError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("record json: {0}")]
    Json(#[from] serde_json::Error),
}
