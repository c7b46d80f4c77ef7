//! Human vs engine Reversi for Kalmia
//!
//! This crate provides:
//! - A client for engine subprocesses speaking the USI-style line protocol
//! - Human and engine players behind one `Player` trait
//! - The authoritative game loop with pause, resume and suspend
//! - An evaluator that ponders on a second engine for win rate display
//!
//! # Usage
//!
//! ```no_run
//! use kalmia_game::{EngineConfig, EngineOptions, EnginePlayer, GameManager, HumanPlayer};
//! use std::sync::Arc;
//!
//! let engine = EnginePlayer::launch(EngineConfig::new("engine/Kalmia"), &EngineOptions::default())?;
//! let human = Arc::new(HumanPlayer::new("You"));
//! let game = GameManager::new(human.clone(), Arc::new(engine), Default::default());
//! game.start()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod engine;
mod engine_player;
mod error;
mod evaluator;
mod events;
mod game_manager;
mod human_player;
mod player;
mod protocol;
mod record;
mod session;

pub use config::*;
pub use engine::*;
pub use engine_player::*;
pub use error::*;
pub use evaluator::*;
pub use events::*;
pub use game_manager::*;
pub use human_player::*;
pub use player::*;
pub use protocol::*;
pub use record::*;
pub use session::*;
