//! Reversi rules for the Kalmia game client.
//!
//! Provides the board the game loop owns: bitboard disc sets, move legality,
//! move application, terminal detection, coordinate text and the one-line
//! board encoding sent to engines.

pub mod bitboard;
pub mod board;
pub mod encoding;
pub mod error;
pub mod types;

pub use bitboard::*;
pub use board::*;
pub use encoding::ENCODED_LEN;
pub use error::PositionError;
pub use types::*;
