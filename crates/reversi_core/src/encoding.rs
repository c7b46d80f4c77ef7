//! Text encoding of a position for the engine protocol.
//!
//! One symbol per square in row-major order from a1 (`X` black, `O` white,
//! `-` empty) followed by the side to move (`B` or `W`).

use crate::bitboard::Bitboard;
use crate::board::Position;
use crate::error::PositionError;
use crate::types::{DiscColor, Square, SQUARE_NUM};

pub const ENCODED_LEN: usize = SQUARE_NUM as usize + 1;

impl Position {
    pub fn to_encoded(&self) -> String {
        let mut s = String::with_capacity(ENCODED_LEN);
        for idx in 0..SQUARE_NUM {
            let ch = match Square::new(idx).and_then(|sq| self.disc_at(sq)) {
                Some(DiscColor::Black) => 'X',
                Some(DiscColor::White) => 'O',
                None => '-',
            };
            s.push(ch);
        }
        s.push(match self.side_to_move() {
            DiscColor::Black => 'B',
            DiscColor::White => 'W',
        });
        s
    }

    pub fn from_encoded(s: &str) -> Result<Position, PositionError> {
        let symbols: Vec<char> = s.chars().collect();
        if symbols.len() != ENCODED_LEN {
            return Err(PositionError::BadLength {
                expected: ENCODED_LEN,
                actual: symbols.len(),
            });
        }

        let mut black = Bitboard::EMPTY;
        let mut white = Bitboard::EMPTY;
        for (index, &symbol) in symbols[..SQUARE_NUM as usize].iter().enumerate() {
            match symbol {
                'X' => black.set(index as u8),
                'O' => white.set(index as u8),
                '-' => {}
                _ => return Err(PositionError::BadSymbol { index, symbol }),
            }
        }

        let side_to_move = match symbols[SQUARE_NUM as usize] {
            'B' => DiscColor::Black,
            'W' => DiscColor::White,
            symbol => {
                return Err(PositionError::BadSymbol {
                    index: SQUARE_NUM as usize,
                    symbol,
                })
            }
        };

        Ok(Position::from_discs(black, white, side_to_move))
    }
}
