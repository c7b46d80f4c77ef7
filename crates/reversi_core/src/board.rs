//! Reversi position: disc placement, legality and move application.

use crate::bitboard::Bitboard;
use crate::error::PositionError;
use crate::types::{DiscColor, Move, Square, SQUARE_NUM};

/// Number of squares occupied before the first move.
pub const INITIAL_DISC_NUM: u32 = 4;

/// Outcome of a finished game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameResult {
    /// Side with more discs, None on a draw
    pub winner: Option<DiscColor>,
    pub black_discs: u32,
    pub white_discs: u32,
}

impl GameResult {
    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    black: Bitboard,
    white: Bitboard,
    side_to_move: DiscColor,
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    /// Standard initial configuration: d4/e5 White, d5/e4 Black, Black to move.
    pub fn new() -> Self {
        const D4: u8 = 27;
        const E4: u8 = 28;
        const D5: u8 = 35;
        const E5: u8 = 36;
        Self {
            black: Bitboard::from_square(E4) | Bitboard::from_square(D5),
            white: Bitboard::from_square(D4) | Bitboard::from_square(E5),
            side_to_move: DiscColor::Black,
        }
    }

    /// Build a position from raw disc sets. Overlapping squares are treated as black.
    pub fn from_discs(black: Bitboard, white: Bitboard, side_to_move: DiscColor) -> Self {
        Self {
            black,
            white: white & !black,
            side_to_move,
        }
    }

    #[inline]
    pub fn side_to_move(&self) -> DiscColor {
        self.side_to_move
    }

    /// Discs belonging to `color`.
    #[inline]
    pub fn discs(&self, color: DiscColor) -> Bitboard {
        match color {
            DiscColor::Black => self.black,
            DiscColor::White => self.white,
        }
    }

    pub fn disc_at(&self, sq: Square) -> Option<DiscColor> {
        if self.black.contains(sq.index()) {
            Some(DiscColor::Black)
        } else if self.white.contains(sq.index()) {
            Some(DiscColor::White)
        } else {
            None
        }
    }

    pub fn disc_count(&self, color: DiscColor) -> u32 {
        self.discs(color).popcount()
    }

    pub fn empty_count(&self) -> u32 {
        SQUARE_NUM as u32 - (self.black | self.white).popcount()
    }

    /// Number of discs placed since the initial configuration. Passes are not counted.
    pub fn move_number(&self) -> u32 {
        (SQUARE_NUM as u32 - INITIAL_DISC_NUM).saturating_sub(self.empty_count())
    }

    fn empties(&self) -> Bitboard {
        !(self.black | self.white)
    }

    /// Discs that placing on `sq` would flip for `player` against `opponent`.
    fn flips(player: Bitboard, opponent: Bitboard, sq: u8) -> Bitboard {
        let start = Bitboard::from_square(sq);
        let mut flipped = Bitboard::EMPTY;
        for shift in Bitboard::DIRECTIONS {
            let mut line = Bitboard::EMPTY;
            let mut cur = shift(start);
            while !(cur & opponent).is_empty() {
                line |= cur;
                cur = shift(cur);
            }
            if !(cur & player).is_empty() {
                flipped |= line;
            }
        }
        flipped
    }

    fn mobility(&self, color: DiscColor) -> Bitboard {
        let player = self.discs(color);
        let opponent = self.discs(color.opponent());
        let mut moves = Bitboard::EMPTY;
        for sq in self.empties() {
            if !Self::flips(player, opponent, sq).is_empty() {
                moves.set(sq);
            }
        }
        moves
    }

    /// Squares the side to move may place a disc on.
    pub fn legal_squares(&self) -> Bitboard {
        self.mobility(self.side_to_move)
    }

    /// All legal moves for the side to move: placements, or a single pass.
    pub fn legal_moves(&self) -> Vec<Move> {
        let squares = self.legal_squares();
        if !squares.is_empty() {
            return squares.filter_map(Square::new).map(Move::Place).collect();
        }
        if self.can_pass() {
            vec![Move::Pass]
        } else {
            Vec::new()
        }
    }

    /// True when the side to move can place at least one disc.
    pub fn has_legal_move(&self) -> bool {
        !self.legal_squares().is_empty()
    }

    /// True when the side to move has no placement but the opponent still has one.
    pub fn can_pass(&self) -> bool {
        self.legal_squares().is_empty() && !self.mobility(self.side_to_move.opponent()).is_empty()
    }

    pub fn is_legal(&self, mv: Move) -> bool {
        match mv {
            Move::Pass => self.can_pass(),
            Move::Place(sq) => {
                let idx = sq.index();
                self.empties().contains(idx)
                    && !Self::flips(
                        self.discs(self.side_to_move),
                        self.discs(self.side_to_move.opponent()),
                        idx,
                    )
                    .is_empty()
            }
        }
    }

    /// Apply a legal move and hand the turn to the opponent.
    pub fn update(&mut self, mv: Move) -> Result<(), PositionError> {
        if !self.is_legal(mv) {
            return Err(PositionError::IllegalMove(mv));
        }
        if let Move::Place(sq) = mv {
            let idx = sq.index();
            let (player, opponent) = match self.side_to_move {
                DiscColor::Black => (&mut self.black, &mut self.white),
                DiscColor::White => (&mut self.white, &mut self.black),
            };
            let flipped = Self::flips(*player, *opponent, idx);
            *player |= flipped | Bitboard::from_square(idx);
            *opponent &= !flipped;
        }
        self.side_to_move = self.side_to_move.opponent();
        Ok(())
    }

    pub fn is_game_over(&self) -> bool {
        self.mobility(DiscColor::Black).is_empty() && self.mobility(DiscColor::White).is_empty()
    }

    /// Final result, or None while either side can still place a disc.
    pub fn game_result(&self) -> Option<GameResult> {
        if !self.is_game_over() {
            return None;
        }
        let black_discs = self.disc_count(DiscColor::Black);
        let white_discs = self.disc_count(DiscColor::White);
        let winner = match black_discs.cmp(&white_discs) {
            std::cmp::Ordering::Greater => Some(DiscColor::Black),
            std::cmp::Ordering::Less => Some(DiscColor::White),
            std::cmp::Ordering::Equal => None,
        };
        Some(GameResult {
            winner,
            black_discs,
            white_discs,
        })
    }
}

#[cfg(test)]
#[path = "board_tests.rs"]
mod tests;
