use std::fmt;
use std::str::FromStr;

use crate::error::PositionError;

pub const BOARD_SIZE: u8 = 8;
pub const SQUARE_NUM: u8 = BOARD_SIZE * BOARD_SIZE;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiscColor {
    Black,
    White,
}

impl DiscColor {
    pub fn opponent(self) -> DiscColor {
        match self {
            DiscColor::Black => DiscColor::White,
            DiscColor::White => DiscColor::Black,
        }
    }

    pub fn idx(self) -> usize {
        match self {
            DiscColor::Black => 0,
            DiscColor::White => 1,
        }
    }
}

impl fmt::Display for DiscColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscColor::Black => write!(f, "Black"),
            DiscColor::White => write!(f, "White"),
        }
    }
}

/// A board square, 0..64 in row-major order starting at a1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    /// f5, the conventional first move for Black.
    pub const F5: Square = Square(4 * BOARD_SIZE + 5);

    pub fn new(index: u8) -> Option<Square> {
        (index < SQUARE_NUM).then_some(Square(index))
    }

    /// Square from zero-based column (a = 0) and row (1 = 0).
    pub fn from_coords(col: u8, row: u8) -> Option<Square> {
        if col < BOARD_SIZE && row < BOARD_SIZE {
            Some(Square(row * BOARD_SIZE + col))
        } else {
            None
        }
    }

    #[inline]
    pub fn index(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn col(self) -> u8 {
        self.0 % BOARD_SIZE
    }

    #[inline]
    pub fn row(self) -> u8 {
        self.0 / BOARD_SIZE
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = (b'a' + self.col()) as char;
        let r = (b'1' + self.row()) as char;
        write!(f, "{c}{r}")
    }
}

impl FromStr for Square {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let b = s.as_bytes();
        if b.len() != 2 {
            return Err(PositionError::InvalidCoordinate(s.to_string()));
        }
        let col = b[0].to_ascii_lowercase().wrapping_sub(b'a');
        let row = b[1].wrapping_sub(b'1');
        Square::from_coords(col, row).ok_or_else(|| PositionError::InvalidCoordinate(s.to_string()))
    }
}

/// A move: a disc placed on a square, or a pass when no placement exists.
///
/// The absence of a move (a failed parse, an aborted request) is modelled
/// as `Option<Move>::None` rather than a third variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    Place(Square),
    Pass,
}

impl Move {
    pub fn square(self) -> Option<Square> {
        match self {
            Move::Place(sq) => Some(sq),
            Move::Pass => None,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Place(sq) => sq.fmt(f),
            Move::Pass => write!(f, "pass"),
        }
    }
}

impl FromStr for Move {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("pass") {
            return Ok(Move::Pass);
        }
        s.parse().map(Move::Place)
    }
}

/// Parse a protocol token into a move, yielding `None` for anything unparseable.
pub fn parse_move(token: &str) -> Option<Move> {
    token.parse().ok()
}

/// Text for an optional move, with `null` standing in for the absent move.
pub fn move_text(mv: &Option<Move>) -> String {
    match mv {
        Some(mv) => mv.to_string(),
        None => "null".to_string(),
    }
}
