use thiserror::Error;

use crate::types::Move;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("invalid coordinate: {0:?}")]
    InvalidCoordinate(String),

    #[error("move {0} is not legal in this position")]
    IllegalMove(Move),

    #[error("encoded board must be {expected} characters, got {actual}")]
    BadLength { expected: usize, actual: usize },

    #[error("unexpected symbol {symbol:?} at index {index} of encoded board")]
    BadSymbol { index: usize, symbol: char },
}
