//! Bitboard representation for the 8x8 Reversi board.
//!
//! A bitboard is a 64-bit integer where each bit represents a square.
//! Bit 0 = a1, bit 7 = h1, bit 8 = a2, ..., bit 63 = h8 (row-major, row 1 first).

use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

/// A set of squares on the board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Bitboard(pub u64);

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);
    pub const ALL: Bitboard = Bitboard(!0);

    pub const COLUMN_A: Bitboard = Bitboard(0x0101010101010101);
    pub const COLUMN_H: Bitboard = Bitboard(0x8080808080808080);

    const NOT_COLUMN_A: u64 = !0x0101010101010101;
    const NOT_COLUMN_H: u64 = !0x8080808080808080;

    /// Every shift in the eight compass directions.
    pub const DIRECTIONS: [fn(Bitboard) -> Bitboard; 8] = [
        Bitboard::down,
        Bitboard::up,
        Bitboard::right,
        Bitboard::left,
        Bitboard::down_right,
        Bitboard::down_left,
        Bitboard::up_right,
        Bitboard::up_left,
    ];

    /// Create a bitboard with a single square set.
    #[inline(always)]
    pub const fn from_square(sq: u8) -> Self {
        Bitboard(1u64 << sq)
    }

    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline(always)]
    pub const fn contains(self, sq: u8) -> bool {
        (self.0 & (1u64 << sq)) != 0
    }

    #[inline(always)]
    pub fn set(&mut self, sq: u8) {
        self.0 |= 1u64 << sq;
    }

    #[inline(always)]
    pub fn clear(&mut self, sq: u8) {
        self.0 &= !(1u64 << sq);
    }

    /// Number of squares in the set.
    #[inline(always)]
    pub const fn popcount(self) -> u32 {
        self.0.count_ones()
    }

    /// Get and remove the least significant bit.
    #[inline(always)]
    pub fn pop_lsb(&mut self) -> Option<u8> {
        if self.0 == 0 {
            None
        } else {
            let sq = self.0.trailing_zeros() as u8;
            self.0 &= self.0 - 1;
            Some(sq)
        }
    }

    /// Shift toward row 8.
    #[inline(always)]
    pub const fn down(self) -> Bitboard {
        Bitboard(self.0 << 8)
    }

    /// Shift toward row 1.
    #[inline(always)]
    pub const fn up(self) -> Bitboard {
        Bitboard(self.0 >> 8)
    }

    /// Shift toward column h, masking out wrapping.
    #[inline(always)]
    pub const fn right(self) -> Bitboard {
        Bitboard((self.0 << 1) & Self::NOT_COLUMN_A)
    }

    /// Shift toward column a, masking out wrapping.
    #[inline(always)]
    pub const fn left(self) -> Bitboard {
        Bitboard((self.0 >> 1) & Self::NOT_COLUMN_H)
    }

    #[inline(always)]
    pub const fn down_right(self) -> Bitboard {
        Bitboard((self.0 << 9) & Self::NOT_COLUMN_A)
    }

    #[inline(always)]
    pub const fn down_left(self) -> Bitboard {
        Bitboard((self.0 << 7) & Self::NOT_COLUMN_H)
    }

    #[inline(always)]
    pub const fn up_right(self) -> Bitboard {
        Bitboard((self.0 >> 7) & Self::NOT_COLUMN_A)
    }

    #[inline(always)]
    pub const fn up_left(self) -> Bitboard {
        Bitboard((self.0 >> 9) & Self::NOT_COLUMN_H)
    }
}

impl BitAnd for Bitboard {
    type Output = Self;
    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 & rhs.0)
    }
}

impl BitAndAssign for Bitboard {
    #[inline(always)]
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl BitOr for Bitboard {
    type Output = Self;
    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 | rhs.0)
    }
}

impl BitOrAssign for Bitboard {
    #[inline(always)]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitXor for Bitboard {
    type Output = Self;
    #[inline(always)]
    fn bitxor(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 ^ rhs.0)
    }
}

impl BitXorAssign for Bitboard {
    #[inline(always)]
    fn bitxor_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0;
    }
}

impl Not for Bitboard {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self::Output {
        Bitboard(!self.0)
    }
}

/// Iterator over set squares, lowest index first.
impl Iterator for Bitboard {
    type Item = u8;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        self.pop_lsb()
    }
}

#[cfg(test)]
#[path = "bitboard_tests.rs"]
mod tests;
