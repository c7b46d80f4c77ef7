use super::*;

#[test]
fn test_from_square() {
    assert_eq!(Bitboard::from_square(0).0, 1); // a1
    assert_eq!(Bitboard::from_square(7).0, 128); // h1
    assert_eq!(Bitboard::from_square(63).0, 1 << 63); // h8
}

#[test]
fn test_popcount() {
    assert_eq!(Bitboard::EMPTY.popcount(), 0);
    assert_eq!(Bitboard::COLUMN_A.popcount(), 8);
    assert_eq!(Bitboard::ALL.popcount(), 64);
}

#[test]
fn test_iterator() {
    let bb = Bitboard(0b1010);
    let squares: Vec<u8> = bb.collect();
    assert_eq!(squares, vec![1, 3]);
}

#[test]
fn test_shifts_do_not_wrap() {
    let a1 = Bitboard::from_square(0);
    assert_eq!(a1.down(), Bitboard::from_square(8));
    assert_eq!(a1.right(), Bitboard::from_square(1));
    assert_eq!(a1.left(), Bitboard::EMPTY);
    assert_eq!(a1.up(), Bitboard::EMPTY);
    assert_eq!(a1.up_left(), Bitboard::EMPTY);

    let h1 = Bitboard::from_square(7);
    assert_eq!(h1.right(), Bitboard::EMPTY);
    assert_eq!(h1.down_right(), Bitboard::EMPTY);
    assert_eq!(h1.down_left(), Bitboard::from_square(14));
}

#[test]
fn test_every_direction_moves_one_step() {
    // d4 sits in the middle, so every shift lands on a neighbour
    let d4 = Bitboard::from_square(27);
    for shift in Bitboard::DIRECTIONS {
        assert_eq!(shift(d4).popcount(), 1);
    }
}
