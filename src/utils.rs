//! Free functions shared by the table builders and the move generator.

/// Index of the least-significant set bit, clearing it in `bb`.
///
/// Panics in debug builds if `bb` is zero — callers only invoke this while
/// iterating a non-empty bitboard.
#[inline(always)]
pub fn pop_lsb(bb: &mut u64) -> u8 {
    debug_assert!(*bb != 0, "pop_lsb on empty bitboard");
    let idx = bb.trailing_zeros() as u8;
    *bb &= *bb - 1;
    idx
}

/// Flattens a 0-based (rank, file) pair into a 0..64 square index (a1 = 0).
#[inline(always)]
pub fn square_index(rank: usize, file: usize) -> usize {
    rank * 8 + file
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_lsb_clears_and_returns_lowest_bit() {
        let mut bb = 0b1010_1000u64;
        assert_eq!(pop_lsb(&mut bb), 3);
        assert_eq!(bb, 0b1010_0000);
    }

    #[test]
    fn square_index_matches_a1_zero_numbering() {
        assert_eq!(square_index(0, 0), 0); // a1
        assert_eq!(square_index(0, 7), 7); // h1
        assert_eq!(square_index(7, 0), 56); // a8
        assert_eq!(square_index(7, 7), 63); // h8
    }
}
