// src/board/castle_bits.rs

/// Underlying bit type for castling rights.
/// Use the same width you already use across the engine.
pub type CastleBits = u8;

// IMPORTANT: keep your original bit positions/values.
// Replace these literals with your current constants if they differ.
pub const CASTLE_WK: CastleBits = 0b0001;
pub const CASTLE_WQ: CastleBits = 0b0010;
pub const CASTLE_BK: CastleBits = 0b0100;
pub const CASTLE_BQ: CastleBits = 0b1000;

const ALL_RIGHTS: CastleBits = CASTLE_WK | CASTLE_WQ | CASTLE_BK | CASTLE_BQ;

const fn build_cr_lost_from() -> [CastleBits; 64] {
    let mut table = [ALL_RIGHTS; 64];
    table[4] = !(CASTLE_WK | CASTLE_WQ) & ALL_RIGHTS; // e1: king moves
    table[60] = !(CASTLE_BK | CASTLE_BQ) & ALL_RIGHTS; // e8: king moves
    table[0] &= !CASTLE_WQ; // a1: rook moves
    table[7] &= !CASTLE_WK; // h1: rook moves
    table[56] &= !CASTLE_BQ; // a8: rook moves
    table[63] &= !CASTLE_BK; // h8: rook moves
    table
}

const fn build_cr_lost_to() -> [CastleBits; 64] {
    let mut table = [ALL_RIGHTS; 64];
    table[0] &= !CASTLE_WQ; // a1 captured
    table[7] &= !CASTLE_WK; // h1 captured
    table[56] &= !CASTLE_BQ; // a8 captured
    table[63] &= !CASTLE_BK; // h8 captured
    table
}

/// Rights surviving a move whose origin is `sq`: intersect with
/// `CR_LOST_TO[to]` to get the full update, per spec's single
/// `cr &= CR_LOST_FROM[from] & CR_LOST_TO[to]`.
pub const CR_LOST_FROM: [CastleBits; 64] = build_cr_lost_from();
/// Rights surviving a move whose destination is `sq` (covers a rook
/// being captured on its home corner).
pub const CR_LOST_TO: [CastleBits; 64] = build_cr_lost_to();
