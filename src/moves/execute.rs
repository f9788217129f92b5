use crate::board::castle_bits::{CR_LOST_FROM, CR_LOST_TO};
use crate::board::{Board, Color, EMPTY_SQ, Piece};
use crate::hash::zobrist::{ep_file_to_hash, xor_castling_rights_delta, zobrist_keys};
use crate::moves::magic::MagicTables;
use crate::moves::movegen::generate_pseudo_legal;
use crate::moves::square_control::{in_check, is_legal_castling};
use crate::moves::types::{Move, MoveBuffer, Undo};
use crate::square::Square;

/// Precomputed castling rook moves by king destination index.
#[inline(always)]
fn rook_castle_squares(king_to_idx: u8) -> Option<(Square, Square)> {
    match king_to_idx {
        6 => Some((Square::from_index(7), Square::from_index(5))), // White O-O
        2 => Some((Square::from_index(0), Square::from_index(3))), // White O-O-O
        62 => Some((Square::from_index(63), Square::from_index(61))), // Black O-O
        58 => Some((Square::from_index(56), Square::from_index(59))), // Black O-O-O
        _ => None,
    }
}

/// Helper: clear a piece bit and table entry at `idx`.
#[inline(always)]
fn remove_piece(board: &mut Board, color: Color, piece: Piece, idx: usize) {
    let new_bb = board.bb(color, piece) & !(1u64 << idx);
    board.set_bb(color, piece, new_bb);
}

/// Helper: set a piece bit and table entry at `idx`.
#[inline(always)]
fn place_piece(board: &mut Board, color: Color, piece: Piece, idx: usize) {
    let new_bb = board.bb(color, piece) | (1u64 << idx);
    board.set_bb(color, piece, new_bb);
}

/// Applies `mv` to `board` in place, pushing an undo cookie onto
/// `board.cookies` on success. Returns `false` (state fully restored,
/// no cookie pushed) if the move leaves its own king in check.
///
/// # Panics
/// Panics if the cookie stack is already at capacity — the caller has
/// exceeded the maximum supported ply depth, a programmer error rather
/// than a recoverable condition.
pub fn make_move_in_place(board: &mut Board, tables: &MagicTables, mv: Move) -> bool {
    if board.cookies.is_full() {
        panic!(
            "{}",
            crate::error::CookieStackOverflow {
                capacity: board.cookies.capacity(),
            }
        );
    }
    if mv.is_castling() && !is_legal_castling(board, mv, tables) {
        return false;
    }

    let prev_zobrist = board.zobrist;
    let color = board.side_to_move;
    let piece = mv.piece;
    let from_idx = mv.from.index() as usize;
    let to_idx = mv.to.index() as usize;

    let prev_en_passant = board.en_passant;
    let prev_halfmove_clock = board.halfmove_clock;
    let prev_fullmove_number = board.fullmove_number;
    let prev_castling_rights = board.castling_rights;

    // XOR out the old EP-file hash contribution before mutating anything.
    if let Some(f) = ep_file_to_hash(board) {
        board.zobrist ^= zobrist_keys().ep_file[f as usize];
    }
    board.en_passant = None;

    // Capture handling.
    let mut capture = None;
    if mv.is_en_passant() {
        let cap_sq = if color == Color::White {
            to_idx - 8
        } else {
            to_idx + 8
        };
        capture = Some((
            color.opposite(),
            Piece::Pawn,
            Square::from_index(cap_sq as u8),
        ));
        remove_piece(board, color.opposite(), Piece::Pawn, cap_sq);
    } else {
        let occupant = board.piece_on_sq[to_idx];
        if occupant != EMPTY_SQ {
            let cap_color = Color::from_u8(occupant >> 3);
            let cap_piece = Piece::from_u8(occupant & 0b111);
            if cap_piece == Piece::King {
                // Would capture the enemy king: the move was never legal to begin with.
                undo_partial_capture_free(board, prev_zobrist, prev_en_passant);
                return false;
            }
            capture = Some((cap_color, cap_piece, mv.to));
            remove_piece(board, cap_color, cap_piece, to_idx);
        }
    }

    let castling_rook = if mv.is_castling() {
        rook_castle_squares(to_idx as u8)
    } else {
        None
    };

    // En passant target: set iff this was a pawn double push.
    if piece == Piece::Pawn {
        let from_rank = from_idx / 8;
        let to_rank = to_idx / 8;
        if (color == Color::White && from_rank == 1 && to_rank == 3)
            || (color == Color::Black && from_rank == 6 && to_rank == 4)
        {
            let ep_sq = if color == Color::White {
                from_idx + 8
            } else {
                from_idx - 8
            };
            board.en_passant = Some(Square::from_index(ep_sq as u8));
            debug_assert!(
                (color == Color::White && ep_sq / 8 == 2) || (color == Color::Black && ep_sq / 8 == 5),
                "EP square on wrong rank"
            );
        }
    }

    // Castling rights: cr &= CR_LOST_FROM[from] & CR_LOST_TO[to], plus the
    // captured-rook case (rights lost at the capture square too).
    let mut new_rights = prev_castling_rights & CR_LOST_FROM[from_idx] & CR_LOST_TO[from_idx];
    new_rights &= CR_LOST_FROM[to_idx] & CR_LOST_TO[to_idx];
    if new_rights != prev_castling_rights {
        board.castling_rights = new_rights;
        xor_castling_rights_delta(&mut board.zobrist, zobrist_keys(), prev_castling_rights, new_rights);
    }

    // Move / promote.
    remove_piece(board, color, piece, from_idx);
    if let Some(prom) = mv.promotion {
        debug_assert!(piece == Piece::Pawn, "only pawns can promote");
        place_piece(board, color, prom, to_idx);
    } else {
        place_piece(board, color, piece, to_idx);
    }

    // Rook shuffle on castling.
    if let Some((rook_from, rook_to)) = castling_rook {
        remove_piece(board, color, Piece::Rook, rook_from.index() as usize);
        place_piece(board, color, Piece::Rook, rook_to.index() as usize);
    }

    // Clocks, saturating per spec.
    if capture.is_some() || piece == Piece::Pawn {
        board.halfmove_clock = 0;
    } else {
        board.halfmove_clock = prev_halfmove_clock.saturating_add(1).min(127);
    }
    if color == Color::Black {
        board.fullmove_number = prev_fullmove_number.saturating_add(1).min(511);
    }

    board.side_to_move = color.opposite();
    board.zobrist ^= zobrist_keys().side_to_move;

    if let Some(f) = ep_file_to_hash(board) {
        board.zobrist ^= zobrist_keys().ep_file[f as usize];
    }

    #[cfg(debug_assertions)]
    debug_assert_valid_ep(board);

    #[cfg(all(debug_assertions, feature = "paranoid_hash"))]
    {
        let full = board.compute_zobrist_full();
        let diff = board.zobrist ^ full;
        if diff != 0 {
            tracing::debug!(diff = format!("{:#018x}", diff), "zobrist parity mismatch");
        }
    }

    let undo = Undo {
        from: mv.from,
        to: mv.to,
        piece,
        color,
        prev_side: color,
        capture,
        castling_rook,
        prev_castling_rights,
        promotion: mv.promotion,
        prev_en_passant,
        prev_halfmove_clock,
        prev_fullmove_number,
        prev_zobrist,
    };

    // Legality check: the mover's own king must not be attacked.
    if in_check(board, color, tables) {
        rollback(board, &undo);
        return false;
    }

    board.cookies.push(undo);
    #[cfg(debug_assertions)]
    board.assert_hash();
    true
}

/// Reverses the mutation performed so far when a king-capture is detected
/// before any board state beyond the EP hash/field has actually changed.
#[inline(always)]
fn undo_partial_capture_free(board: &mut Board, prev_zobrist: u64, prev_en_passant: Option<Square>) {
    board.zobrist = prev_zobrist;
    board.en_passant = prev_en_passant;
}

/// Reverses every mutation `make_move_in_place` performed, without
/// touching the cookie stack. Shared by the illegal-move rollback path
/// and `undo_move_in_place`.
fn rollback(board: &mut Board, undo: &Undo) {
    if let Some(f) = ep_file_to_hash(board) {
        board.zobrist ^= zobrist_keys().ep_file[f as usize];
    }

    board.side_to_move = undo.prev_side;
    board.zobrist ^= zobrist_keys().side_to_move;

    let kz = zobrist_keys();
    if board.castling_rights != undo.prev_castling_rights {
        xor_castling_rights_delta(&mut board.zobrist, kz, board.castling_rights, undo.prev_castling_rights);
    }
    board.castling_rights = undo.prev_castling_rights;

    board.halfmove_clock = undo.prev_halfmove_clock;
    board.fullmove_number = undo.prev_fullmove_number;

    let from_idx = undo.from.index() as usize;
    let to_idx = undo.to.index() as usize;

    if let Some(prom) = undo.promotion {
        remove_piece(board, undo.color, prom, to_idx);
        place_piece(board, undo.color, Piece::Pawn, from_idx);
    } else {
        remove_piece(board, undo.color, undo.piece, to_idx);
        place_piece(board, undo.color, undo.piece, from_idx);
    }

    if let Some((cap_color, cap_piece, cap_sq)) = undo.capture {
        place_piece(board, cap_color, cap_piece, cap_sq.index() as usize);
    }

    if let Some((rook_from, rook_to)) = undo.castling_rook {
        remove_piece(board, undo.color, Piece::Rook, rook_to.index() as usize);
        place_piece(board, undo.color, Piece::Rook, rook_from.index() as usize);
    }

    board.en_passant = undo.prev_en_passant;
    if let Some(f) = ep_file_to_hash(board) {
        board.zobrist ^= kz.ep_file[f as usize];
    }

    board.zobrist = undo.prev_zobrist;

    #[cfg(debug_assertions)]
    debug_assert_valid_ep(board);
}

/// Reverses the most recently completed make, popping its cookie.
///
/// # Panics
/// Panics if the cookie stack is empty — the precondition is that the
/// previous call on this board was a `make_move_in_place` returning `true`.
pub fn undo_move_in_place(board: &mut Board) {
    let undo = board.cookies.pop().expect("undo called with no matching make");
    rollback(board, &undo);
    #[cfg(debug_assertions)]
    board.assert_hash();
}

pub fn generate_legal(
    board: &mut Board,
    tables: &MagicTables,
    moves: &mut impl MoveBuffer,
    scratch: &mut impl MoveBuffer,
) {
    scratch.clear();
    generate_pseudo_legal(board, tables, scratch);
    moves.clear();

    for mv in scratch.iter().copied() {
        if make_move_in_place(board, tables, mv) {
            undo_move_in_place(board);
            moves.push(mv);
        }
    }
}

/// Check if a pseudo-legal move is legal (doesn't leave own king in check).
#[inline]
pub fn is_legal_move(board: &mut Board, tables: &MagicTables, mv: Move) -> bool {
    if make_move_in_place(board, tables, mv) {
        undo_move_in_place(board);
        true
    } else {
        false
    }
}

/// Generate only legal capture moves (captures, promotion-captures, en passant).
pub fn generate_captures(
    board: &mut Board,
    tables: &MagicTables,
    moves: &mut impl MoveBuffer,
    scratch: &mut impl MoveBuffer,
) {
    scratch.clear();
    generate_pseudo_legal(board, tables, scratch);
    moves.clear();

    for &mv in scratch.iter() {
        if !mv.is_capture() && !mv.is_en_passant() {
            continue;
        }
        if is_legal_move(board, tables, mv) {
            moves.push(mv);
        }
    }
}

#[cfg(debug_assertions)]
#[inline]
pub(crate) fn debug_assert_valid_ep(board: &Board) {
    if let Some(ep) = board.en_passant {
        let ep_idx = ep.index() as usize;
        let ep_rank = ep_idx / 8;
        match board.side_to_move {
            Color::White => {
                debug_assert!(
                    ep_rank == 5,
                    "EP must be on rank 6 when White is to move, got rank {} at {:?}",
                    ep_rank,
                    ep
                );
            }
            Color::Black => {
                debug_assert!(
                    ep_rank == 2,
                    "EP must be on rank 3 when Black is to move, got rank {} at {:?}",
                    ep_rank,
                    ep
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::magic::loader::load_magic_tables;
    use crate::moves::movegen::generate_pseudo_legal;
    use arrayvec::ArrayVec;
    use std::str::FromStr;

    #[test]
    fn make_undo_round_trips_hash_and_state() {
        let tables = load_magic_tables();
        let mut board = Board::new();
        let start = board.clone();

        let mut moves: ArrayVec<Move, 256> = ArrayVec::new();
        generate_pseudo_legal(&board, tables, &mut moves);
        let mv = moves[0];

        assert!(make_move_in_place(&mut board, tables, mv));
        assert_ne!(board.zobrist, start.zobrist);
        undo_move_in_place(&mut board);
        assert_eq!(board, start);
    }

    #[test]
    fn illegal_move_leaves_board_unchanged() {
        // Black king on e8, pinned-ish setup isn't needed: moving the white
        // king into check by the black rook is enough to exercise rollback.
        let fen = "4r3/8/8/8/8/8/8/4K3 w - - 0 1";
        let mut board = Board::from_str(fen).unwrap();
        let start = board.clone();
        let tables = load_magic_tables();

        let illegal = Move {
            from: Square::from_index(4),  // e1
            to: Square::from_index(12),   // e2, still on the rook's file
            piece: Piece::King,
            promotion: None,
            flags: crate::moves::types::QUIET_MOVE,
        };
        assert!(!make_move_in_place(&mut board, tables, illegal));
        assert_eq!(board, start);
    }

    #[test]
    fn halfmove_clock_saturates_at_127() {
        let fen = "4k3/8/8/8/8/8/8/4K3 w - - 126 1";
        let mut board = Board::from_str(fen).unwrap();
        let tables = load_magic_tables();
        let mv = Move {
            from: Square::from_index(4),
            to: Square::from_index(5),
            piece: Piece::King,
            promotion: None,
            flags: crate::moves::types::QUIET_MOVE,
        };
        assert!(make_move_in_place(&mut board, tables, mv));
        assert_eq!(board.halfmove_clock, 127);
    }
}
