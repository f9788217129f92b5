use crate::board::{Board, Color, Piece};
use crate::error::{InvalidMoveEncoding, InvalidUciMove};
use crate::moves::execute::generate_legal;
use crate::moves::magic::MagicTables;
use crate::square::Square;
use arrayvec::ArrayVec;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

pub trait MoveBuffer: Deref<Target = [Move]> + DerefMut {
    fn push(&mut self, mv: Move);
    fn clear(&mut self);
}

impl MoveBuffer for Vec<Move> {
    fn push(&mut self, mv: Move) {
        self.push(mv);
    }
    fn clear(&mut self) {
        self.clear();
    }
}

impl<const N: usize> MoveBuffer for ArrayVec<Move, N> {
    fn push(&mut self, mv: Move) {
        self.push(mv);
    }
    fn clear(&mut self) {
        self.clear();
    }
}

// Move flag encoding (4 bits)
// Bits 0-1: Special move type (00=quiet, 01=double pawn, 10=kingside castle, 11=queenside castle)
// Bit 2: Capture flag
// Bit 3: Promotion flag
pub const QUIET_MOVE: u8 = 0b0000;
pub const DOUBLE_PAWN_PUSH: u8 = 0b0001;
pub const KINGSIDE_CASTLE: u8 = 0b0010;
pub const QUEENSIDE_CASTLE: u8 = 0b0011;
pub const CAPTURE: u8 = 0b0100;
pub const EN_PASSANT: u8 = 0b0101;
pub const PROMOTION: u8 = 0b1000;
pub const PROMOTION_CAPTURE: u8 = 0b1100;

/// The four move kinds the packed move integer and DIFF_INFO cookie
/// distinguish. Capture status is carried separately (by occupancy of
/// `to` at make time), not by this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MoveKind {
    Normal = 0,
    Promotion = 1,
    EnPassant = 2,
    Castle = 3,
}

impl MoveKind {
    fn from_bits(bits: u32) -> Result<Self, InvalidMoveEncoding> {
        match bits {
            0 => Ok(MoveKind::Normal),
            1 => Ok(MoveKind::Promotion),
            2 => Ok(MoveKind::EnPassant),
            3 => Ok(MoveKind::Castle),
            _ => unreachable!("2-bit field"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub promotion: Option<Piece>,
    pub flags: u8,
}

/// Encodes a promotion piece into the 2-bit `promo` field: 0=N,1=B,2=R,3=Q.
fn promo_bits(piece: Piece) -> u32 {
    match piece {
        Piece::Knight => 0,
        Piece::Bishop => 1,
        Piece::Rook => 2,
        Piece::Queen => 3,
        _ => unreachable!("only N/B/R/Q can be a promotion target"),
    }
}

fn promo_from_bits(bits: u32) -> Piece {
    match bits {
        0 => Piece::Knight,
        1 => Piece::Bishop,
        2 => Piece::Rook,
        _ => Piece::Queen,
    }
}

impl Move {
    #[inline(always)]
    pub fn is_capture(&self) -> bool {
        (self.flags & CAPTURE) != 0
    }

    #[inline(always)]
    pub fn is_en_passant(&self) -> bool {
        self.flags == EN_PASSANT
    }

    #[inline(always)]
    pub fn is_castling(&self) -> bool {
        self.flags == KINGSIDE_CASTLE || self.flags == QUEENSIDE_CASTLE
    }

    #[inline(always)]
    pub fn is_kingside_castle(&self) -> bool {
        self.flags == KINGSIDE_CASTLE
    }

    #[inline(always)]
    pub fn is_queenside_castle(&self) -> bool {
        self.flags == QUEENSIDE_CASTLE
    }

    #[inline(always)]
    pub fn is_promotion(&self) -> bool {
        (self.flags & PROMOTION) != 0
    }

    #[inline(always)]
    pub fn is_double_pawn_push(&self) -> bool {
        self.flags == DOUBLE_PAWN_PUSH
    }

    #[inline(always)]
    pub fn is_quiet(&self) -> bool {
        self.flags == QUIET_MOVE
    }

    fn kind(&self) -> MoveKind {
        if self.is_promotion() {
            MoveKind::Promotion
        } else if self.is_en_passant() {
            MoveKind::EnPassant
        } else if self.is_castling() {
            MoveKind::Castle
        } else {
            MoveKind::Normal
        }
    }

    /// Packs this move into the 32-bit external move integer:
    /// `from | (to<<6) | (promo<<12) | (type<<14) | (mover<<16)`.
    /// `mover` is the combined color+piece index (0-11, `WP..BK` order)
    /// of the piece making the move, supplied by the caller since a
    /// bare `Move` does not itself carry the side to move.
    pub fn to_packed(&self, color: Color) -> u32 {
        let from = self.from.index() as u32;
        let to = self.to.index() as u32;
        let promo = self.promotion.map(promo_bits).unwrap_or(0);
        let kind = self.kind() as u32;
        let mover = (color as u32) * 6 + (self.piece as u32);

        from | (to << 6) | (promo << 12) | (kind << 14) | (mover << 16)
    }

    /// Reconstructs a move (plus the color of its mover) from a packed
    /// move integer. Flags narrower than the full `Move` representation
    /// (capture/double-push distinctions) are not recoverable from the
    /// packed form alone; this is sufficient to replay the move through
    /// `make_move_in_place`, which re-derives capture status itself.
    pub fn from_packed(bits: u32) -> Result<(Move, Color), InvalidMoveEncoding> {
        let from = (bits & 0x3f) as u8;
        let to = ((bits >> 6) & 0x3f) as u8;
        let promo = (bits >> 12) & 0x3;
        let kind_bits = (bits >> 14) & 0x3;
        let mover = (bits >> 16) & 0xf;

        if mover > 11 {
            return Err(InvalidMoveEncoding { raw: bits });
        }
        let color = if mover < 6 { Color::White } else { Color::Black };
        let piece = Piece::from_u8((mover % 6) as u8);
        let kind = MoveKind::from_bits(kind_bits)?;

        let (promotion, flags) = match kind {
            MoveKind::Promotion => (Some(promo_from_bits(promo)), PROMOTION),
            MoveKind::EnPassant => (None, EN_PASSANT),
            MoveKind::Castle => {
                let flags = if to > from {
                    KINGSIDE_CASTLE
                } else {
                    QUEENSIDE_CASTLE
                };
                (None, flags)
            }
            MoveKind::Normal => (None, QUIET_MOVE),
        };

        Ok((
            Move {
                from: Square::from_index(from),
                to: Square::from_index(to),
                piece,
                promotion,
                flags,
            },
            color,
        ))
    }

    pub fn to_uci(&self) -> String {
        let promo = if let Some(p) = self.promotion {
            match p {
                Piece::Queen => "q",
                Piece::Rook => "r",
                Piece::Bishop => "b",
                Piece::Knight => "n",
                _ => "",
            }
        } else {
            ""
        };

        format!("{}{}{}", self.from, self.to, promo)
    }

    /// Parses long-algebraic UCI move text (`<from><to>[promo]`, e.g.
    /// `e2e4` or `a7a8q`) and resolves it against `board`'s legal moves,
    /// since the flags/piece fields a bare `Move` needs cannot be
    /// recovered from the text alone.
    pub fn from_uci(
        text: &str,
        board: &mut Board,
        tables: &MagicTables,
    ) -> Result<Move, InvalidUciMove> {
        if text.len() < 4 || text.len() > 5 {
            return Err(InvalidUciMove {
                text: text.to_string(),
                reason: "expected 4 or 5 characters: <from><to>[promo]".to_string(),
            });
        }

        let from = Square::from_str(&text[0..2]).map_err(|_| InvalidUciMove {
            text: text.to_string(),
            reason: "unparseable source square".to_string(),
        })?;
        let to = Square::from_str(&text[2..4]).map_err(|_| InvalidUciMove {
            text: text.to_string(),
            reason: "unparseable destination square".to_string(),
        })?;
        let promotion = match text.as_bytes().get(4) {
            None => None,
            Some(b'q') | Some(b'Q') => Some(Piece::Queen),
            Some(b'r') | Some(b'R') => Some(Piece::Rook),
            Some(b'b') | Some(b'B') => Some(Piece::Bishop),
            Some(b'n') | Some(b'N') => Some(Piece::Knight),
            Some(_) => {
                return Err(InvalidUciMove {
                    text: text.to_string(),
                    reason: "unrecognized promotion piece".to_string(),
                });
            }
        };

        let mut legal: Vec<Move> = Vec::with_capacity(64);
        let mut scratch: Vec<Move> = Vec::with_capacity(256);
        generate_legal(board, tables, &mut legal, &mut scratch);

        legal
            .into_iter()
            .find(|mv| mv.from == from && mv.to == to && mv.promotion == promotion)
            .ok_or_else(|| InvalidUciMove {
                text: text.to_string(),
                reason: "no legal move matches this source/destination/promotion".to_string(),
            })
    }
}

/// Journal entry for one completed `make_move_in_place` call. Holds the
/// DIFF_INFO fields (from/to/mover/capture/castling-rook/promotion) plus
/// the previous `Meta` snapshot, stored raw (not XOR-delta) per the
/// crate's resolution of spec.md's "either encoding is correct".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Undo {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub color: Color,
    pub prev_side: Color,
    pub capture: Option<(Color, Piece, Square)>,
    pub castling_rook: Option<(Square /* rook_from */, Square /* rook_to */)>,

    pub prev_castling_rights: u8,
    pub promotion: Option<Piece>,
    pub prev_en_passant: Option<Square>,

    pub prev_halfmove_clock: u16,
    pub prev_fullmove_number: u16,
    pub prev_zobrist: u64,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Start with from->to like e2e4
        let mut s = format!("{}{}", self.from, self.to);

        // Add promotion piece if applicable (lowercase for UCI style)
        if let Some(promo) = self.promotion {
            let c = match promo {
                Piece::Queen => 'q',
                Piece::Rook => 'r',
                Piece::Bishop => 'b',
                Piece::Knight => 'n',
                _ => '?', // Should never happen
            };
            s.push(c);
        }

        // If verbose mode requested, we could add special tags
        if f.alternate() {
            // like "{:#}" formatting
            if self.is_castling() {
                s.push_str(" (castle)");
            } else if self.is_en_passant() {
                s.push_str(" (ep)");
            } else if self.is_capture() {
                s.push_str(" (x)");
            }
        }

        write!(f, "{}", s)
    }
}
