//! FEN parsing and serialization.
//!
//! Every malformed field is reported through `FenError`; unlike some
//! parsers in the wild, a bad halfmove clock or side-to-move letter is
//! never silently defaulted away.

use super::fen_tables::{CHAR_TO_PC, PC_TO_CHAR};
use super::{Board, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, Color, Piece};
use crate::error::FenError;
use crate::hash::zobrist::ep_file_to_hash;
use crate::square::Square;

impl Board {
    /// Parses a board position from Forsyth-Edwards Notation.
    pub fn set_fen(&mut self, fen: &str) -> Result<(), FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(FenError::new(
                "fields",
                format!("expected at least 4 space-separated fields, found {}", parts.len()),
            ));
        }

        *self = Board::new_empty();

        let ranks: Vec<&str> = parts[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::new(
                "placement",
                format!("expected 8 ranks, found {}", ranks.len()),
            ));
        }
        for (rank_from_top, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_from_top;
            let mut file = 0usize;
            for c in rank_str.chars() {
                if file >= 8 {
                    return Err(FenError::new(
                        "placement",
                        format!("rank {} has more than 8 files", rank + 1),
                    ));
                }
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                    continue;
                }
                if !c.is_ascii() || CHAR_TO_PC[c as usize].is_none() {
                    return Err(FenError::new(
                        "placement",
                        format!("unrecognized piece glyph `{}`", c),
                    ));
                }
                let (piece, color) = CHAR_TO_PC[c as usize].unwrap();
                let sq = Square::from_index((rank * 8 + file) as u8);
                let bb = self.bb(color, piece) | (1u64 << sq.index());
                self.set_bb(color, piece, bb);
                file += 1;
            }
            if file != 8 {
                return Err(FenError::new(
                    "placement",
                    format!("rank {} covers {} files, expected 8", rank + 1, file),
                ));
            }
        }

        self.side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::new(
                    "side to move",
                    format!("expected `w` or `b`, found `{}`", other),
                ));
            }
        };

        self.castling_rights = 0;
        if parts[2] != "-" {
            for c in parts[2].chars() {
                self.castling_rights |= match c {
                    'K' => CASTLE_WK,
                    'Q' => CASTLE_WQ,
                    'k' => CASTLE_BK,
                    'q' => CASTLE_BQ,
                    other => {
                        return Err(FenError::new(
                            "castling rights",
                            format!("unrecognized character `{}`", other),
                        ));
                    }
                };
            }
        }

        self.en_passant = if parts[3] == "-" {
            None
        } else {
            Some(
                parts[3]
                    .parse::<Square>()
                    .map_err(|e| FenError::new("en passant target", e.to_string()))?,
            )
        };

        self.halfmove_clock = parts
            .get(4)
            .unwrap_or(&"0")
            .parse()
            .map_err(|_| FenError::new("halfmove clock", format!("not a valid integer: `{}`", parts.get(4).unwrap_or(&"0"))))?;

        self.fullmove_number = parts
            .get(5)
            .unwrap_or(&"1")
            .parse()
            .map_err(|_| FenError::new("fullmove number", format!("not a valid integer: `{}`", parts.get(5).unwrap_or(&"1"))))?;
        if self.fullmove_number == 0 {
            return Err(FenError::new("fullmove number", "must be at least 1".to_string()));
        }

        self.refresh_zobrist();
        Ok(())
    }

    /// Serializes the current position to Forsyth-Edwards Notation.
    pub fn to_fen(&self) -> String {
        let mut ranks = Vec::with_capacity(8);
        for rank in (0..8).rev() {
            let mut row = String::new();
            let mut empty = 0u32;
            for file in 0..8 {
                let sq = Square::from_index((rank * 8 + file) as u8);
                if let Some((color, piece)) = self.piece_at(sq) {
                    if empty > 0 {
                        row.push_str(&empty.to_string());
                        empty = 0;
                    }
                    let idx = (color as usize) * 6 + (piece as usize);
                    row.push(PC_TO_CHAR[idx]);
                } else {
                    empty += 1;
                }
            }
            if empty > 0 {
                row.push_str(&empty.to_string());
            }
            ranks.push(row);
        }

        let side = match self.side_to_move {
            Color::White => "w",
            Color::Black => "b",
        };

        let mut castling = String::new();
        if self.castling_rights & CASTLE_WK != 0 {
            castling.push('K');
        }
        if self.castling_rights & CASTLE_WQ != 0 {
            castling.push('Q');
        }
        if self.castling_rights & CASTLE_BK != 0 {
            castling.push('k');
        }
        if self.castling_rights & CASTLE_BQ != 0 {
            castling.push('q');
        }
        if castling.is_empty() {
            castling.push('-');
        }

        // Only write the EP square if it is actually capturable this ply;
        // a `Some` en_passant that no enemy pawn can take is written `-`.
        let ep = match ep_file_to_hash(self) {
            Some(_) => self.en_passant.unwrap().to_string(),
            None => "-".to_string(),
        };

        format!(
            "{} {} {} {} {} {}",
            ranks.join("/"),
            side,
            castling,
            ep,
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}
