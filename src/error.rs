//! Typed error kinds surfaced at the crate boundary.
//!
//! Illegality inside make/undo is a `bool`, never one of these — these
//! cover only the boundary operations that can genuinely fail on bad
//! input: FEN parsing, UCI move/square text, and packed-move decoding.

use std::fmt;

/// A FEN string failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenError {
    pub field: &'static str,
    pub reason: String,
}

impl FenError {
    pub(crate) fn new(field: &'static str, reason: impl Into<String>) -> Self {
        FenError {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid FEN field `{}`: {}", self.field, self.reason)
    }
}

impl std::error::Error for FenError {}

/// A packed move integer had a field outside its domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidMoveEncoding {
    pub raw: u32,
}

impl fmt::Display for InvalidMoveEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "packed move 0x{:08x} has a field outside its domain", self.raw)
    }
}

impl std::error::Error for InvalidMoveEncoding {}

/// `a1`-`h8` text did not parse as a square.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSquare {
    pub text: String,
}

impl fmt::Display for InvalidSquare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid square text: `{}`", self.text)
    }
}

impl std::error::Error for InvalidSquare {}

/// UCI long-algebraic move text did not parse, or named no matching move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidUciMove {
    pub text: String,
    pub reason: String,
}

impl fmt::Display for InvalidUciMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid UCI move `{}`: {}", self.text, self.reason)
    }
}

impl std::error::Error for InvalidUciMove {}

/// `make_move_in_place` was invoked beyond the cookie stack's configured
/// capacity. A programmer error (the caller must respect max ply), not a
/// recoverable condition — this is only ever raised via panic, never
/// returned as a `Result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieStackOverflow {
    pub capacity: usize,
}

impl fmt::Display for CookieStackOverflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cookie stack overflow: make invoked beyond capacity {}",
            self.capacity
        )
    }
}

impl std::error::Error for CookieStackOverflow {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fen_error_display_names_field_and_reason() {
        let e = FenError::new("halfmove_clock", "not an integer");
        assert_eq!(
            e.to_string(),
            "invalid FEN field `halfmove_clock`: not an integer"
        );
    }

    #[test]
    fn invalid_square_display() {
        let e = InvalidSquare {
            text: "z9".to_string(),
        };
        assert_eq!(e.to_string(), "invalid square text: `z9`");
    }
}
