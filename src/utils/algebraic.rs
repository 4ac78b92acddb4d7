//! Conversions between algebraic coordinates (`e4`) and board squares.
//!
//! Parsing is strict: exactly one file letter `a`..`h` followed by one rank
//! digit `1`..`8`. Anything else is an error, never a panic.

use crate::chess_errors::ChessErrors;
use crate::game_state::chess_types::Square;

/// Convert algebraic notation (for example: "e4") to a square.
pub fn algebraic_to_square(square: &str) -> Result<Square, ChessErrors> {
    let invalid = || ChessErrors::InvalidAlgebraicString(square.to_owned());

    let bytes = square.as_bytes();
    if bytes.len() != 2 {
        return Err(invalid());
    }

    let file = bytes[0];
    let rank = bytes[1];
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return Err(invalid());
    }

    Square::new((rank - b'1') as i8, (file - b'a') as i8).ok_or_else(invalid)
}
