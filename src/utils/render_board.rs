//! Terminal-oriented board renderer.
//!
//! Prints the storage codes (`WK`, `BP`, `--`) rank 8 first, which is what the
//! command-line host shows and what log lines carry at `debug` level.

use crate::game_state::board::Board;
use crate::game_state::chess_types::Square;

const EMPTY_CODE: &str = "--";

pub fn render_board(board: &Board) -> String {
    let mut out = String::new();

    for row in (0..8i8).rev() {
        out.push(char::from(b'1' + row as u8));
        out.push(' ');

        for col in 0..8i8 {
            match Square::new(row, col).and_then(|square| board.get(square)) {
                Some(piece) => out.push_str(&piece.code()),
                None => out.push_str(EMPTY_CODE),
            }
            out.push(' ');
        }

        out.push('\n');
    }

    out.push_str("  a  b  c  d  e  f  g  h");
    out
}
