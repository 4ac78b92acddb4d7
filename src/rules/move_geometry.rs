//! Pure per-piece movement geometry.
//!
//! `is_valid_move` answers "may this piece travel from here to there on this
//! board" without looking at check, castling rights or en passant. Those are
//! layered on top by `check_detection` and `special_moves`.

use crate::game_state::board::Board;
use crate::game_state::chess_rules::KING_HOME_COL;
use crate::game_state::chess_types::*;

/// Geometry and occupancy check for `mv` with `side_to_move` on move.
pub fn is_valid_move(board: &Board, mv: &ChessMove, side_to_move: Color) -> bool {
    let Some(piece) = board.get(mv.from) else {
        return false;
    };
    if piece.color != side_to_move || mv.from == mv.to {
        return false;
    }
    if let Some(target) = board.get(mv.to) {
        if target.color == piece.color {
            return false;
        }
    }

    match piece.kind {
        PieceKind::Pawn => is_valid_pawn_move(board, mv, piece.color),
        PieceKind::Knight => is_knight_step(mv),
        PieceKind::Bishop => is_diagonal(mv) && path_is_clear(board, mv.from, mv.to),
        PieceKind::Rook => is_orthogonal(mv) && path_is_clear(board, mv.from, mv.to),
        PieceKind::Queen => {
            (is_diagonal(mv) || is_orthogonal(mv)) && path_is_clear(board, mv.from, mv.to)
        }
        PieceKind::King => is_king_step(mv) || is_castling_shape(mv, piece.color),
    }
}

fn is_valid_pawn_move(board: &Board, mv: &ChessMove, color: Color) -> bool {
    let direction = color.pawn_direction();
    let d_row = mv.row_delta();
    let d_col = mv.col_delta().abs();

    if d_col == 0 {
        if !board.is_empty(mv.to) {
            return false;
        }
        if d_row == direction {
            return true;
        }
        if d_row == 2 * direction && mv.from.row() == color.pawn_start_row() {
            return mv
                .from
                .offset(direction, 0)
                .is_some_and(|between| board.is_empty(between));
        }
        return false;
    }

    // Diagonal steps need an enemy on the target; en passant is handled by the state.
    d_col == 1 && d_row == direction && !board.is_empty(mv.to)
}

#[inline]
pub fn is_knight_step(mv: &ChessMove) -> bool {
    let (d_row, d_col) = (mv.row_delta().abs(), mv.col_delta().abs());
    (d_row == 2 && d_col == 1) || (d_row == 1 && d_col == 2)
}

#[inline]
pub fn is_diagonal(mv: &ChessMove) -> bool {
    let d_row = mv.row_delta().abs();
    d_row != 0 && d_row == mv.col_delta().abs()
}

#[inline]
pub fn is_orthogonal(mv: &ChessMove) -> bool {
    (mv.row_delta() == 0) != (mv.col_delta() == 0)
}

#[inline]
pub fn is_king_step(mv: &ChessMove) -> bool {
    let (d_row, d_col) = (mv.row_delta().abs(), mv.col_delta().abs());
    d_row <= 1 && d_col <= 1 && (d_row, d_col) != (0, 0)
}

/// Two columns sideways from the king's home square. Only legal with castling rights.
#[inline]
pub fn is_castling_shape(mv: &ChessMove, color: Color) -> bool {
    mv.from.row() == color.home_row()
        && mv.from.col() == KING_HOME_COL
        && mv.row_delta() == 0
        && mv.col_delta().abs() == 2
}

/// True when every square strictly between `from` and `to` is empty.
///
/// Walks unit steps along the line; callers only pass straight or diagonal lines.
pub fn path_is_clear(board: &Board, from: Square, to: Square) -> bool {
    let step_row = (to.row() as i8 - from.row() as i8).signum();
    let step_col = (to.col() as i8 - from.col() as i8).signum();

    let mut current = from;
    loop {
        let Some(next) = current.offset(step_row, step_col) else {
            return false;
        };
        if next == to {
            return true;
        }
        if !board.is_empty(next) {
            return false;
        }
        current = next;
    }
}
