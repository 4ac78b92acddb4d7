//! Attack, check, and legal-reply detection on a bare board.
//!
//! Everything here is pure and works on copies: nothing mutates the board it
//! is given. Legal-reply search is brute force over every origin/destination
//! pair, which is bounded by 64 x 64 geometry checks.

use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::rules::move_geometry::{
    is_diagonal, is_king_step, is_knight_step, is_orthogonal, is_valid_move, path_is_clear,
};

/// Location of the king of `color`, or `None` if the position is corrupt.
#[inline]
pub fn find_king(board: &Board, color: Color) -> Option<Square> {
    board.find_king(color)
}

/// Whether `piece` standing on `from` attacks `target`, regardless of what stands there.
pub fn attacks_square(board: &Board, from: Square, piece: Piece, target: Square) -> bool {
    if from == target {
        return false;
    }
    let line = ChessMove::new(from, target);

    match piece.kind {
        PieceKind::Pawn => {
            line.row_delta() == piece.color.pawn_direction() && line.col_delta().abs() == 1
        }
        PieceKind::Knight => is_knight_step(&line),
        PieceKind::Bishop => is_diagonal(&line) && path_is_clear(board, from, target),
        PieceKind::Rook => is_orthogonal(&line) && path_is_clear(board, from, target),
        PieceKind::Queen => {
            (is_diagonal(&line) || is_orthogonal(&line)) && path_is_clear(board, from, target)
        }
        PieceKind::King => is_king_step(&line),
    }
}

/// True when any piece of `by_color` attacks `square`.
pub fn is_square_attacked(board: &Board, square: Square, by_color: Color) -> bool {
    board
        .pieces_of(by_color)
        .any(|(from, piece)| attacks_square(board, from, piece, square))
}

/// Whether the king of `color` is attacked. A board without that king is never in check.
pub fn is_in_check(board: &Board, color: Color) -> bool {
    let Some(king) = find_king(board, color) else {
        return false;
    };
    is_square_attacked(board, king, color.opposite())
}

/// Plays `mv` as a plain relocation on a scratch board and tests for check.
pub fn would_leave_in_check(board: &Board, mv: &ChessMove, color: Color) -> bool {
    let scratch = board.with_relocation(mv.from, mv.to);
    is_in_check(&scratch, color)
}

/// Whether `color` has at least one ordinary legal move.
///
/// Two-column king moves are skipped: a legal castle always implies a legal
/// single king step onto the transit square, so they never change the answer.
/// En passant needs the previous move and is added by the game state.
pub fn has_any_legal_move(board: &Board, color: Color) -> bool {
    board.pieces_of(color).any(|(from, piece)| {
        Square::all().any(|to| {
            let mv = ChessMove::new(from, to);
            if piece.kind == PieceKind::King && mv.col_delta().abs() == 2 {
                return false;
            }
            is_valid_move(board, &mv, color) && !would_leave_in_check(board, &mv, color)
        })
    })
}

pub fn is_checkmate(board: &Board, color: Color) -> bool {
    is_in_check(board, color) && !has_any_legal_move(board, color)
}

pub fn is_stalemate(board: &Board, color: Color) -> bool {
    !is_in_check(board, color) && !has_any_legal_move(board, color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::fen::parse_fen;

    fn sq(name: &str) -> Square {
        name.parse().expect("square should parse")
    }

    #[test]
    fn starting_position_is_quiet() {
        let board = Board::standard();
        assert!(!is_in_check(&board, Color::White));
        assert!(!is_in_check(&board, Color::Black));
        assert!(has_any_legal_move(&board, Color::White));
        assert!(has_any_legal_move(&board, Color::Black));
    }

    #[test]
    fn pawn_attacks_empty_diagonals_only() {
        let state = parse_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1").expect("FEN should parse");
        assert!(is_square_attacked(&state.board, sq("d3"), Color::White));
        assert!(is_square_attacked(&state.board, sq("f3"), Color::White));
        assert!(!is_square_attacked(&state.board, sq("e3"), Color::White));
        assert!(!is_square_attacked(&state.board, sq("d1"), Color::Black));
    }

    #[test]
    fn sliding_attacks_are_blocked() {
        let state = parse_fen("4k3/8/8/8/8/8/4N3/r3K3 w - - 0 1").expect("FEN should parse");
        assert!(is_in_check(&state.board, Color::White));
        assert!(!is_square_attacked(&state.board, sq("f2"), Color::Black));

        let state = parse_fen("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1").expect("FEN should parse");
        assert!(!is_in_check(&state.board, Color::White));
    }

    #[test]
    fn pinned_piece_cannot_move_off_the_line() {
        let state = parse_fen("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1").expect("FEN should parse");
        let knight_jump = ChessMove::new(sq("e2"), sq("c3"));
        assert!(is_valid_move(&state.board, &knight_jump, Color::White));
        assert!(would_leave_in_check(&state.board, &knight_jump, Color::White));
    }

    #[test]
    fn back_rank_mate() {
        let state = parse_fen("3R2k1/5ppp/8/8/8/8/8/6K1 b - - 0 1").expect("FEN should parse");
        assert!(is_checkmate(&state.board, Color::Black));
        assert!(!is_stalemate(&state.board, Color::Black));
    }

    #[test]
    fn rook_stalemate_and_near_stalemate() {
        // Black king on a8, white rook on b7 guarded by the king: no legal move.
        let state = parse_fen("k7/1R6/1K6/8/8/8/8/8 b - - 0 1").expect("FEN should parse");
        assert!(!is_in_check(&state.board, Color::Black));
        assert!(!has_any_legal_move(&state.board, Color::Black));
        assert!(is_stalemate(&state.board, Color::Black));

        // Same idea with the white king one square further: Kxb7 is available.
        let state = parse_fen("k7/1R6/8/1K6/8/8/8/8 b - - 0 1").expect("FEN should parse");
        assert!(has_any_legal_move(&state.board, Color::Black));
        assert!(!is_stalemate(&state.board, Color::Black));
        assert!(!is_checkmate(&state.board, Color::Black));
    }

    #[test]
    fn kings_never_walk_into_each_other() {
        let state = parse_fen("8/8/8/3k4/8/3K4/8/8 w - - 0 1").expect("FEN should parse");
        let step = ChessMove::new(sq("d3"), sq("d4"));
        assert!(is_valid_move(&state.board, &step, Color::White));
        assert!(would_leave_in_check(&state.board, &step, Color::White));
    }

    #[test]
    fn missing_king_is_not_in_check() {
        let board = Board::empty();
        assert_eq!(find_king(&board, Color::White), None);
        assert!(!is_in_check(&board, Color::White));
    }
}
