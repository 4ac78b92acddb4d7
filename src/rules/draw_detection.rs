//! Rule-derived draws: fifty-move rule, repetition and insufficient material.
//!
//! Stalemate lives in `check_detection`; the game state combines both.

use crate::game_state::board::Board;
use crate::game_state::chess_rules::{FIFTY_MOVE_HALFMOVES, REPETITION_LIMIT};
use crate::game_state::chess_types::*;
use crate::game_state::position_history::PositionHistory;

#[inline]
pub fn is_fifty_move_draw(halfmove_clock: u16) -> bool {
    halfmove_clock >= FIFTY_MOVE_HALFMOVES
}

#[inline]
pub fn is_threefold_repetition(history: &PositionHistory) -> bool {
    history.max_occurrences() >= REPETITION_LIMIT
}

/// Neither side can possibly deliver mate.
///
/// Covers a bare king against a bare king, a single minor piece against a
/// bare king, and king and bishop against king and bishop. The last case does
/// not look at the bishops' square colors.
pub fn is_insufficient_material(board: &Board) -> bool {
    let white: Vec<PieceKind> = non_king_kinds(board, Color::White);
    let black: Vec<PieceKind> = non_king_kinds(board, Color::Black);

    match (white.as_slice(), black.as_slice()) {
        ([], []) => true,
        ([minor], []) | ([], [minor]) => minor.is_minor(),
        ([PieceKind::Bishop], [PieceKind::Bishop]) => true,
        _ => false,
    }
}

fn non_king_kinds(board: &Board, color: Color) -> Vec<PieceKind> {
    board
        .pieces_of(color)
        .map(|(_, piece)| piece.kind)
        .filter(|kind| *kind != PieceKind::King)
        .collect()
}
