//! En passant, castling and promotion rules.
//!
//! These need more than the board: the previous move (en passant) and the
//! castling flags. The game state feeds them in and executes the result.

use crate::chess_errors::MoveRejected;
use crate::game_state::board::Board;
use crate::game_state::chess_rules::{KINGSIDE_ROOK_COL, KING_HOME_COL, QUEENSIDE_ROOK_COL};
use crate::game_state::chess_types::*;
use crate::rules::check_detection::{is_in_check, is_square_attacked};
use crate::rules::move_geometry::path_is_clear;

/// Which wing a castle goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastleSide {
    Kingside,
    Queenside,
}

impl CastleSide {
    /// Wing targeted by a king move onto `to_col`, if it is a castling destination.
    pub fn from_king_destination(to_col: u8) -> Option<Self> {
        match to_col {
            6 => Some(CastleSide::Kingside),
            2 => Some(CastleSide::Queenside),
            _ => None,
        }
    }

    pub const fn rook_col(self) -> u8 {
        match self {
            CastleSide::Kingside => KINGSIDE_ROOK_COL,
            CastleSide::Queenside => QUEENSIDE_ROOK_COL,
        }
    }

    /// Column the rook lands on, adjacent to the king's destination.
    pub const fn rook_destination_col(self) -> u8 {
        match self {
            CastleSide::Kingside => 5,
            CastleSide::Queenside => 3,
        }
    }

    const fn step(self) -> i8 {
        match self {
            CastleSide::Kingside => 1,
            CastleSide::Queenside => -1,
        }
    }
}

/// Rook relocation that accompanies a castle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastleRookMove {
    pub side: CastleSide,
    pub rook_from: Square,
    pub rook_to: Square,
}

/// Checks every castling precondition for `color` on `side`.
pub fn validate_castling(
    board: &Board,
    rights: &CastlingRights,
    color: Color,
    side: CastleSide,
) -> Result<CastleRookMove, MoveRejected> {
    let flags = rights.side(color);
    if flags.king_moved {
        return Err(MoveRejected::CastlingNotAllowed("king has already moved"));
    }
    let rook_moved = match side {
        CastleSide::Kingside => flags.kingside_rook_moved,
        CastleSide::Queenside => flags.queenside_rook_moved,
    };
    if rook_moved {
        return Err(MoveRejected::CastlingNotAllowed("rook has already moved"));
    }

    let row = color.home_row() as i8;
    let king_from =
        Square::new(row, KING_HOME_COL as i8).ok_or(MoveRejected::KingMissing(color))?;
    if board.get(king_from) != Some(Piece::new(color, PieceKind::King)) {
        return Err(MoveRejected::CastlingNotAllowed("king is not on its home square"));
    }
    let rook_from = Square::new(row, side.rook_col() as i8)
        .ok_or(MoveRejected::CastlingNotAllowed("rook square off the board"))?;
    if board.get(rook_from) != Some(Piece::new(color, PieceKind::Rook)) {
        return Err(MoveRejected::CastlingNotAllowed("rook is not on its home square"));
    }
    if !path_is_clear(board, king_from, rook_from) {
        return Err(MoveRejected::CastlingNotAllowed("squares between king and rook are occupied"));
    }
    if is_in_check(board, color) {
        return Err(MoveRejected::CastlingNotAllowed("king is in check"));
    }

    let enemy = color.opposite();
    for distance in 1..=2 {
        let transit = king_from
            .offset(0, side.step() * distance)
            .ok_or(MoveRejected::CastlingNotAllowed("king path off the board"))?;
        if is_square_attacked(board, transit, enemy) {
            return Err(MoveRejected::CastlingNotAllowed("king passes through an attacked square"));
        }
    }

    let rook_to = Square::new(row, side.rook_destination_col() as i8)
        .ok_or(MoveRejected::CastlingNotAllowed("rook destination off the board"))?;
    Ok(CastleRookMove {
        side,
        rook_from,
        rook_to,
    })
}

/// Square of the pawn captured en passant by `mv`, if `mv` is an en passant capture.
///
/// `en_passant_file` is the file the previous move enabled, if any.
pub fn en_passant_capture_square(
    board: &Board,
    mv: &ChessMove,
    color: Color,
    en_passant_file: Option<u8>,
) -> Option<Square> {
    let piece = board.get(mv.from)?;
    if piece != Piece::new(color, PieceKind::Pawn) {
        return None;
    }
    if en_passant_file != Some(mv.to.col()) {
        return None;
    }
    if mv.from.row() != color.en_passant_row()
        || mv.row_delta() != color.pawn_direction()
        || mv.col_delta().abs() != 1
        || !board.is_empty(mv.to)
    {
        return None;
    }

    let captured = Square::new(mv.from.row() as i8, mv.to.col() as i8)?;
    (board.get(captured) == Some(Piece::new(color.opposite(), PieceKind::Pawn)))
        .then_some(captured)
}

/// File to record after `mv`: the landing file of a pawn double step that an
/// enemy pawn could capture en passant next move.
pub fn en_passant_file_after(board_before: &Board, mv: &ChessMove, color: Color) -> Option<u8> {
    let piece = board_before.get(mv.from)?;
    if piece.kind != PieceKind::Pawn || mv.col_delta() != 0 || mv.row_delta().abs() != 2 {
        return None;
    }

    let enemy_pawn = Piece::new(color.opposite(), PieceKind::Pawn);
    let adjacent_enemy = [-1, 1].into_iter().any(|d_col| {
        mv.to
            .offset(0, d_col)
            .is_some_and(|side| board_before.get(side) == Some(enemy_pawn))
    });
    adjacent_enemy.then_some(mv.to.col())
}

/// Kind a pawn becomes when it reaches the last rank; `None` if `mv` is no promotion.
pub fn promotion_kind(piece: Piece, mv: &ChessMove) -> Option<PieceKind> {
    if piece.kind != PieceKind::Pawn || mv.to.row() != piece.color.promotion_row() {
        return None;
    }
    Some(
        mv.promotion
            .filter(|kind| kind.is_promotion_target())
            .unwrap_or(PieceKind::Queen),
    )
}
