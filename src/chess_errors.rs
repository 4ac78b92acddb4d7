//! Errors used throughout the referee.
//!
//! Two families live here:
//! - `MoveRejected` is the ordinary negative outcome of a move attempt. It is
//!   returned, never panicked, and the game state is untouched when it occurs.
//!   `KingMissing` is the exception: it reports a corrupted position and the
//!   caller should abort the game's operation.
//! - `ChessErrors` covers everything else: parsing, snapshot loading and
//!   session/store level failures. Move rejections convert into it with `?`.

use thiserror::Error;
use uuid::Uuid;

use crate::game_state::chess_types::{Color, Square};
use crate::session::game_session::SessionStatus;

/// Why a move attempt was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveRejected {
    /// The game has already ended.
    #[error("the game is already over")]
    GameOver,

    /// No piece stands on the origin square.
    #[error("no piece on {0}")]
    EmptyOrigin(Square),

    /// The origin holds a piece of the side not to move.
    #[error("piece on {square} belongs to {owner}, but {to_move} is to move")]
    WrongSideToMove {
        square: Square,
        owner: Color,
        to_move: Color,
    },

    /// The destination holds a piece of the mover's own color.
    #[error("cannot capture own piece on {0}")]
    SelfCapture(Square),

    /// Origin and destination are the same square.
    #[error("move from {0} to itself")]
    NullMove(Square),

    /// The piece cannot move that way, or its path is blocked.
    #[error("illegal movement from {from} to {to}")]
    IllegalMovement { from: Square, to: Square },

    /// A castling precondition failed.
    #[error("castling not allowed: {0}")]
    CastlingNotAllowed(&'static str),

    /// The move would leave (or keep) the mover's king attacked.
    #[error("move would leave the {0} king in check")]
    LeavesKingInCheck(Color),

    /// Internal fault: the position has no king for this color.
    #[error("position has no {0} king")]
    KingMissing(Color),
}

/// Unified error type for parsing, loading and session operations.
#[derive(Error, Debug)]
pub enum ChessErrors {
    #[error("invalid algebraic square: {0:?}")]
    InvalidAlgebraicString(String),

    #[error("invalid move notation: {0:?}")]
    InvalidMoveNotation(String),

    #[error("invalid piece code: {0:?}")]
    InvalidPieceCode(String),

    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    /// Persisted data could not be turned back into a game.
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("snapshot JSON error: {0}")]
    SnapshotJson(#[from] serde_json::Error),

    /// A reconstructed position violates the one-king-per-color invariant.
    #[error("position has no {0} king")]
    KingMissing(Color),

    #[error(transparent)]
    IllegalMove(#[from] MoveRejected),

    #[error("game {0} not found")]
    GameNotFound(Uuid),

    #[error("game is {0:?}, operation not permitted")]
    InvalidSessionState(SessionStatus),

    #[error("game {0} already has two players")]
    GameAlreadyFull(Uuid),

    #[error("player {0:?} cannot join their own game")]
    CannotJoinOwnGame(String),

    #[error("player {0:?} is not seated in this game")]
    UnknownPlayer(String),

    #[error("it is not {0:?}'s turn")]
    NotPlayersTurn(String),

    #[error("game store is full ({0} games)")]
    StoreFull(usize),
}

pub type ChessResult<T> = Result<T, ChessErrors>;
