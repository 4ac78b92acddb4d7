//! Persistable snapshot of a game session.
//!
//! The JSON shape is camelCase with the board as an 8x8 array of two-letter
//! codes (`"WP"`, `"BK"`, `"--"` for empty), row 0 (rank 1) first. Moves are
//! kept as `e2-e4` / `e7-e8=Q` strings, and the en-passant column is `-1` when
//! there is none. Loading validates everything and never trusts the status
//! fields blindly: the rules status is re-derived from the position.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chess_errors::{ChessErrors, ChessResult};
use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::game_state::game_state::{DrawReason, GameState, GameStatus};
use crate::game_state::position_history::PositionHistory;
use crate::session::game_session::{GameId, GameSession, SessionStatus};

pub const EMPTY_SQUARE_CODE: &str = "--";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub id: GameId,
    pub white_player_name: String,
    pub black_player_name: Option<String>,
    pub board_state: Vec<Vec<String>>,
    pub move_history: Vec<String>,
    pub status: SessionStatus,
    pub white_turn: bool,
    pub white_king_moved: bool,
    pub black_king_moved: bool,
    pub white_rook_kingside_moved: bool,
    pub white_rook_queenside_moved: bool,
    pub black_rook_kingside_moved: bool,
    pub black_rook_queenside_moved: bool,
    pub en_passant_column: i8,
    pub half_move_clock: u16,
    pub position_history: Vec<String>,
    /// Informational only; recomputed on load.
    #[serde(default)]
    pub white_in_check: bool,
    /// Informational only; recomputed on load.
    #[serde(default)]
    pub black_in_check: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Board as rows of two-letter codes, rank 1 first.
pub fn encode_board(board: &Board) -> Vec<Vec<String>> {
    board
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| cell.map_or_else(|| EMPTY_SQUARE_CODE.to_owned(), Piece::code))
                .collect()
        })
        .collect()
}

pub fn decode_board(rows: &[Vec<String>]) -> ChessResult<Board> {
    if rows.len() != 8 {
        return Err(ChessErrors::CorruptSnapshot(format!(
            "board has {} rows, expected 8",
            rows.len()
        )));
    }

    let mut board = Board::empty();
    for (row_idx, row) in rows.iter().enumerate() {
        if row.len() != 8 {
            return Err(ChessErrors::CorruptSnapshot(format!(
                "board row {row_idx} has {} cells, expected 8",
                row.len()
            )));
        }
        for (col_idx, code) in row.iter().enumerate() {
            if code == EMPTY_SQUARE_CODE {
                continue;
            }
            let piece = Piece::from_code(code).ok_or_else(|| {
                ChessErrors::CorruptSnapshot(format!("unknown piece code {code:?}"))
            })?;
            let square = Square::new(row_idx as i8, col_idx as i8).ok_or_else(|| {
                ChessErrors::CorruptSnapshot(format!("cell {row_idx},{col_idx} off the board"))
            })?;
            board.set(square, Some(piece));
        }
    }
    Ok(board)
}

impl GameSnapshot {
    pub fn capture(session: &GameSession) -> Self {
        let state = session.state();
        let white = state.castling_rights.side(Color::White);
        let black = state.castling_rights.side(Color::Black);

        Self {
            id: session.id(),
            white_player_name: session.white_player().to_owned(),
            black_player_name: session.black_player().map(str::to_owned),
            board_state: encode_board(&state.board),
            move_history: session.move_history().iter().map(ToString::to_string).collect(),
            status: session.status(),
            white_turn: state.side_to_move == Color::White,
            white_king_moved: white.king_moved,
            black_king_moved: black.king_moved,
            white_rook_kingside_moved: white.kingside_rook_moved,
            white_rook_queenside_moved: white.queenside_rook_moved,
            black_rook_kingside_moved: black.kingside_rook_moved,
            black_rook_queenside_moved: black.queenside_rook_moved,
            en_passant_column: state.en_passant_file.map_or(-1, |file| file as i8),
            half_move_clock: state.halfmove_clock,
            position_history: state.position_history.entries().to_vec(),
            white_in_check: state.status() == GameStatus::WhiteInCheck,
            black_in_check: state.status() == GameStatus::BlackInCheck,
            created_at: session.created_at(),
            completed_at: session.completed_at(),
        }
    }

    /// Rebuilds a live session, rejecting anything inconsistent.
    pub fn restore(&self) -> ChessResult<GameSession> {
        let board = decode_board(&self.board_state)?;

        let move_history = self
            .move_history
            .iter()
            .map(|text| {
                text.parse::<ChessMove>().map_err(|_| {
                    ChessErrors::CorruptSnapshot(format!("unreadable move {text:?}"))
                })
            })
            .collect::<ChessResult<Vec<_>>>()?;

        let en_passant_file = match self.en_passant_column {
            -1 => None,
            col @ 0..=7 => Some(col as u8),
            other => {
                return Err(ChessErrors::CorruptSnapshot(format!(
                    "en-passant column {other} out of range"
                )))
            }
        };

        let mut castling_rights = CastlingRights::default();
        *castling_rights.side_mut(Color::White) = SideCastling {
            king_moved: self.white_king_moved,
            kingside_rook_moved: self.white_rook_kingside_moved,
            queenside_rook_moved: self.white_rook_queenside_moved,
        };
        *castling_rights.side_mut(Color::Black) = SideCastling {
            king_moved: self.black_king_moved,
            kingside_rook_moved: self.black_rook_kingside_moved,
            queenside_rook_moved: self.black_rook_queenside_moved,
        };

        let side_to_move = if self.white_turn {
            Color::White
        } else {
            Color::Black
        };

        let mut state = GameState::from_parts(
            board,
            side_to_move,
            castling_rights,
            en_passant_file,
            self.half_move_clock,
            PositionHistory::from_entries(self.position_history.clone()),
        )?;

        match (self.status, state.status().is_terminal()) {
            (status, true) if status != SessionStatus::from_game_status(state.status()) => {
                return Err(ChessErrors::CorruptSnapshot(format!(
                    "status {:?} contradicts a finished position ({:?})",
                    status,
                    state.status()
                )));
            }
            (SessionStatus::WhiteWon, false) => state.conclude(GameStatus::Resigned {
                winner: Color::White,
            }),
            (SessionStatus::BlackWon, false) => state.conclude(GameStatus::Resigned {
                winner: Color::Black,
            }),
            (SessionStatus::Draw, false) => {
                state.conclude(GameStatus::Draw(DrawReason::Agreement))
            }
            _ => {}
        }

        if self.status != SessionStatus::WaitingForPlayer && self.black_player_name.is_none() {
            return Err(ChessErrors::CorruptSnapshot(
                "game past the lobby has no black player".to_owned(),
            ));
        }

        debug!(game_id = %self.id, status = ?self.status, "snapshot restored");
        Ok(GameSession::from_parts(
            self.id,
            self.white_player_name.clone(),
            self.black_player_name.clone(),
            state,
            move_history,
            self.status,
            self.created_at,
            self.completed_at,
        ))
    }

    pub fn to_json(&self) -> ChessResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> ChessResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
