//! Turn-level game session.
//!
//! A `GameSession` owns one `GameState` together with the seated players, the
//! move history and the lifecycle status:
//!
//! `WaitingForPlayer -> InProgress -> {WhiteWon, BlackWon, Draw, Abandoned}`
//!
//! It is the only thing that advances the state, and only through
//! `GameState::apply_move`. Terminal statuses never change again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::chess_errors::{ChessErrors, ChessResult, MoveRejected};
use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::game_state::game_state::{DrawReason, GameState, GameStatus};

pub type GameId = Uuid;

/// Lifecycle of a hosted game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    WaitingForPlayer,
    InProgress,
    WhiteWon,
    BlackWon,
    Draw,
    Abandoned,
}

impl SessionStatus {
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionStatus::WhiteWon
                | SessionStatus::BlackWon
                | SessionStatus::Draw
                | SessionStatus::Abandoned
        )
    }

    /// Session status implied by a rules-level status.
    pub const fn from_game_status(status: GameStatus) -> Self {
        match status {
            GameStatus::Normal | GameStatus::WhiteInCheck | GameStatus::BlackInCheck => {
                SessionStatus::InProgress
            }
            GameStatus::Checkmate { winner } | GameStatus::Resigned { winner } => match winner {
                Color::White => SessionStatus::WhiteWon,
                Color::Black => SessionStatus::BlackWon,
            },
            GameStatus::Stalemate | GameStatus::Draw(_) => SessionStatus::Draw,
        }
    }
}

/// What the caller gets back for an accepted move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// History notation of the accepted move, e.g. `e7-e8=Q`.
    pub notation: String,
    pub status: GameStatus,
    pub session_status: SessionStatus,
    pub board: Board,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSession {
    id: GameId,
    white_player: String,
    black_player: Option<String>,
    state: GameState,
    move_history: Vec<ChessMove>,
    status: SessionStatus,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl GameSession {
    /// Opens a game with `white_player` seated, waiting for an opponent.
    pub fn new(white_player: &str) -> Self {
        Self::with_id(Uuid::new_v4(), white_player)
    }

    pub fn with_id(id: GameId, white_player: &str) -> Self {
        info!(game_id = %id, white = white_player, "game created");
        Self {
            id,
            white_player: white_player.to_owned(),
            black_player: None,
            state: GameState::new(),
            move_history: Vec::new(),
            status: SessionStatus::WaitingForPlayer,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Reassembles a session from persisted parts. Used by the snapshot loader.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        id: GameId,
        white_player: String,
        black_player: Option<String>,
        state: GameState,
        move_history: Vec<ChessMove>,
        status: SessionStatus,
        created_at: DateTime<Utc>,
        completed_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            white_player,
            black_player,
            state,
            move_history,
            status,
            created_at,
            completed_at,
        }
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn white_player(&self) -> &str {
        &self.white_player
    }

    pub fn black_player(&self) -> Option<&str> {
        self.black_player.as_deref()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn move_history(&self) -> &[ChessMove] {
        &self.move_history
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Color `player` plays in this game, if seated.
    pub fn color_of(&self, player: &str) -> Option<Color> {
        if self.white_player == player {
            Some(Color::White)
        } else if self.black_player.as_deref() == Some(player) {
            Some(Color::Black)
        } else {
            None
        }
    }

    pub fn is_participant(&self, player: &str) -> bool {
        self.color_of(player).is_some()
    }

    /// Seats the black player and starts the game.
    pub fn join(&mut self, black_player: &str) -> ChessResult<()> {
        if self.black_player.is_some() {
            return Err(ChessErrors::GameAlreadyFull(self.id));
        }
        if self.status != SessionStatus::WaitingForPlayer {
            return Err(ChessErrors::InvalidSessionState(self.status));
        }
        if black_player == self.white_player {
            return Err(ChessErrors::CannotJoinOwnGame(black_player.to_owned()));
        }

        self.black_player = Some(black_player.to_owned());
        self.status = SessionStatus::InProgress;
        info!(game_id = %self.id, black = black_player, "player joined, game in progress");
        Ok(())
    }

    /// Submits a move for whichever side is to move.
    pub fn submit_move(&mut self, mv: ChessMove) -> ChessResult<MoveOutcome> {
        if self.status != SessionStatus::InProgress {
            warn!(game_id = %self.id, status = ?self.status, %mv, "move submitted outside play");
            return Err(ChessErrors::InvalidSessionState(self.status));
        }

        let next = match self.state.apply_move(mv) {
            Ok(next) => next,
            Err(MoveRejected::KingMissing(color)) => {
                error!(game_id = %self.id, %color, "position has no king, aborting move");
                return Err(MoveRejected::KingMissing(color).into());
            }
            Err(rejected) => {
                warn!(game_id = %self.id, %mv, reason = %rejected, "move rejected");
                return Err(rejected.into());
            }
        };

        self.state = next;
        self.move_history.push(mv);

        let status = self.state.status();
        let session_status = SessionStatus::from_game_status(status);
        if session_status.is_terminal() {
            self.finish(session_status);
        }
        debug!(game_id = %self.id, %mv, ?status, "move accepted");

        Ok(MoveOutcome {
            notation: mv.to_string(),
            status,
            session_status: self.status,
            board: self.state.board,
        })
    }

    /// Like `submit_move`, but only if `player` is seated and on move.
    pub fn submit_move_as(&mut self, player: &str, mv: ChessMove) -> ChessResult<MoveOutcome> {
        let color = self
            .color_of(player)
            .ok_or_else(|| ChessErrors::UnknownPlayer(player.to_owned()))?;
        if self.status == SessionStatus::InProgress && color != self.state.side_to_move {
            return Err(ChessErrors::NotPlayersTurn(player.to_owned()));
        }
        self.submit_move(mv)
    }

    /// Submits a move given as algebraic squares and an optional promotion letter.
    ///
    /// Off-board squares or an unknown promotion letter reject the move.
    pub fn submit_algebraic(
        &mut self,
        from: &str,
        to: &str,
        promotion: Option<&str>,
    ) -> ChessResult<MoveOutcome> {
        let from: Square = from.parse()?;
        let to: Square = to.parse()?;
        let promotion = match promotion {
            Some(letter) => {
                let mut chars = letter.chars();
                match (chars.next().and_then(PieceKind::from_symbol), chars.next()) {
                    (Some(kind), None) => Some(kind),
                    _ => return Err(ChessErrors::InvalidPieceCode(letter.to_owned())),
                }
            }
            None => None,
        };
        self.submit_move(ChessMove {
            from,
            to,
            promotion,
        })
    }

    /// Both players agreed to a draw.
    pub fn agree_draw(&mut self) -> ChessResult<()> {
        if self.status != SessionStatus::InProgress {
            return Err(ChessErrors::InvalidSessionState(self.status));
        }
        self.state.conclude(GameStatus::Draw(DrawReason::Agreement));
        self.finish(SessionStatus::Draw);
        Ok(())
    }

    /// `color` gives up; the opponent wins.
    pub fn resign(&mut self, color: Color) -> ChessResult<()> {
        if self.status != SessionStatus::InProgress {
            return Err(ChessErrors::InvalidSessionState(self.status));
        }
        let status = GameStatus::Resigned {
            winner: color.opposite(),
        };
        self.state.conclude(status);
        self.finish(SessionStatus::from_game_status(status));
        Ok(())
    }

    /// Gives up on a game that has not finished, e.g. because a player left.
    pub fn abandon(&mut self) -> ChessResult<()> {
        if self.status.is_terminal() {
            return Err(ChessErrors::InvalidSessionState(self.status));
        }
        self.finish(SessionStatus::Abandoned);
        Ok(())
    }

    fn finish(&mut self, status: SessionStatus) {
        self.status = status;
        self.completed_at = Some(Utc::now());
        info!(game_id = %self.id, ?status, moves = self.move_history.len(), "game finished");
    }
}
