//! The rules-level game aggregate.
//!
//! `GameState` holds everything the rules need to judge the next move: the
//! board, the side to move, castling flags, the en-passant file enabled by the
//! previous move, the half-move clock and the repetition ledger. It is only
//! ever advanced through `apply_move`, which builds a successor and leaves
//! `self` untouched, so a rejected move can never leave a half-applied state.

use crate::chess_errors::{ChessErrors, ChessResult, MoveRejected};
use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::game_state::position_history::{fingerprint, PositionHistory};
use crate::rules::check_detection::{has_any_legal_move, is_checkmate, is_in_check};
use crate::rules::draw_detection::{
    is_fifty_move_draw, is_insufficient_material, is_threefold_repetition,
};
use crate::rules::legal_moves::has_legal_en_passant;
use crate::rules::move_geometry::{is_castling_shape, is_valid_move};
use crate::rules::special_moves::{
    en_passant_capture_square, en_passant_file_after, promotion_kind, validate_castling,
    CastleSide,
};

/// Why a game was drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawReason {
    FiftyMoveRule,
    ThreefoldRepetition,
    InsufficientMaterial,
    Agreement,
}

/// Rules-level status of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameStatus {
    Normal,
    WhiteInCheck,
    BlackInCheck,
    Checkmate { winner: Color },
    Stalemate,
    Draw(DrawReason),
    Resigned { winner: Color },
}

impl GameStatus {
    #[inline]
    pub const fn is_terminal(self) -> bool {
        !matches!(
            self,
            GameStatus::Normal | GameStatus::WhiteInCheck | GameStatus::BlackInCheck
        )
    }

    /// Winning color, when the game ended decisively.
    #[inline]
    pub const fn winner(self) -> Option<Color> {
        match self {
            GameStatus::Checkmate { winner } | GameStatus::Resigned { winner } => Some(winner),
            _ => None,
        }
    }
}

/// Board after a move that passed every rule, plus what it changed.
struct ValidatedMove {
    board: Board,
    piece: Piece,
    captured: Option<Piece>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    pub side_to_move: Color,
    pub castling_rights: CastlingRights,
    /// File of a pawn that just double-stepped next to an enemy pawn.
    pub en_passant_file: Option<u8>,
    pub halfmove_clock: u16,
    pub position_history: PositionHistory,
    status: GameStatus,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Standard starting position, all castling rights, clocks at zero.
    pub fn new() -> Self {
        let board = Board::standard();
        let castling_rights = CastlingRights::default();
        let mut position_history = PositionHistory::new();
        position_history.record(fingerprint(&board, Color::White, &castling_rights));

        Self {
            board,
            side_to_move: Color::White,
            castling_rights,
            en_passant_file: None,
            halfmove_clock: 0,
            position_history,
            status: GameStatus::Normal,
        }
    }

    /// Builds a state from reconstructed parts and derives its status.
    ///
    /// Fails when either king is missing. An empty `position_history` is seeded
    /// with the current position.
    pub fn from_parts(
        board: Board,
        side_to_move: Color,
        castling_rights: CastlingRights,
        en_passant_file: Option<u8>,
        halfmove_clock: u16,
        mut position_history: PositionHistory,
    ) -> ChessResult<Self> {
        for color in [Color::White, Color::Black] {
            if board.find_king(color).is_none() {
                return Err(ChessErrors::KingMissing(color));
            }
        }
        if position_history.is_empty() {
            position_history.record(fingerprint(&board, side_to_move, &castling_rights));
        }

        let mut state = Self {
            board,
            side_to_move,
            castling_rights,
            en_passant_file,
            halfmove_clock,
            position_history,
            status: GameStatus::Normal,
        };
        state.status = state.evaluate_status();
        Ok(state)
    }

    #[inline]
    pub fn status(&self) -> GameStatus {
        self.status
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.status.is_terminal()
    }

    /// Ends the game by an event outside the rules (agreement, resignation).
    pub fn conclude(&mut self, status: GameStatus) {
        self.status = status;
    }

    pub fn fingerprint(&self) -> String {
        fingerprint(&self.board, self.side_to_move, &self.castling_rights)
    }

    /// Validates `mv` and returns the successor state.
    pub fn apply_move(&self, mv: ChessMove) -> Result<GameState, MoveRejected> {
        if self.is_game_over() {
            return Err(MoveRejected::GameOver);
        }
        let ValidatedMove {
            board,
            piece,
            captured,
        } = self.validate_move(&mv)?;
        let color = piece.color;

        let mut castling_rights = self.castling_rights;
        match piece.kind {
            PieceKind::King => castling_rights.side_mut(color).king_moved = true,
            PieceKind::Rook => castling_rights.mark_rook_corner(color, mv.from),
            _ => {}
        }
        if captured.is_some_and(|taken| taken.kind == PieceKind::Rook) {
            castling_rights.mark_rook_corner(color.opposite(), mv.to);
        }

        let halfmove_clock = if piece.kind == PieceKind::Pawn || captured.is_some() {
            0
        } else {
            self.halfmove_clock.saturating_add(1)
        };

        let side_to_move = color.opposite();
        let mut position_history = self.position_history.clone();
        position_history.record(fingerprint(&board, side_to_move, &castling_rights));

        let mut next = GameState {
            board,
            side_to_move,
            castling_rights,
            en_passant_file: en_passant_file_after(&self.board, &mv, color),
            halfmove_clock,
            position_history,
            status: GameStatus::Normal,
        };
        next.status = next.evaluate_status();
        Ok(next)
    }

    /// Whether `mv` is legal for the side to move, ignoring whether the game has ended.
    pub fn is_legal(&self, mv: &ChessMove) -> bool {
        self.validate_move(mv).is_ok()
    }

    /// Runs every legality rule against `mv` and builds the resulting board.
    fn validate_move(&self, mv: &ChessMove) -> Result<ValidatedMove, MoveRejected> {
        let color = self.side_to_move;
        if self.board.find_king(color).is_none() {
            return Err(MoveRejected::KingMissing(color));
        }

        let piece = self
            .board
            .get(mv.from)
            .ok_or(MoveRejected::EmptyOrigin(mv.from))?;
        if piece.color != color {
            return Err(MoveRejected::WrongSideToMove {
                square: mv.from,
                owner: piece.color,
                to_move: color,
            });
        }
        if mv.from == mv.to {
            return Err(MoveRejected::NullMove(mv.from));
        }
        if self.board.get(mv.to).is_some_and(|target| target.color == color) {
            return Err(MoveRejected::SelfCapture(mv.to));
        }

        // The previous move's en-passant window closes with this attempt.
        let en_passant_victim =
            en_passant_capture_square(&self.board, mv, color, self.en_passant_file);

        let castle = if piece.kind == PieceKind::King && is_castling_shape(mv, color) {
            let side = CastleSide::from_king_destination(mv.to.col()).ok_or(
                MoveRejected::IllegalMovement {
                    from: mv.from,
                    to: mv.to,
                },
            )?;
            Some(validate_castling(&self.board, &self.castling_rights, color, side)?)
        } else {
            None
        };

        if en_passant_victim.is_none() && castle.is_none() && !is_valid_move(&self.board, mv, color)
        {
            return Err(MoveRejected::IllegalMovement {
                from: mv.from,
                to: mv.to,
            });
        }

        let mut board = self.board;
        let mut captured = board.relocate(mv.from, mv.to);
        if let Some(victim) = en_passant_victim {
            captured = board.take(victim);
        }
        if let Some(rook) = castle {
            board.relocate(rook.rook_from, rook.rook_to);
        }
        if let Some(kind) = promotion_kind(piece, mv) {
            board.set(mv.to, Some(Piece::new(color, kind)));
        }

        if is_in_check(&board, color) {
            return Err(MoveRejected::LeavesKingInCheck(color));
        }

        Ok(ValidatedMove {
            board,
            piece,
            captured,
        })
    }

    /// Whether the side to move has any legal move, en passant included.
    pub fn has_legal_move(&self) -> bool {
        has_any_legal_move(&self.board, self.side_to_move) || has_legal_en_passant(self)
    }

    pub fn is_checkmate(&self, color: Color) -> bool {
        if color == self.side_to_move {
            is_in_check(&self.board, color) && !self.has_legal_move()
        } else {
            is_checkmate(&self.board, color)
        }
    }

    /// Only the side to move can be stalemated.
    pub fn is_stalemate(&self) -> bool {
        !is_in_check(&self.board, self.side_to_move) && !self.has_legal_move()
    }

    pub fn is_draw(&self) -> bool {
        self.is_stalemate()
            || is_fifty_move_draw(self.halfmove_clock)
            || is_threefold_repetition(&self.position_history)
            || is_insufficient_material(&self.board)
    }

    /// Derives the rules-level status from the position alone.
    ///
    /// Checkmate outranks every draw; stalemate outranks the other draw rules.
    pub fn evaluate_status(&self) -> GameStatus {
        let color = self.side_to_move;
        let in_check = is_in_check(&self.board, color);
        let can_move = self.has_legal_move();

        if in_check && !can_move {
            return GameStatus::Checkmate {
                winner: color.opposite(),
            };
        }
        if !can_move {
            return GameStatus::Stalemate;
        }
        if is_fifty_move_draw(self.halfmove_clock) {
            return GameStatus::Draw(DrawReason::FiftyMoveRule);
        }
        if is_threefold_repetition(&self.position_history) {
            return GameStatus::Draw(DrawReason::ThreefoldRepetition);
        }
        if is_insufficient_material(&self.board) {
            return GameStatus::Draw(DrawReason::InsufficientMaterial);
        }
        match (in_check, color) {
            (true, Color::White) => GameStatus::WhiteInCheck,
            (true, Color::Black) => GameStatus::BlackInCheck,
            (false, _) => GameStatus::Normal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::fen::parse_fen;

    fn mv(text: &str) -> ChessMove {
        text.parse().expect("move should parse")
    }

    fn sq(name: &str) -> Square {
        name.parse().expect("square should parse")
    }

    fn play(state: &GameState, moves: &[&str]) -> GameState {
        moves.iter().fold(state.clone(), |current, text| {
            current
                .apply_move(mv(text))
                .unwrap_or_else(|err| panic!("{text} should be legal: {err}"))
        })
    }

    #[test]
    fn initial_state() {
        let state = GameState::new();
        assert_eq!(state.side_to_move, Color::White);
        assert_eq!(state.en_passant_file, None);
        assert_eq!(state.halfmove_clock, 0);
        assert_eq!(state.status(), GameStatus::Normal);
        assert!(state.has_legal_move());
        assert!(!state.is_game_over());
        assert_eq!(state.position_history.len(), 1);
    }

    #[test]
    fn rejected_moves_leave_state_unchanged() {
        let state = play(&GameState::new(), &["e2-e4", "e7-e5"]);
        let before = state.clone();

        let attempts = [
            ("e4-e6", MoveRejected::IllegalMovement { from: sq("e4"), to: sq("e6") }),
            ("e3-e4", MoveRejected::EmptyOrigin(sq("e3"))),
            (
                "d7-d6",
                MoveRejected::WrongSideToMove {
                    square: sq("d7"),
                    owner: Color::Black,
                    to_move: Color::White,
                },
            ),
            ("d1-d2", MoveRejected::SelfCapture(sq("d2"))),
            ("f1-f1", MoveRejected::NullMove(sq("f1"))),
            ("e1-g1", MoveRejected::CastlingNotAllowed("squares between king and rook are occupied")),
        ];
        for (text, expected) in attempts {
            assert_eq!(state.apply_move(mv(text)), Err(expected), "{text}");
            assert_eq!(state, before, "{text} must not mutate the state");
        }
    }

    #[test]
    fn side_to_move_toggles_and_clock_counts() {
        let state = play(&GameState::new(), &["g1-f3"]);
        assert_eq!(state.side_to_move, Color::Black);
        assert_eq!(state.halfmove_clock, 1);
        let state = play(&state, &["b8-c6"]);
        assert_eq!(state.side_to_move, Color::White);
        assert_eq!(state.halfmove_clock, 2);
        let state = play(&state, &["e2-e4"]);
        assert_eq!(state.halfmove_clock, 0);
    }

    #[test]
    fn scholars_mate() {
        let state = play(
            &GameState::new(),
            &["e2-e4", "e7-e5", "d1-h5", "b8-c6", "f1-c4", "g8-f6", "h5-f7"],
        );
        assert!(state.is_checkmate(Color::Black));
        assert!(!state.is_checkmate(Color::White));
        assert_eq!(state.status(), GameStatus::Checkmate { winner: Color::White });
        assert!(state.is_game_over());
        assert_eq!(state.apply_move(mv("e8-f7")), Err(MoveRejected::GameOver));
    }

    #[test]
    fn check_is_reported_and_must_be_answered() {
        let state = play(&GameState::new(), &["e2-e4", "f7-f6", "d1-h5"]);
        assert_eq!(state.status(), GameStatus::BlackInCheck);
        assert_eq!(
            state.apply_move(mv("a7-a6")),
            Err(MoveRejected::LeavesKingInCheck(Color::Black))
        );
        let state = play(&state, &["g7-g6"]);
        assert_eq!(state.status(), GameStatus::Normal);
    }

    #[test]
    fn en_passant_capture() {
        let state = play(&GameState::new(), &["e2-e4", "a7-a6", "e4-e5", "d7-d5"]);
        assert_eq!(state.en_passant_file, Some(3));

        let state = play(&state, &["e5-d6"]);
        assert!(state.board.is_empty(sq("d5")));
        assert_eq!(
            state.board.get(sq("d6")),
            Some(Piece::new(Color::White, PieceKind::Pawn))
        );
        assert!(state.board.is_empty(sq("e5")));
        assert_eq!(state.halfmove_clock, 0);
        assert_eq!(state.en_passant_file, None);
    }

    #[test]
    fn black_captures_en_passant_from_fourth_rank() {
        let state = play(
            &GameState::new(),
            &["a2-a3", "e7-e5", "a3-a4", "e5-e4", "d2-d4"],
        );
        assert_eq!(state.en_passant_file, Some(3));

        let state = play(&state, &["e4-d3"]);
        assert!(state.board.is_empty(sq("d4")));
        assert!(state.board.is_empty(sq("e4")));
        assert_eq!(
            state.board.get(sq("d3")),
            Some(Piece::new(Color::Black, PieceKind::Pawn))
        );
        assert_eq!(state.halfmove_clock, 0);
    }

    #[test]
    fn en_passant_expires_after_one_move() {
        let state = play(
            &GameState::new(),
            &["e2-e4", "a7-a6", "e4-e5", "d7-d5", "g1-f3", "g8-f6"],
        );
        assert_eq!(state.en_passant_file, None);
        assert_eq!(
            state.apply_move(mv("e5-d6")),
            Err(MoveRejected::IllegalMovement { from: sq("e5"), to: sq("d6") })
        );
    }

    #[test]
    fn double_step_without_neighbour_sets_no_file() {
        let state = play(&GameState::new(), &["e2-e4"]);
        assert_eq!(state.en_passant_file, None);
    }

    #[test]
    fn en_passant_that_exposes_the_king_is_rejected() {
        // Removing both pawns from rank 5 would open the rook's line to the king.
        let state = parse_fen("8/8/8/K2pP2r/8/8/8/7k w - d6 0 1").expect("FEN should parse");
        assert_eq!(
            state.apply_move(mv("e5-d6")),
            Err(MoveRejected::LeavesKingInCheck(Color::White))
        );
    }

    #[test]
    fn kingside_castle() {
        let state = play(
            &GameState::new(),
            &["e2-e4", "e7-e5", "g1-f3", "b8-c6", "f1-c4", "g8-f6"],
        );
        let castled = play(&state, &["e1-g1"]);
        assert_eq!(
            castled.board.get(sq("g1")),
            Some(Piece::new(Color::White, PieceKind::King))
        );
        assert_eq!(
            castled.board.get(sq("f1")),
            Some(Piece::new(Color::White, PieceKind::Rook))
        );
        assert!(castled.board.is_empty(sq("h1")));
        assert!(castled.board.is_empty(sq("e1")));
        let white = castled.castling_rights.side(Color::White);
        assert!(white.king_moved);
        assert!(!white.can_castle_kingside());
        assert!(!white.can_castle_queenside());
    }

    #[test]
    fn kingside_castle_blocked_by_bishop() {
        let state = play(&GameState::new(), &["e2-e4", "e7-e5", "g1-f3", "b8-c6"]);
        let before = state.clone();
        assert!(matches!(
            state.apply_move(mv("e1-g1")),
            Err(MoveRejected::CastlingNotAllowed(_))
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn castling_onto_an_attacked_square_is_rejected() {
        let state = parse_fen("4k3/8/8/8/8/8/6r1/4K2R w K - 0 1").expect("FEN should parse");
        assert_eq!(
            state.apply_move(mv("e1-g1")),
            Err(MoveRejected::CastlingNotAllowed(
                "king passes through an attacked square"
            ))
        );
        assert!(state.is_legal(&mv("e1-f1")));

        let state = parse_fen("2r1k3/8/8/8/8/8/8/R3K3 w Q - 0 1").expect("FEN should parse");
        assert_eq!(
            state.apply_move(mv("e1-c1")),
            Err(MoveRejected::CastlingNotAllowed(
                "king passes through an attacked square"
            ))
        );
        assert!(state.is_legal(&mv("e1-d1")));
    }

    #[test]
    fn queenside_castle_moves_rook_to_d_file() {
        let state = parse_fen("r3k3/8/8/8/8/8/8/4K3 b q - 0 1").expect("FEN should parse");
        let state = play(&state, &["e8-c8"]);
        assert_eq!(
            state.board.get(sq("d8")),
            Some(Piece::new(Color::Black, PieceKind::Rook))
        );
        assert!(state.board.is_empty(sq("a8")));
    }

    #[test]
    fn rook_moves_clear_castling_rights() {
        let state = parse_fen("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1").expect("FEN should parse");
        let state = play(&state, &["h1-h2", "e8-e7", "h2-h1", "e7-e8"]);
        let white = state.castling_rights.side(Color::White);
        assert!(white.kingside_rook_moved);
        assert!(!white.queenside_rook_moved);
        assert!(matches!(
            state.apply_move(mv("e1-g1")),
            Err(MoveRejected::CastlingNotAllowed(_))
        ));
        assert!(state.apply_move(mv("e1-c1")).is_ok());
    }

    #[test]
    fn promotion_honours_request_and_defaults_to_queen() {
        let state = parse_fen("7k/P7/8/8/8/8/8/K7 w - - 0 1").expect("FEN should parse");
        let knight = play(&state, &["a7-a8=N"]);
        assert_eq!(
            knight.board.get(sq("a8")),
            Some(Piece::new(Color::White, PieceKind::Knight))
        );

        let queen = state
            .apply_move(ChessMove::with_promotion(sq("a7"), sq("a8"), PieceKind::King))
            .expect("promotion should be legal");
        assert_eq!(
            queen.board.get(sq("a8")),
            Some(Piece::new(Color::White, PieceKind::Queen))
        );
        assert_eq!(queen.status(), GameStatus::BlackInCheck);
    }

    #[test]
    fn stalemate_after_move() {
        let state = parse_fen("k7/2R5/1K6/8/8/8/8/8 w - - 0 1").expect("FEN should parse");
        let state = play(&state, &["c7-b7"]);
        assert_eq!(state.status(), GameStatus::Stalemate);
        assert!(state.is_stalemate());
        assert!(state.is_draw());
        assert!(state.is_game_over());
    }

    #[test]
    fn threefold_repetition() {
        let shuffle = ["g1-f3", "g8-f6", "f3-g1", "f6-g8"];
        let twice = play(&GameState::new(), &shuffle);
        assert_eq!(twice.position_history.occurrences(&twice.fingerprint()), 2);
        assert!(!twice.is_draw());
        assert_eq!(twice.status(), GameStatus::Normal);

        let thrice = play(&twice, &shuffle);
        assert_eq!(thrice.position_history.occurrences(&thrice.fingerprint()), 3);
        assert!(thrice.is_draw());
        assert_eq!(thrice.status(), GameStatus::Draw(DrawReason::ThreefoldRepetition));
    }

    #[test]
    fn fifty_move_rule() {
        let state = parse_fen("4k3/8/8/8/8/8/4P3/R3K3 w - - 99 80").expect("FEN should parse");
        let drawn = play(&state, &["a1-a2"]);
        assert_eq!(drawn.halfmove_clock, 100);
        assert!(drawn.is_draw());
        assert_eq!(drawn.status(), GameStatus::Draw(DrawReason::FiftyMoveRule));

        let reset = play(&state, &["e2-e3"]);
        assert_eq!(reset.halfmove_clock, 0);
        assert!(!reset.is_draw());
    }

    #[test]
    fn capture_resets_clock() {
        let state = parse_fen("4k3/8/8/8/8/8/r7/R3K3 w - - 99 80").expect("FEN should parse");
        let state = play(&state, &["a1-a2"]);
        assert_eq!(state.halfmove_clock, 0);
        assert_eq!(state.status(), GameStatus::Normal);
    }

    #[test]
    fn insufficient_material_after_capture() {
        let state = parse_fen("4k3/8/8/8/8/8/1r6/B3K3 w - - 0 1").expect("FEN should parse");
        let state = play(&state, &["a1-b2"]);
        assert_eq!(state.status(), GameStatus::Draw(DrawReason::InsufficientMaterial));

        let bishop = parse_fen("4k3/8/8/8/8/8/8/2B1K3 w - - 0 1").expect("FEN should parse");
        assert!(bishop.is_draw());
        let rook = parse_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").expect("FEN should parse");
        assert!(!rook.is_draw());
    }

    #[test]
    fn from_parts_requires_both_kings() {
        let mut board = Board::standard();
        board.take(sq("e1"));
        let result = GameState::from_parts(
            board,
            Color::White,
            CastlingRights::default(),
            None,
            0,
            PositionHistory::new(),
        );
        assert!(matches!(result, Err(ChessErrors::KingMissing(Color::White))));
    }
}
