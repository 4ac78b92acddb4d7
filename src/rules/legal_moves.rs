//! Full legal-move listing for a game state.
//!
//! Unlike `check_detection::has_any_legal_move`, this includes en passant,
//! castling and one entry per promotion choice. Candidates are every
//! origin/destination pair filtered through `GameState::is_legal`.

use crate::game_state::chess_types::*;
use crate::game_state::game_state::GameState;

pub fn legal_moves(state: &GameState) -> Vec<ChessMove> {
    let color = state.side_to_move;
    let mut out = Vec::new();

    for (from, piece) in state.board.pieces_of(color) {
        for to in Square::all() {
            let base = ChessMove::new(from, to);
            if !state.is_legal(&base) {
                continue;
            }
            if piece.kind == PieceKind::Pawn && to.row() == color.promotion_row() {
                out.extend(
                    PROMOTION_KINDS
                        .iter()
                        .map(|kind| ChessMove::with_promotion(from, to, *kind)),
                );
            } else {
                out.push(base);
            }
        }
    }

    out
}

/// Counts leaf positions `depth` plies ahead. Finished games are leaves.
pub fn perft(state: &GameState, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = legal_moves(state);
    if depth == 1 {
        return moves.len() as u64;
    }
    moves
        .into_iter()
        .filter_map(|mv| state.apply_move(mv).ok())
        .map(|next| perft(&next, depth - 1))
        .sum()
}

/// Whether the side to move can legally capture en passant right now.
pub fn has_legal_en_passant(state: &GameState) -> bool {
    let Some(file) = state.en_passant_file else {
        return false;
    };
    let color = state.side_to_move;
    let row = color.en_passant_row() as i8;
    let target_row = row + color.pawn_direction();

    [-1i8, 1].into_iter().any(|d_col| {
        let from = Square::new(row, file as i8 + d_col);
        let to = Square::new(target_row, file as i8);
        match (from, to) {
            (Some(from), Some(to)) => {
                state.board.get(from) == Some(Piece::new(color, PieceKind::Pawn))
                    && state.is_legal(&ChessMove::new(from, to))
            }
            _ => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::game_state::GameStatus;
    use crate::utils::fen::parse_fen;

    #[test]
    fn twenty_moves_from_the_start() {
        let state = GameState::new();
        assert_eq!(legal_moves(&state).len(), 20);
    }

    #[test]
    fn castling_and_promotions_are_listed() {
        let state = parse_fen("4k3/1P6/8/8/8/8/8/R3K2R w KQ - 0 1").expect("FEN should parse");
        let moves = legal_moves(&state);
        let castle_k: ChessMove = "e1-g1".parse().expect("move");
        let castle_q: ChessMove = "e1-c1".parse().expect("move");
        assert!(moves.contains(&castle_k));
        assert!(moves.contains(&castle_q));
        let promotions = moves
            .iter()
            .filter(|mv| mv.promotion.is_some())
            .count();
        assert_eq!(promotions, 4);
    }

    #[test]
    fn en_passant_removes_a_checking_pawn() {
        // d7-d5 gave check to the king on e4; exd6 takes the checker off the board.
        let state = parse_fen("8/8/8/3pP3/4K3/2q5/8/7k w - d6 0 1").expect("FEN should parse");
        assert!(has_legal_en_passant(&state));
        let moves = legal_moves(&state);
        let capture: ChessMove = "e5-d6".parse().expect("move");
        assert!(moves.contains(&capture));
        assert_eq!(state.status(), GameStatus::WhiteInCheck);
    }

    #[test]
    fn perft_matches_reference_counts() {
        let start = GameState::new();
        assert_eq!(perft(&start, 1), 20);
        assert_eq!(perft(&start, 2), 400);

        let kiwipete = parse_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .expect("FEN should parse");
        assert_eq!(perft(&kiwipete, 1), 48);

        let endgame = parse_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1")
            .expect("FEN should parse");
        assert_eq!(perft(&endgame, 1), 14);
        assert_eq!(perft(&endgame, 2), 191);
    }

    #[test]
    fn no_en_passant_without_file() {
        let state = parse_fen("4k3/8/8/3pP3/8/8/8/4K3 w - - 0 1").expect("FEN should parse");
        assert!(!has_legal_en_passant(&state));
    }
}
