//! FEN parsing and generation.
//!
//! FEN castling letters map onto the moved-flags the rules track: a missing
//! letter for one wing marks that rook as moved, and a color with no letters
//! at all is treated as having moved its king. The full-move counter is
//! validated but not kept.

use crate::chess_errors::{ChessErrors, ChessResult};
use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::game_state::game_state::GameState;
use crate::game_state::position_history::PositionHistory;
use crate::utils::algebraic::algebraic_to_square;

pub fn parse_fen(fen: &str) -> ChessResult<GameState> {
    let invalid = |reason: &str| ChessErrors::InvalidFen(format!("{reason}: {fen:?}"));
    let mut parts = fen.split_whitespace();

    let board_part = parts.next().ok_or_else(|| invalid("missing board layout"))?;
    let side_part = parts.next().ok_or_else(|| invalid("missing side to move"))?;
    let castling_part = parts.next().ok_or_else(|| invalid("missing castling rights"))?;
    let en_passant_part = parts.next().ok_or_else(|| invalid("missing en-passant square"))?;
    let halfmove_part = parts.next().ok_or_else(|| invalid("missing halfmove clock"))?;
    let fullmove_part = parts.next().ok_or_else(|| invalid("missing fullmove number"))?;

    if parts.next().is_some() {
        return Err(invalid("extra trailing fields"));
    }

    let board = parse_board(board_part)?;
    let side_to_move = match side_part {
        "w" => Color::White,
        "b" => Color::Black,
        _ => return Err(invalid("invalid side to move")),
    };
    let castling_rights = parse_castling_rights(castling_part)?;
    let en_passant_file = if en_passant_part == "-" {
        None
    } else {
        Some(algebraic_to_square(en_passant_part)?.col())
    };
    let halfmove_clock = halfmove_part
        .parse::<u16>()
        .map_err(|_| invalid("invalid halfmove clock"))?;
    fullmove_part
        .parse::<u16>()
        .map_err(|_| invalid("invalid fullmove number"))?;

    GameState::from_parts(
        board,
        side_to_move,
        castling_rights,
        en_passant_file,
        halfmove_clock,
        PositionHistory::new(),
    )
}

fn parse_board(board_part: &str) -> ChessResult<Board> {
    let ranks: Vec<&str> = board_part.split('/').collect();
    if ranks.len() != 8 {
        return Err(ChessErrors::InvalidFen(
            "board layout must contain 8 ranks".to_owned(),
        ));
    }

    let mut board = Board::empty();
    for (fen_rank_idx, rank_str) in ranks.iter().enumerate() {
        let row = 7 - fen_rank_idx as i8;
        let too_many_files =
            || ChessErrors::InvalidFen(format!("rank {rank_str:?} has too many files"));
        let mut col = 0usize;

        for ch in rank_str.chars() {
            if let Some(empty_count) = ch.to_digit(10) {
                if !(1..=8).contains(&empty_count) {
                    return Err(ChessErrors::InvalidFen(format!(
                        "invalid empty-square count '{ch}'"
                    )));
                }
                col += empty_count as usize;
                if col > 8 {
                    return Err(too_many_files());
                }
                continue;
            }

            let piece = Piece::from_fen_char(ch).ok_or_else(|| {
                ChessErrors::InvalidFen(format!("invalid piece character '{ch}'"))
            })?;
            if col >= 8 {
                return Err(too_many_files());
            }
            let square = Square::new(row, col as i8).ok_or_else(too_many_files)?;
            board.set(square, Some(piece));
            col += 1;
        }

        if col != 8 {
            return Err(ChessErrors::InvalidFen(format!(
                "rank {rank_str:?} does not sum to 8 files"
            )));
        }
    }

    Ok(board)
}

fn parse_castling_rights(castling_part: &str) -> ChessResult<CastlingRights> {
    let mut kingside = [false; 2];
    let mut queenside = [false; 2];

    if castling_part != "-" {
        for ch in castling_part.chars() {
            match ch {
                'K' => kingside[Color::White.index()] = true,
                'Q' => queenside[Color::White.index()] = true,
                'k' => kingside[Color::Black.index()] = true,
                'q' => queenside[Color::Black.index()] = true,
                _ => {
                    return Err(ChessErrors::InvalidFen(format!(
                        "invalid castling rights character '{ch}'"
                    )))
                }
            }
        }
    }

    let mut rights = CastlingRights::default();
    for color in [Color::White, Color::Black] {
        let (k, q) = (kingside[color.index()], queenside[color.index()]);
        let side = rights.side_mut(color);
        if !k && !q {
            side.king_moved = true;
        } else {
            side.kingside_rook_moved = !k;
            side.queenside_rook_moved = !q;
        }
    }
    Ok(rights)
}

/// FEN for `state`. The full-move number is not tracked and is always `1`.
pub fn generate_fen(state: &GameState) -> String {
    let side_to_move = match state.side_to_move {
        Color::White => "w",
        Color::Black => "b",
    };

    let en_passant = state
        .en_passant_file
        .and_then(|file| {
            let color = state.side_to_move;
            Square::new(
                color.en_passant_row() as i8 + color.pawn_direction(),
                file as i8,
            )
        })
        .map_or_else(|| "-".to_owned(), |square| square.to_string());

    format!(
        "{} {} {} {} {} 1",
        generate_board_field(&state.board),
        side_to_move,
        generate_castling_field(&state.castling_rights),
        en_passant,
        state.halfmove_clock
    )
}

fn generate_board_field(board: &Board) -> String {
    let mut out = String::new();

    for row in (0..8i8).rev() {
        let mut empty_count = 0u8;

        for col in 0..8i8 {
            match Square::new(row, col).and_then(|square| board.get(square)) {
                Some(piece) => {
                    if empty_count > 0 {
                        out.push(char::from(b'0' + empty_count));
                        empty_count = 0;
                    }
                    out.push(piece.fen_char());
                }
                None => empty_count += 1,
            }
        }

        if empty_count > 0 {
            out.push(char::from(b'0' + empty_count));
        }
        if row > 0 {
            out.push('/');
        }
    }

    out
}

fn generate_castling_field(rights: &CastlingRights) -> String {
    let mut out = String::new();
    for (color, k, q) in [(Color::White, 'K', 'Q'), (Color::Black, 'k', 'q')] {
        let side = rights.side(color);
        if side.can_castle_kingside() {
            out.push(k);
        }
        if side.can_castle_queenside() {
            out.push(q);
        }
    }
    if out.is_empty() {
        out.push('-');
    }
    out
}
