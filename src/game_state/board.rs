//! Mailbox board: 64 squares, each empty or holding one piece.
//!
//! `squares[row][col]` with row 0 = rank 1 and col 0 = file a, which is also
//! the order the persistence layer stores the grid in.

use crate::game_state::chess_rules::BACK_RANK;
use crate::game_state::chess_types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    #[inline]
    pub const fn empty() -> Self {
        Self {
            squares: [[None; 8]; 8],
        }
    }

    /// The standard starting layout.
    pub fn standard() -> Self {
        let mut board = Self::empty();
        for (col, kind) in BACK_RANK.iter().copied().enumerate() {
            board.squares[0][col] = Some(Piece::new(Color::White, kind));
            board.squares[1][col] = Some(Piece::new(Color::White, PieceKind::Pawn));
            board.squares[6][col] = Some(Piece::new(Color::Black, PieceKind::Pawn));
            board.squares[7][col] = Some(Piece::new(Color::Black, kind));
        }
        board
    }

    #[inline]
    pub fn get(&self, square: Square) -> Option<Piece> {
        self.squares[square.row() as usize][square.col() as usize]
    }

    #[inline]
    pub fn set(&mut self, square: Square, piece: Option<Piece>) {
        self.squares[square.row() as usize][square.col() as usize] = piece;
    }

    #[inline]
    pub fn is_empty(&self, square: Square) -> bool {
        self.get(square).is_none()
    }

    /// Removes and returns whatever stands on `square`.
    #[inline]
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        let piece = self.get(square);
        self.set(square, None);
        piece
    }

    /// Plain relocation: whatever is on `to` is overwritten, `from` is vacated.
    pub fn relocate(&mut self, from: Square, to: Square) -> Option<Piece> {
        let moving = self.take(from);
        let captured = self.get(to);
        self.set(to, moving);
        captured
    }

    /// Copy of the board with `from` relocated onto `to`.
    pub fn with_relocation(&self, from: Square, to: Square) -> Self {
        let mut scratch = *self;
        scratch.relocate(from, to);
        scratch
    }

    /// Occupied squares in rank-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |square| self.get(square).map(|piece| (square, piece)))
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces().filter(move |(_, piece)| piece.color == color)
    }

    /// Linear scan for the king of `color`.
    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces_of(color)
            .find(|(_, piece)| piece.kind == PieceKind::King)
            .map(|(square, _)| square)
    }

    /// Rows of the grid, rank 1 first.
    pub fn rows(&self) -> &[[Option<Piece>; 8]; 8] {
        &self.squares
    }
}
