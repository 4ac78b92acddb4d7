//! Core value types shared by the board, the rules and the session layer.
//!
//! Everything here is `Copy` and cheap to compare. Colors and piece kinds carry
//! their persistence letters so the snapshot boundary never has to guess.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::chess_errors::ChessErrors;

/// Side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row delta of a single pawn push.
    #[inline]
    pub const fn pawn_direction(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Row holding the king and rooks at the start of the game.
    #[inline]
    pub const fn home_row(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    #[inline]
    pub const fn pawn_start_row(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    #[inline]
    pub const fn promotion_row(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    /// Row a pawn must stand on to capture en passant (fifth rank from its side).
    #[inline]
    pub const fn en_passant_row(self) -> u8 {
        match self {
            Color::White => 4,
            Color::Black => 3,
        }
    }

    #[inline]
    pub const fn symbol(self) -> char {
        match self {
            Color::White => 'W',
            Color::Black => 'B',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'W' => Some(Color::White),
            'B' => Some(Color::Black),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

pub const ALL_PIECE_KINDS: [PieceKind; 6] = [
    PieceKind::Pawn,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Rook,
    PieceKind::Queen,
    PieceKind::King,
];

/// Kinds a pawn may turn into, in the order the legal-move listing emits them.
pub const PROMOTION_KINDS: [PieceKind; 4] = [
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Bishop,
    PieceKind::Knight,
];

impl PieceKind {
    #[inline]
    pub const fn symbol(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        ALL_PIECE_KINDS
            .into_iter()
            .find(|kind| kind.symbol() == symbol.to_ascii_uppercase())
    }

    #[inline]
    pub const fn is_minor(self) -> bool {
        matches!(self, PieceKind::Knight | PieceKind::Bishop)
    }

    #[inline]
    pub const fn is_promotion_target(self) -> bool {
        matches!(
            self,
            PieceKind::Queen | PieceKind::Rook | PieceKind::Bishop | PieceKind::Knight
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    #[inline]
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }

    /// Two-letter storage code such as `"WP"` or `"BK"`.
    pub fn code(self) -> String {
        let mut out = String::with_capacity(2);
        out.push(self.color.symbol());
        out.push(self.kind.symbol());
        out
    }

    /// FEN letter: uppercase for white, lowercase for black.
    pub fn fen_char(self) -> char {
        match self.color {
            Color::White => self.kind.symbol(),
            Color::Black => self.kind.symbol().to_ascii_lowercase(),
        }
    }

    pub fn from_fen_char(ch: char) -> Option<Self> {
        let color = if ch.is_ascii_uppercase() {
            Color::White
        } else if ch.is_ascii_lowercase() {
            Color::Black
        } else {
            return None;
        };
        Some(Self::new(color, PieceKind::from_symbol(ch)?))
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let mut chars = code.chars();
        let color = Color::from_symbol(chars.next()?)?;
        let kind_char = chars.next()?;
        if chars.next().is_some() || !kind_char.is_ascii_uppercase() {
            return None;
        }
        Some(Self::new(color, PieceKind::from_symbol(kind_char)?))
    }
}

/// A board coordinate. Always on the board: `row` and `col` are both in `0..8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    row: u8,
    col: u8,
}

impl Square {
    /// Returns `None` when either coordinate falls off the board.
    #[inline]
    pub fn new(row: i8, col: i8) -> Option<Self> {
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Self {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    #[inline]
    pub const fn row(self) -> u8 {
        self.row
    }

    #[inline]
    pub const fn col(self) -> u8 {
        self.col
    }

    #[inline]
    pub fn offset(self, d_row: i8, d_col: i8) -> Option<Self> {
        Self::new(self.row as i8 + d_row, self.col as i8 + d_col)
    }

    /// All 64 squares, rank 1 first, file a first.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|row| (0..8u8).map(move |col| Square { row, col }))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            char::from(b'a' + self.col),
            char::from(b'1' + self.row)
        )
    }
}

impl FromStr for Square {
    type Err = ChessErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::utils::algebraic::algebraic_to_square(s)
    }
}

/// A proposed move. `promotion` is ignored unless a pawn reaches its last rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChessMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl ChessMove {
    #[inline]
    pub const fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    #[inline]
    pub const fn with_promotion(from: Square, to: Square, promotion: PieceKind) -> Self {
        Self {
            from,
            to,
            promotion: Some(promotion),
        }
    }

    #[inline]
    pub fn row_delta(&self) -> i8 {
        self.to.row() as i8 - self.from.row() as i8
    }

    #[inline]
    pub fn col_delta(&self) -> i8 {
        self.to.col() as i8 - self.from.col() as i8
    }
}

/// History notation: `e2-e4` or `e7-e8=Q`.
impl fmt::Display for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "={}", kind.symbol())?;
        }
        Ok(())
    }
}

impl FromStr for ChessMove {
    type Err = ChessErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ChessErrors::InvalidMoveNotation(s.to_owned());

        let (squares, promotion) = match s.split_once('=') {
            Some((squares, letter)) => {
                let mut chars = letter.chars();
                let kind = chars
                    .next()
                    .and_then(PieceKind::from_symbol)
                    .ok_or_else(invalid)?;
                if chars.next().is_some() {
                    return Err(invalid());
                }
                (squares, Some(kind))
            }
            None => (s, None),
        };

        let (from, to) = squares.split_once('-').ok_or_else(invalid)?;
        let from = from.parse::<Square>().map_err(|_| invalid())?;
        let to = to.parse::<Square>().map_err(|_| invalid())?;

        Ok(Self {
            from,
            to,
            promotion,
        })
    }
}

/// Castling eligibility flags for one color. Once set, a flag is never cleared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SideCastling {
    pub king_moved: bool,
    pub kingside_rook_moved: bool,
    pub queenside_rook_moved: bool,
}

impl SideCastling {
    #[inline]
    pub const fn can_castle_kingside(self) -> bool {
        !self.king_moved && !self.kingside_rook_moved
    }

    #[inline]
    pub const fn can_castle_queenside(self) -> bool {
        !self.king_moved && !self.queenside_rook_moved
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CastlingRights {
    sides: [SideCastling; 2],
}

impl CastlingRights {
    #[inline]
    pub fn side(&self, color: Color) -> SideCastling {
        self.sides[color.index()]
    }

    #[inline]
    pub fn side_mut(&mut self, color: Color) -> &mut SideCastling {
        &mut self.sides[color.index()]
    }

    /// Marks the rook flag of `color` if `square` is one of its home corners.
    pub fn mark_rook_corner(&mut self, color: Color, square: Square) {
        if square.row() != color.home_row() {
            return;
        }
        match square.col() {
            0 => self.side_mut(color).queenside_rook_moved = true,
            7 => self.side_mut(color).kingside_rook_moved = true,
            _ => {}
        }
    }
}
