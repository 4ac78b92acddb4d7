//! Position fingerprints and the repetition ledger.
//!
//! A fingerprint covers the full board, the side to move and all six castling
//! flags. The en-passant file is deliberately left out, so two positions that
//! differ only in a pending en-passant chance count as the same position.

use std::collections::HashMap;

use crate::game_state::board::Board;
use crate::game_state::chess_types::*;

/// Canonical, opaque encoding of a position for repetition counting.
///
/// Layout: 64 board characters (rank 1 first, `.` for empty, FEN letters for
/// pieces), then `w`/`b`, then six `0`/`1` castling flags (white king, white
/// kingside rook, white queenside rook, then the same for black).
pub fn fingerprint(board: &Board, side_to_move: Color, rights: &CastlingRights) -> String {
    let mut out = String::with_capacity(64 + 1 + 6);

    for square in Square::all() {
        out.push(match board.get(square) {
            Some(piece) => piece.fen_char(),
            None => '.',
        });
    }

    out.push(match side_to_move {
        Color::White => 'w',
        Color::Black => 'b',
    });

    for color in [Color::White, Color::Black] {
        let side = rights.side(color);
        for flag in [side.king_moved, side.kingside_rook_moved, side.queenside_rook_moved] {
            out.push(if flag { '1' } else { '0' });
        }
    }

    out
}

/// Ordered fingerprints seen so far with an occurrence count per fingerprint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionHistory {
    entries: Vec<String>,
    counts: HashMap<String, u8>,
}

impl PositionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the ledger (and its counts) from persisted entries.
    pub fn from_entries(entries: Vec<String>) -> Self {
        let mut history = Self::new();
        for entry in entries {
            history.record(entry);
        }
        history
    }

    /// Records one occurrence and returns the new count for that fingerprint.
    pub fn record(&mut self, fingerprint: String) -> u8 {
        let count = self.counts.entry(fingerprint.clone()).or_insert(0);
        *count = count.saturating_add(1);
        let updated = *count;
        self.entries.push(fingerprint);
        updated
    }

    pub fn occurrences(&self, fingerprint: &str) -> u8 {
        self.counts.get(fingerprint).copied().unwrap_or(0)
    }

    /// Highest occurrence count of any position.
    pub fn max_occurrences(&self) -> u8 {
        self.counts.values().copied().max().unwrap_or(0)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
