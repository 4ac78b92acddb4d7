//! Crate root module declarations for the chess referee.
//!
//! The referee validates moves, applies them, and decides check, mate and the
//! draw rules for games hosted in sessions. Layers, bottom-up: board and
//! position types, the rule functions, the pure `GameState`, and the session
//! layer that seats players and stores games.

pub mod chess_errors;
pub mod config;

pub mod game_state {
    pub mod board;
    pub mod chess_rules;
    pub mod chess_types;
    pub mod game_state;
    pub mod position_history;
}

pub mod rules {
    pub mod check_detection;
    pub mod draw_detection;
    pub mod legal_moves;
    pub mod move_geometry;
    pub mod special_moves;
}

pub mod session {
    pub mod game_session;
    pub mod game_store;
    pub mod snapshot;
}

pub mod utils {
    pub mod algebraic;
    pub mod fen;
    pub mod logging;
    pub mod render_board;
}
