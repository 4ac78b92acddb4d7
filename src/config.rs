//! Runtime configuration for hosting games.
//!
//! Values come from the environment (a `.env` file is loaded by the binaries
//! first). Unset or unparsable variables fall back to the defaults.

use std::env;

pub const LOG_FILTER_VAR: &str = "CHESS_REFEREE_LOG";
pub const MAX_GAMES_VAR: &str = "CHESS_REFEREE_MAX_GAMES";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefereeConfig {
    /// `tracing` filter directive, e.g. `info` or `chess_referee=debug`.
    pub log_filter: String,
    /// Upper bound on games held by one in-memory store.
    pub max_games: usize,
}

impl Default for RefereeConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_owned(),
            max_games: 1024,
        }
    }
}

impl RefereeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let log_filter = lookup(LOG_FILTER_VAR)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.log_filter);

        let max_games = lookup(MAX_GAMES_VAR)
            .and_then(|value| value.trim().parse::<usize>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(defaults.max_games);

        Self {
            log_filter,
            max_games,
        }
    }
}
