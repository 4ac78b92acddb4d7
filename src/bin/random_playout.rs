//! Plays random legal games through a full session and reports the outcomes.
//!
//! Usage:
//! `cargo run --release --bin random_playout -- [games] [max_plies]`

use rand::prelude::IndexedRandom;
use tracing::{debug, info, warn};

use chess_referee::chess_errors::ChessResult;
use chess_referee::config::RefereeConfig;
use chess_referee::game_state::chess_types::Color;
use chess_referee::game_state::game_state::GameStatus;
use chess_referee::rules::legal_moves::legal_moves;
use chess_referee::session::game_session::{GameSession, SessionStatus};
use chess_referee::utils::logging::init_tracing;

#[derive(Debug, Default)]
struct PlayoutStats {
    games: u32,
    white_wins: u32,
    black_wins: u32,
    stalemates: u32,
    rule_draws: u32,
    unfinished: u32,
    plies: u64,
}

impl PlayoutStats {
    fn report(&self) -> String {
        let avg_plies = if self.games == 0 {
            0.0
        } else {
            self.plies as f64 / self.games as f64
        };
        format!(
            "games={} white_wins={} black_wins={} stalemates={} rule_draws={} unfinished={} avg_plies={:.1}",
            self.games,
            self.white_wins,
            self.black_wins,
            self.stalemates,
            self.rule_draws,
            self.unfinished,
            avg_plies
        )
    }
}

fn play_one(rng: &mut impl rand::Rng, max_plies: u32) -> ChessResult<GameSession> {
    let mut session = GameSession::new("random-white");
    session.join("random-black")?;

    for _ in 0..max_plies {
        if session.status() != SessionStatus::InProgress {
            break;
        }
        let moves = legal_moves(session.state());
        let Some(mv) = moves.choose(rng).copied() else {
            warn!(game_id = %session.id(), "no legal move in a live game");
            break;
        };
        session.submit_move(mv)?;
    }

    Ok(session)
}

fn main() {
    dotenv::dotenv().ok();
    let config = RefereeConfig::from_env();
    init_tracing(&config.log_filter);

    let mut args = std::env::args().skip(1);
    let games: u32 = args.next().and_then(|v| v.parse().ok()).unwrap_or(20);
    let max_plies: u32 = args.next().and_then(|v| v.parse().ok()).unwrap_or(400);

    let mut rng = rand::rng();
    let mut stats = PlayoutStats::default();

    for _ in 0..games {
        let session = match play_one(&mut rng, max_plies) {
            Ok(session) => session,
            Err(err) => {
                warn!(%err, "playout aborted");
                continue;
            }
        };

        stats.games += 1;
        stats.plies += session.move_history().len() as u64;
        match session.state().status() {
            GameStatus::Checkmate {
                winner: Color::White,
            } => stats.white_wins += 1,
            GameStatus::Checkmate { .. } => stats.black_wins += 1,
            GameStatus::Stalemate => stats.stalemates += 1,
            GameStatus::Draw(_) => stats.rule_draws += 1,
            _ => stats.unfinished += 1,
        }
        debug!(game_id = %session.id(), status = ?session.state().status(), "playout finished");
    }

    info!("{}", stats.report());
    println!("{}", stats.report());
}
