//! Line-oriented host for refereed games.
//!
//! Reads one command per line from stdin and prints one response:
//!
//! ```text
//! new <white>                  open a game, prints its id
//! join <id> <black>            seat the second player
//! move <id> <e2-e4> [player]   submit a move (e7-e8=Q for promotions)
//! show <id>                    board, status and FEN
//! draw <id> | abandon <id>     end by agreement / give up the game
//! resign <id> <player>
//! list [player]                active games, or one player's games
//! save <id>                    snapshot as JSON
//! load <json>                  restore a snapshot
//! quit
//! ```

use std::io::{self, BufRead, Write};

use tracing::{error, info};
use uuid::Uuid;

use chess_referee::chess_errors::{ChessErrors, ChessResult};
use chess_referee::config::RefereeConfig;
use chess_referee::game_state::chess_types::ChessMove;
use chess_referee::session::game_store::{GameStore, InMemoryGameStore};
use chess_referee::session::snapshot::GameSnapshot;
use chess_referee::utils::fen::generate_fen;
use chess_referee::utils::logging::init_tracing;
use chess_referee::utils::render_board::render_board;

fn parse_id(token: Option<&str>) -> ChessResult<Uuid> {
    let token = token.ok_or_else(|| ChessErrors::InvalidMoveNotation("missing game id".to_owned()))?;
    Uuid::parse_str(token)
        .map_err(|_| ChessErrors::InvalidMoveNotation(format!("bad game id {token:?}")))
}

fn required<'a>(token: Option<&'a str>, what: &str) -> ChessResult<&'a str> {
    token.ok_or_else(|| ChessErrors::InvalidMoveNotation(format!("missing {what}")))
}

fn run_command(store: &dyn GameStore, line: &str) -> ChessResult<String> {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let mut args = rest.split_whitespace();

    match command {
        "new" => {
            let white = required(args.next(), "player name")?;
            Ok(store.create_game(white)?.to_string())
        }
        "join" => {
            let id = parse_id(args.next())?;
            store.join_game(id, required(args.next(), "player name")?)?;
            Ok("ok".to_owned())
        }
        "move" => {
            let id = parse_id(args.next())?;
            let mv: ChessMove = required(args.next(), "move")?.parse()?;
            let outcome = store.submit_move(id, args.next(), mv)?;
            Ok(format!("{} {:?}", outcome.notation, outcome.status))
        }
        "show" => {
            let id = parse_id(args.next())?;
            let session = store.snapshot(id)?.restore()?;
            Ok(format!(
                "{}\n{:?} / {:?}\n{}",
                render_board(&session.state().board),
                session.status(),
                session.state().status(),
                generate_fen(session.state())
            ))
        }
        "draw" => {
            store.agree_draw(parse_id(args.next())?)?;
            Ok("ok".to_owned())
        }
        "abandon" => {
            store.abandon(parse_id(args.next())?)?;
            Ok("ok".to_owned())
        }
        "resign" => {
            let id = parse_id(args.next())?;
            store.resign(id, required(args.next(), "player name")?)?;
            Ok("ok".to_owned())
        }
        "list" => {
            let ids = match args.next() {
                Some(player) => store.player_games(player),
                None => store.active_games(),
            };
            Ok(ids
                .iter()
                .map(Uuid::to_string)
                .collect::<Vec<_>>()
                .join("\n"))
        }
        "save" => store.snapshot(parse_id(args.next())?)?.to_json(),
        "load" => {
            let snapshot = GameSnapshot::from_json(rest)?;
            Ok(store.restore(&snapshot)?.to_string())
        }
        other => Err(ChessErrors::InvalidMoveNotation(format!(
            "unknown command {other:?}"
        ))),
    }
}

fn main() {
    dotenv::dotenv().ok();
    let config = RefereeConfig::from_env();
    init_tracing(&config.log_filter);
    info!(max_games = config.max_games, "chess referee ready");

    let store = InMemoryGameStore::from_config(&config);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                error!(%err, "failed to read stdin");
                break;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "quit" {
            break;
        }

        match run_command(&store, trimmed) {
            Ok(response) => println!("{response}"),
            Err(err) => println!("error: {err}"),
        }
        stdout.flush().ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_game_to_checkmate() {
        let store = InMemoryGameStore::default();
        let id = run_command(&store, "new alice").expect("new game");
        run_command(&store, &format!("join {id} bob")).expect("join");

        for mv in ["f2-f3", "e7-e5", "g2-g4"] {
            run_command(&store, &format!("move {id} {mv}")).expect("move");
        }
        let last = run_command(&store, &format!("move {id} d8-h4 bob")).expect("mate");
        assert!(last.starts_with("d8-h4 Checkmate"));

        let shown = run_command(&store, &format!("show {id}")).expect("show");
        assert!(shown.contains("BlackWon"));
        assert!(run_command(&store, "list").expect("list").is_empty());
    }

    #[test]
    fn bad_input_is_reported_not_fatal() {
        let store = InMemoryGameStore::default();
        assert!(run_command(&store, "fly away").is_err());
        assert!(run_command(&store, "move not-a-uuid e2-e4").is_err());
        let id = run_command(&store, "new alice").expect("new game");
        assert!(run_command(&store, &format!("move {id} e2-e4")).is_err());
        assert!(run_command(&store, &format!("move {id} e2e4")).is_err());
    }

    #[test]
    fn save_and_load_round_trip() {
        let store = InMemoryGameStore::default();
        let id = run_command(&store, "new alice").expect("new game");
        run_command(&store, &format!("join {id} bob")).expect("join");
        run_command(&store, &format!("move {id} e2-e4")).expect("move");
        let json = run_command(&store, &format!("save {id}")).expect("save");

        let other = InMemoryGameStore::default();
        let loaded = run_command(&other, &format!("load {json}")).expect("load");
        assert_eq!(loaded, id);
    }
}
