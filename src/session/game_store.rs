//! Hosting many games at once.
//!
//! Each game sits behind its own `Mutex`, so moves on one game are serialized
//! while different games proceed in parallel. The outer `RwLock` is only held
//! long enough to find or insert a game.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};

use crate::chess_errors::{ChessErrors, ChessResult};
use crate::config::RefereeConfig;
use crate::game_state::chess_types::ChessMove;
use crate::session::game_session::{GameId, GameSession, MoveOutcome, SessionStatus};
use crate::session::snapshot::GameSnapshot;

/// Storage and lookup for hosted games.
///
/// Finished games stay readable until the store needs their slot.
pub trait GameStore: Send + Sync {
    /// Opens a new game for `white_player` and returns its id.
    fn create_game(&self, white_player: &str) -> ChessResult<GameId>;

    fn join_game(&self, id: GameId, black_player: &str) -> ChessResult<()>;

    /// Submits a move. With `player` set, the move is only accepted on that
    /// player's turn.
    fn submit_move(
        &self,
        id: GameId,
        player: Option<&str>,
        mv: ChessMove,
    ) -> ChessResult<MoveOutcome>;

    fn agree_draw(&self, id: GameId) -> ChessResult<()>;

    fn resign(&self, id: GameId, player: &str) -> ChessResult<()>;

    fn abandon(&self, id: GameId) -> ChessResult<()>;

    fn snapshot(&self, id: GameId) -> ChessResult<GameSnapshot>;

    /// Loads a persisted game, replacing any live game with the same id.
    fn restore(&self, snapshot: &GameSnapshot) -> ChessResult<GameId>;

    /// Ids of games still waiting for a player or in progress.
    fn active_games(&self) -> Vec<GameId>;

    /// Ids of all games `player` is seated in.
    fn player_games(&self, player: &str) -> Vec<GameId>;
}

pub struct InMemoryGameStore {
    games: RwLock<HashMap<GameId, Arc<Mutex<GameSession>>>>,
    max_games: usize,
}

impl InMemoryGameStore {
    pub fn new(max_games: usize) -> Self {
        Self {
            games: RwLock::new(HashMap::new()),
            max_games,
        }
    }

    pub fn from_config(config: &RefereeConfig) -> Self {
        Self::new(config.max_games)
    }

    pub fn len(&self) -> usize {
        self.games.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.read().is_empty()
    }

    fn game(&self, id: GameId) -> ChessResult<Arc<Mutex<GameSession>>> {
        self.games
            .read()
            .get(&id)
            .cloned()
            .ok_or(ChessErrors::GameNotFound(id))
    }

    fn with_game<R>(
        &self,
        id: GameId,
        f: impl FnOnce(&mut GameSession) -> ChessResult<R>,
    ) -> ChessResult<R> {
        let game = self.game(id)?;
        let mut session = game.lock();
        f(&mut *session)
    }

    /// Inserts `session`. At capacity, finished games are evicted first; only
    /// waiting and in-progress games count against `max_games`.
    fn insert(&self, session: GameSession) -> ChessResult<GameId> {
        let id = session.id();
        let mut games = self.games.write();
        if !games.contains_key(&id) && games.len() >= self.max_games {
            let before = games.len();
            games.retain(|_, game| !game.lock().status().is_terminal());
            let evicted = before - games.len();
            if evicted > 0 {
                info!(evicted, "evicted finished games");
            }
        }
        if !games.contains_key(&id) && games.len() >= self.max_games {
            warn!(max_games = self.max_games, "game store is full");
            return Err(ChessErrors::StoreFull(self.max_games));
        }
        games.insert(id, Arc::new(Mutex::new(session)));
        Ok(id)
    }

    fn ids_where(&self, keep: impl Fn(&GameSession) -> bool) -> Vec<GameId> {
        let games: Vec<_> = self.games.read().values().cloned().collect();
        let mut ids: Vec<GameId> = games
            .iter()
            .filter_map(|game| {
                let session = game.lock();
                keep(&*session).then(|| session.id())
            })
            .collect();
        ids.sort();
        ids
    }
}

impl Default for InMemoryGameStore {
    fn default() -> Self {
        Self::from_config(&RefereeConfig::default())
    }
}

impl GameStore for InMemoryGameStore {
    fn create_game(&self, white_player: &str) -> ChessResult<GameId> {
        self.insert(GameSession::new(white_player))
    }

    fn join_game(&self, id: GameId, black_player: &str) -> ChessResult<()> {
        self.with_game(id, |session| session.join(black_player))
    }

    fn submit_move(
        &self,
        id: GameId,
        player: Option<&str>,
        mv: ChessMove,
    ) -> ChessResult<MoveOutcome> {
        self.with_game(id, |session| match player {
            Some(player) => session.submit_move_as(player, mv),
            None => session.submit_move(mv),
        })
    }

    fn agree_draw(&self, id: GameId) -> ChessResult<()> {
        self.with_game(id, GameSession::agree_draw)
    }

    fn resign(&self, id: GameId, player: &str) -> ChessResult<()> {
        self.with_game(id, |session| {
            let color = session
                .color_of(player)
                .ok_or_else(|| ChessErrors::UnknownPlayer(player.to_owned()))?;
            session.resign(color)
        })
    }

    fn abandon(&self, id: GameId) -> ChessResult<()> {
        self.with_game(id, GameSession::abandon)
    }

    fn snapshot(&self, id: GameId) -> ChessResult<GameSnapshot> {
        self.with_game(id, |session| Ok(GameSnapshot::capture(session)))
    }

    fn restore(&self, snapshot: &GameSnapshot) -> ChessResult<GameId> {
        let session = snapshot.restore()?;
        let id = self.insert(session)?;
        info!(game_id = %id, "game restored from snapshot");
        Ok(id)
    }

    fn active_games(&self) -> Vec<GameId> {
        self.ids_where(|session| {
            matches!(
                session.status(),
                SessionStatus::WaitingForPlayer | SessionStatus::InProgress
            )
        })
    }

    fn player_games(&self, player: &str) -> Vec<GameId> {
        self.ids_where(|session| session.is_participant(player))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    use crate::chess_errors::MoveRejected;

    fn mv(text: &str) -> ChessMove {
        text.parse().expect("move should parse")
    }

    fn started(store: &InMemoryGameStore, white: &str, black: &str) -> GameId {
        let id = store.create_game(white).expect("game should be created");
        store.join_game(id, black).expect("black should join");
        id
    }

    #[test]
    fn unknown_games_are_reported() {
        let store = InMemoryGameStore::default();
        let missing = GameId::new_v4();
        assert!(matches!(
            store.submit_move(missing, None, mv("e2-e4")),
            Err(ChessErrors::GameNotFound(id)) if id == missing
        ));
        assert!(matches!(
            store.snapshot(missing),
            Err(ChessErrors::GameNotFound(_))
        ));
    }

    #[test]
    fn capacity_is_enforced() {
        let store = InMemoryGameStore::new(1);
        store.create_game("alice").expect("first game fits");
        assert!(matches!(
            store.create_game("bob"),
            Err(ChessErrors::StoreFull(1))
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn finished_games_make_room() {
        let store = InMemoryGameStore::new(2);
        let first = store.create_game("alice").expect("first game fits");
        let second = started(&store, "bob", "carol");
        assert!(matches!(
            store.create_game("dave"),
            Err(ChessErrors::StoreFull(2))
        ));

        store.abandon(first).expect("waiting game can be abandoned");
        store.resign(second, "carol").expect("carol may resign");
        assert!(store.active_games().is_empty());
        // Finished games remain visible until their slot is needed.
        assert_eq!(store.player_games("carol"), vec![second]);

        let late = store.create_game("late").expect("finished games are evicted");
        assert_eq!(store.active_games(), vec![late]);
        assert_eq!(store.len(), 1);
        assert!(matches!(
            store.snapshot(first),
            Err(ChessErrors::GameNotFound(_))
        ));
    }

    #[test]
    fn listings_follow_status_and_seats() {
        let store = InMemoryGameStore::default();
        let first = started(&store, "alice", "bob");
        let second = store.create_game("carol").expect("game should be created");
        let third = started(&store, "bob", "dave");

        store.resign(third, "dave").expect("dave may resign");

        let mut active = vec![first, second];
        active.sort();
        assert_eq!(store.active_games(), active);

        let mut bobs = vec![first, third];
        bobs.sort();
        assert_eq!(store.player_games("bob"), bobs);
        assert!(store.player_games("erin").is_empty());
        assert!(matches!(
            store.resign(first, "erin"),
            Err(ChessErrors::UnknownPlayer(_))
        ));
    }

    #[test]
    fn snapshots_restore_into_another_store() {
        let store = InMemoryGameStore::default();
        let id = started(&store, "alice", "bob");
        store
            .submit_move(id, Some("alice"), mv("d2-d4"))
            .expect("alice is on move");

        let snapshot = store.snapshot(id).expect("snapshot");
        let other = InMemoryGameStore::default();
        assert_eq!(other.restore(&snapshot).expect("restore"), id);
        other
            .submit_move(id, Some("bob"), mv("d7-d5"))
            .expect("bob is on move after restore");
    }

    #[test]
    fn games_progress_in_parallel() {
        let store = Arc::new(InMemoryGameStore::default());
        let ids: Vec<GameId> = (0..8)
            .map(|n| started(&store, &format!("white{n}"), &format!("black{n}")))
            .collect();

        let handles: Vec<_> = ids
            .iter()
            .map(|&id| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for text in ["g1-f3", "g8-f6", "f3-g1", "f6-g8"] {
                        store
                            .submit_move(id, None, mv(text))
                            .expect("shuffle move should be legal");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("worker should finish");
        }

        for id in ids {
            let snapshot = store.snapshot(id).expect("snapshot");
            assert_eq!(snapshot.move_history.len(), 4);
            assert_eq!(snapshot.position_history.len(), 5);
        }
    }

    #[test]
    fn racing_moves_on_one_game_are_serialized() {
        let store = Arc::new(InMemoryGameStore::default());
        let id = started(&store, "alice", "bob");

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.submit_move(id, None, mv("e2-e4")))
            })
            .collect();
        let results: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().expect("worker should finish"))
            .collect();

        assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
        for result in results.iter().filter(|result| result.is_err()) {
            assert!(matches!(
                result,
                Err(ChessErrors::IllegalMove(MoveRejected::EmptyOrigin(_)))
            ));
        }
        assert_eq!(store.snapshot(id).expect("snapshot").move_history.len(), 1);
    }
}
