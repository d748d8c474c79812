//! Registry of live games guarded by a single reader/writer lock.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::state::{
    game::{GameState, Score},
    rotation::GameError,
};

/// Identifier of a registered game (24 lowercase hexadecimal characters).
pub type GameId = String;

const GAME_ID_BYTES: usize = 12;

/// Point-in-time summary of a registered game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameListing {
    /// Registry key.
    pub id: GameId,
    /// Whether the game accepts goals.
    pub started: bool,
    /// Score at the time of listing.
    pub score: Score,
}

/// Owns every [`GameState`] and serializes access to them.
///
/// Readers share the lock; every mutation, including registration, takes it
/// exclusively. Callers get one scoped window per logical operation and must
/// compute whatever they need to return inside that window.
#[derive(Debug, Default)]
pub struct GameStore {
    games: RwLock<HashMap<GameId, GameState>>,
}

impl GameStore {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a game under a fresh random identifier.
    ///
    /// `view` runs inside the same write window so the returned projection is
    /// the state that was inserted.
    pub async fn create<T>(
        &self,
        game: GameState,
        view: impl FnOnce(&GameState) -> T,
    ) -> (GameId, T) {
        let mut games = self.games.write().await;
        let id = vacant_id(&games, random_game_id);
        let projection = view(&game);
        games.insert(id.clone(), game);
        (id, projection)
    }

    /// Run a read-only operation against one game under the shared lock.
    pub async fn read<T>(
        &self,
        id: &str,
        operation: impl FnOnce(&GameState) -> T,
    ) -> Result<T, GameError> {
        let games = self.games.read().await;
        let game = games
            .get(id)
            .ok_or_else(|| GameError::GameNotFound(id.to_string()))?;
        Ok(operation(game))
    }

    /// Run one mutating operation against one game under the exclusive lock.
    pub async fn update<T>(
        &self,
        id: &str,
        operation: impl FnOnce(&mut GameState) -> Result<T, GameError>,
    ) -> Result<T, GameError> {
        let mut games = self.games.write().await;
        let game = games
            .get_mut(id)
            .ok_or_else(|| GameError::GameNotFound(id.to_string()))?;
        operation(game)
    }

    /// Summaries of every game, ordered by identifier.
    pub async fn list(&self) -> Vec<GameListing> {
        let games = self.games.read().await;
        let mut listings = games
            .iter()
            .map(|(id, game)| GameListing {
                id: id.clone(),
                started: game.started(),
                score: game.score(),
            })
            .collect::<Vec<_>>();
        listings.sort_by(|left, right| left.id.cmp(&right.id));
        listings
    }

    /// Number of registered games.
    pub async fn len(&self) -> usize {
        self.games.read().await.len()
    }
}

/// Draw identifiers until one is not registered yet.
fn vacant_id(games: &HashMap<GameId, GameState>, mut generate: impl FnMut() -> GameId) -> GameId {
    loop {
        let candidate = generate();
        if !games.contains_key(&candidate) {
            return candidate;
        }
    }
}

fn random_game_id() -> GameId {
    let bytes: [u8; GAME_ID_BYTES] = rand::random();
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::state::game::{Team, TeamSlot};

    fn sample_game(waiting: &[&str]) -> GameState {
        GameState::new(
            TeamSlot::new("p1", "p2"),
            TeamSlot::new("p3", "p4"),
            waiting.iter().map(|player| player.to_string()).collect(),
            8,
        )
        .unwrap()
    }

    #[test]
    fn random_ids_are_hex() {
        let id = random_game_id();
        assert_eq!(id.len(), GAME_ID_BYTES * 2);
        assert!(id.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
    }

    #[test]
    fn vacant_id_retries_on_collision() {
        let mut games = HashMap::new();
        games.insert("taken".to_string(), sample_game(&[]));

        let mut script = vec!["fresh", "taken", "taken"];
        let id = vacant_id(&games, || script.pop().unwrap_or("fallback").to_string());
        assert_eq!(id, "fresh");
        assert!(script.is_empty());
    }

    #[tokio::test]
    async fn create_then_read_and_list() {
        let store = GameStore::new();
        let (id, waiting) = store
            .create(sample_game(&["p5"]), |game| game.waiting().snapshot())
            .await;
        assert_eq!(waiting, vec!["p5".to_string()]);

        let score = store.read(&id, GameState::score).await.unwrap();
        assert_eq!(score, Score::default());

        let listings = store.list().await;
        assert_eq!(
            listings,
            vec![GameListing {
                id: id.clone(),
                started: true,
                score: Score::default(),
            }]
        );
    }

    #[tokio::test]
    async fn unknown_game_is_reported() {
        let store = GameStore::new();
        assert_eq!(
            store.read("nope", |_| ()).await,
            Err(GameError::GameNotFound("nope".into()))
        );
        assert_eq!(
            store.update("nope", |game| game.undo()).await,
            Err(GameError::GameNotFound("nope".into()))
        );
    }

    #[tokio::test]
    async fn failed_update_leaves_game_untouched() {
        let store = GameStore::new();
        let (id, before) = store.create(sample_game(&[]), GameState::clone).await;

        let result = store.update(&id, |game| game.apply_goal(Team::Red)).await;
        assert_eq!(result.unwrap_err(), GameError::QueueEmpty);
        assert_eq!(store.read(&id, GameState::clone).await.unwrap(), before);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_enqueues_are_serialized() {
        let store = Arc::new(GameStore::new());
        let (id, _) = store.create(sample_game(&[]), |_| ()).await;

        let tasks = (0..64)
            .map(|n| {
                let store = store.clone();
                let id = id.clone();
                tokio::spawn(async move {
                    store
                        .update(&id, |game| game.enqueue(&format!("w{n}")))
                        .await
                })
            })
            .collect::<Vec<_>>();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let (len, history) = store
            .read(&id, |game| (game.waiting().len(), game.history_len()))
            .await
            .unwrap();
        assert_eq!(len, 64);
        assert_eq!(history, 64);
    }

    #[tokio::test]
    async fn ids_are_unique_across_many_games() {
        let store = GameStore::new();
        for _ in 0..100 {
            store.create(sample_game(&[]), |_| ()).await;
        }
        assert_eq!(store.len().await, 100);
        assert_eq!(store.list().await.len(), 100);
    }
}
