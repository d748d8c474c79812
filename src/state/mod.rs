/// Seated teams, score and undo snapshots.
pub mod game;
pub mod queue;
pub mod rotation;
pub mod store;

use std::sync::Arc;

use crate::{
    config::AppConfig,
    dao::stats_store::StatsStore,
    error::ServiceError,
    services::persistence::PersistenceQueue,
};

pub use self::game::{GameState, PlayerId, Score, Snapshot, Team, TeamSlot};
pub use self::rotation::{FullRotationEvent, GameError, GoalOutcome, RotationSummary};
pub use self::store::{GameId, GameListing, GameStore};

/// Handle shared by every request handler.
pub type SharedState = Arc<AppState>;

/// Central application state: the game registry plus the durability plumbing.
pub struct AppState {
    games: GameStore,
    persistence: PersistenceQueue,
    stats_store: Option<Arc<dyn StatsStore>>,
    queue_capacity: usize,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// When a stats store is given the persistence worker is spawned on the
    /// current runtime; otherwise durability submissions are dropped.
    pub fn new(config: &AppConfig, stats_store: Option<Arc<dyn StatsStore>>) -> SharedState {
        let persistence = match &stats_store {
            Some(store) => PersistenceQueue::spawn(store.clone(), config.retry),
            None => PersistenceQueue::disabled(),
        };

        Arc::new(Self {
            games: GameStore::default(),
            persistence,
            stats_store,
            queue_capacity: config.queue_capacity,
        })
    }

    /// Registry of live games.
    pub fn games(&self) -> &GameStore {
        &self.games
    }

    /// Ordered write-behind queue towards the stats store.
    pub fn persistence(&self) -> &PersistenceQueue {
        &self.persistence
    }

    /// Configured stats store, if any.
    pub fn stats_store(&self) -> Option<&Arc<dyn StatsStore>> {
        self.stats_store.as_ref()
    }

    /// Stats store for endpoints that cannot work without one.
    pub fn require_stats_store(&self) -> Result<&Arc<dyn StatsStore>, ServiceError> {
        self.stats_store.as_ref().ok_or(ServiceError::Disabled)
    }

    /// Minimum waiting-queue capacity for newly created games.
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }
}
