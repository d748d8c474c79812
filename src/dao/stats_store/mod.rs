/// CouchDB-backed stats store.
#[cfg(feature = "couch-store")]
pub mod couchdb;
/// Process-local stats store.
pub mod memory;

use futures::future::BoxFuture;

use crate::dao::{
    models::{GoalEventEntity, PlayerEntity},
    storage::StorageResult,
};

/// Durable home of player records and goal events.
///
/// Writes are issued by the persistence queue, which retries them until they
/// succeed, so a goal event may arrive more than once and must credit each
/// player only once.
pub trait StatsStore: Send + Sync {
    /// Insert missing players and refresh `last_seen` for known ones.
    fn ensure_players(&self, names: Vec<String>) -> BoxFuture<'static, StorageResult<()>>;
    /// Store a goal event and bump the win/survive counters of its players.
    fn record_goal(&self, event: GoalEventEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Players whose name contains `query`, best first, at most `limit` entries.
    fn search_players(
        &self,
        query: String,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>>;
    /// Cheap round trip proving the backend answers.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish whatever the backend needs before the next attempt.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
