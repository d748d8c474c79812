//! Process-local stats store, handy for development and tests.

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use tokio::sync::RwLock;

use crate::dao::{
    models::{GoalEventEntity, PlayerEntity, now_rfc3339, rank_players, unique_names},
    stats_store::StatsStore,
    storage::StorageResult,
};

/// In-memory [`StatsStore`]; contents vanish with the process.
#[derive(Clone, Default)]
pub struct MemoryStatsStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    players: DashMap<String, PlayerEntity>,
    events: RwLock<Vec<GoalEventEntity>>,
}

impl MemoryStatsStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of a player record, if known.
    pub fn player(&self, name: &str) -> Option<PlayerEntity> {
        self.inner.players.get(name).map(|entry| entry.value().clone())
    }

    /// Recorded goal events in write order.
    pub async fn events(&self) -> Vec<GoalEventEntity> {
        self.inner.events.read().await.clone()
    }
}

impl MemoryInner {
    fn touch(&self, names: &[String]) {
        let now = now_rfc3339();
        for name in names {
            self.players
                .entry(name.clone())
                .and_modify(|player| player.last_seen = now.clone())
                .or_insert_with(|| PlayerEntity::new(name.clone()));
        }
    }

    fn credit(&self, event: &GoalEventEntity) {
        for name in event.players() {
            if let Some(mut player) = self.players.get_mut(&name) {
                player.credit_goal(event);
            }
        }
    }
}

impl StatsStore for MemoryStatsStore {
    fn ensure_players(&self, names: Vec<String>) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.touch(&unique_names(names.iter()));
            Ok(())
        })
    }

    fn record_goal(&self, event: GoalEventEntity) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut events = inner.events.write().await;
            if events.iter().any(|recorded| recorded.id == event.id) {
                return Ok(());
            }

            inner.touch(&event.players());
            inner.credit(&event);
            events.push(event);
            Ok(())
        })
    }

    fn search_players(
        &self,
        query: String,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let players = inner
                .players
                .iter()
                .map(|entry| entry.value().clone())
                .collect::<Vec<_>>();
            Ok(rank_players(players, &query, limit))
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::game::{GameState, Team, TeamSlot};

    fn goal_event(scoring: Team) -> GoalEventEntity {
        let mut game = GameState::new(
            TeamSlot::new("p1", "p2"),
            TeamSlot::new("p3", "p4"),
            vec!["p5".into()],
            8,
        )
        .unwrap();
        let outcome = game.apply_goal(scoring).unwrap();
        GoalEventEntity::from_outcome("game", &outcome)
    }

    #[tokio::test]
    async fn ensure_players_is_idempotent() {
        let store = MemoryStatsStore::new();
        store
            .ensure_players(vec!["alice".into(), " alice ".into(), "".into()])
            .await
            .unwrap();
        store.ensure_players(vec!["alice".into()]).await.unwrap();

        let found = store.search_players(String::new(), 10).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "alice");
    }

    #[tokio::test]
    async fn goal_updates_wins_and_survives() {
        let store = MemoryStatsStore::new();
        store.record_goal(goal_event(Team::Red)).await.unwrap();

        assert_eq!(store.player("p1").unwrap().wins, 1);
        assert_eq!(store.player("p2").unwrap().survives, 1);
        let loser_forward = store.player("p3").unwrap();
        assert_eq!((loser_forward.wins, loser_forward.survives), (0, 1));
        let benched = store.player("p4").unwrap();
        assert_eq!((benched.wins, benched.survives), (0, 0));
        assert!(store.player("p5").is_some());
    }

    #[tokio::test]
    async fn replayed_goal_is_counted_once() {
        let store = MemoryStatsStore::new();
        let event = goal_event(Team::Blue);
        store.record_goal(event.clone()).await.unwrap();
        store.record_goal(event).await.unwrap();

        assert_eq!(store.events().await.len(), 1);
        assert_eq!(store.player("p3").unwrap().wins, 1);
    }

    #[tokio::test]
    async fn leaderboard_reflects_counters() {
        let store = MemoryStatsStore::new();
        store.record_goal(goal_event(Team::Blue)).await.unwrap();
        store.record_goal(goal_event(Team::Blue)).await.unwrap();

        let top = store.search_players(String::new(), 2).await.unwrap();
        let names = top.iter().map(|p| p.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["p3", "p4"]);
    }
}
