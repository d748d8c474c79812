use serde::Serialize;
use utoipa::ToSchema;

/// Health payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok", "disabled" or "degraded").
    pub status: String,
    /// Games currently held in memory.
    pub games: usize,
    /// Durability operations submitted but not yet written.
    pub pending_persistence: usize,
}

impl HealthResponse {
    /// The stats store answered its health check.
    pub fn ok(games: usize, pending_persistence: usize) -> Self {
        Self {
            status: "ok".to_string(),
            games,
            pending_persistence,
        }
    }

    /// No stats store is configured; games still work in memory.
    pub fn disabled(games: usize) -> Self {
        Self {
            status: "disabled".to_string(),
            games,
            pending_persistence: 0,
        }
    }

    /// The stats store failed its health check.
    pub fn degraded(games: usize, pending_persistence: usize) -> Self {
        Self {
            status: "degraded".to_string(),
            games,
            pending_persistence,
        }
    }
}
