use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report whether the stats store answers, logging connectivity issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let games = state.games().len().await;
    let Some(store) = state.stats_store() else {
        return HealthResponse::disabled(games);
    };

    let pending = state.persistence().pending();
    match store.health_check().await {
        Ok(()) => HealthResponse::ok(games, pending),
        Err(err) => {
            warn!(error = %err, pending, "stats store health check failed");
            HealthResponse::degraded(games, pending)
        }
    }
}
