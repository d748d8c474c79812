use tracing::info;

use crate::{
    dto::player::{CreatePlayerRequest, LeaderboardQuery, PlayerSearchQuery, PlayerSummary},
    error::ServiceError,
    services::persistence::PersistenceOp,
    state::SharedState,
};

const DEFAULT_SEARCH_LIMIT: usize = 20;
const MAX_SEARCH_LIMIT: usize = 100;
const DEFAULT_LEADERBOARD_LIMIT: usize = 50;
const MAX_LEADERBOARD_LIMIT: usize = 1000;

/// Find players whose name contains the query, best ranked first.
pub async fn search_players(
    state: &SharedState,
    query: PlayerSearchQuery,
) -> Result<Vec<PlayerSummary>, ServiceError> {
    let store = state.require_stats_store()?;
    let limit = clamp_limit(query.limit, DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT);
    let players = store
        .search_players(query.query.unwrap_or_default(), limit)
        .await?;
    Ok(players.into_iter().map(Into::into).collect())
}

/// Players ranked by wins, then survives.
pub async fn leaderboard(
    state: &SharedState,
    query: LeaderboardQuery,
) -> Result<Vec<PlayerSummary>, ServiceError> {
    let store = state.require_stats_store()?;
    let limit = clamp_limit(query.limit, DEFAULT_LEADERBOARD_LIMIT, MAX_LEADERBOARD_LIMIT);
    let players = store.search_players(String::new(), limit).await?;
    Ok(players.into_iter().map(Into::into).collect())
}

/// Register a player; the write goes through the persistence queue.
pub async fn create_player(
    state: &SharedState,
    request: CreatePlayerRequest,
) -> Result<PlayerSummary, ServiceError> {
    state.require_stats_store()?;

    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(ServiceError::InvalidInput("player name must not be empty".into()));
    }

    info!(player = %name, "player registered");
    state
        .persistence()
        .submit(PersistenceOp::EnsurePlayers(vec![name.clone()]));
    Ok(PlayerSummary::fresh(name))
}

fn clamp_limit(requested: Option<usize>, default: usize, max: usize) -> usize {
    requested.unwrap_or(default).clamp(1, max)
}
