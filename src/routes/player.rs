use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use axum_valid::Valid;

use crate::{
    dto::player::{CreatePlayerRequest, LeaderboardQuery, PlayerSearchQuery, PlayerSummary},
    error::AppError,
    services::player_service,
    state::SharedState,
};

/// Player statistics backed by the stats store.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/players", get(search_players).post(create_player))
        .route("/leaderboard/data", get(leaderboard))
}

/// Search players by name.
#[utoipa::path(
    get,
    path = "/players",
    tag = "players",
    params(PlayerSearchQuery),
    responses(
        (status = 200, description = "Matching players, best ranked first", body = [PlayerSummary]),
        (status = 501, description = "No stats store configured")
    )
)]
pub async fn search_players(
    State(state): State<SharedState>,
    Query(query): Query<PlayerSearchQuery>,
) -> Result<Json<Vec<PlayerSummary>>, AppError> {
    Ok(Json(player_service::search_players(&state, query).await?))
}

/// Register a player so it shows up in searches before playing.
#[utoipa::path(
    post,
    path = "/players",
    tag = "players",
    request_body = CreatePlayerRequest,
    responses(
        (status = 200, description = "Player registered", body = PlayerSummary),
        (status = 400, description = "Blank name"),
        (status = 501, description = "No stats store configured")
    )
)]
pub async fn create_player(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreatePlayerRequest>>,
) -> Result<Json<PlayerSummary>, AppError> {
    Ok(Json(player_service::create_player(&state, payload).await?))
}

/// Players ordered by wins, then survives.
#[utoipa::path(
    get,
    path = "/leaderboard/data",
    tag = "players",
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "Leaderboard rows", body = [PlayerSummary]),
        (status = 501, description = "No stats store configured")
    )
)]
pub async fn leaderboard(
    State(state): State<SharedState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<PlayerSummary>>, AppError> {
    Ok(Json(player_service::leaderboard(&state, query).await?))
}
