use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::game::{
        CreateGameRequest, CreateGameResponse, GameListItem, GameResponse, GoalRequest,
        QueuePlayerRequest, RemovePlayerRequest,
    },
    error::AppError,
    services::game_service,
    state::SharedState,
};

/// Routes driving table games: creation, goals, queue changes and undo.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", get(list_games))
        .route("/games/start", post(start_game))
        .route("/games/{id}", get(get_game))
        .route("/games/{id}/queue", post(queue_player))
        .route("/games/{id}/goal", post(score_goal))
        .route("/games/{id}/undo", post(undo))
        .route("/games/{id}/remove", post(remove_player))
}

/// List every game with its score.
#[utoipa::path(
    get,
    path = "/games",
    tag = "game",
    responses((status = 200, description = "Known games", body = [GameListItem]))
)]
pub async fn list_games(State(state): State<SharedState>) -> Json<Vec<GameListItem>> {
    Json(game_service::list_games(&state).await)
}

/// Start a game with two seated teams and an optional waiting queue.
#[utoipa::path(
    post,
    path = "/games/start",
    tag = "game",
    request_body = CreateGameRequest,
    responses(
        (status = 200, description = "Game started", body = CreateGameResponse),
        (status = 400, description = "Empty player id"),
        (status = 409, description = "Player id used twice")
    )
)]
pub async fn start_game(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateGameRequest>>,
) -> Result<Json<CreateGameResponse>, AppError> {
    Ok(Json(game_service::create_game(&state, payload).await?))
}

/// Fetch the current state of a game.
#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "game",
    params(("id" = String, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Current game state", body = GameResponse),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<GameResponse>, AppError> {
    Ok(Json(game_service::get_game(&state, &id).await?))
}

/// Append a player to the waiting queue.
#[utoipa::path(
    post,
    path = "/games/{id}/queue",
    tag = "game",
    params(("id" = String, Path, description = "Game identifier")),
    request_body = QueuePlayerRequest,
    responses(
        (status = 200, description = "Player queued", body = GameResponse),
        (status = 404, description = "Unknown game"),
        (status = 409, description = "Player already in the game")
    )
)]
pub async fn queue_player(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Valid(Json(payload)): Valid<Json<QueuePlayerRequest>>,
) -> Result<Json<GameResponse>, AppError> {
    Ok(Json(game_service::enqueue_player(&state, &id, payload).await?))
}

/// Record a goal and rotate the losing team.
#[utoipa::path(
    post,
    path = "/games/{id}/goal",
    tag = "game",
    params(("id" = String, Path, description = "Game identifier")),
    request_body = GoalRequest,
    responses(
        (status = 200, description = "Goal applied; includes the rotation", body = GameResponse),
        (status = 400, description = "Team is neither red nor blue"),
        (status = 404, description = "Unknown game"),
        (status = 409, description = "Nobody waiting or game not started")
    )
)]
pub async fn score_goal(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<GoalRequest>,
) -> Result<Json<GameResponse>, AppError> {
    Ok(Json(game_service::apply_goal(&state, &id, payload).await?))
}

/// Revert the latest goal, queue addition or removal.
#[utoipa::path(
    post,
    path = "/games/{id}/undo",
    tag = "game",
    params(("id" = String, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Previous state restored", body = GameResponse),
        (status = 404, description = "Unknown game"),
        (status = 409, description = "Nothing to undo")
    )
)]
pub async fn undo(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<GameResponse>, AppError> {
    Ok(Json(game_service::undo(&state, &id).await?))
}

/// Remove a player from the queue or from the table.
#[utoipa::path(
    post,
    path = "/games/{id}/remove",
    tag = "game",
    params(("id" = String, Path, description = "Game identifier")),
    request_body = RemovePlayerRequest,
    responses(
        (status = 200, description = "Player removed", body = GameResponse),
        (status = 404, description = "Unknown game or player")
    )
)]
pub async fn remove_player(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<RemovePlayerRequest>,
) -> Result<Json<GameResponse>, AppError> {
    Ok(Json(game_service::remove_player(&state, &id, payload).await?))
}
