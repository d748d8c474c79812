use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for King of the Table.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::game::list_games,
        crate::routes::game::start_game,
        crate::routes::game::get_game,
        crate::routes::game::queue_player,
        crate::routes::game::score_goal,
        crate::routes::game::undo,
        crate::routes::game::remove_player,
        crate::routes::player::search_players,
        crate::routes::player::create_player,
        crate::routes::player::leaderboard,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::game::CreateGameRequest,
            crate::dto::game::CreateGameResponse,
            crate::dto::game::GameResponse,
            crate::dto::game::GameListItem,
            crate::dto::game::GoalRequest,
            crate::dto::game::QueuePlayerRequest,
            crate::dto::game::RemovePlayerRequest,
            crate::dto::game::TeamSlotDto,
            crate::dto::player::CreatePlayerRequest,
            crate::dto::player::PlayerSummary,
            crate::state::game::Score,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "game", description = "Table games, goals and rotations"),
        (name = "players", description = "Player statistics"),
    )
)]
/// OpenAPI document covering every route.
pub struct ApiDoc;
