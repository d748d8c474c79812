/// OpenAPI documentation generation.
pub mod documentation;
/// Game lifecycle: creation, goals, queue changes and undo.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Ordered background hand-off of durability work.
pub mod persistence;
/// Player search, registration and leaderboard.
pub mod player_service;
