/// Game payloads.
pub mod game;
/// Health payloads.
pub mod health;
/// Player and leaderboard payloads.
pub mod player;
pub mod validation;
