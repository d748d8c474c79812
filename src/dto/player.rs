use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationErrors};

use crate::{dao::models::PlayerEntity, dto::validation::validate_player_id};

/// Query string of `GET /players`.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PlayerSearchQuery {
    /// Case-insensitive substring of the player name.
    #[serde(default)]
    pub query: Option<String>,
    /// Maximum number of results (default 20, at most 100).
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Query string of `GET /leaderboard/data`.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct LeaderboardQuery {
    /// Maximum number of rows (default 50, at most 1000).
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Payload registering a player in the stats store.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePlayerRequest {
    /// Player name, trimmed before storing.
    pub name: String,
}

impl Validate for CreatePlayerRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_player_id(&self.name) {
            errors.add("name", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Lifetime counters of one player.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct PlayerSummary {
    /// Player name.
    pub name: String,
    /// Goals scored while holding the forward position.
    pub wins: u64,
    /// Goals after which the player stayed at the table.
    pub survives: u64,
}

impl PlayerSummary {
    /// Player not yet credited with anything.
    pub fn fresh(name: String) -> Self {
        Self {
            name,
            wins: 0,
            survives: 0,
        }
    }
}

impl From<PlayerEntity> for PlayerSummary {
    fn from(player: PlayerEntity) -> Self {
        Self {
            name: player.name,
            wins: player.wins,
            survives: player.survives,
        }
    }
}
