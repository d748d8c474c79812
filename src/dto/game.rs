use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::validation::validate_player_id,
    state::{
        game::{GameState, PlayerId, Score, TeamSlot},
        rotation::{FullRotationEvent, RotationSummary},
        store::GameListing,
    },
};

/// Line-up of one team on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct TeamSlotDto {
    /// Player on the attacking rods.
    pub forward: String,
    /// Player in goal.
    pub goalkeeper: String,
}

impl TeamSlotDto {
    fn validate_into(&self, field: &'static str, errors: &mut ValidationErrors) {
        if let Err(e) = validate_player_id(&self.forward) {
            errors.add(field, e);
        }
        if let Err(e) = validate_player_id(&self.goalkeeper) {
            errors.add(field, e);
        }
    }
}

impl From<&TeamSlot> for TeamSlotDto {
    fn from(slot: &TeamSlot) -> Self {
        Self {
            forward: slot.forward.clone(),
            goalkeeper: slot.goalkeeper.clone(),
        }
    }
}

impl From<TeamSlotDto> for TeamSlot {
    fn from(dto: TeamSlotDto) -> Self {
        TeamSlot::new(dto.forward, dto.goalkeeper)
    }
}

/// Payload used to start a brand-new game.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateGameRequest {
    /// Red line-up.
    pub red: TeamSlotDto,
    /// Blue line-up.
    pub blue: TeamSlotDto,
    /// Players waiting for a seat, front of the queue first.
    #[serde(default)]
    pub waiting: Vec<String>,
}

impl Validate for CreateGameRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        self.red.validate_into("red", &mut errors);
        self.blue.validate_into("blue", &mut errors);
        for id in &self.waiting {
            if let Err(e) = validate_player_id(id) {
                errors.add("waiting", e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Player to append to the waiting queue.
#[derive(Debug, Deserialize, ToSchema)]
pub struct QueuePlayerRequest {
    /// Player joining the back of the queue.
    pub player_id: String,
}

impl Validate for QueuePlayerRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_player_id(&self.player_id) {
            errors.add("player_id", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Player to take out of the game, seated or waiting.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RemovePlayerRequest {
    /// Player leaving the game.
    pub player_id: String,
}

/// Goal scored by `team` ("red" or "blue", case-insensitive).
#[derive(Debug, Deserialize, ToSchema)]
pub struct GoalRequest {
    /// Scoring team token.
    pub team: String,
}

/// Rotation of the losing team after a goal.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RotationSummaryDto {
    /// Losing goalkeeper sent to the back of the queue.
    pub benched: String,
    /// Losing forward who took the goal.
    pub moved_to_goalkeeper: String,
    /// Player drawn from the front of the queue.
    pub new_forward: String,
}

impl From<RotationSummary> for RotationSummaryDto {
    fn from(summary: RotationSummary) -> Self {
        Self {
            benched: summary.benched,
            moved_to_goalkeeper: summary.moved_to_goalkeeper,
            new_forward: summary.new_forward,
        }
    }
}

/// The scoring pair beat every opposing composition since their streak began.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FullRotationDto {
    /// Team that completed the rotation.
    pub team: String,
    /// The two players of that team, sorted.
    pub players: Vec<String>,
}

impl From<FullRotationEvent> for FullRotationDto {
    fn from(event: FullRotationEvent) -> Self {
        Self {
            team: event.team.to_string(),
            players: event.players,
        }
    }
}

/// Public projection of a game returned by every game endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GameResponse {
    /// Red line-up.
    pub red: TeamSlotDto,
    /// Blue line-up.
    pub blue: TeamSlotDto,
    /// Waiting queue, front first.
    pub waiting: Vec<PlayerId>,
    /// Goals per team.
    pub score: Score,
    /// Whether goals are accepted.
    pub started: bool,
    /// Present only on goal responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationSummaryDto>,
    /// Present when the goal completed a full rotation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_rotation: Option<FullRotationDto>,
}

impl From<&GameState> for GameResponse {
    fn from(game: &GameState) -> Self {
        Self {
            red: game.red().into(),
            blue: game.blue().into(),
            waiting: game.waiting().snapshot(),
            score: game.score(),
            started: game.started(),
            rotation: None,
            full_rotation: None,
        }
    }
}

/// Identifier of the new game together with its initial state.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateGameResponse {
    /// Identifier to use in every later game route.
    pub id: String,
    /// State right after creation.
    pub state: GameResponse,
}

/// One row of the game listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameListItem {
    /// Game identifier.
    pub id: String,
    /// Whether goals are accepted.
    pub started: bool,
    /// Goals per team.
    pub score: Score,
}

impl From<GameListing> for GameListItem {
    fn from(listing: GameListing) -> Self {
        Self {
            id: listing.id,
            started: listing.started,
            score: listing.score,
        }
    }
}
