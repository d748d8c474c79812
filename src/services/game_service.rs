//! Game operations as seen by the HTTP layer.
//!
//! Each operation takes exactly one window on the game registry, builds its
//! response inside that window, and only after releasing it hands durability
//! work to the persistence queue.

use tracing::{debug, info};

use crate::{
    dao::models::GoalEventEntity,
    dto::game::{
        CreateGameRequest, CreateGameResponse, GameListItem, GameResponse, GoalRequest,
        QueuePlayerRequest, RemovePlayerRequest,
    },
    error::ServiceError,
    services::persistence::PersistenceOp,
    state::{
        SharedState,
        game::{GameState, Team},
    },
};

/// Register a new started game and remember all of its players.
pub async fn create_game(
    state: &SharedState,
    request: CreateGameRequest,
) -> Result<CreateGameResponse, ServiceError> {
    let CreateGameRequest { red, blue, waiting } = request;
    let game = GameState::new(red.into(), blue.into(), waiting, state.queue_capacity())?;
    let players = game.player_ids();

    let (id, response) = state
        .games()
        .create(game, |game| GameResponse::from(game))
        .await;
    info!(game_id = %id, players = players.len(), "game created");

    state
        .persistence()
        .submit(PersistenceOp::EnsurePlayers(players));

    Ok(CreateGameResponse {
        id,
        state: response,
    })
}

/// Current state of one game.
pub async fn get_game(state: &SharedState, id: &str) -> Result<GameResponse, ServiceError> {
    Ok(state.games().read(id, |game| GameResponse::from(game)).await?)
}

/// Every game with its score.
pub async fn list_games(state: &SharedState) -> Vec<GameListItem> {
    state
        .games()
        .list()
        .await
        .into_iter()
        .map(Into::into)
        .collect()
}

/// Append a player to the back of the waiting queue.
pub async fn enqueue_player(
    state: &SharedState,
    id: &str,
    request: QueuePlayerRequest,
) -> Result<GameResponse, ServiceError> {
    let player = request.player_id.trim().to_string();
    let response = state
        .games()
        .update(id, |game| {
            game.enqueue(&player)?;
            Ok(GameResponse::from(&*game))
        })
        .await?;

    debug!(game_id = %id, player = %player, "player queued");
    state
        .persistence()
        .submit(PersistenceOp::EnsurePlayers(vec![player]));

    Ok(response)
}

/// Score a goal and rotate the losing team.
///
/// The team token is parsed before the game is touched.
pub async fn apply_goal(
    state: &SharedState,
    id: &str,
    request: GoalRequest,
) -> Result<GameResponse, ServiceError> {
    let team: Team = request.team.parse()?;

    // the event is stamped inside the window so timestamps follow mutation order
    let (outcome, event, mut response) = state
        .games()
        .update(id, |game| {
            let outcome = game.apply_goal(team)?;
            let event = GoalEventEntity::from_outcome(id, &outcome);
            Ok((outcome, event, GameResponse::from(&*game)))
        })
        .await?;

    info!(
        game_id = %id,
        team = %team,
        benched = %outcome.rotation.benched,
        new_forward = %outcome.rotation.new_forward,
        red = response.score.red,
        blue = response.score.blue,
        "goal scored"
    );
    if let Some(event) = &outcome.full_rotation {
        info!(
            game_id = %id,
            team = %event.team,
            players = ?event.players,
            "full rotation completed"
        );
    }

    state.persistence().submit(PersistenceOp::RecordGoal(event));

    response.rotation = Some(outcome.rotation.into());
    response.full_rotation = outcome.full_rotation.map(Into::into);
    Ok(response)
}

/// Take a player out of the queue or off the table.
pub async fn remove_player(
    state: &SharedState,
    id: &str,
    request: RemovePlayerRequest,
) -> Result<GameResponse, ServiceError> {
    let response = state
        .games()
        .update(id, |game| {
            game.remove_player(&request.player_id)?;
            Ok(GameResponse::from(&*game))
        })
        .await?;

    debug!(game_id = %id, player = %request.player_id.trim(), "player removed");
    Ok(response)
}

/// Revert the latest goal, queue addition or removal.
pub async fn undo(state: &SharedState, id: &str) -> Result<GameResponse, ServiceError> {
    let response = state
        .games()
        .update(id, |game| {
            game.undo()?;
            Ok(GameResponse::from(&*game))
        })
        .await?;

    debug!(game_id = %id, "last action undone");
    Ok(response)
}
