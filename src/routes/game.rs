use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::{
        game::{ActionAck, CreateGameRequest, GameListItem},
        snapshot::GameSnapshot,
    },
    error::AppError,
    services::game_service,
    state::SharedState,
};

/// Routes handling game rooms, their state and incoming actions.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", get(list_games).post(create_game))
        .route("/games/{id}/state", get(game_state))
        .route("/games/{id}/actions", post(submit_action))
}

/// List the hosted games.
#[utoipa::path(
    get,
    path = "/games",
    tag = "game",
    responses(
        (status = 200, description = "Hosted games", body = [GameListItem])
    )
)]
pub async fn list_games(State(state): State<SharedState>) -> Json<Vec<GameListItem>> {
    Json(game_service::list_games(&state))
}

/// Open a new game room.
#[utoipa::path(
    post,
    path = "/games",
    tag = "game",
    request_body = CreateGameRequest,
    responses(
        (status = 201, description = "Game created", body = GameListItem),
        (status = 400, description = "Invalid game identifier"),
        (status = 409, description = "A game with this identifier already exists")
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateGameRequest>>,
) -> Result<(StatusCode, Json<GameListItem>), AppError> {
    let item = game_service::create_game(&state, payload)?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Fetch the full state of a game, for first load and resync after a reconnect.
#[utoipa::path(
    get,
    path = "/games/{id}/state",
    tag = "game",
    params(("id" = String, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Current game state", body = GameSnapshot),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn game_state(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<GameSnapshot>, AppError> {
    let snapshot = game_service::snapshot(&state, &id).await?;
    Ok(Json(snapshot))
}

/// Submit one action, a JSON object tagged by `type` (`ADD_TEAM`, `START`, `MARK_CORRECT`...).
///
/// The action is queued and applied asynchronously; its effect shows up on the
/// game's event stream. Malformed bodies are acknowledged with `accepted: false`.
#[utoipa::path(
    post,
    path = "/games/{id}/actions",
    tag = "game",
    params(("id" = String, Path, description = "Identifier of the game")),
    request_body(content = String, content_type = "application/json", description = "Game action tagged by `type`"),
    responses(
        (status = 202, description = "Action acknowledged", body = ActionAck),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn submit_action(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<ActionAck>), AppError> {
    let ack = game_service::submit_action(&state, &id, &body)?;
    Ok((StatusCode::ACCEPTED, Json(ack)))
}
