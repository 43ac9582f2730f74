use std::convert::Infallible;

use axum::{
    Router,
    extract::{Path, State},
    response::sse::Sse,
    routing::get,
};
use futures::Stream;
use tracing::info;

use crate::{error::AppError, services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/games/{id}/subscribe",
    tag = "sse",
    params(("id" = String, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Game message stream (SYNC_STATE and FINISH)", content_type = "text/event-stream", body = String),
        (status = 404, description = "Unknown game")
    )
)]
/// Stream every message a game pushes after the connection opens.
///
/// The stream has no replay: clients fetch `/games/{id}/state` first, then subscribe.
pub async fn game_stream(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>>, AppError> {
    let receiver = sse_service::subscribe_game(&state, &id)?;
    info!(game_id = %id, "New game SSE connection");
    Ok(sse_service::to_sse_stream(receiver, id))
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/games/{id}/subscribe", get(game_stream))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt;

    use crate::{config::AppConfig, routes, state::AppState};

    #[tokio::test]
    async fn opens_an_event_stream_for_known_games() {
        let app = routes::router(AppState::new(AppConfig::default()));
        let response = app
            .oneshot(
                Request::get("/games/henyo/subscribe")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/event-stream"
        );
    }

    #[tokio::test]
    async fn unknown_games_cannot_be_subscribed() {
        let app = routes::router(AppState::new(AppConfig::default()));
        let response = app
            .oneshot(
                Request::get("/games/missing/subscribe")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
