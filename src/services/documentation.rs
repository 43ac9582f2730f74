use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Word Party Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::game::list_games,
        crate::routes::game::create_game,
        crate::routes::game::game_state,
        crate::routes::game::submit_action,
        crate::routes::sse::game_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::game::CreateGameRequest,
            crate::dto::game::GameListItem,
            crate::dto::game::ActionAck,
            crate::dto::snapshot::GameSnapshot,
            crate::dto::snapshot::TeamSnapshot,
            crate::dto::snapshot::TurnSnapshot,
            crate::dto::snapshot::TimerSnapshot,
            crate::dto::snapshot::FinishSummary,
            crate::dto::sse::GameMessage,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "game", description = "Game rooms, state and actions"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;
