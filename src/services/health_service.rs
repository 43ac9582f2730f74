use tracing::debug;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Respond with the health payload, counting hosted games.
pub fn health_status(state: &SharedState) -> HealthResponse {
    let games = state.games().len();
    debug!(games, "health check");
    HealthResponse::ok(games)
}
