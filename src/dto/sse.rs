use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::dto::snapshot::{FinishSummary, GameSnapshot};

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Build an event from an already serialised payload.
    pub fn new(event: Option<String>, data: String) -> Self {
        Self { event, data }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

/// Messages pushed to the subscribers of a game, tagged by `type`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameMessage {
    /// Full snapshot after a change.
    SyncState {
        /// Current game state.
        state: Box<GameSnapshot>,
    },
    /// Outcome of a round that just ended, sent before the matching snapshot.
    Finish {
        /// Round outcome.
        summary: FinishSummary,
    },
}
