use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::{format_system_time, validation::validate_game_id},
    state::{actor::GameHandle, game::GameKind},
};

/// Payload used to open a new game room.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateGameRequest {
    /// Registry identifier, 1 to 64 characters of `[A-Za-z0-9_-]`.
    pub id: String,
    /// Game type hosted by the room.
    pub kind: GameKind,
}

impl Validate for CreateGameRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_game_id(&self.id) {
            errors.add("id", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Entry of the game listing.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameListItem {
    pub id: String,
    pub kind: GameKind,
    /// RFC 3339 creation time.
    pub created_at: String,
}

impl GameListItem {
    pub(crate) fn new(id: &str, kind: GameKind, created_at: SystemTime) -> Self {
        Self {
            id: id.to_string(),
            kind,
            created_at: format_system_time(created_at),
        }
    }
}

impl From<&GameHandle> for GameListItem {
    fn from(handle: &GameHandle) -> Self {
        Self::new(handle.id(), handle.kind(), handle.created_at())
    }
}

/// Acknowledgement returned for a submitted action.
///
/// Acceptance only means the action was well-formed and queued; whether the
/// state machine applied it shows up in the next snapshot.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActionAck {
    pub accepted: bool,
}
