use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{
        snapshot::{FinishSummary, GameSnapshot},
        sse::{GameMessage, ServerEvent},
    },
    state::SseHub,
};

/// SSE event name carrying every game message.
pub const EVENT_MESSAGE: &str = "message";

/// Broadcast the full game state after a change.
pub fn broadcast_sync_state(hub: &SseHub, snapshot: GameSnapshot) {
    let payload = GameMessage::SyncState {
        state: Box::new(snapshot),
    };
    send_game_event(hub, EVENT_MESSAGE, &payload);
}

/// Broadcast the outcome of a round that just ended.
pub fn broadcast_finish(hub: &SseHub, summary: FinishSummary) {
    let payload = GameMessage::Finish { summary };
    send_game_event(hub, EVENT_MESSAGE, &payload);
}

fn send_game_event(hub: &SseHub, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => hub.broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize game SSE payload"),
    }
}
