use tracing::{info, warn};

use crate::{
    dto::{
        game::{ActionAck, CreateGameRequest, GameListItem},
        snapshot::GameSnapshot,
    },
    error::ServiceError,
    state::{SharedState, actor::GameHandle, state_machine::GameAction},
};

/// List every hosted game, oldest first.
pub fn list_games(state: &SharedState) -> Vec<GameListItem> {
    state
        .games()
        .list()
        .iter()
        .map(GameListItem::from)
        .collect()
}

/// Open a new game room; the request has already been validated.
pub fn create_game(
    state: &SharedState,
    request: CreateGameRequest,
) -> Result<GameListItem, ServiceError> {
    let handle = state.open_game(&request.id, request.kind)?;
    Ok(GameListItem::from(&handle))
}

/// Fetch the current snapshot of game `id`.
pub async fn snapshot(state: &SharedState, id: &str) -> Result<GameSnapshot, ServiceError> {
    require_game(state, id)?.snapshot().await
}

/// Queue the action encoded in `body` for game `id`.
///
/// A malformed body is logged and dropped: the caller still gets an
/// acknowledgement, with `accepted` set to false.
pub fn submit_action(
    state: &SharedState,
    id: &str,
    body: &[u8],
) -> Result<ActionAck, ServiceError> {
    let game = require_game(state, id)?;

    let action = match serde_json::from_slice::<GameAction>(body) {
        Ok(action) => action,
        Err(err) => {
            warn!(game_id = id, error = %err, "dropping malformed action");
            return Ok(ActionAck { accepted: false });
        }
    };

    game.submit(action)?;
    Ok(ActionAck { accepted: true })
}

/// Look up game `id`.
pub fn require_game(state: &SharedState, id: &str) -> Result<GameHandle, ServiceError> {
    state.games().get(id).ok_or_else(|| {
        info!(game_id = id, "unknown game requested");
        ServiceError::NotFound(format!("game `{id}` not found"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        state::{AppState, game::GameKind, state_machine::GameStatus},
    };

    #[tokio::test]
    async fn boot_games_are_listed() {
        let state = AppState::new(AppConfig::default());
        let games = list_games(&state);
        let ids: Vec<&str> = games.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"charades") && ids.contains(&"henyo"));
    }

    #[tokio::test]
    async fn malformed_actions_are_acknowledged_but_dropped() {
        let state = AppState::new(AppConfig::default());

        let ack = submit_action(&state, "charades", br#"{"type":"NOPE"}"#).unwrap();
        assert!(!ack.accepted);
        let ack = submit_action(&state, "charades", b"not json").unwrap();
        assert!(!ack.accepted);

        let snapshot = snapshot(&state, "charades").await.unwrap();
        assert_eq!(snapshot.version, 0);
    }

    #[tokio::test]
    async fn actions_reach_the_game() {
        let state = AppState::new(AppConfig::default());
        let ack = submit_action(&state, "henyo", br#"{"type":"ADD_TEAM"}"#).unwrap();
        assert!(ack.accepted);

        let team_id = snapshot(&state, "henyo").await.unwrap().teams[0].id;
        let body = format!(
            r#"{{"type":"UPDATE_TEAM","teamId":"{team_id}","name":"Owls","words":["Apple"]}}"#
        );
        submit_action(&state, "henyo", body.as_bytes()).unwrap();
        let body = format!(r#"{{"type":"SELECT_TEAM","teamId":"{team_id}"}}"#);
        submit_action(&state, "henyo", body.as_bytes()).unwrap();
        submit_action(&state, "henyo", br#"{"type":"PREPARE"}"#).unwrap();

        let snapshot = snapshot(&state, "henyo").await.unwrap();
        assert_eq!(snapshot.status, GameStatus::Starting);
        assert_eq!(snapshot.teams[0].name, "Owls");
        assert_eq!(snapshot.countdown, Some(3));
    }

    #[tokio::test]
    async fn unknown_games_are_not_found() {
        let state = AppState::new(AppConfig::default());
        assert!(matches!(
            submit_action(&state, "nope", br#"{"type":"ADD_TEAM"}"#),
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            snapshot(&state, "nope").await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn created_games_join_the_registry() {
        let state = AppState::new(AppConfig::default());
        let request = CreateGameRequest {
            id: "friday".into(),
            kind: GameKind::Charades,
        };
        let item = create_game(&state, request).unwrap();
        assert_eq!(item.id, "friday");
        assert_eq!(state.games().len(), 3);

        let duplicate = CreateGameRequest {
            id: "friday".into(),
            kind: GameKind::Henyo,
        };
        assert!(matches!(
            create_game(&state, duplicate),
            Err(ServiceError::Conflict(_))
        ));
    }
}
