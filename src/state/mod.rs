pub mod actor;
pub mod game;
pub mod registry;
mod sse;
pub mod state_machine;
pub mod team;
pub mod timer;
pub mod turn;
pub mod word;

use std::sync::Arc;

use tracing::warn;

use crate::{
    config::AppConfig,
    error::ServiceError,
    state::{actor::GameHandle, game::GameKind, registry::GameRegistry},
};

pub use self::sse::SseHub;

pub type SharedState = Arc<AppState>;

/// Central application state: configuration and the hosted games.
pub struct AppState {
    config: AppConfig,
    games: GameRegistry,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] and open the configured boot games.
    ///
    /// Must be called from within a Tokio runtime since every game runs on its own task.
    pub fn new(config: AppConfig) -> SharedState {
        let state = Arc::new(Self {
            config,
            games: GameRegistry::new(),
        });

        for boot in state.config.boot_games() {
            if let Err(err) = state.open_game(&boot.id, boot.kind) {
                warn!(game_id = %boot.id, error = %err, "skipping boot game");
            }
        }

        state
    }

    /// Registry of hosted games.
    pub fn games(&self) -> &GameRegistry {
        &self.games
    }

    /// Open a game of `kind` with the configured rules.
    pub fn open_game(&self, id: &str, kind: GameKind) -> Result<GameHandle, ServiceError> {
        self.games.open(
            id,
            kind,
            self.config.rules(kind),
            self.config.broadcast_capacity(),
        )
    }
}
