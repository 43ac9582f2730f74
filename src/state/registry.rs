use dashmap::{DashMap, mapref::entry::Entry};
use tracing::info;

use crate::{
    error::ServiceError,
    state::{
        actor::GameHandle,
        game::{GameKind, GameRules},
    },
};

/// Games hosted by the process, keyed by identifier.
#[derive(Default)]
pub struct GameRegistry {
    games: DashMap<String, GameHandle>,
}

impl GameRegistry {
    /// Build an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a game under `id`, failing when the identifier is taken.
    pub fn open(
        &self,
        id: &str,
        kind: GameKind,
        rules: GameRules,
        broadcast_capacity: usize,
    ) -> Result<GameHandle, ServiceError> {
        match self.games.entry(id.to_string()) {
            Entry::Occupied(_) => Err(ServiceError::Conflict(format!("game {id} already exists"))),
            Entry::Vacant(slot) => {
                let handle = GameHandle::spawn(id, kind, rules, broadcast_capacity);
                slot.insert(handle.clone());
                info!(game_id = id, ?kind, "game opened");
                Ok(handle)
            }
        }
    }

    /// Handle of game `id`.
    pub fn get(&self, id: &str) -> Option<GameHandle> {
        self.games.get(id).map(|entry| entry.value().clone())
    }

    /// Every game, oldest first.
    pub fn list(&self) -> Vec<GameHandle> {
        let mut games: Vec<GameHandle> =
            self.games.iter().map(|entry| entry.value().clone()).collect();
        games.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        games
    }

    /// Number of hosted games.
    pub fn len(&self) -> usize {
        self.games.len()
    }

    /// True when no game is hosted.
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}
