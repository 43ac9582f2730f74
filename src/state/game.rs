use std::time::Duration;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Game types hosted by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    /// Teams act out words; rounds start as soon as the game-master says go.
    Charades,
    /// Teams guess words with yes/no questions; rounds open with a short countdown.
    Henyo,
}

/// How a round leaves the waiting state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundStart {
    /// `START` goes straight to playing.
    Immediate,
    /// `PREPARE` enters a countdown of `seconds` before playing.
    Countdown {
        /// First value shown by the countdown.
        seconds: u32,
    },
}

/// Per-game rules resolved from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRules {
    /// Round start mode.
    pub round_start: RoundStart,
    /// Default round length.
    pub round_duration: Duration,
}

impl GameKind {
    /// Rules used when the configuration does not override them.
    pub fn default_rules(self) -> GameRules {
        match self {
            GameKind::Charades => GameRules {
                round_start: RoundStart::Immediate,
                round_duration: Duration::from_secs(60),
            },
            GameKind::Henyo => GameRules {
                round_start: RoundStart::Countdown { seconds: 3 },
                round_duration: Duration::from_secs(120),
            },
        }
    }
}
