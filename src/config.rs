//! Application-level configuration loading: per-kind round rules and the games opened at boot.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::game::{GameKind, GameRules, RoundStart};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "WORD_PARTY_BACK_CONFIG_PATH";
/// Per-game broadcast channel capacity used when the file does not set one.
const DEFAULT_BROADCAST_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    charades: GameRules,
    henyo: GameRules,
    broadcast_capacity: usize,
    boot_games: Vec<BootGame>,
}

/// Game opened when the server starts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BootGame {
    /// Registry identifier.
    pub id: String,
    /// Game type.
    pub kind: GameKind,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        games = app_config.boot_games.len(),
                        "loaded game configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a configuration document; missing keys take their default value.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Round rules for `kind`.
    pub fn rules(&self, kind: GameKind) -> GameRules {
        match kind {
            GameKind::Charades => self.charades,
            GameKind::Henyo => self.henyo,
        }
    }

    /// Capacity of each game's broadcast channel.
    pub fn broadcast_capacity(&self) -> usize {
        self.broadcast_capacity
    }

    /// Games to open at startup.
    pub fn boot_games(&self) -> &[BootGame] {
        &self.boot_games
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            charades: GameKind::Charades.default_rules(),
            henyo: GameKind::Henyo.default_rules(),
            broadcast_capacity: DEFAULT_BROADCAST_CAPACITY,
            boot_games: default_boot_games(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    broadcast_capacity: Option<usize>,
    #[serde(default)]
    games: RawGames,
    #[serde(default)]
    boot_games: Option<Vec<BootGame>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawGames {
    #[serde(default)]
    charades: RawRules,
    #[serde(default)]
    henyo: RawRules,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Overrides for one game kind.
struct RawRules {
    round_duration_ms: Option<u64>,
    countdown_seconds: Option<u32>,
}

impl RawRules {
    fn apply(self, mut rules: GameRules) -> GameRules {
        if let Some(ms) = self.round_duration_ms.filter(|ms| *ms > 0) {
            rules.round_duration = Duration::from_millis(ms);
        }
        if let (RoundStart::Countdown { seconds }, Some(value)) = (
            &mut rules.round_start,
            self.countdown_seconds.filter(|value| *value > 0),
        )
        {
            *seconds = value;
        }
        rules
    }
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            charades: value.games.charades.apply(defaults.charades),
            henyo: value.games.henyo.apply(defaults.henyo),
            broadcast_capacity: value
                .broadcast_capacity
                .filter(|capacity| *capacity > 0)
                .unwrap_or(defaults.broadcast_capacity),
            boot_games: value.boot_games.unwrap_or(defaults.boot_games),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// One game per kind, named after the kind.
fn default_boot_games() -> Vec<BootGame> {
    vec![
        BootGame {
            id: "charades".into(),
            kind: GameKind::Charades,
        },
        BootGame {
            id: "henyo".into(),
            kind: GameKind::Henyo,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(
            config.rules(GameKind::Charades),
            GameKind::Charades.default_rules()
        );
        assert_eq!(config.rules(GameKind::Henyo), GameKind::Henyo.default_rules());
        assert_eq!(config.broadcast_capacity(), DEFAULT_BROADCAST_CAPACITY);
        assert_eq!(config.boot_games(), default_boot_games().as_slice());
    }

    #[test]
    fn overrides_are_applied_per_kind() {
        let config = AppConfig::from_json(
            r#"{
                "broadcastCapacity": 8,
                "games": {
                    "charades": { "roundDurationMs": 45000, "countdownSeconds": 9 },
                    "henyo": { "countdownSeconds": 5 }
                },
                "bootGames": [{ "id": "main", "kind": "henyo" }]
            }"#,
        )
        .unwrap();

        let charades = config.rules(GameKind::Charades);
        assert_eq!(charades.round_duration, Duration::from_secs(45));
        assert_eq!(charades.round_start, RoundStart::Immediate);

        let henyo = config.rules(GameKind::Henyo);
        assert_eq!(henyo.round_start, RoundStart::Countdown { seconds: 5 });
        assert_eq!(henyo.round_duration, Duration::from_secs(120));

        assert_eq!(config.broadcast_capacity(), 8);
        assert_eq!(
            config.boot_games(),
            [BootGame {
                id: "main".into(),
                kind: GameKind::Henyo,
            }]
        );
    }

    #[test]
    fn zero_values_keep_the_defaults() {
        let config = AppConfig::from_json(
            r#"{ "games": { "henyo": { "roundDurationMs": 0, "countdownSeconds": 0 } } }"#,
        )
        .unwrap();
        assert_eq!(config.rules(GameKind::Henyo), GameKind::Henyo.default_rules());
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(AppConfig::from_json(r#"{ "games": 3 }"#).is_err());
    }
}
