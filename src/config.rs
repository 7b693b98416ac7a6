//! Client configuration loading for the live-play services.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::services::player::PlayerSettings;

/// Default location on disk where the client looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/client.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "BIGBRAIN_CONFIG_PATH";
/// Backend origin used when the configuration does not name one.
const DEFAULT_BASE_URL: &str = "http://localhost:5005";
/// Period of the status and question polls, in milliseconds.
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
/// Period of the local countdown tick, in milliseconds.
const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the client.
pub struct ClientConfig {
    /// Origin of the session-state service.
    pub base_url: String,
    /// Period of the status and question poll loops.
    pub poll_interval: Duration,
    /// Period of the local countdown tick.
    pub tick_interval: Duration,
}

impl ClientConfig {
    /// Load the client configuration from disk, falling back to the built-in
    /// defaults when the file is missing or malformed.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        base_url = %config.base_url,
                        "loaded client config"
                    );
                    config
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

    /// Timer periods for a player session.
    pub fn player_settings(&self) -> PlayerSettings {
        PlayerSettings {
            poll_interval: self.poll_interval,
            tick_interval: self.tick_interval,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file.
struct RawConfig {
    base_url: Option<String>,
    poll_interval_ms: Option<u64>,
    tick_interval_ms: Option<u64>,
}

impl From<RawConfig> for ClientConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            base_url: value.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            poll_interval: Duration::from_millis(
                value.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS),
            ),
            tick_interval: Duration::from_millis(
                value.tick_interval_ms.unwrap_or(DEFAULT_TICK_INTERVAL_MS),
            ),
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
