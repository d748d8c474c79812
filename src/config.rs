//! Application-level configuration loading: queue sizing and persistence settings.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::{services::persistence::RetryPolicy, state::queue::DEFAULT_QUEUE_CAPACITY};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "KING_OF_THE_TABLE_CONFIG_PATH";
/// Presence of this variable selects CouchDB when no backend is configured.
const COUCH_URL_ENV: &str = "COUCH_BASE_URL";

/// Where durability operations end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// No stats store; persistence submissions are dropped.
    Disabled,
    /// Process-local store, lost on restart.
    Memory,
    /// CouchDB reached through `COUCH_*` environment variables.
    Couch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Minimum initial capacity of a new game's waiting queue.
    pub queue_capacity: usize,
    /// Stats backend selected at startup.
    pub storage: StorageBackend,
    /// Backoff and timeout settings of the persistence worker.
    pub retry: RetryPolicy,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let couch_url_set = env::var_os(COUCH_URL_ENV).is_some_and(|value| !value.is_empty());
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config = raw.resolve(couch_url_set);
                    info!(
                        path = %path.display(),
                        storage = ?app_config.storage,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    RawConfig::default().resolve(couch_url_set)
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                RawConfig::default().resolve(couch_url_set)
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                RawConfig::default().resolve(couch_url_set)
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().resolve(false)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    queue_capacity: Option<usize>,
    #[serde(default)]
    persistence: RawPersistence,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPersistence {
    #[serde(default)]
    backend: Option<StorageBackend>,
    #[serde(default)]
    initial_backoff_ms: Option<u64>,
    #[serde(default)]
    max_backoff_ms: Option<u64>,
    #[serde(default)]
    attempt_timeout_ms: Option<u64>,
}

impl RawConfig {
    fn resolve(self, couch_url_set: bool) -> AppConfig {
        let defaults = RetryPolicy::default();
        let persistence = self.persistence;

        let initial_backoff = persistence
            .initial_backoff_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.initial_backoff)
            .max(Duration::from_millis(1));
        let max_backoff = persistence
            .max_backoff_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.max_backoff)
            .max(initial_backoff);
        let attempt_timeout = persistence
            .attempt_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.attempt_timeout)
            .max(Duration::from_millis(1));

        let storage = persistence.backend.unwrap_or(if couch_url_set {
            StorageBackend::Couch
        } else {
            StorageBackend::Disabled
        });

        AppConfig {
            queue_capacity: self
                .queue_capacity
                .unwrap_or(DEFAULT_QUEUE_CAPACITY)
                .max(1),
            storage,
            retry: RetryPolicy {
                initial_backoff,
                max_backoff,
                attempt_timeout,
            },
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

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str, couch_url_set: bool) -> AppConfig {
        serde_json::from_str::<RawConfig>(json)
            .unwrap()
            .resolve(couch_url_set)
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse("{}", false);
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(config.storage, StorageBackend::Disabled);
        assert_eq!(config.retry, RetryPolicy::default());
    }

    #[test]
    fn couch_is_picked_when_url_is_present() {
        assert_eq!(parse("{}", true).storage, StorageBackend::Couch);
        let explicit = parse(r#"{"persistence": {"backend": "memory"}}"#, true);
        assert_eq!(explicit.storage, StorageBackend::Memory);
    }

    #[test]
    fn backoff_values_are_sanitized() {
        let config = parse(
            r#"{
                "queue_capacity": 0,
                "persistence": {
                    "initial_backoff_ms": 500,
                    "max_backoff_ms": 100,
                    "attempt_timeout_ms": 2500
                }
            }"#,
            false,
        );
        assert_eq!(config.queue_capacity, 1);
        assert_eq!(config.retry.initial_backoff, Duration::from_millis(500));
        assert_eq!(config.retry.max_backoff, Duration::from_millis(500));
        assert_eq!(config.retry.attempt_timeout, Duration::from_millis(2500));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<RawConfig>(r#"{"colors": []}"#).is_err());
    }
}
