//! Application-level configuration loading, including the remote backend parameters.

use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "BATTLE_ARENA_CONFIG_PATH";
/// Environment variable carrying the remote endpoint.
pub const REMOTE_URL_ENV: &str = "SUPABASE_URL";
/// Environment variable carrying the remote credential.
pub const REMOTE_KEY_ENV: &str = "SUPABASE_ANON_KEY";

const DEFAULT_CONTEST_DURATION_HOURS: u64 = 48;
/// Longest accepted voting window: one year.
const MAX_CONTEST_DURATION_HOURS: u64 = 24 * 366;
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_HEALTH_POLL_SECS: u64 = 5;

/// Why the remote backend cannot be used.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The remote base URL is unset or blank.
    #[error("remote endpoint is not configured")]
    MissingEndpoint,
    /// The remote API key is unset or blank.
    #[error("remote credential is not configured")]
    MissingCredential,
    /// The remote base URL does not use `https://`.
    #[error("remote endpoint `{endpoint}` must use https")]
    InsecureEndpoint {
        /// Endpoint as configured.
        endpoint: String,
    },
}

/// Connection parameters of the remote durable backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Base URL of the REST endpoint, e.g. `https://project.example.co`.
    pub base_url: String,
    /// API key sent with every request.
    pub api_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl RemoteConfig {
    /// Parameters with the default request timeout.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(DEFAULT_REMOTE_TIMEOUT_SECS),
        }
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check the parameters are usable: non-empty `https://` endpoint and a non-empty credential.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.base_url.trim();
        if endpoint.is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }
        let host = endpoint
            .strip_prefix("https://")
            .ok_or_else(|| ConfigError::InsecureEndpoint {
                endpoint: endpoint.to_string(),
            })?;
        if host.trim_matches('/').is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    contest_duration: Duration,
    data_dir: PathBuf,
    health_poll_interval: Duration,
    remote: Option<RemoteConfig>,
}

impl AppConfig {
    /// Load the configuration from disk and the environment, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let raw = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    info!(path = %path.display(), "loaded configuration file");
                    raw
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    RawConfig::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                RawConfig::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                RawConfig::default()
            }
        };

        raw.with_remote_env(non_empty_env(REMOTE_URL_ENV), non_empty_env(REMOTE_KEY_ENV))
            .into()
    }

    /// Fixed length of every contest's voting window.
    pub fn contest_duration(&self) -> Duration {
        self.contest_duration
    }

    /// Directory holding the local fallback relations.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Pause between two health checks of the remote backend.
    pub fn health_poll_interval(&self) -> Duration {
        self.health_poll_interval
    }

    /// Remote parameters, only when present and well formed.
    pub fn remote(&self) -> Result<&RemoteConfig, ConfigError> {
        let remote = self.remote.as_ref().ok_or(ConfigError::MissingEndpoint)?;
        remote.validate()?;
        Ok(remote)
    }

    /// Replace the remote parameters.
    pub fn with_remote(mut self, remote: Option<RemoteConfig>) -> Self {
        self.remote = remote;
        self
    }

    /// Replace the directory of the local fallback store.
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Replace the contest voting window.
    pub fn with_contest_duration(mut self, duration: Duration) -> Self {
        self.contest_duration = duration;
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    contest_duration_hours: Option<u64>,
    data_dir: Option<PathBuf>,
    health_poll_secs: Option<u64>,
    remote: Option<RawRemote>,
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the optional `remote` section.
struct RawRemote {
    url: Option<String>,
    anon_key: Option<String>,
    timeout_secs: Option<u64>,
}

impl RawConfig {
    /// Environment values take precedence over the file.
    fn with_remote_env(mut self, url: Option<String>, key: Option<String>) -> Self {
        if url.is_none() && key.is_none() {
            return self;
        }
        let remote = self.remote.get_or_insert_with(RawRemote::default);
        if url.is_some() {
            remote.url = url;
        }
        if key.is_some() {
            remote.anon_key = key;
        }
        self
    }
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let remote = value.remote.and_then(|raw| {
            let url = raw.url?;
            let mut config = RemoteConfig::new(url, raw.anon_key.unwrap_or_default());
            if let Some(secs) = raw.timeout_secs {
                config = config.with_timeout(Duration::from_secs(secs));
            }
            Some(config)
        });

        Self {
            contest_duration: contest_duration(value.contest_duration_hours),
            data_dir: value
                .data_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            health_poll_interval: Duration::from_secs(
                value.health_poll_secs.unwrap_or(DEFAULT_HEALTH_POLL_SECS),
            ),
            remote,
        }
    }
}

/// Voting window in hours, falling back to the default when out of `1..=MAX_CONTEST_DURATION_HOURS`.
fn contest_duration(hours: Option<u64>) -> Duration {
    let default = Duration::from_secs(DEFAULT_CONTEST_DURATION_HOURS * 3_600);
    let Some(hours) = hours else {
        return default;
    };

    match hours.checked_mul(3_600) {
        Some(secs) if (1..=MAX_CONTEST_DURATION_HOURS).contains(&hours) => {
            Duration::from_secs(secs)
        }
        _ => {
            warn!(
                contest_duration_hours = hours,
                max = MAX_CONTEST_DURATION_HOURS,
                default = DEFAULT_CONTEST_DURATION_HOURS,
                "contest duration out of range; using default"
            );
            default
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

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_observed_design() {
        let config = AppConfig::default();
        assert_eq!(config.contest_duration(), Duration::from_secs(48 * 3_600));
        assert_eq!(config.data_dir(), Path::new("data"));
        assert_eq!(config.remote(), Err(ConfigError::MissingEndpoint));
    }

    #[test]
    fn https_endpoint_with_key_is_well_formed() {
        let remote = RemoteConfig::new("https://arena.example.co", "anon");
        assert_eq!(remote.validate(), Ok(()));
    }

    #[test]
    fn plain_http_endpoint_is_refused() {
        let remote = RemoteConfig::new("http://arena.example.co", "anon");
        assert!(matches!(
            remote.validate(),
            Err(ConfigError::InsecureEndpoint { .. })
        ));
    }

    #[test]
    fn blank_values_are_missing() {
        assert_eq!(
            RemoteConfig::new("   ", "anon").validate(),
            Err(ConfigError::MissingEndpoint)
        );
        assert_eq!(
            RemoteConfig::new("https://", "anon").validate(),
            Err(ConfigError::MissingEndpoint)
        );
        assert_eq!(
            RemoteConfig::new("https://arena.example.co", " ").validate(),
            Err(ConfigError::MissingCredential)
        );
    }

    #[test]
    fn environment_overrides_file_values() {
        let raw: RawConfig = serde_json::from_str(
            r#"{"contest_duration_hours": 24, "remote": {"url": "https://file.example", "anon_key": "file-key", "timeout_secs": 3}}"#,
        )
        .unwrap();

        let config: AppConfig = raw
            .with_remote_env(Some("https://env.example".into()), None)
            .into();

        let remote = config.remote().unwrap();
        assert_eq!(remote.base_url, "https://env.example");
        assert_eq!(remote.api_key, "file-key");
        assert_eq!(remote.timeout, Duration::from_secs(3));
        assert_eq!(config.contest_duration(), Duration::from_secs(24 * 3_600));
    }

    #[test]
    fn credential_without_endpoint_is_not_configured() {
        let config: AppConfig = RawConfig::default()
            .with_remote_env(None, Some("key".into()))
            .into();
        assert_eq!(config.remote(), Err(ConfigError::MissingEndpoint));
    }

    #[test]
    fn out_of_range_contest_durations_fall_back_to_default() {
        let default = Duration::from_secs(48 * 3_600);
        for hours in [0, MAX_CONTEST_DURATION_HOURS + 1, u64::MAX / 1_000, u64::MAX] {
            let raw: RawConfig =
                serde_json::from_str(&format!(r#"{{"contest_duration_hours": {hours}}}"#))
                    .unwrap();
            let config: AppConfig = raw.into();
            assert_eq!(config.contest_duration(), default, "hours = {hours}");
        }
    }

    #[test]
    fn longest_accepted_contest_duration_is_kept() {
        assert_eq!(
            contest_duration(Some(MAX_CONTEST_DURATION_HOURS)),
            Duration::from_secs(MAX_CONTEST_DURATION_HOURS * 3_600)
        );
        assert_eq!(contest_duration(Some(1)), Duration::from_secs(3_600));
    }
}
