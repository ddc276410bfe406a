//! Invocation event and `agentwatch.toml` parsing.
//!
//! A [`MonitorEvent`] is the loosely-typed input a pass is triggered with.
//! It is validated exactly once into a [`PassConfig`]; nothing past this
//! boundary re-checks presence or types.

use std::num::NonZeroU64;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Consecutive disconnects before an instance is terminated.
pub const DEFAULT_FAIL_AFTER: u64 = 2;

/// Default bound on every collaborator call, in seconds.
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 10;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("event has no `cluster`; which cluster should be scanned?")]
    MissingCluster,

    #[error("fail_after must be at least 1")]
    InvalidThreshold,

    #[error("timeouts.call_secs must be at least 1")]
    InvalidTimeout,

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid event: {0}")]
    Event(#[from] serde_json::Error),
}

// ── Invocation event ───────────────────────────────────────────────

/// Raw invocation event, as received.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorEvent {
    pub cluster: Option<String>,

    /// Accepts `true`/`false` or a string; only `"true"` (any case) enables.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub warn_only: bool,

    pub fail_after: Option<u64>,

    #[serde(alias = "snsLogArn")]
    pub notify_channel: Option<String>,
}

impl MonitorEvent {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Validate into a [`PassConfig`], applying defaults.
    pub fn validate(self) -> Result<PassConfig, ConfigError> {
        let cluster = self
            .cluster
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(ConfigError::MissingCluster)?;

        let fail_after = NonZeroU64::new(self.fail_after.unwrap_or(DEFAULT_FAIL_AFTER))
            .ok_or(ConfigError::InvalidThreshold)?;

        let notify_channel = self.notify_channel.filter(|c| !c.trim().is_empty());

        Ok(PassConfig {
            cluster,
            warn_only: self.warn_only,
            fail_after,
            notify_channel,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolOrString {
    Bool(bool),
    Text(String),
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<BoolOrString>::deserialize(deserializer)? {
        Some(BoolOrString::Bool(b)) => b,
        Some(BoolOrString::Text(s)) => s.trim().eq_ignore_ascii_case("true"),
        None => false,
    })
}

/// Validated settings for one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassConfig {
    pub cluster: String,
    /// Compute and report decisions without detaching or terminating.
    pub warn_only: bool,
    pub fail_after: NonZeroU64,
    /// Reporting is disabled when absent.
    pub notify_channel: Option<String>,
}

// ── agentwatch.toml ────────────────────────────────────────────────

/// Process-level configuration: where state lives and how to reach
/// collaborators.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentwatchConfig {
    pub store: StoreConfig,
    pub cluster: ClusterConfig,
    pub notify: NotifyConfig,
    pub timeouts: TimeoutConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the redb counter database.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/var/lib/agentwatch/counters.redb"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Base URL of the cluster gateway.
    pub endpoint: String,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8700".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Webhook URL notifications are posted to.
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub call_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            call_secs: DEFAULT_CALL_TIMEOUT_SECS,
        }
    }
}

impl AgentwatchConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: AgentwatchConfig = toml::from_str(content)?;
        if config.timeouts.call_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(config)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.call_secs)
    }
}
