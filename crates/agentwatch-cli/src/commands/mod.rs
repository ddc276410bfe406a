pub mod counters;
pub mod run;
pub mod scan;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use tracing::info;

use agentwatch_cluster::HttpClusterClient;
use agentwatch_core::{AgentwatchConfig, ConfigError, MonitorEvent, PassConfig};
use agentwatch_notify::WebhookNotifier;
use agentwatch_remediate::{Monitor, RemediationDriver, Reporter};
use agentwatch_state::RedbCounterStore;

/// Invocation event, from a JSON file or assembled from flags.
#[derive(Args)]
pub struct EventArgs {
    /// JSON event file: {"cluster", "warn_only", "fail_after", "notify_channel"}.
    #[arg(long, conflicts_with_all = ["cluster", "warn_only", "fail_after", "notify_channel"])]
    pub event: Option<PathBuf>,

    /// Cluster to scan.
    #[arg(long)]
    pub cluster: Option<String>,

    /// Report what would be terminated without detaching or terminating.
    #[arg(long)]
    pub warn_only: bool,

    /// Consecutive disconnected passes before termination (default 2).
    #[arg(long)]
    pub fail_after: Option<u64>,

    /// Channel reports are published to. Reporting is off when omitted.
    #[arg(long)]
    pub notify_channel: Option<String>,
}

impl EventArgs {
    pub fn into_pass_config(self) -> Result<PassConfig, ConfigError> {
        let event = match self.event {
            Some(path) => MonitorEvent::from_file(&path)?,
            None => MonitorEvent {
                cluster: self.cluster,
                warn_only: self.warn_only,
                fail_after: self.fail_after,
                notify_channel: self.notify_channel,
            },
        };
        event.validate()
    }
}

pub fn load_config(path: Option<&Path>) -> Result<AgentwatchConfig, ConfigError> {
    match path {
        Some(path) => {
            let config = AgentwatchConfig::from_file(path)?;
            info!(path = ?path, "configuration loaded");
            Ok(config)
        }
        None => Ok(AgentwatchConfig::default()),
    }
}

pub fn open_store(config: &AgentwatchConfig) -> anyhow::Result<RedbCounterStore> {
    let path = &config.store.path;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(RedbCounterStore::open(path)?)
}

/// Wire the gateway client, counter store, and optional webhook into a monitor.
pub fn build_monitor(config: &AgentwatchConfig) -> anyhow::Result<Monitor> {
    let store = Arc::new(open_store(config)?);
    let gateway = Arc::new(HttpClusterClient::new(&config.cluster.endpoint)?);
    let timeout = config.call_timeout();

    let driver = RemediationDriver::new(gateway.clone(), gateway, store).with_call_timeout(timeout);
    let mut monitor = Monitor::new(driver);

    if let Some(endpoint) = &config.notify.endpoint {
        let notifier = Arc::new(WebhookNotifier::new(endpoint.as_str()));
        monitor = monitor.with_reporter(Reporter::new(notifier).with_call_timeout(timeout));
    }

    info!(
        gateway = %config.cluster.endpoint,
        store = ?config.store.path,
        notify = config.notify.endpoint.is_some(),
        timeout_secs = timeout.as_secs(),
        "monitor initialized"
    );
    Ok(monitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(cluster: Option<&str>) -> EventArgs {
        EventArgs {
            event: None,
            cluster: cluster.map(str::to_string),
            warn_only: false,
            fail_after: None,
            notify_channel: None,
        }
    }

    #[test]
    fn flags_without_cluster_fail_validation() {
        assert!(matches!(
            flags(None).into_pass_config(),
            Err(ConfigError::MissingCluster)
        ));
    }

    #[test]
    fn event_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        std::fs::write(&path, r#"{"cluster": "prod", "warn_only": "True", "snsLogArn": "ops"}"#).unwrap();

        let args = EventArgs {
            event: Some(path),
            ..flags(None)
        };
        let pass = args.into_pass_config().unwrap();
        assert_eq!(pass.cluster, "prod");
        assert!(pass.warn_only);
        assert_eq!(pass.notify_channel.as_deref(), Some("ops"));
    }

    #[test]
    fn store_parent_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AgentwatchConfig::default();
        config.store.path = dir.path().join("nested/state/counters.redb");

        open_store(&config).unwrap();
        assert!(config.store.path.exists());
    }

    #[test]
    fn monitor_builds_from_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AgentwatchConfig::default();
        config.store.path = dir.path().join("counters.redb");
        config.notify.endpoint = Some("http://127.0.0.1:8701/publish".to_string());

        assert!(build_monitor(&config).is_ok());
    }

    #[test]
    fn bad_gateway_endpoint_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AgentwatchConfig::default();
        config.store.path = dir.path().join("counters.redb");
        config.cluster.endpoint = "gateway without scheme".to_string();

        assert!(build_monitor(&config).is_err());
    }
}
