//! Monitor error types.

use thiserror::Error;

/// Destructive step that failed for an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemediationAction {
    Detach,
    Terminate,
}

impl std::fmt::Display for RemediationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemediationAction::Detach => f.write_str("detach"),
            RemediationAction::Terminate => f.write_str("terminate"),
        }
    }
}

/// Errors that can occur during a monitoring pass.
///
/// Only `Inventory` aborts a pass. The per-instance variants are collected
/// into [`PassResult::failures`](crate::PassResult) and `Notify` is logged.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("inventory of cluster {cluster} failed: {reason}")]
    Inventory { cluster: String, reason: String },

    #[error("instance {instance_id} has no autoscaling group tag")]
    TagLookup { instance_id: String },

    #[error("failed to {action} instance {instance_id}: {reason}")]
    Remediation {
        instance_id: String,
        action: RemediationAction,
        reason: String,
    },

    #[error("notification failed: {0}")]
    Notify(String),

    #[error("counter store error: {0}")]
    State(#[from] agentwatch_state::StateError),
}

impl MonitorError {
    pub(crate) fn inventory(cluster: &str, err: anyhow::Error) -> Self {
        MonitorError::Inventory {
            cluster: cluster.to_string(),
            reason: format!("{err:#}"),
        }
    }

    pub(crate) fn remediation(instance_id: &str, action: RemediationAction, err: anyhow::Error) -> Self {
        MonitorError::Remediation {
            instance_id: instance_id.to_string(),
            action,
            reason: format!("{err:#}"),
        }
    }
}
