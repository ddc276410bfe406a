//! Operator notifications for a finished pass.

use std::fmt::Write as _;
use std::num::NonZeroU64;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use agentwatch_core::config::DEFAULT_CALL_TIMEOUT_SECS;
use agentwatch_core::{InstanceId, Notifier};

use crate::call::bounded;
use crate::error::MonitorError;

/// Subject line used for every notification.
pub const SUBJECT: &str = "agentwatch: ECS agent monitor";

/// Sends the tracked and terminated notices produced by a pass.
pub struct Reporter {
    notifier: Arc<dyn Notifier>,
    call_timeout: Duration,
}

impl Reporter {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            call_timeout: Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS),
        }
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Warn about instances still counting toward termination.
    ///
    /// Returns whether a notification was sent.
    pub async fn report_tracked(
        &self,
        tracked: &[(InstanceId, u64)],
        threshold: NonZeroU64,
        channel: Option<&str>,
    ) -> Result<bool, MonitorError> {
        let Some(channel) = channel else {
            return Ok(false);
        };
        if tracked.is_empty() {
            return Ok(false);
        }
        self.send(channel, &format_tracked_message(tracked, threshold))
            .await?;
        debug!(%channel, instances = tracked.len(), "tracked report sent");
        Ok(true)
    }

    /// Announce instances terminated this pass.
    ///
    /// Returns whether a notification was sent.
    pub async fn report_terminated(
        &self,
        terminated: &[InstanceId],
        cluster_id: &str,
        dry_run: bool,
        channel: Option<&str>,
    ) -> Result<bool, MonitorError> {
        let Some(channel) = channel else {
            return Ok(false);
        };
        if terminated.is_empty() {
            return Ok(false);
        }
        self.send(channel, &format_terminated_message(terminated, cluster_id, dry_run))
            .await?;
        debug!(%channel, instances = terminated.len(), "termination report sent");
        Ok(true)
    }

    async fn send(&self, channel: &str, message: &str) -> Result<(), MonitorError> {
        bounded(self.call_timeout, self.notifier.publish(channel, SUBJECT, message))
            .await
            .map_err(|e| MonitorError::Notify(format!("{e:#}")))
    }
}

/// One line per tracked instance, with its count and the threshold.
pub fn format_tracked_message(tracked: &[(InstanceId, u64)], threshold: NonZeroU64) -> String {
    let mut message = String::from("agentwatch has detected the following:\n");
    for (instance_id, failures) in tracked {
        let _ = writeln!(
            message,
            "The instance `{instance_id}' failed. It has failed {failures} times. \
             It will be terminated if it fails {threshold} times."
        );
    }
    message
}

pub fn format_terminated_message(terminated: &[InstanceId], cluster_id: &str, dry_run: bool) -> String {
    let mut message = format!(
        "agentwatch has detected {} EC2 instances in the `{cluster_id}' ECS cluster \
         whose ECS agent has stopped reporting.\n\nThese are:\n{}\n\n",
        terminated.len(),
        terminated.join("\n"),
    );
    if dry_run {
        message.push_str("Warn-only mode: no instances were detached or terminated.");
    } else {
        message.push_str("These instances have been detached from their autoscaling groups and terminated.");
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<InstanceId> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn tracked_message_lists_each_instance() {
        let tracked = vec![("i-1".to_string(), 1), ("i-2".to_string(), 2)];
        let msg = format_tracked_message(&tracked, NonZeroU64::new(3).unwrap());
        let lines: Vec<&str> = msg.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "agentwatch has detected the following:");
        assert_eq!(
            lines[1],
            "The instance `i-1' failed. It has failed 1 times. It will be terminated if it fails 3 times."
        );
        assert!(lines[2].contains("`i-2'") && lines[2].contains("failed 2 times"));
    }

    #[test]
    fn terminated_message_live() {
        let msg = format_terminated_message(&ids(&["i-1", "i-2"]), "prod", false);
        assert!(msg.contains("detected 2 EC2 instances in the `prod' ECS cluster"));
        assert!(msg.contains("These are:\ni-1\ni-2\n"));
        assert!(msg.ends_with("detached from their autoscaling groups and terminated."));
        assert!(!msg.contains("Warn-only"));
    }

    #[test]
    fn terminated_message_dry_run() {
        let msg = format_terminated_message(&ids(&["i-9"]), "staging", true);
        assert!(msg.contains("detected 1 EC2 instances"));
        assert!(msg.contains("no instances were detached or terminated"));
        assert!(!msg.contains("have been detached"));
    }
}
