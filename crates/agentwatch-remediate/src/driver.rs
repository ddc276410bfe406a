//! Remediation driver: runs the failure tracker over a cluster and acts
//! on termination decisions.

use std::num::NonZeroU64;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use agentwatch_core::config::DEFAULT_CALL_TIMEOUT_SECS;
use agentwatch_core::{ClusterInventory, Decision, InstanceController, InstanceId, InstanceObservation};
use agentwatch_health::FailureTracker;
use agentwatch_state::CounterStore;

use crate::call::bounded;
use crate::error::{MonitorError, RemediationAction};
use crate::inventory;

/// A per-instance problem that did not abort the pass.
#[derive(Debug)]
pub struct InstanceFailure {
    pub instance_id: InstanceId,
    pub error: MonitorError,
}

/// Everything a pass decided, in inventory order.
#[derive(Debug, Default)]
pub struct PassResult {
    /// Instances still under observation, with their consecutive failures.
    pub tracked: Vec<(InstanceId, u64)>,
    /// Instances terminated (or that would have been, in warn-only mode).
    pub terminated: Vec<InstanceId>,
    pub failures: Vec<InstanceFailure>,
}

impl PassResult {
    fn fail(&mut self, instance_id: &str, error: MonitorError) {
        self.failures.push(InstanceFailure {
            instance_id: instance_id.to_string(),
            error,
        });
    }
}

/// Drives one pass over a cluster.
///
/// Callers must not run two passes over the same counter store at once.
pub struct RemediationDriver {
    inventory: Arc<dyn ClusterInventory>,
    controller: Arc<dyn InstanceController>,
    tracker: FailureTracker,
    call_timeout: Duration,
}

impl RemediationDriver {
    pub fn new(
        inventory: Arc<dyn ClusterInventory>,
        controller: Arc<dyn InstanceController>,
        store: Arc<dyn CounterStore>,
    ) -> Self {
        Self {
            inventory,
            controller,
            tracker: FailureTracker::new(store),
            call_timeout: Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS),
        }
    }

    /// Bound each inventory and controller call by `timeout`.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Evaluate every instance in `cluster_id` once.
    ///
    /// Fails only if the inventory cannot be fetched, in which case no
    /// counter has been touched. Everything after that is per-instance and
    /// lands in [`PassResult::failures`].
    pub async fn run_pass(
        &self,
        cluster_id: &str,
        threshold: NonZeroU64,
        dry_run: bool,
    ) -> Result<PassResult, MonitorError> {
        let instances =
            inventory::fetch_instances(self.inventory.as_ref(), cluster_id, self.call_timeout).await?;
        info!(cluster = %cluster_id, instances = instances.len(), dry_run, "pass started");

        let mut result = PassResult::default();

        for detail in &instances {
            let obs = detail.observe();
            let decision = match self.tracker.evaluate(&obs.instance_id, obs.agent_connected, threshold) {
                Ok(decision) => decision,
                Err(e) => {
                    warn!(instance_id = %obs.instance_id, error = %e, "failure counter unavailable");
                    result.fail(&obs.instance_id, e.into());
                    continue;
                }
            };

            match decision {
                Decision::Reset => {}
                Decision::Tracked(count) => result.tracked.push((obs.instance_id, count)),
                Decision::Terminate => self.remediate(&obs, dry_run, &mut result).await,
            }
        }

        info!(
            cluster = %cluster_id,
            tracked = result.tracked.len(),
            terminated = result.terminated.len(),
            failures = result.failures.len(),
            "pass complete"
        );
        Ok(result)
    }

    async fn remediate(&self, obs: &InstanceObservation, dry_run: bool, result: &mut PassResult) {
        let instance_id = obs.instance_id.as_str();

        let Some(group) = obs.autoscaling_group.as_deref() else {
            error!(%instance_id, "cannot remediate: no autoscaling group tag");
            result.fail(
                instance_id,
                MonitorError::TagLookup {
                    instance_id: instance_id.to_string(),
                },
            );
            return;
        };

        if dry_run {
            info!(%instance_id, %group, "warn-only: skipping detach and terminate");
            result.terminated.push(instance_id.to_string());
            return;
        }

        // A failed detach still terminates; the group then replaces the
        // instance itself.
        match bounded(self.call_timeout, self.controller.detach(instance_id, group)).await {
            Ok(()) => debug!(%instance_id, %group, "instance detached"),
            Err(e) => {
                error!(%instance_id, %group, error = %e, "detach failed");
                result.fail(
                    instance_id,
                    MonitorError::remediation(instance_id, RemediationAction::Detach, e),
                );
            }
        }

        match bounded(self.call_timeout, self.controller.terminate(instance_id)).await {
            Ok(()) => {
                info!(%instance_id, %group, "detached and terminated");
                result.terminated.push(instance_id.to_string());
            }
            Err(e) => {
                error!(%instance_id, error = %e, "terminate failed; reconcile manually");
                result.fail(
                    instance_id,
                    MonitorError::remediation(instance_id, RemediationAction::Terminate, e),
                );
            }
        }
    }
}
