//! Traits for the external systems a pass talks to.
//!
//! Implementations are injected as `Arc<dyn ...>` handles. None of these
//! calls are retried by the caller; each is bounded by the driver's
//! per-call timeout.

use async_trait::async_trait;

use crate::types::{InstanceDetail, InstanceRef, Page};

/// Read access to the orchestrator's view of a cluster.
#[async_trait]
pub trait ClusterInventory: Send + Sync {
    /// Fetch one page of instance references. Pass the previous page's
    /// `next_token` to continue; `None` starts from the beginning.
    async fn list_instances(
        &self,
        cluster: &str,
        next_token: Option<&str>,
    ) -> anyhow::Result<Page<InstanceRef>>;

    /// Describe a batch of instances. Results come back in request order.
    async fn describe_instances(
        &self,
        cluster: &str,
        refs: &[InstanceRef],
    ) -> anyhow::Result<Vec<InstanceDetail>>;
}

/// Destructive operations against instances.
#[async_trait]
pub trait InstanceController: Send + Sync {
    /// Remove the instance from its autoscaling group without lowering the
    /// group's desired capacity, so a replacement is launched.
    async fn detach(&self, instance_id: &str, group_name: &str) -> anyhow::Result<()>;

    /// Terminate the instance.
    async fn terminate(&self, instance_id: &str) -> anyhow::Result<()>;
}

/// Operator notification sink.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, channel: &str, subject: &str, message: &str) -> anyhow::Result<()>;
}
