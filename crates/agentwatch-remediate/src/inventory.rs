//! Full-cluster inventory fetch.
//!
//! Listing is paginated; every page is followed until one arrives without
//! a continuation token. Describing is batched because the orchestrator
//! caps how many instances a single describe call accepts.

use std::time::Duration;

use tracing::debug;

use agentwatch_core::{ClusterInventory, InstanceDetail, InstanceObservation, InstanceRef};

use crate::call::bounded;
use crate::error::MonitorError;

/// Maximum instances per describe call.
pub const DESCRIBE_BATCH_SIZE: usize = 100;

/// List every instance reference in `cluster`, in page order.
pub async fn list_all(
    inventory: &dyn ClusterInventory,
    cluster: &str,
    timeout: Duration,
) -> Result<Vec<InstanceRef>, MonitorError> {
    let mut refs = Vec::new();
    let mut token: Option<String> = None;
    let mut pages = 0u32;

    loop {
        let page = bounded(timeout, inventory.list_instances(cluster, token.as_deref()))
            .await
            .map_err(|e| MonitorError::inventory(cluster, e))?;
        pages += 1;
        let last = !page.has_next();
        refs.extend(page.items);
        if last {
            break;
        }
        token = page.next_token;
    }

    debug!(%cluster, pages, instances = refs.len(), "instance listing complete");
    Ok(refs)
}

/// Describe `refs` in batches of [`DESCRIBE_BATCH_SIZE`], preserving order.
pub async fn describe_all(
    inventory: &dyn ClusterInventory,
    cluster: &str,
    refs: &[InstanceRef],
    timeout: Duration,
) -> Result<Vec<InstanceDetail>, MonitorError> {
    let mut details = Vec::with_capacity(refs.len());
    for batch in refs.chunks(DESCRIBE_BATCH_SIZE) {
        let described = bounded(timeout, inventory.describe_instances(cluster, batch))
            .await
            .map_err(|e| MonitorError::inventory(cluster, e))?;
        details.extend(described);
    }
    Ok(details)
}

/// List and describe every instance in `cluster`.
pub async fn fetch_instances(
    inventory: &dyn ClusterInventory,
    cluster: &str,
    timeout: Duration,
) -> Result<Vec<InstanceDetail>, MonitorError> {
    let refs = list_all(inventory, cluster, timeout).await?;
    if refs.is_empty() {
        return Ok(Vec::new());
    }
    describe_all(inventory, cluster, &refs, timeout).await
}

/// Disconnected instances in `cluster`, in inventory order.
///
/// Read-only: no counter is consulted and nothing is remediated.
pub async fn disconnected(
    inventory: &dyn ClusterInventory,
    cluster: &str,
    timeout: Duration,
) -> Result<Vec<InstanceObservation>, MonitorError> {
    let instances = fetch_instances(inventory, cluster, timeout).await?;
    let found: Vec<_> = instances
        .iter()
        .filter(|detail| !detail.agent_connected)
        .map(InstanceDetail::observe)
        .collect();
    debug!(%cluster, instances = instances.len(), disconnected = found.len(), "scan complete");
    Ok(found)
}
