//! Failure tracker: per-instance consecutive disconnect counting.

use std::num::NonZeroU64;
use std::sync::Arc;

use tracing::{debug, info, warn};

use agentwatch_core::Decision;
use agentwatch_state::{CounterStore, StateResult};

/// Evaluates one instance observation against its stored failure counter.
///
/// Not idempotent for disconnected observations: every call counts as one
/// more consecutive failure. Invoke once per instance per pass.
#[derive(Clone)]
pub struct FailureTracker {
    store: Arc<dyn CounterStore>,
}

impl FailureTracker {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    /// Decide whether to reset, keep tracking, or terminate `instance_id`.
    ///
    /// The stored value is the number of *previous* consecutive disconnects;
    /// the current observation makes it one more. Termination happens when
    /// that total reaches `threshold`, and clears the counter so a later
    /// incident starts from scratch.
    pub fn evaluate(
        &self,
        instance_id: &str,
        agent_connected: bool,
        threshold: NonZeroU64,
    ) -> StateResult<Decision> {
        if agent_connected {
            if self.store.exists(instance_id)? {
                self.store.delete(instance_id)?;
                info!(%instance_id, "agent reconnected, failure counter reset");
            }
            return Ok(Decision::Reset);
        }

        let stored = self.store.get(instance_id)?;
        let observed = stored.unwrap_or(0).saturating_add(1);

        if observed >= threshold.get() {
            if stored.is_some() {
                self.store.delete(instance_id)?;
            }
            warn!(
                %instance_id,
                failures = observed,
                threshold = threshold.get(),
                "agent disconnect threshold reached"
            );
            return Ok(Decision::Terminate);
        }

        let count = match stored {
            None => {
                self.store.set(instance_id, 1)?;
                1
            }
            Some(_) => self.store.incr(instance_id)?,
        };
        debug!(%instance_id, failures = count, threshold = threshold.get(), "agent disconnected");
        Ok(Decision::Tracked(count))
    }
}
