//! Shared types used across agentwatch crates.

use serde::{Deserialize, Serialize};

/// Tag key the autoscaler stamps on every instance it launches.
pub const AUTOSCALING_GROUP_TAG: &str = "aws:autoscaling:groupName";

/// EC2 instance identifier, also the counter store key.
pub type InstanceId = String;

/// Opaque orchestrator reference to a registered container instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceRef(pub String);

impl InstanceRef {
    pub fn new(arn: impl Into<String>) -> Self {
        Self(arn.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InstanceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of a paginated listing.
///
/// `next_token` is `None` on the last page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    /// A page with no continuation.
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_token: None,
        }
    }

    /// A page followed by another page fetched with `token`.
    pub fn with_next(items: Vec<T>, token: impl Into<String>) -> Self {
        Self {
            items,
            next_token: Some(token.into()),
        }
    }

    pub fn has_next(&self) -> bool {
        self.next_token.is_some()
    }
}

/// A key/value tag attached to an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Container instance as returned by a describe call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDetail {
    pub instance_ref: InstanceRef,
    pub ec2_id: InstanceId,
    pub agent_connected: bool,
    pub tags: Vec<Tag>,
}

impl InstanceDetail {
    /// Value of the autoscaling group tag, if the instance carries one.
    pub fn autoscaling_group(&self) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.key == AUTOSCALING_GROUP_TAG)
            .map(|t| t.value.as_str())
    }

    /// Reduce to the fields the failure tracker and driver act on.
    pub fn observe(&self) -> InstanceObservation {
        InstanceObservation {
            instance_id: self.ec2_id.clone(),
            agent_connected: self.agent_connected,
            autoscaling_group: self.autoscaling_group().map(str::to_string),
        }
    }
}

/// Connectivity snapshot of one instance, built fresh every pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceObservation {
    pub instance_id: InstanceId,
    pub agent_connected: bool,
    pub autoscaling_group: Option<String>,
}

/// Outcome of evaluating one observation against the failure counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Agent is connected; any counter was cleared.
    Reset,
    /// Agent is disconnected; counter now holds this many consecutive failures.
    Tracked(u64),
    /// Threshold reached; counter cleared and the instance should go.
    Terminate,
}
