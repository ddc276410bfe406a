//! agentwatch-cluster: cluster inventory and instance control over HTTP.
//!
//! [`HttpClusterClient`] talks to a gateway that fronts the orchestrator
//! and autoscaling APIs, using their JSON field names:
//!
//! ```text
//! GET  /clusters/{cluster}/container-instances[?nextToken=..]
//! POST /clusters/{cluster}/container-instances/describe
//! POST /autoscaling/detach-instances
//! POST /instances/{id}/terminate
//! ```

pub mod client;
pub mod error;
pub mod wire;

pub use client::HttpClusterClient;
pub use error::GatewayError;
