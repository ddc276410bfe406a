//! agentwatch-core: shared types, collaborator traits, and configuration.
//!
//! Everything the monitor needs from the outside world is expressed as a
//! trait in [`collaborators`] so concrete clients (HTTP gateway, webhook)
//! and test fakes can be swapped in at construction time.

pub mod collaborators;
pub mod config;
pub mod types;

pub use collaborators::{ClusterInventory, InstanceController, Notifier};
pub use config::{AgentwatchConfig, ConfigError, MonitorEvent, PassConfig};
pub use types::*;
