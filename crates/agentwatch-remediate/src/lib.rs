//! agentwatch-remediate: one monitoring pass, end to end.
//!
//! # Data Flow
//!
//! ```text
//! Monitor::run_once(PassConfig)
//!   └── RemediationDriver::run_pass
//!         ├── inventory::fetch_instances   (list pages → describe batches)
//!         ├── FailureTracker::evaluate      (per instance, counter store)
//!         └── InstanceController            (detach + terminate on trip)
//!   └── Reporter                            (tracked / terminated notices)
//! ```
//!
//! # Serialization
//!
//! Passes over the same cluster and counter store must not overlap: two
//! concurrent passes can both read the same counter and either undercount
//! or terminate an instance twice. Nothing here locks; callers run one
//! pass at a time. [`Monitor::run_loop`] does so by construction.

pub mod driver;
pub mod error;
pub mod inventory;
pub mod monitor;
pub mod reporter;

mod call;

pub use driver::{InstanceFailure, PassResult, RemediationDriver};
pub use error::{MonitorError, RemediationAction};
pub use monitor::Monitor;
pub use reporter::Reporter;
