//! agentwatch-state: durable failure counters.
//!
//! The counter store is the only memory the monitor keeps between passes:
//! one `u64` per instance id, present only while that instance is being
//! tracked as disconnected. [`CounterStore`] is the seam; [`RedbCounterStore`]
//! persists to an embedded [redb](https://docs.rs/redb) database, or to an
//! in-memory backend for tests.

pub mod error;
pub mod store;
pub mod tables;

pub use error::{StateError, StateResult};
pub use store::{CounterStore, RedbCounterStore};
