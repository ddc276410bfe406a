//! agentwatch-health: turns connectivity polls into termination decisions.
//!
//! # State machine
//!
//! ```text
//!             connected                 disconnected (n + 1 < threshold)
//!   absent ◄──────────── tracked(n) ─────────────────────► tracked(n + 1)
//!     │                     │
//!     │ disconnected        │ disconnected (n + 1 >= threshold)
//!     ▼                     ▼
//!  tracked(1)           Terminate ──► absent
//! ```
//!
//! The only state is the counter in the [`CounterStore`]; a pass evaluates
//! each instance exactly once, so N consecutive disconnected passes
//! terminate on the Nth.
//!
//! [`CounterStore`]: agentwatch_state::CounterStore

pub mod tracker;

pub use tracker::FailureTracker;
