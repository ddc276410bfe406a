//! agentwatch-notify: operator notifications over an HTTP webhook.
//!
//! [`WebhookNotifier`] implements [`agentwatch_core::Notifier`] by POSTing
//! `{ "channel", "subject", "message" }` as JSON. Delivery is attempted
//! once; retries are the receiving relay's concern.

pub mod error;
pub mod webhook;

pub use error::NotifyError;
pub use webhook::WebhookNotifier;
