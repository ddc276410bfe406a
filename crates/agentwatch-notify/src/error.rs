//! Error types for notification delivery.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Webhook answered with a non-2xx status
    #[error("webhook returned {status}: {body}")]
    Status { status: u16, body: String },
}
