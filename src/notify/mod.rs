//! Alert delivery.
//!
//! Delivery never fails the run: every outcome, including a missing
//! configuration, is reported as a [`Delivery`] value.

mod telegram;

pub use telegram::TelegramNotifier;

use async_trait::async_trait;
use std::fmt;

/// Result of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// Credentials or recipient missing; nothing was sent over the network.
    NotConfigured,
    /// Provider answered with a non-success status.
    Rejected { status: u16, body: String },
    /// Request could not be completed (connect error, timeout).
    Failed(String),
}

impl Delivery {
    pub fn is_sent(&self) -> bool {
        matches!(self, Delivery::Sent)
    }
}

impl fmt::Display for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delivery::Sent => write!(f, "sent"),
            Delivery::NotConfigured => write!(f, "not sent (notifier not configured)"),
            Delivery::Rejected { status, .. } => write!(f, "not sent (HTTP {})", status),
            Delivery::Failed(reason) => write!(f, "not sent ({})", reason),
        }
    }
}

/// Sink for alert messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Attempt to deliver `text`.
    async fn notify(&self, text: &str) -> Delivery;
}
