//! Port for outbound text messages.

use async_trait::async_trait;

use crate::domain::PhoneNumber;

use super::define_port_error;

/// What happened to an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Handed to the provider.
    Sent,
    /// No provider configured; the message was only logged.
    Stubbed,
}

define_port_error! {
    /// Errors raised by SMS transports.
    pub enum SmsSenderError {
        /// The provider could not be reached or timed out.
        Transport { message: String } => "sms transport failed: {message}",
        /// The provider refused the message.
        Rejected { status: u16, message: String } =>
            "sms provider rejected message with status {status}: {message}",
    }
}

/// Sends a text message to one recipient.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Send `body` to `to`.
    async fn send(&self, to: &PhoneNumber, body: &str) -> Result<Delivery, SmsSenderError>;
}
