//! Port for outbound email.

use async_trait::async_trait;

use super::define_port_error;
use super::sms_sender::Delivery;

/// An HTML email to the configured digest recipients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
}

define_port_error! {
    /// Errors raised by email transports.
    pub enum EmailSenderError {
        /// The relay could not be reached or timed out.
        Transport { message: String } => "email transport failed: {message}",
        /// The relay refused the message.
        Rejected { status: u16, message: String } =>
            "email relay rejected message with status {status}: {message}",
    }
}

/// Sends an email.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send `message` to the configured recipients.
    async fn send(&self, message: &EmailMessage) -> Result<Delivery, EmailSenderError>;
}
