//! Email transports for the daily digest.
//!
//! [`HttpEmailSender`] posts JSON to an HTTP mail relay. [`LoggingEmailSender`]
//! only logs the subject when no relay is configured.

mod relay;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{Delivery, EmailMessage, EmailSender, EmailSenderError};

pub use relay::{EmailRelayConfig, HttpEmailSender};

/// Stub transport that logs instead of sending.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingEmailSender;

#[async_trait]
impl EmailSender for LoggingEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<Delivery, EmailSenderError> {
        info!(subject = %message.subject, "email stub: message not sent");
        Ok(Delivery::Stubbed)
    }
}
