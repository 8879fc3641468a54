//! SMS transports.
//!
//! [`TwilioSmsSender`] posts to the Twilio Messages API. [`LoggingSmsSender`]
//! stands in when no credentials are configured and only logs the message.

mod twilio;

use async_trait::async_trait;
use tracing::info;

use crate::domain::PhoneNumber;
use crate::domain::ports::{Delivery, SmsSender, SmsSenderError};

pub use twilio::{TwilioCredentials, TwilioSender, TwilioSmsSender};

/// Stub transport that logs instead of sending.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingSmsSender;

#[async_trait]
impl SmsSender for LoggingSmsSender {
    async fn send(&self, to: &PhoneNumber, body: &str) -> Result<Delivery, SmsSenderError> {
        info!(to = %to.masked(), body, "sms stub: message not sent");
        Ok(Delivery::Stubbed)
    }
}
