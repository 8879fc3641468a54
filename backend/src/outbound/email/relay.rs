//! Reqwest-backed HTTP mail relay adapter.
//!
//! Sends `{ from, to, subject, html }` as JSON with a bearer key. Any relay
//! accepting that shape works; the response body is ignored on success.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;

use crate::domain::ports::{Delivery, EmailMessage, EmailSender, EmailSenderError};

/// Relay endpoint, credentials, and addressing.
#[derive(Debug, Clone)]
pub struct EmailRelayConfig {
    /// Relay URL receiving the POST.
    pub endpoint: Url,
    /// Bearer token.
    pub api_key: String,
    /// Sender address.
    pub from: String,
    /// Recipient addresses.
    pub to: Vec<String>,
}

#[derive(Debug, Serialize)]
struct RelayPayload<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
}

/// Email transport posting to a JSON relay.
pub struct HttpEmailSender {
    client: Client,
    config: EmailRelayConfig,
}

impl HttpEmailSender {
    /// Build a sender with a bounded request timeout.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the client cannot be constructed.
    pub fn new(config: EmailRelayConfig, timeout: Duration) -> Result<Self, EmailSenderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| EmailSenderError::transport(err.to_string()))?;
        Ok(Self { client, config })
    }
}

fn payload<'a>(config: &'a EmailRelayConfig, message: &'a EmailMessage) -> RelayPayload<'a> {
    RelayPayload {
        from: &config.from,
        to: &config.to,
        subject: &message.subject,
        html: &message.html,
    }
}

fn map_status_error(status: StatusCode) -> EmailSenderError {
    if status.is_client_error() {
        EmailSenderError::rejected(status.as_u16(), format!("relay refused with {status}"))
    } else {
        EmailSenderError::transport(format!("relay returned {status}"))
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<Delivery, EmailSenderError> {
        let response = self
            .client
            .post(self.config.endpoint.clone())
            .bearer_auth(&self.config.api_key)
            .json(&payload(&self.config, message))
            .send()
            .await
            .map_err(|err| EmailSenderError::transport(err.to_string()))?;
        let status = response.status();
        if status.is_success() {
            Ok(Delivery::Sent)
        } else {
            Err(map_status_error(status))
        }
    }
}
