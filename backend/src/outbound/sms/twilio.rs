//! Reqwest-backed Twilio Messages adapter.
//!
//! Owns transport details only: form encoding, basic auth, timeout, and
//! status mapping into [`SmsSenderError`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use crate::domain::PhoneNumber;
use crate::domain::ports::{Delivery, SmsSender, SmsSenderError};

const TWILIO_API_BASE: &str = "https://api.twilio.com";
const BODY_PREVIEW_CHAR_LIMIT: usize = 160;

/// Sender identity: a messaging service takes precedence over a number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TwilioSender {
    /// `MessagingServiceSid` parameter.
    MessagingService(String),
    /// `From` parameter.
    From(String),
}

/// Account credentials and sender identity.
#[derive(Debug, Clone)]
pub struct TwilioCredentials {
    /// Account SID, used in the URL and as the basic-auth user.
    pub account_sid: String,
    /// Auth token, used as the basic-auth password.
    pub auth_token: String,
    /// Who the message is sent from.
    pub sender: TwilioSender,
}

/// SMS transport posting to `/2010-04-01/Accounts/{sid}/Messages.json`.
pub struct TwilioSmsSender {
    client: Client,
    endpoint: Url,
    credentials: TwilioCredentials,
}

impl TwilioSmsSender {
    /// Build a sender with a bounded request timeout.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the client cannot be constructed or the
    /// account SID does not form a valid URL.
    pub fn new(credentials: TwilioCredentials, timeout: Duration) -> Result<Self, SmsSenderError> {
        Self::with_api_base(TWILIO_API_BASE, credentials, timeout)
    }

    /// Build a sender against another API base, such as a local mock.
    ///
    /// # Errors
    ///
    /// See [`TwilioSmsSender::new`].
    pub fn with_api_base(
        api_base: &str,
        credentials: TwilioCredentials,
        timeout: Duration,
    ) -> Result<Self, SmsSenderError> {
        let endpoint = messages_endpoint(api_base, &credentials.account_sid)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| SmsSenderError::transport(err.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            credentials,
        })
    }
}

fn messages_endpoint(api_base: &str, account_sid: &str) -> Result<Url, SmsSenderError> {
    let raw = format!(
        "{}/2010-04-01/Accounts/{}/Messages.json",
        api_base.trim_end_matches('/'),
        account_sid.trim()
    );
    Url::parse(&raw).map_err(|err| SmsSenderError::transport(format!("invalid endpoint: {err}")))
}

fn form_fields<'a>(sender: &'a TwilioSender, to: &'a str, body: &'a str) -> [(&'static str, &'a str); 3] {
    let from = match sender {
        TwilioSender::MessagingService(sid) => ("MessagingServiceSid", sid.as_str()),
        TwilioSender::From(number) => ("From", number.as_str()),
    };
    [from, ("To", to), ("Body", body)]
}

#[async_trait]
impl SmsSender for TwilioSmsSender {
    async fn send(&self, to: &PhoneNumber, body: &str) -> Result<Delivery, SmsSenderError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .basic_auth(
                &self.credentials.account_sid,
                Some(&self.credentials.auth_token),
            )
            .form(&form_fields(&self.credentials.sender, to.as_str(), body))
            .send()
            .await
            .map_err(|err| SmsSenderError::transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(Delivery::Sent);
        }
        let body = response
            .bytes()
            .await
            .map_err(|err| SmsSenderError::transport(err.to_string()))?;
        Err(map_status_error(status, body.as_ref()))
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> SmsSenderError {
    let preview = body_preview(body);
    if status.is_client_error() {
        SmsSenderError::rejected(status.as_u16(), preview)
    } else {
        SmsSenderError::transport(format!("status {}: {preview}", status.as_u16()))
    }
}

fn body_preview(body: &[u8]) -> String {
    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview: String = compact.chars().take(BODY_PREVIEW_CHAR_LIMIT).collect();
    if compact.chars().count() > BODY_PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network Twilio helpers.

    use super::*;
    use rstest::rstest;

    #[rstest]
    fn endpoint_embeds_account_sid() {
        let url = messages_endpoint("https://api.twilio.com/", "AC123").expect("valid url");
        assert_eq!(
            url.as_str(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[rstest]
    #[case(TwilioSender::MessagingService("MG9".to_owned()), "MessagingServiceSid", "MG9")]
    #[case(TwilioSender::From("+15155550100".to_owned()), "From", "+15155550100")]
    fn sender_identity_selects_form_field(
        #[case] sender: TwilioSender,
        #[case] key: &str,
        #[case] value: &str,
    ) {
        let fields = form_fields(&sender, "+15155550142", "hi");
        assert_eq!(fields[0], (key, value));
        assert_eq!(fields[1], ("To", "+15155550142"));
        assert_eq!(fields[2], ("Body", "hi"));
    }

    #[rstest]
    #[case(StatusCode::BAD_REQUEST, true)]
    #[case(StatusCode::UNAUTHORIZED, true)]
    #[case(StatusCode::INTERNAL_SERVER_ERROR, false)]
    fn client_statuses_are_rejections(#[case] status: StatusCode, #[case] rejected: bool) {
        let err = map_status_error(status, br#"{"message": "The 'To' number is not valid"}"#);
        assert_eq!(matches!(err, SmsSenderError::Rejected { .. }), rejected);
    }

    #[rstest]
    fn long_bodies_are_truncated_in_errors() {
        let body = "x".repeat(400);
        let preview = body_preview(body.as_bytes());
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), BODY_PREVIEW_CHAR_LIMIT + 3);
    }
}
