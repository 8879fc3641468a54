//! Service configuration loaded via OrthoConfig.
//!
//! Values come from `YARDLINE_*` environment variables, CLI flags, or a
//! config file. Optional fields fall back to documented defaults through the
//! accessor methods.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;

use crate::domain::{
    CalendarOffsetError, DEFAULT_HOLD_WINDOW_SECONDS, MonitorSettings, OperatingCalendar,
    PhoneNumber,
};
use crate::outbound::email::EmailRelayConfig;
use crate::outbound::sms::{TwilioCredentials, TwilioSender};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_ALERT_WAIT_MINUTES: i64 = 90;
const DEFAULT_DIGEST_HOUR_LOCAL: u32 = 18;
const DEFAULT_CHECK_PERIOD_SECONDS: u64 = 60;
const DEFAULT_TRANSPORT_TIMEOUT_SECONDS: u64 = 10;

/// Errors raised while turning raw settings into runtime values.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// `bind_addr` is not a socket address.
    #[error("invalid bind address {value:?}: {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    /// `utc_offset_minutes` is outside a day.
    #[error(transparent)]
    UtcOffset(#[from] CalendarOffsetError),
    /// `digest_hour_local` is not an hour of the day.
    #[error("digest hour must be between 0 and 23, got {0}")]
    DigestHour(u32),
    /// `email_endpoint` is not a URL.
    #[error("invalid email endpoint {value:?}: {message}")]
    EmailEndpoint { value: String, message: String },
}

/// Runtime configuration for the yard service.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "YARDLINE")]
pub struct AppSettings {
    /// PostgreSQL URL; in-memory stores are used when absent.
    pub database_url: Option<String>,
    /// Listen address.
    pub bind_addr: Option<String>,
    /// File holding the session cookie key.
    pub session_key_file: Option<PathBuf>,
    /// Mark the session cookie `Secure`.
    pub cookie_secure: Option<bool>,
    /// Phone seeded as the first admin.
    pub admin_phone: Option<String>,
    /// Recipient of long-wait alerts.
    pub alert_sms_to: Option<String>,
    /// Recipient of the SMS digest.
    pub digest_sms_to: Option<String>,
    /// Minutes an arrived truck waits before staff are alerted.
    pub alert_wait_minutes: Option<i64>,
    /// Local hour at which the digest goes out.
    pub digest_hour_local: Option<u32>,
    /// Offset of the operating day from UTC.
    pub utc_offset_minutes: Option<i32>,
    /// Seconds between anomaly ticks.
    pub check_period_seconds: Option<u64>,
    /// Seconds a slot hold lasts.
    pub hold_window_seconds: Option<u32>,
    /// Public origin used in driver links.
    pub base_url: Option<String>,
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_from: Option<String>,
    pub twilio_messaging_service_sid: Option<String>,
    pub email_endpoint: Option<String>,
    pub email_api_key: Option<String>,
    pub email_from: Option<String>,
    /// Comma separated digest email recipients.
    pub digest_email_to: Option<String>,
    /// Upper bound for every SMS and email call.
    pub transport_timeout_seconds: Option<u64>,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|raw| raw.trim()).filter(|raw| !raw.is_empty())
}

impl AppSettings {
    /// Listen address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = non_blank(self.bind_addr.as_ref()).unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Database URL, if one is configured.
    pub fn database_url(&self) -> Option<&str> {
        non_blank(self.database_url.as_ref())
    }

    /// Whether the session cookie is `Secure`; true unless disabled.
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure.unwrap_or(true)
    }

    /// Normalised admin phone.
    pub fn admin_phone(&self) -> Option<PhoneNumber> {
        non_blank(self.admin_phone.as_ref()).and_then(PhoneNumber::normalize)
    }

    /// Alert recipient, falling back to the admin phone.
    pub fn alert_sms_to(&self) -> Option<PhoneNumber> {
        non_blank(self.alert_sms_to.as_ref())
            .and_then(PhoneNumber::normalize)
            .or_else(|| self.admin_phone())
    }

    /// Digest recipient, falling back to the admin phone.
    pub fn digest_sms_to(&self) -> Option<PhoneNumber> {
        non_blank(self.digest_sms_to.as_ref())
            .and_then(PhoneNumber::normalize)
            .or_else(|| self.admin_phone())
    }

    /// Operating-day calendar from `utc_offset_minutes`.
    pub fn calendar(&self) -> Result<OperatingCalendar, SettingsError> {
        Ok(OperatingCalendar::from_offset_minutes(
            self.utc_offset_minutes.unwrap_or(0),
        )?)
    }

    /// Interval between anomaly ticks; never zero.
    pub fn check_period(&self) -> Duration {
        Duration::from_secs(
            self.check_period_seconds
                .unwrap_or(DEFAULT_CHECK_PERIOD_SECONDS)
                .max(1),
        )
    }

    /// How long a hold lasts.
    pub fn hold_window(&self) -> TimeDelta {
        self.hold_window_seconds
            .map_or(TimeDelta::seconds(DEFAULT_HOLD_WINDOW_SECONDS), |seconds| {
                TimeDelta::seconds(i64::from(seconds))
            })
    }

    /// Bound applied to every SMS and email call.
    pub fn transport_timeout(&self) -> Duration {
        Duration::from_secs(
            self.transport_timeout_seconds
                .unwrap_or(DEFAULT_TRANSPORT_TIMEOUT_SECONDS)
                .max(1),
        )
    }

    /// Tunables for the anomaly tick.
    pub fn monitor_settings(&self) -> Result<MonitorSettings, SettingsError> {
        let digest_hour_local = self
            .digest_hour_local
            .unwrap_or(DEFAULT_DIGEST_HOUR_LOCAL);
        if digest_hour_local > 23 {
            return Err(SettingsError::DigestHour(digest_hour_local));
        }
        Ok(MonitorSettings {
            alert_wait_minutes: self
                .alert_wait_minutes
                .unwrap_or(DEFAULT_ALERT_WAIT_MINUTES),
            digest_hour_local,
            alert_sms_to: self.alert_sms_to(),
            digest_sms_to: self.digest_sms_to(),
            base_url: non_blank(self.base_url.as_ref())
                .unwrap_or_default()
                .trim_end_matches('/')
                .to_owned(),
        })
    }

    /// Twilio credentials when the account, token, and a sender are set.
    /// A messaging service takes precedence over a from number.
    pub fn twilio_credentials(&self) -> Option<TwilioCredentials> {
        let account_sid = non_blank(self.twilio_account_sid.as_ref())?;
        let auth_token = non_blank(self.twilio_auth_token.as_ref())?;
        let sender = match (
            non_blank(self.twilio_messaging_service_sid.as_ref()),
            non_blank(self.twilio_from.as_ref()),
        ) {
            (Some(sid), _) => TwilioSender::MessagingService(sid.to_owned()),
            (None, Some(from)) => TwilioSender::From(from.to_owned()),
            (None, None) => return None,
        };
        Some(TwilioCredentials {
            account_sid: account_sid.to_owned(),
            auth_token: auth_token.to_owned(),
            sender,
        })
    }

    /// Email relay settings when endpoint, key, sender, and recipients are
    /// all set.
    pub fn email_relay(&self) -> Result<Option<EmailRelayConfig>, SettingsError> {
        let (Some(endpoint), Some(api_key), Some(from)) = (
            non_blank(self.email_endpoint.as_ref()),
            non_blank(self.email_api_key.as_ref()),
            non_blank(self.email_from.as_ref()),
        ) else {
            return Ok(None);
        };
        let to: Vec<String> = non_blank(self.digest_email_to.as_ref())
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|address| !address.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();
        if to.is_empty() {
            return Ok(None);
        }
        let endpoint = Url::parse(endpoint).map_err(|err| SettingsError::EmailEndpoint {
            value: endpoint.to_owned(),
            message: err.to_string(),
        })?;
        Ok(Some(EmailRelayConfig {
            endpoint,
            api_key: api_key.to_owned(),
            from: from.to_owned(),
            to,
        }))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for configuration parsing and fallbacks.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 10] = [
        "YARDLINE_DATABASE_URL",
        "YARDLINE_BIND_ADDR",
        "YARDLINE_ADMIN_PHONE",
        "YARDLINE_ALERT_SMS_TO",
        "YARDLINE_DIGEST_SMS_TO",
        "YARDLINE_UTC_OFFSET_MINUTES",
        "YARDLINE_TWILIO_ACCOUNT_SID",
        "YARDLINE_TWILIO_AUTH_TOKEN",
        "YARDLINE_TWILIO_FROM",
        "YARDLINE_TWILIO_MESSAGING_SERVICE_SID",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("yardline")]).expect("config should load")
    }

    fn cleared_with(
        overrides: &[(&'static str, &str)],
    ) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(cleared_with(&[]));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default address"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("socket address")
        );
        assert!(settings.database_url().is_none());
        assert!(settings.cookie_secure());
        assert!(settings.twilio_credentials().is_none());
        let monitor = settings.monitor_settings().expect("valid defaults");
        assert_eq!(monitor.alert_wait_minutes, 90);
        assert_eq!(monitor.digest_hour_local, 18);
        assert_eq!(settings.check_period(), Duration::from_secs(60));
        assert_eq!(settings.transport_timeout(), Duration::from_secs(10));
        assert_eq!(settings.hold_window(), TimeDelta::seconds(120));
    }

    #[rstest]
    fn recipients_fall_back_to_admin_phone() {
        let _guard = lock_env(cleared_with(&[
            ("YARDLINE_ADMIN_PHONE", "(515) 555-0100"),
            ("YARDLINE_DIGEST_SMS_TO", "515-555-0199"),
        ]));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.alert_sms_to().map(|phone| phone.to_string()),
            Some("+15155550100".to_owned())
        );
        assert_eq!(
            settings.digest_sms_to().map(|phone| phone.to_string()),
            Some("+15155550199".to_owned())
        );
    }

    #[rstest]
    fn messaging_service_wins_over_from_number() {
        let _guard = lock_env(cleared_with(&[
            ("YARDLINE_TWILIO_ACCOUNT_SID", "AC123"),
            ("YARDLINE_TWILIO_AUTH_TOKEN", "secret"),
            ("YARDLINE_TWILIO_FROM", "+15155550000"),
            ("YARDLINE_TWILIO_MESSAGING_SERVICE_SID", "MG456"),
        ]));

        let credentials = load_from_empty_args()
            .twilio_credentials()
            .expect("credentials configured");
        assert_eq!(
            credentials.sender,
            TwilioSender::MessagingService("MG456".to_owned())
        );
    }

    #[rstest]
    fn invalid_offset_is_reported() {
        let _guard = lock_env(cleared_with(&[("YARDLINE_UTC_OFFSET_MINUTES", "5000")]));

        assert!(matches!(
            load_from_empty_args().calendar(),
            Err(SettingsError::UtcOffset(_))
        ));
    }

    #[rstest]
    fn email_relay_needs_recipients() {
        let settings = AppSettings {
            email_endpoint: Some("https://mail.example.test/send".to_owned()),
            email_api_key: Some("key".to_owned()),
            email_from: Some("yard@example.test".to_owned()),
            ..AppSettings::default()
        };
        assert!(settings.email_relay().expect("valid").is_none());

        let settings = AppSettings {
            digest_email_to: Some("ops@example.test, , lead@example.test".to_owned()),
            ..settings
        };
        let relay = settings.email_relay().expect("valid").expect("configured");
        assert_eq!(relay.to, vec!["ops@example.test", "lead@example.test"]);
    }
}
