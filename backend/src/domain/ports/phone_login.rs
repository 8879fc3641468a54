//! Driving port for phone one-time-code login.

use async_trait::async_trait;

use crate::domain::{Error, PhoneNumber};

/// Login by texted code, plus the admin capability check.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhoneLogin: Send + Sync {
    /// Issue and text a code to `raw_phone`.
    async fn request_code(&self, raw_phone: &str) -> Result<(), Error>;

    /// Check a code and return the authenticated phone.
    async fn verify_code(&self, raw_phone: &str, code: &str) -> Result<PhoneNumber, Error>;

    /// Fail with `Forbidden` unless the phone is an admin and not banned.
    async fn require_admin(&self, phone: &PhoneNumber) -> Result<(), Error>;
}

/// Fixture where code `123456` logs anyone in and every phone is admin.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePhoneLogin;

#[async_trait]
impl PhoneLogin for FixturePhoneLogin {
    async fn request_code(&self, raw_phone: &str) -> Result<(), Error> {
        PhoneNumber::normalize(raw_phone)
            .map(|_| ())
            .ok_or_else(|| Error::invalid_request("invalid phone"))
    }

    async fn verify_code(&self, raw_phone: &str, code: &str) -> Result<PhoneNumber, Error> {
        let phone = PhoneNumber::normalize(raw_phone)
            .ok_or_else(|| Error::invalid_request("invalid phone"))?;
        if code == "123456" {
            Ok(phone)
        } else {
            Err(Error::invalid_request("incorrect code"))
        }
    }

    async fn require_admin(&self, _phone: &PhoneNumber) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case("123456", true)]
    #[case("654321", false)]
    #[tokio::test]
    async fn fixture_login_accepts_only_the_demo_code(
        #[case] code: &str,
        #[case] should_succeed: bool,
    ) {
        let result = FixturePhoneLogin.verify_code("515 555 0142", code).await;
        match (should_succeed, result) {
            (true, Ok(phone)) => assert_eq!(phone.as_str(), "+15155550142"),
            (false, Err(err)) => assert_eq!(err.code(), ErrorCode::InvalidRequest),
            (true, Err(err)) => panic!("expected success, got error: {err:?}"),
            (false, Ok(phone)) => panic!("expected failure, got success: {phone}"),
        }
    }
}
