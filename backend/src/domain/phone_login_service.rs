//! Phone one-time-code login.
//!
//! Implements [`PhoneLogin`]: a six-digit code is texted to the phone, stored
//! as a digest with a short lifetime and a small attempt budget, and consumed
//! on the first matching verification.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use rand::Rng;
use tracing::{info, warn};

use crate::domain::ports::{AuthRepository, PhoneLogin, SmsSender};
use crate::domain::{
    Error, NewOtpCode, OTP_MAX_ATTEMPTS, PhoneNumber, hash_code, is_well_formed, otp_lifetime,
};

/// Shortest normalised phone accepted for login, `+` and ten digits.
const MIN_LOGIN_PHONE_LEN: usize = 11;

/// Source of fresh login codes.
#[cfg_attr(test, mockall::automock)]
pub trait CodeGenerator: Send + Sync {
    /// A six-digit code.
    fn generate(&self) -> String;
}

/// Uniformly random codes from the thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        rand::thread_rng().gen_range(100_000..1_000_000).to_string()
    }
}

/// Login service backed by an [`AuthRepository`] and an SMS transport.
#[derive(Clone)]
pub struct PhoneLoginService<A> {
    auth_repo: Arc<A>,
    sms: Arc<dyn SmsSender>,
    codes: Arc<dyn CodeGenerator>,
    clock: Arc<dyn Clock>,
}

impl<A> PhoneLoginService<A> {
    /// Create a service issuing random codes.
    pub fn new(auth_repo: Arc<A>, sms: Arc<dyn SmsSender>, clock: Arc<dyn Clock>) -> Self {
        Self {
            auth_repo,
            sms,
            codes: Arc::new(RandomCodeGenerator),
            clock,
        }
    }

    /// Replace the code source.
    #[must_use]
    pub fn with_code_generator(mut self, codes: Arc<dyn CodeGenerator>) -> Self {
        self.codes = codes;
        self
    }
}

impl<A> PhoneLoginService<A>
where
    A: AuthRepository,
{
    async fn ensure_not_banned(&self, phone: &PhoneNumber) -> Result<(), Error> {
        let banned = self
            .auth_repo
            .is_banned(phone)
            .await
            .map_err(Error::from)?;
        if banned {
            return Err(Error::forbidden("number suspended"));
        }
        Ok(())
    }
}

#[async_trait]
impl<A> PhoneLogin for PhoneLoginService<A>
where
    A: AuthRepository,
{
    async fn request_code(&self, raw_phone: &str) -> Result<(), Error> {
        let phone = PhoneNumber::normalize(raw_phone)
            .filter(|phone| phone.len() >= MIN_LOGIN_PHONE_LEN)
            .ok_or_else(|| Error::invalid_request("invalid phone"))?;
        self.ensure_not_banned(&phone).await?;

        let code = self.codes.generate();
        let record = NewOtpCode {
            phone: phone.clone(),
            code_hash: hash_code(&code),
            expires_at: self.clock.utc() + otp_lifetime(),
            attempts_left: OTP_MAX_ATTEMPTS,
        };
        self.auth_repo
            .store_code(&record)
            .await
            .map_err(Error::from)?;

        self.sms
            .send(&phone, &format!("Your yard login code is {code}"))
            .await
            .map_err(|err| {
                warn!(phone = %phone.masked(), error = %err, "login code sms failed");
                Error::service_unavailable("could not send login code")
            })?;
        info!(phone = %phone.masked(), "login code issued");
        Ok(())
    }

    async fn verify_code(&self, raw_phone: &str, code: &str) -> Result<PhoneNumber, Error> {
        let phone = PhoneNumber::normalize(raw_phone)
            .filter(|_| is_well_formed(code))
            .ok_or_else(|| Error::invalid_request("bad input"))?;
        let now = self.clock.utc();

        let active = self
            .auth_repo
            .latest_active_code(&phone, now)
            .await
            .map_err(Error::from)?
            .ok_or_else(|| Error::invalid_request("code expired"))?;
        if active.attempts_left == 0 {
            return Err(Error::invalid_request("too many attempts"));
        }
        if !active.matches(code) {
            self.auth_repo
                .decrement_attempts(active.id)
                .await
                .map_err(Error::from)?;
            return Err(Error::invalid_request("incorrect code"));
        }

        self.auth_repo
            .complete_login(active.id, &phone, now)
            .await
            .map_err(Error::from)?;
        info!(phone = %phone.masked(), "phone login verified");
        Ok(phone)
    }

    async fn require_admin(&self, phone: &PhoneNumber) -> Result<(), Error> {
        self.ensure_not_banned(phone).await?;
        let admin = self
            .auth_repo
            .is_admin(phone)
            .await
            .map_err(Error::from)?;
        if admin {
            Ok(())
        } else {
            Err(Error::forbidden("admin only"))
        }
    }
}

#[cfg(test)]
#[path = "phone_login_service_tests.rs"]
mod tests;
