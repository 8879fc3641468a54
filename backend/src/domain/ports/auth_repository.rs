//! Port for phone accounts, admin grants, and login codes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ActiveOtpCode, NewOtpCode, PhoneNumber};

use super::define_port_error;

define_port_error! {
    /// Errors raised by auth repository adapters.
    pub enum AuthRepositoryError for "auth repository" {}
}

/// Storage for login state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthRepository: Send + Sync {
    /// Whether the phone is suspended.
    async fn is_banned(&self, phone: &PhoneNumber) -> Result<bool, AuthRepositoryError>;

    /// Whether the phone holds the admin capability.
    async fn is_admin(&self, phone: &PhoneNumber) -> Result<bool, AuthRepositoryError>;

    /// Grant admin unless already granted. Returns whether a row was written.
    async fn ensure_admin(&self, phone: &PhoneNumber) -> Result<bool, AuthRepositoryError>;

    /// Store a freshly issued code.
    async fn store_code(&self, code: &NewOtpCode) -> Result<(), AuthRepositoryError>;

    /// Newest unconsumed code for the phone that has not expired at `now`.
    async fn latest_active_code(
        &self,
        phone: &PhoneNumber,
        now: DateTime<Utc>,
    ) -> Result<Option<ActiveOtpCode>, AuthRepositoryError>;

    /// Spend one verification attempt.
    async fn decrement_attempts(&self, code_id: i64) -> Result<(), AuthRepositoryError>;

    /// Create the user if absent, stamp the login, and consume the code, in
    /// one transaction.
    async fn complete_login(
        &self,
        code_id: i64,
        phone: &PhoneNumber,
        now: DateTime<Utc>,
    ) -> Result<(), AuthRepositoryError>;
}
