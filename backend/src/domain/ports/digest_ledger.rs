//! Port recording which dates have had their digest sent.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use super::define_port_error;

define_port_error! {
    /// Errors raised by digest ledger adapters.
    pub enum DigestLedgerError for "digest ledger" {}
}

/// At-most-once claim per local date.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DigestLedger: Send + Sync {
    /// Claim `date`. Returns `true` only for the first caller.
    async fn claim(&self, date: NaiveDate, now: DateTime<Utc>) -> Result<bool, DigestLedgerError>;
}

/// Fixture that never grants a claim.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDigestLedger;

#[async_trait]
impl DigestLedger for FixtureDigestLedger {
    async fn claim(
        &self,
        _date: NaiveDate,
        _now: DateTime<Utc>,
    ) -> Result<bool, DigestLedgerError> {
        Ok(false)
    }
}
