//! PostgreSQL-backed `DigestLedger`.
//!
//! A claim is an insert into `digest_runs` keyed by date; the primary key
//! lets exactly one process win across restarts and replicas.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{DigestLedger, DigestLedgerError};

use super::diesel_error_mapping;
use super::pool::{DbPool, PoolError};
use super::schema::digest_runs;

/// Diesel-backed implementation of the `DigestLedger` port.
#[derive(Clone)]
pub struct DieselDigestLedger {
    pool: DbPool,
}

impl DieselDigestLedger {
    /// Create a new ledger with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> DigestLedgerError {
    diesel_error_mapping::map_pool_error(error, DigestLedgerError::connection)
}

fn map_diesel_error(error: DieselError) -> DigestLedgerError {
    diesel_error_mapping::map_diesel_error(
        error,
        DigestLedgerError::query,
        DigestLedgerError::connection,
    )
}

#[async_trait]
impl DigestLedger for DieselDigestLedger {
    async fn claim(&self, date: NaiveDate, now: DateTime<Utc>) -> Result<bool, DigestLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted = diesel::insert_into(digest_runs::table)
            .values((digest_runs::digest_date.eq(date), digest_runs::sent_at.eq(now)))
            .on_conflict(digest_runs::digest_date)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(inserted == 1)
    }
}
