//! PostgreSQL-backed `AuthRepository` implementation using Diesel ORM.
//!
//! Login codes are stored as digests only. Completing a login upserts the
//! user, stamps `last_login_at`, and consumes the code in one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{AuthRepository, AuthRepositoryError};
use crate::domain::{ActiveOtpCode, NewOtpCode, PhoneNumber};

use super::diesel_error_mapping;
use super::models::{NewOtpCodeRow, OtpCodeRow};
use super::pool::{DbPool, PoolError};
use super::schema::{app_admins, otp_codes, users};

/// Diesel-backed implementation of the `AuthRepository` port.
#[derive(Clone)]
pub struct DieselAuthRepository {
    pool: DbPool,
}

impl DieselAuthRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AuthRepositoryError {
    diesel_error_mapping::map_pool_error(error, AuthRepositoryError::connection)
}

fn map_diesel_error(error: DieselError) -> AuthRepositoryError {
    diesel_error_mapping::map_diesel_error(
        error,
        AuthRepositoryError::query,
        AuthRepositoryError::connection,
    )
}

fn row_to_code(row: OtpCodeRow) -> ActiveOtpCode {
    ActiveOtpCode {
        id: row.id,
        code_hash: row.code_hash,
        attempts_left: u32::try_from(row.attempts_left).unwrap_or(0),
    }
}

#[async_trait]
impl AuthRepository for DieselAuthRepository {
    async fn is_banned(&self, phone: &PhoneNumber) -> Result<bool, AuthRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let banned: Option<bool> = users::table
            .find(phone.as_str())
            .select(users::is_banned)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(banned.unwrap_or(false))
    }

    async fn is_admin(&self, phone: &PhoneNumber) -> Result<bool, AuthRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            app_admins::table.filter(app_admins::phone.eq(phone.as_str())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn ensure_admin(&self, phone: &PhoneNumber) -> Result<bool, AuthRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted = diesel::insert_into(app_admins::table)
            .values(app_admins::phone.eq(phone.as_str()))
            .on_conflict(app_admins::phone)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(inserted == 1)
    }

    async fn store_code(&self, code: &NewOtpCode) -> Result<(), AuthRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(otp_codes::table)
            .values(NewOtpCodeRow {
                phone: code.phone.as_str(),
                code_hash: &code.code_hash,
                expires_at: code.expires_at,
                attempts_left: i32::try_from(code.attempts_left).unwrap_or(i32::MAX),
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn latest_active_code(
        &self,
        phone: &PhoneNumber,
        now: DateTime<Utc>,
    ) -> Result<Option<ActiveOtpCode>, AuthRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = otp_codes::table
            .filter(otp_codes::phone.eq(phone.as_str()))
            .filter(otp_codes::consumed_at.is_null())
            .filter(otp_codes::expires_at.gt(now))
            .order(otp_codes::id.desc())
            .select(OtpCodeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_code))
    }

    async fn decrement_attempts(&self, code_id: i64) -> Result<(), AuthRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(
            otp_codes::table
                .find(code_id)
                .filter(otp_codes::attempts_left.gt(0)),
        )
        .set(otp_codes::attempts_left.eq(otp_codes::attempts_left - 1))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn complete_login(
        &self,
        code_id: i64,
        phone: &PhoneNumber,
        now: DateTime<Utc>,
    ) -> Result<(), AuthRepositoryError> {
        let phone = phone.as_str().to_owned();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(users::table)
                    .values((
                        users::phone.eq(&phone),
                        users::created_at.eq(now),
                        users::last_login_at.eq(Some(now)),
                    ))
                    .on_conflict(users::phone)
                    .do_update()
                    .set(users::last_login_at.eq(Some(now)))
                    .execute(conn)
                    .await?;

                diesel::update(otp_codes::table.find(code_id))
                    .set(otp_codes::consumed_at.eq(Some(now)))
                    .execute(conn)
                    .await?;
                Ok::<(), DieselError>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
