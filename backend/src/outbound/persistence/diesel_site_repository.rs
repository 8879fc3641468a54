//! PostgreSQL-backed `SiteRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{SiteRepository, SiteRepositoryError};
use crate::domain::{Site, SiteCode, SiteId};

use super::diesel_error_mapping;
use super::models::SiteRow;
use super::pool::{DbPool, PoolError};
use super::row_mapping::{site_from_row, site_to_row};
use super::schema::sites;

/// Diesel-backed implementation of the `SiteRepository` port.
#[derive(Clone)]
pub struct DieselSiteRepository {
    pool: DbPool,
}

impl DieselSiteRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SiteRepositoryError {
    diesel_error_mapping::map_pool_error(error, SiteRepositoryError::connection)
}

fn map_diesel_error(error: DieselError) -> SiteRepositoryError {
    diesel_error_mapping::map_diesel_error(
        error,
        SiteRepositoryError::query,
        SiteRepositoryError::connection,
    )
}

fn row_to_site(row: SiteRow) -> Result<Site, SiteRepositoryError> {
    site_from_row(row).map_err(SiteRepositoryError::query)
}

#[async_trait]
impl SiteRepository for DieselSiteRepository {
    async fn list_sites(&self) -> Result<Vec<Site>, SiteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<SiteRow> = sites::table
            .order(sites::id.asc())
            .select(SiteRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_site).collect()
    }

    async fn find_site(&self, id: SiteId) -> Result<Option<Site>, SiteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = sites::table
            .find(id.get())
            .select(SiteRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_site).transpose()
    }

    async fn find_site_by_code(
        &self,
        code: &SiteCode,
    ) -> Result<Option<Site>, SiteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = sites::table
            .filter(sites::code.eq(code.as_str()))
            .select(SiteRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_site).transpose()
    }

    async fn insert_site_if_absent(&self, site: &Site) -> Result<bool, SiteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        // No conflict target: a clash on either the id or the code skips the row.
        let inserted = diesel::insert_into(sites::table)
            .values(site_to_row(site))
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(inserted == 1)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for site repository mapping.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn invalid_stored_code_is_a_query_error() {
        let row = SiteRow {
            id: 100,
            code: "TOO-LONG-CODE".to_owned(),
            name: "Broken".to_owned(),
            min_interval_minutes: 5,
        };
        assert!(matches!(row_to_site(row), Err(SiteRepositoryError::Query { .. })));
    }

    #[rstest]
    fn pool_checkout_failure_is_a_connection_error() {
        let err = map_pool_error(PoolError::checkout("timed out"));
        assert!(err.to_string().contains("timed out"));
        assert!(matches!(err, SiteRepositoryError::Connection { .. }));
    }
}
