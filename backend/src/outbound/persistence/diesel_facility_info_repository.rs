//! PostgreSQL-backed `FacilityInfoRepository` using the single-row
//! `facility_info` table.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;

use crate::domain::FacilityInfo;
use crate::domain::ports::{FacilityInfoRepository, FacilityInfoRepositoryError};

use super::diesel_error_mapping;
use super::models::FacilityInfoRow;
use super::pool::{DbPool, PoolError};
use super::schema::facility_info;

const FACILITY_ROW_ID: i32 = 1;

/// Diesel-backed implementation of the `FacilityInfoRepository` port.
#[derive(Clone)]
pub struct DieselFacilityInfoRepository {
    pool: DbPool,
}

impl DieselFacilityInfoRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> FacilityInfoRepositoryError {
    diesel_error_mapping::map_pool_error(error, FacilityInfoRepositoryError::connection)
}

fn map_diesel_error(error: DieselError) -> FacilityInfoRepositoryError {
    diesel_error_mapping::map_diesel_error(
        error,
        FacilityInfoRepositoryError::query,
        FacilityInfoRepositoryError::connection,
    )
}

#[async_trait]
impl FacilityInfoRepository for DieselFacilityInfoRepository {
    async fn get(&self) -> Result<FacilityInfo, FacilityInfoRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = facility_info::table
            .find(FACILITY_ROW_ID)
            .select(FacilityInfoRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row
            .map(|row| FacilityInfo {
                facility_phone: row.facility_phone,
                support_phone: row.support_phone,
            })
            .unwrap_or_default())
    }

    async fn update(&self, info: &FacilityInfo) -> Result<(), FacilityInfoRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(facility_info::table)
            .values((
                facility_info::id.eq(FACILITY_ROW_ID),
                facility_info::facility_phone.eq(info.facility_phone.as_deref()),
                facility_info::support_phone.eq(info.support_phone.as_deref()),
            ))
            .on_conflict(facility_info::id)
            .do_update()
            .set((
                facility_info::facility_phone.eq(info.facility_phone.as_deref()),
                facility_info::support_phone.eq(info.support_phone.as_deref()),
                facility_info::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}
