//! PostgreSQL-backed `TruckRepository` implementation using Diesel ORM.
//!
//! Truck rows accumulate per day. The `current_queue_entries` table points
//! each `(site, date, phone)` triple at its live row and is replaced in the
//! same transaction that inserts a new row. Status and ETA changes lock the
//! row with `FOR UPDATE` and apply [`TruckChange`] to what is stored, so
//! concurrent writers never roll back each other's timestamps.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{TruckRepository, TruckRepositoryError};
use crate::domain::{
    LineType, NewTruck, NotificationKind, PhoneNumber, QueueCode, SiteId, Truck, TruckChange,
    TruckId, TruckStatus,
};

use super::diesel_error_mapping;
use super::models::{NewNotificationRow, TruckRow};
use super::pool::{DbPool, PoolError};
use super::row_mapping::{new_truck_row, truck_from_row, truck_update};
use super::schema::{current_queue_entries, notifications, trucks};

/// Diesel-backed implementation of the `TruckRepository` port.
#[derive(Clone)]
pub struct DieselTruckRepository {
    pool: DbPool,
}

impl DieselTruckRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TruckRepositoryError {
    diesel_error_mapping::map_pool_error(error, TruckRepositoryError::connection)
}

fn map_diesel_error(error: DieselError) -> TruckRepositoryError {
    diesel_error_mapping::map_diesel_error(
        error,
        TruckRepositoryError::query,
        TruckRepositoryError::connection,
    )
}

/// Failure inside a truck transaction. Both variants roll it back.
#[derive(Debug)]
enum TruckTxError {
    Database(DieselError),
    Rejected(TruckRepositoryError),
}

impl From<DieselError> for TruckTxError {
    fn from(error: DieselError) -> Self {
        Self::Database(error)
    }
}

impl From<TruckRepositoryError> for TruckTxError {
    fn from(error: TruckRepositoryError) -> Self {
        Self::Rejected(error)
    }
}

fn map_tx_error(error: TruckTxError) -> TruckRepositoryError {
    match error {
        TruckTxError::Database(err) => map_diesel_error(err),
        TruckTxError::Rejected(err) => err,
    }
}

async fn lock_truck(
    conn: &mut AsyncPgConnection,
    id: TruckId,
) -> Result<Option<TruckRow>, DieselError> {
    trucks::table
        .find(id.get())
        .select(TruckRow::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()
}

fn row_to_truck(row: TruckRow) -> Result<Truck, TruckRepositoryError> {
    truck_from_row(row).map_err(TruckRepositoryError::query)
}

fn rows_to_trucks(rows: Vec<TruckRow>) -> Result<Vec<Truck>, TruckRepositoryError> {
    rows.into_iter().map(row_to_truck).collect()
}

#[async_trait]
impl TruckRepository for DieselTruckRepository {
    async fn find_truck(&self, id: TruckId) -> Result<Option<Truck>, TruckRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = trucks::table
            .find(id.get())
            .select(TruckRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_truck).transpose()
    }

    async fn current_entry(
        &self,
        date: NaiveDate,
        phone: &PhoneNumber,
        site_id: Option<SiteId>,
    ) -> Result<Option<Truck>, TruckRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = current_queue_entries::table
            .inner_join(trucks::table)
            .filter(current_queue_entries::checkin_date.eq(date))
            .filter(current_queue_entries::phone.eq(phone.as_str()))
            .select(TruckRow::as_select())
            .order(trucks::id.desc())
            .into_boxed();
        if let Some(site_id) = site_id {
            query = query.filter(current_queue_entries::site_id.eq(site_id.get()));
        }
        let row = query
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_truck).transpose()
    }

    async fn create_truck(&self, truck: NewTruck) -> Result<Truck, TruckRepositoryError> {
        // Timestamps follow the initial status; the id is assigned on insert.
        let draft = Truck::from_new(TruckId::new(0), truck);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = conn
            .transaction(|conn| {
                async move {
                    let inserted: TruckRow = diesel::insert_into(trucks::table)
                        .values(new_truck_row(&draft))
                        .returning(TruckRow::as_returning())
                        .get_result(conn)
                        .await?;

                    diesel::insert_into(current_queue_entries::table)
                        .values((
                            current_queue_entries::site_id.eq(inserted.site_id),
                            current_queue_entries::checkin_date.eq(inserted.checkin_date),
                            current_queue_entries::phone.eq(&inserted.phone),
                            current_queue_entries::truck_id.eq(inserted.id),
                        ))
                        .on_conflict((
                            current_queue_entries::site_id,
                            current_queue_entries::checkin_date,
                            current_queue_entries::phone,
                        ))
                        .do_update()
                        .set(
                            current_queue_entries::truck_id
                                .eq(excluded(current_queue_entries::truck_id)),
                        )
                        .execute(conn)
                        .await?;

                    Ok::<TruckRow, DieselError>(inserted)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        row_to_truck(row)
    }

    async fn apply_change(
        &self,
        id: TruckId,
        change: TruckChange,
    ) -> Result<Truck, TruckRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                let row = lock_truck(conn, id)
                    .await?
                    .ok_or_else(|| TruckRepositoryError::not_found(id.get()))?;
                let mut truck = row_to_truck(row)?;
                change.apply_to(&mut truck);
                diesel::update(trucks::table.find(id.get()))
                    .set(truck_update(&truck))
                    .execute(conn)
                    .await?;
                Ok::<Truck, TruckTxError>(truck)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }

    async fn find_by_queue_code(
        &self,
        site_id: SiteId,
        date: NaiveDate,
        code: &QueueCode,
    ) -> Result<Option<Truck>, TruckRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = trucks::table
            .filter(trucks::site_id.eq(site_id.get()))
            .filter(trucks::checkin_date.eq(date))
            .filter(trucks::queue_code.eq(code.as_str()))
            .order(trucks::id.desc())
            .select(TruckRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_truck).transpose()
    }

    async fn list_trucks_for_day(
        &self,
        site_id: SiteId,
        date: NaiveDate,
    ) -> Result<Vec<Truck>, TruckRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<TruckRow> = trucks::table
            .filter(trucks::site_id.eq(site_id.get()))
            .filter(trucks::checkin_date.eq(date))
            .order(trucks::id.asc())
            .select(TruckRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_trucks(rows)
    }

    async fn list_trucks_in_range(
        &self,
        site_id: SiteId,
        start: NaiveDate,
        end: NaiveDate,
        line_type: Option<LineType>,
    ) -> Result<Vec<Truck>, TruckRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = trucks::table
            .filter(trucks::site_id.eq(site_id.get()))
            .filter(trucks::checkin_date.between(start, end))
            .order((trucks::checkin_date.asc(), trucks::id.asc()))
            .select(TruckRow::as_select())
            .into_boxed();
        if let Some(line) = line_type {
            query = query.filter(trucks::line_type.eq(line.as_str()));
        }
        let rows: Vec<TruckRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        rows_to_trucks(rows)
    }

    async fn has_notification(
        &self,
        truck_id: TruckId,
        kind: NotificationKind,
    ) -> Result<bool, TruckRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            notifications::table
                .filter(notifications::truck_id.eq(truck_id.get()))
                .filter(notifications::kind.eq(kind.as_str())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn record_notification(
        &self,
        truck_id: TruckId,
        kind: NotificationKind,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<(), TruckRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(notifications::table)
            .values(NewNotificationRow {
                truck_id: truck_id.get(),
                kind: kind.as_str(),
                message,
                created_at: now,
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn mark_eta_prompted(
        &self,
        truck_id: TruckId,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, TruckRepositoryError> {
        let message = message.to_owned();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                let stamped = diesel::update(
                    trucks::table
                        .find(truck_id.get())
                        .filter(trucks::status.eq(TruckStatus::EnRoute.as_str()))
                        .filter(trucks::eta_at.lt(now))
                        .filter(trucks::eta_prompted_at.is_null()),
                )
                .set(trucks::eta_prompted_at.eq(now))
                .execute(conn)
                .await?;
                if stamped == 0 {
                    return Ok(false);
                }

                diesel::insert_into(notifications::table)
                    .values(NewNotificationRow {
                        truck_id: truck_id.get(),
                        kind: NotificationKind::EtaExpired.as_str(),
                        message: &message,
                        created_at: now,
                    })
                    .execute(conn)
                    .await?;
                Ok::<bool, DieselError>(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
