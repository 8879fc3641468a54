//! PostgreSQL-backed `ScheduleRepository` implementation using Diesel ORM.
//!
//! Every slot transition runs in one transaction: the affected `time_slots`
//! rows are read with `SELECT ... FOR UPDATE`, the next state is computed by
//! [`SlotState`], and the occupancy columns are written back before commit.
//! Concurrent holds on the same slot therefore serialise on the row lock and
//! exactly one of them observes the slot as free.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{ScheduleRepository, ScheduleRepositoryError};
use crate::domain::{
    BookingDetails, DaySettings, GridSlot, Hold, HoldToken, ManageToken, Reservation,
    ReservationId, SiteId, Slot, SlotKey, SlotState, SlotTime, SlotTransitionError,
};

use super::diesel_error_mapping;
use super::models::{
    NewReservationRow, NewTimeSlotRow, ReservationRow, SiteSettingsRow, TimeSlotRow,
};
use super::pool::{DbPool, PoolError};
use super::row_mapping::{
    day_settings_from_row, day_settings_to_row, minute_column, occupancy_update,
    reservation_from_row, slot_from_row, slot_state_from_row,
};
use super::schema::{site_settings, slot_reservations, time_slots};

/// Diesel-backed implementation of the `ScheduleRepository` port.
#[derive(Clone)]
pub struct DieselScheduleRepository {
    pool: DbPool,
}

impl DieselScheduleRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failure inside a slot transaction: either the database failed or the
/// transition was refused. Both roll the transaction back.
#[derive(Debug)]
enum SlotTxError {
    Database(DieselError),
    Rejected(ScheduleRepositoryError),
}

impl From<DieselError> for SlotTxError {
    fn from(error: DieselError) -> Self {
        Self::Database(error)
    }
}

impl From<ScheduleRepositoryError> for SlotTxError {
    fn from(error: ScheduleRepositoryError) -> Self {
        Self::Rejected(error)
    }
}

impl From<SlotTransitionError> for SlotTxError {
    fn from(error: SlotTransitionError) -> Self {
        Self::Rejected(error.into())
    }
}

fn map_pool_error(error: PoolError) -> ScheduleRepositoryError {
    diesel_error_mapping::map_pool_error(error, ScheduleRepositoryError::connection)
}

fn map_diesel_error(error: DieselError) -> ScheduleRepositoryError {
    diesel_error_mapping::map_diesel_error(
        error,
        ScheduleRepositoryError::query,
        ScheduleRepositoryError::connection,
    )
}

fn map_tx_error(error: SlotTxError) -> ScheduleRepositoryError {
    match error {
        SlotTxError::Database(err) => map_diesel_error(err),
        SlotTxError::Rejected(err) => err,
    }
}

fn corrupt(message: String) -> ScheduleRepositoryError {
    ScheduleRepositoryError::query(message)
}

/// Lock one slot row by its natural key.
async fn lock_slot(
    conn: &mut AsyncPgConnection,
    site_id: SiteId,
    date: NaiveDate,
    time: SlotTime,
) -> Result<Option<TimeSlotRow>, DieselError> {
    time_slots::table
        .filter(time_slots::site_id.eq(site_id.get()))
        .filter(time_slots::date.eq(date))
        .filter(time_slots::slot_time.eq(minute_column(time)))
        .select(TimeSlotRow::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()
}

async fn write_state(
    conn: &mut AsyncPgConnection,
    slot_id: i64,
    state: SlotState,
) -> Result<(), DieselError> {
    diesel::update(time_slots::table.find(slot_id))
        .set(occupancy_update(state))
        .execute(conn)
        .await
        .map(|_| ())
}

/// Clear the slots owned by the given reservations. The foreign key would
/// only null `reserved_truck_id`, leaving `reserved_at` behind.
async fn vacate_slots(conn: &mut AsyncPgConnection, ids: &[i64]) -> Result<(), DieselError> {
    diesel::update(time_slots::table.filter(time_slots::reserved_truck_id.eq_any(ids)))
        .set(occupancy_update(SlotState::Open))
        .execute(conn)
        .await
        .map(|_| ())
}

#[async_trait]
impl ScheduleRepository for DieselScheduleRepository {
    async fn save_day(
        &self,
        settings: &DaySettings,
        slots: &[GridSlot],
    ) -> Result<usize, ScheduleRepositoryError> {
        let settings_row = day_settings_to_row(settings);
        let slot_rows: Vec<NewTimeSlotRow> = slots
            .iter()
            .map(|slot| NewTimeSlotRow {
                site_id: settings.site_id.get(),
                date: settings.date,
                slot_time: minute_column(slot.time),
                is_workin: slot.is_workin,
            })
            .collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let created = conn
            .transaction(|conn| {
                async move {
                    diesel::insert_into(site_settings::table)
                        .values(&settings_row)
                        .on_conflict((site_settings::site_id, site_settings::date))
                        .do_update()
                        .set((
                            site_settings::loads_target.eq(excluded(site_settings::loads_target)),
                            site_settings::open_time.eq(excluded(site_settings::open_time)),
                            site_settings::close_time.eq(excluded(site_settings::close_time)),
                            site_settings::workins_per_hour
                                .eq(excluded(site_settings::workins_per_hour)),
                            site_settings::paused.eq(excluded(site_settings::paused)),
                            site_settings::updated_at.eq(diesel::dsl::now),
                        ))
                        .execute(conn)
                        .await?;

                    if slot_rows.is_empty() {
                        return Ok::<usize, DieselError>(0);
                    }

                    diesel::insert_into(time_slots::table)
                        .values(&slot_rows)
                        .on_conflict((time_slots::site_id, time_slots::date, time_slots::slot_time))
                        .do_nothing()
                        .execute(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        debug!(
            site_id = settings.site_id.get(),
            date = %settings.date,
            created,
            "saved day settings"
        );
        Ok(created)
    }

    async fn day_settings(
        &self,
        site_id: SiteId,
        date: NaiveDate,
    ) -> Result<Option<DaySettings>, ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = site_settings::table
            .find((site_id.get(), date))
            .select(SiteSettingsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(day_settings_from_row).transpose().map_err(corrupt)
    }

    async fn list_slots(
        &self,
        site_id: SiteId,
        date: NaiveDate,
    ) -> Result<Vec<Slot>, ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<TimeSlotRow> = time_slots::table
            .filter(time_slots::site_id.eq(site_id.get()))
            .filter(time_slots::date.eq(date))
            .order(time_slots::slot_time.asc())
            .select(TimeSlotRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(slot_from_row)
            .collect::<Result<_, _>>()
            .map_err(corrupt)
    }

    async fn place_hold(
        &self,
        key: &SlotKey,
        token: HoldToken,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Hold, ScheduleRepositoryError> {
        let key = *key;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                let row = lock_slot(conn, key.site_id, key.date, key.time)
                    .await?
                    .ok_or_else(|| ScheduleRepositoryError::not_found("slot not found"))?;
                let current = slot_state_from_row(&row).map_err(corrupt)?;
                let next = current.hold(token, expires_at, now)?;
                write_state(conn, row.id, next).await?;
                Ok::<Hold, SlotTxError>(Hold { token, expires_at })
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }

    async fn confirm_hold(
        &self,
        token: HoldToken,
        details: &BookingDetails,
        manage_token: ManageToken,
        now: DateTime<Utc>,
    ) -> Result<Reservation, ScheduleRepositoryError> {
        let details = details.clone();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = conn
            .transaction(|conn| {
                async move {
                    let slot = time_slots::table
                        .filter(time_slots::hold_token.eq(token.as_uuid()))
                        .select(TimeSlotRow::as_select())
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?
                        .ok_or_else(|| ScheduleRepositoryError::gone("hold expired or invalid"))?;
                    let current = slot_state_from_row(&slot).map_err(corrupt)?;

                    // The reservation id is only known after the insert; a
                    // refused transition rolls the insert back.
                    let new_row = NewReservationRow {
                        site_id: slot.site_id,
                        date: slot.date,
                        slot_time: slot.slot_time,
                        license_plate: details.license_plate.as_deref(),
                        driver_name: details.driver_name.as_deref(),
                        driver_phone: details.driver_phone.as_ref().map(|p| p.as_str()),
                        vendor_name: details.vendor_name.as_deref(),
                        farm_or_ticket: details.farm_or_ticket.as_deref(),
                        est_amount: details.est_amount,
                        est_unit: details.est_unit.as_deref(),
                        manage_token: *manage_token.as_uuid(),
                        created_at: now,
                    };
                    let inserted: ReservationRow = diesel::insert_into(slot_reservations::table)
                        .values(&new_row)
                        .returning(ReservationRow::as_returning())
                        .get_result(conn)
                        .await?;

                    let next = current.confirm(token, ReservationId::new(inserted.id), now)?;
                    write_state(conn, slot.id, next).await?;
                    Ok::<ReservationRow, SlotTxError>(inserted)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_tx_error)?;

        reservation_from_row(row).map_err(corrupt)
    }

    async fn release_hold(&self, token: HoldToken) -> Result<bool, ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let cleared = diesel::update(
            time_slots::table.filter(time_slots::hold_token.eq(token.as_uuid())),
        )
        .set(occupancy_update(SlotState::Open))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(cleared > 0)
    }

    async fn reassign(
        &self,
        reservation_id: ReservationId,
        target: SlotTime,
        now: DateTime<Utc>,
    ) -> Result<Reservation, ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = conn
            .transaction(|conn| {
                async move {
                    let reservation: ReservationRow = slot_reservations::table
                        .find(reservation_id.get())
                        .select(ReservationRow::as_select())
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?
                        .ok_or_else(|| ScheduleRepositoryError::not_found("reservation not found"))?;

                    // Lock source and target in slot order so opposing moves
                    // cannot deadlock.
                    let target_minutes = minute_column(target);
                    let locked: Vec<TimeSlotRow> = time_slots::table
                        .filter(time_slots::site_id.eq(reservation.site_id))
                        .filter(time_slots::date.eq(reservation.date))
                        .filter(time_slots::slot_time.eq_any(vec![reservation.slot_time, target_minutes]))
                        .order(time_slots::slot_time.asc())
                        .select(TimeSlotRow::as_select())
                        .for_update()
                        .load(conn)
                        .await?;

                    let target_row = locked
                        .iter()
                        .find(|row| row.slot_time == target_minutes)
                        .ok_or_else(|| ScheduleRepositoryError::not_found("target slot not found"))?;
                    let occupied = slot_state_from_row(target_row)
                        .map_err(corrupt)?
                        .occupy(reservation_id, now)?;

                    if let Some(source) = locked
                        .iter()
                        .find(|row| row.slot_time == reservation.slot_time)
                    {
                        let vacated = slot_state_from_row(source)
                            .map_err(corrupt)?
                            .vacate(reservation_id);
                        write_state(conn, source.id, vacated).await?;
                    }
                    write_state(conn, target_row.id, occupied).await?;

                    let updated: ReservationRow =
                        diesel::update(slot_reservations::table.find(reservation_id.get()))
                            .set(slot_reservations::slot_time.eq(target_minutes))
                            .returning(ReservationRow::as_returning())
                            .get_result(conn)
                            .await?;
                    Ok::<ReservationRow, SlotTxError>(updated)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_tx_error)?;

        reservation_from_row(row).map_err(corrupt)
    }

    async fn cancel(
        &self,
        reservation_id: ReservationId,
    ) -> Result<Reservation, ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = conn
            .transaction(|conn| {
                async move {
                    vacate_slots(conn, &[reservation_id.get()]).await?;
                    let deleted: ReservationRow =
                        diesel::delete(slot_reservations::table.find(reservation_id.get()))
                            .returning(ReservationRow::as_returning())
                            .get_result(conn)
                            .await
                            .optional()?
                            .ok_or_else(|| {
                                ScheduleRepositoryError::not_found("reservation not found")
                            })?;
                    Ok::<ReservationRow, SlotTxError>(deleted)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_tx_error)?;

        reservation_from_row(row).map_err(corrupt)
    }

    async fn cancel_many_on_day(
        &self,
        site_id: SiteId,
        date: NaiveDate,
        reservation_ids: &[ReservationId],
    ) -> Result<usize, ScheduleRepositoryError> {
        let requested: Vec<i64> = reservation_ids.iter().map(|id| id.get()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                let owned: Vec<i64> = slot_reservations::table
                    .filter(slot_reservations::site_id.eq(site_id.get()))
                    .filter(slot_reservations::date.eq(date))
                    .filter(slot_reservations::id.eq_any(&requested))
                    .select(slot_reservations::id)
                    .for_update()
                    .load(conn)
                    .await?;
                if owned.is_empty() {
                    return Ok(0);
                }
                vacate_slots(conn, &owned).await?;
                diesel::delete(slot_reservations::table.filter(slot_reservations::id.eq_any(&owned)))
                    .execute(conn)
                    .await
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn list_reservations(
        &self,
        site_id: SiteId,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ReservationRow> = slot_reservations::table
            .filter(slot_reservations::site_id.eq(site_id.get()))
            .filter(slot_reservations::date.eq(date))
            .order((slot_reservations::slot_time.asc(), slot_reservations::id.asc()))
            .select(ReservationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(reservation_from_row)
            .collect::<Result<_, _>>()
            .map_err(corrupt)
    }

    async fn find_by_manage_token(
        &self,
        token: ManageToken,
    ) -> Result<Option<Reservation>, ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = slot_reservations::table
            .filter(slot_reservations::manage_token.eq(token.as_uuid()))
            .select(ReservationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(reservation_from_row).transpose().map_err(corrupt)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for transaction error mapping.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let err = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(err, ScheduleRepositoryError::Connection { .. }));
        assert!(err.to_string().contains("connection refused"));
    }

    #[rstest]
    #[case(SlotTransitionError::Reserved, "conflict")]
    #[case(SlotTransitionError::OnHold, "conflict")]
    #[case(SlotTransitionError::HoldInvalid, "gone")]
    fn refused_transitions_keep_their_kind(
        #[case] refusal: SlotTransitionError,
        #[case] expected: &str,
    ) {
        let err = map_tx_error(SlotTxError::from(refusal));
        let kind = match err {
            ScheduleRepositoryError::Conflict { .. } => "conflict",
            ScheduleRepositoryError::Gone { .. } => "gone",
            _ => "other",
        };
        assert_eq!(kind, expected);
    }

    #[rstest]
    fn database_failure_inside_transaction_maps_to_query_error() {
        let err = map_tx_error(SlotTxError::from(DieselError::RollbackTransaction));
        assert!(matches!(err, ScheduleRepositoryError::Query { .. }));
    }
}
