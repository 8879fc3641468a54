//! Slot scheduling and reservation services.
//!
//! This module implements the [`ScheduleCommand`] and [`ScheduleQuery`]
//! driving ports. Input validation and error mapping live here; the atomic
//! slot transitions are delegated to the [`ScheduleRepository`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use mockable::Clock;
use tracing::{debug, info};

use crate::domain::ports::{
    ConfigureDayRequest, DayConfigured, MassCancelOutcome, OpenSlot, OpenSlots, ScheduleCommand,
    ScheduleQuery, ScheduleRepository, SiteRepository,
};
use crate::domain::{
    BookingDetails, Confirmation, DaySettings, Error, Hold, HoldToken, MINUTES_PER_DAY,
    ManageToken, OperatingCalendar, Reservation, ReservationId, SiteId, SlotKey, SlotTime,
    generate_time_grid,
};

/// Most work-in slots allowed per hour (one per minute).
const MAX_WORKINS_PER_HOUR: u32 = 60;

/// Default lifetime of a hold.
pub const DEFAULT_HOLD_WINDOW_SECONDS: i64 = 120;

/// Schedule service implementing the scheduling driving ports.
#[derive(Clone)]
pub struct ScheduleService<R, S> {
    schedule_repo: Arc<R>,
    site_repo: Arc<S>,
    clock: Arc<dyn Clock>,
    calendar: OperatingCalendar,
    hold_window: Duration,
}

impl<R, S> ScheduleService<R, S> {
    /// Create a service with a UTC calendar and the default hold window.
    pub fn new(schedule_repo: Arc<R>, site_repo: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            schedule_repo,
            site_repo,
            clock,
            calendar: OperatingCalendar::utc(),
            hold_window: Duration::seconds(DEFAULT_HOLD_WINDOW_SECONDS),
        }
    }

    /// Use `calendar` to resolve "today".
    #[must_use]
    pub fn with_calendar(mut self, calendar: OperatingCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// Override how long holds last.
    #[must_use]
    pub fn with_hold_window(mut self, hold_window: Duration) -> Self {
        self.hold_window = hold_window;
        self
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    fn resolve_date(&self, date: Option<NaiveDate>) -> NaiveDate {
        date.unwrap_or_else(|| self.calendar.today(self.now()))
    }
}

impl<R, S> ScheduleService<R, S>
where
    R: ScheduleRepository,
    S: SiteRepository,
{
    fn validate_day(request: &ConfigureDayRequest) -> Result<(), Error> {
        if request.loads_target > MINUTES_PER_DAY {
            return Err(Error::invalid_request(format!(
                "loads_target must be at most {MINUTES_PER_DAY}"
            )));
        }
        if request.workins_per_hour > MAX_WORKINS_PER_HOUR {
            return Err(Error::invalid_request(format!(
                "workins_per_hour must be at most {MAX_WORKINS_PER_HOUR}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl<R, S> ScheduleCommand for ScheduleService<R, S>
where
    R: ScheduleRepository,
    S: SiteRepository,
{
    async fn configure_day(&self, request: ConfigureDayRequest) -> Result<DayConfigured, Error> {
        Self::validate_day(&request)?;
        let site = self
            .site_repo
            .find_site(request.site_id)
            .await
            .map_err(Error::from)?
            .ok_or_else(|| Error::not_found(format!("site {} not found", request.site_id)))?;

        let settings = DaySettings {
            site_id: request.site_id,
            date: request.date,
            loads_target: request.loads_target,
            open_time: request.open_time,
            close_time: request.close_time,
            workins_per_hour: request.workins_per_hour,
            paused: request.paused,
        };
        let grid = generate_time_grid(&settings, site.min_interval_minutes);
        let created = self
            .schedule_repo
            .save_day(&settings, grid.slots())
            .await
            .map_err(Error::from)?;

        info!(
            site = %site.code,
            date = %request.date,
            interval_min = grid.interval_minutes(),
            generated = grid.slots().len(),
            created,
            "schedule configured"
        );
        Ok(DayConfigured {
            interval_min: grid.interval_minutes(),
            slots_generated: grid.slots().len(),
            slots_created: created,
        })
    }

    async fn hold(&self, key: SlotKey) -> Result<Hold, Error> {
        let now = self.now();
        let hold = self
            .schedule_repo
            .place_hold(&key, HoldToken::generate(), now + self.hold_window, now)
            .await
            .map_err(Error::from)?;
        debug!(site_id = %key.site_id, date = %key.date, time = %key.time, "slot held");
        Ok(hold)
    }

    async fn confirm(
        &self,
        token: HoldToken,
        details: BookingDetails,
    ) -> Result<Confirmation, Error> {
        let reservation = self
            .schedule_repo
            .confirm_hold(token, &details, ManageToken::generate(), self.now())
            .await
            .map_err(Error::from)?;
        info!(
            reservation_id = %reservation.id,
            site_id = %reservation.site_id,
            date = %reservation.date,
            time = %reservation.slot_time,
            "reservation confirmed"
        );
        Ok(Confirmation {
            reservation_id: reservation.id,
            manage_token: reservation.manage_token,
            slot_time: reservation.slot_time,
        })
    }

    async fn release(&self, token: HoldToken) -> Result<(), Error> {
        let released = self
            .schedule_repo
            .release_hold(token)
            .await
            .map_err(Error::from)?;
        debug!(released, "hold release requested");
        Ok(())
    }

    async fn reassign(
        &self,
        reservation_id: ReservationId,
        target: SlotTime,
    ) -> Result<Reservation, Error> {
        let reservation = self
            .schedule_repo
            .reassign(reservation_id, target, self.now())
            .await
            .map_err(Error::from)?;
        info!(%reservation_id, time = %target, "reservation reassigned");
        Ok(reservation)
    }

    async fn cancel(&self, reservation_id: ReservationId) -> Result<(), Error> {
        self.schedule_repo
            .cancel(reservation_id)
            .await
            .map_err(Error::from)?;
        info!(%reservation_id, "reservation cancelled");
        Ok(())
    }

    async fn mass_cancel(
        &self,
        site_id: SiteId,
        date: NaiveDate,
        reservation_ids: Vec<ReservationId>,
    ) -> Result<MassCancelOutcome, Error> {
        if reservation_ids.is_empty() {
            return Err(Error::invalid_request("reservation_ids must not be empty"));
        }
        let cancelled = self
            .schedule_repo
            .cancel_many_on_day(site_id, date, &reservation_ids)
            .await
            .map_err(Error::from)?;
        info!(
            %site_id,
            %date,
            attempted = reservation_ids.len(),
            cancelled,
            "mass cancellation applied"
        );
        Ok(MassCancelOutcome {
            canceled: reservation_ids.len(),
        })
    }

    async fn cancel_by_manage_token(&self, token: ManageToken) -> Result<(), Error> {
        let reservation = self
            .schedule_repo
            .find_by_manage_token(token)
            .await
            .map_err(Error::from)?
            .ok_or_else(|| Error::not_found("reservation not found"))?;
        self.cancel(reservation.id).await
    }
}

#[async_trait]
impl<R, S> ScheduleQuery for ScheduleService<R, S>
where
    R: ScheduleRepository,
    S: SiteRepository,
{
    async fn open_slots(
        &self,
        site_id: SiteId,
        date: Option<NaiveDate>,
    ) -> Result<OpenSlots, Error> {
        let date = self.resolve_date(date);
        let now = self.now();
        let paused = self
            .schedule_repo
            .day_settings(site_id, date)
            .await
            .map_err(Error::from)?
            .is_some_and(|settings| settings.paused);
        let slots = self
            .schedule_repo
            .list_slots(site_id, date)
            .await
            .map_err(Error::from)?
            .into_iter()
            .filter(|slot| slot.state.is_available(now))
            .map(|slot| OpenSlot {
                time: slot.key.time,
                is_workin: slot.is_workin,
            })
            .collect();
        Ok(OpenSlots {
            site_id,
            date,
            paused,
            slots,
        })
    }

    async fn appointments(
        &self,
        site_id: SiteId,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Reservation>, Error> {
        let date = self.resolve_date(date);
        self.schedule_repo
            .list_reservations(site_id, date)
            .await
            .map_err(Error::from)
    }

    async fn find_by_manage_token(&self, token: ManageToken) -> Result<Reservation, Error> {
        self.schedule_repo
            .find_by_manage_token(token)
            .await
            .map_err(Error::from)?
            .ok_or_else(|| Error::not_found("reservation not found"))
    }
}

#[cfg(test)]
#[path = "schedule_service_tests.rs"]
mod tests;
