//! Driving port for slot scheduling and reservation changes.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{
    BookingDetails, Confirmation, Error, Hold, HoldToken, ManageToken, Reservation, ReservationId,
    SiteId, SlotKey, SlotTime,
};

/// Request to (re)configure one day's schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureDayRequest {
    /// Site being configured.
    pub site_id: SiteId,
    /// Operating date.
    pub date: NaiveDate,
    /// First bookable time.
    pub open_time: SlotTime,
    /// Last bookable time (inclusive).
    pub close_time: SlotTime,
    /// Regular loads to spread across the day.
    pub loads_target: u32,
    /// Work-in slots per clock hour.
    pub workins_per_hour: u32,
    /// Pause bookings for the day.
    pub paused: bool,
}

/// Result of configuring a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayConfigured {
    /// Regular slot spacing in minutes; zero when at most one load.
    pub interval_min: u32,
    /// Slots generated by the grid.
    pub slots_generated: usize,
    /// Slots that did not exist before.
    pub slots_created: usize,
}

/// Result of a mass cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MassCancelOutcome {
    /// Identifiers submitted, whether or not they matched.
    pub canceled: usize,
}

/// Mutations of the slot table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScheduleCommand: Send + Sync {
    /// Save the day's settings and create any missing slots.
    async fn configure_day(&self, request: ConfigureDayRequest) -> Result<DayConfigured, Error>;

    /// Place a short hold on a slot.
    async fn hold(&self, key: SlotKey) -> Result<Hold, Error>;

    /// Convert a live hold into a reservation.
    async fn confirm(
        &self,
        token: HoldToken,
        details: BookingDetails,
    ) -> Result<Confirmation, Error>;

    /// Drop a hold. Unknown tokens are ignored.
    async fn release(&self, token: HoldToken) -> Result<(), Error>;

    /// Move a reservation to another slot on its day.
    async fn reassign(
        &self,
        reservation_id: ReservationId,
        target: SlotTime,
    ) -> Result<Reservation, Error>;

    /// Cancel a reservation and free its slot.
    async fn cancel(&self, reservation_id: ReservationId) -> Result<(), Error>;

    /// Cancel many reservations of one day, skipping ids that do not match.
    async fn mass_cancel(
        &self,
        site_id: SiteId,
        date: NaiveDate,
        reservation_ids: Vec<ReservationId>,
    ) -> Result<MassCancelOutcome, Error>;

    /// Cancel the reservation carrying a manage token.
    async fn cancel_by_manage_token(&self, token: ManageToken) -> Result<(), Error>;
}

/// Fixture that accepts every command without storing anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureScheduleCommand;

#[async_trait]
impl ScheduleCommand for FixtureScheduleCommand {
    async fn configure_day(&self, request: ConfigureDayRequest) -> Result<DayConfigured, Error> {
        Ok(DayConfigured {
            interval_min: crate::domain::regular_interval(
                request.open_time.minutes(),
                request.close_time.minutes(),
                request.loads_target,
                5,
            ),
            slots_generated: 0,
            slots_created: 0,
        })
    }

    async fn hold(&self, _key: SlotKey) -> Result<Hold, Error> {
        Ok(Hold {
            token: HoldToken::generate(),
            expires_at: chrono::Utc::now() + chrono::Duration::seconds(120),
        })
    }

    async fn confirm(
        &self,
        _token: HoldToken,
        _details: BookingDetails,
    ) -> Result<Confirmation, Error> {
        Err(Error::gone("hold expired or invalid"))
    }

    async fn release(&self, _token: HoldToken) -> Result<(), Error> {
        Ok(())
    }

    async fn reassign(
        &self,
        _reservation_id: ReservationId,
        _target: SlotTime,
    ) -> Result<Reservation, Error> {
        Err(Error::not_found("reservation not found"))
    }

    async fn cancel(&self, _reservation_id: ReservationId) -> Result<(), Error> {
        Err(Error::not_found("reservation not found"))
    }

    async fn mass_cancel(
        &self,
        _site_id: SiteId,
        _date: NaiveDate,
        reservation_ids: Vec<ReservationId>,
    ) -> Result<MassCancelOutcome, Error> {
        Ok(MassCancelOutcome {
            canceled: reservation_ids.len(),
        })
    }

    async fn cancel_by_manage_token(&self, _token: ManageToken) -> Result<(), Error> {
        Err(Error::not_found("reservation not found"))
    }
}
