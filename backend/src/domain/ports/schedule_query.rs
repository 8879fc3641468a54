//! Driving port for reading schedules and bookings.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{Error, ManageToken, Reservation, SiteId, SlotTime};

/// A slot free to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSlot {
    /// Slot time.
    pub time: SlotTime,
    /// Work-in flag.
    pub is_workin: bool,
}

/// Open slots for a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSlots {
    /// Site queried.
    pub site_id: SiteId,
    /// Date queried.
    pub date: NaiveDate,
    /// Whether staff paused bookings.
    pub paused: bool,
    /// Free slots ordered by time.
    pub slots: Vec<OpenSlot>,
}

/// Reads over the slot table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScheduleQuery: Send + Sync {
    /// Slots neither reserved nor under a live hold. `None` means today.
    async fn open_slots(&self, site_id: SiteId, date: Option<NaiveDate>)
    -> Result<OpenSlots, Error>;

    /// Reservations for a day ordered by slot time. `None` means today.
    async fn appointments(
        &self,
        site_id: SiteId,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Reservation>, Error>;

    /// Reservation for a manage token.
    async fn find_by_manage_token(&self, token: ManageToken) -> Result<Reservation, Error>;
}

/// Fixture with an empty calendar.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureScheduleQuery;

#[async_trait]
impl ScheduleQuery for FixtureScheduleQuery {
    async fn open_slots(
        &self,
        site_id: SiteId,
        date: Option<NaiveDate>,
    ) -> Result<OpenSlots, Error> {
        Ok(OpenSlots {
            site_id,
            date: date.unwrap_or_else(|| chrono::Utc::now().date_naive()),
            paused: false,
            slots: Vec::new(),
        })
    }

    async fn appointments(
        &self,
        _site_id: SiteId,
        _date: Option<NaiveDate>,
    ) -> Result<Vec<Reservation>, Error> {
        Ok(Vec::new())
    }

    async fn find_by_manage_token(&self, _token: ManageToken) -> Result<Reservation, Error> {
        Err(Error::not_found("reservation not found"))
    }
}
