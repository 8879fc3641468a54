//! Port for the slot table and the reservations that occupy it.
//!
//! Every method that touches a slot together with a reservation must apply
//! atomically. Adapters lock the affected slot rows, compute the next state
//! with [`crate::domain::SlotState`], and write it back in one transaction.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{
    BookingDetails, DaySettings, GridSlot, Hold, HoldToken, ManageToken, Reservation,
    ReservationId, SiteId, Slot, SlotKey, SlotTime, SlotTransitionError,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by schedule repository adapters.
    pub enum ScheduleRepositoryError for "schedule repository" {
        /// A referenced slot or reservation does not exist.
        NotFound { message: String } => "{message}" as not_found,
        /// The slot is held or reserved by someone else.
        Conflict { message: String } => "{message}" as conflict,
        /// The hold token is expired or unknown.
        Gone { message: String } => "{message}" as gone,
    }
}

impl From<SlotTransitionError> for ScheduleRepositoryError {
    fn from(error: SlotTransitionError) -> Self {
        match error {
            SlotTransitionError::Reserved | SlotTransitionError::OnHold => {
                Self::conflict(error.to_string())
            }
            SlotTransitionError::HoldInvalid => Self::gone(error.to_string()),
        }
    }
}

/// Slot and reservation storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// Replace the day's settings and insert any missing slots, in one
    /// transaction. Existing slots are never modified. Returns the number of
    /// slots newly created.
    async fn save_day(
        &self,
        settings: &DaySettings,
        slots: &[GridSlot],
    ) -> Result<usize, ScheduleRepositoryError>;

    /// Settings saved for a day.
    async fn day_settings(
        &self,
        site_id: SiteId,
        date: NaiveDate,
    ) -> Result<Option<DaySettings>, ScheduleRepositoryError>;

    /// Every slot for a day, ordered by time.
    async fn list_slots(
        &self,
        site_id: SiteId,
        date: NaiveDate,
    ) -> Result<Vec<Slot>, ScheduleRepositoryError>;

    /// Hold a slot until `expires_at`.
    ///
    /// Fails with `NotFound` for an unknown slot and `Conflict` when the slot
    /// is reserved or holds a live hold at `now`.
    async fn place_hold(
        &self,
        key: &SlotKey,
        token: HoldToken,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Hold, ScheduleRepositoryError>;

    /// Turn a live hold into a reservation. Fails with `Gone` when no slot
    /// holds `token` unexpired at `now`; no reservation is created then.
    async fn confirm_hold(
        &self,
        token: HoldToken,
        details: &BookingDetails,
        manage_token: ManageToken,
        now: DateTime<Utc>,
    ) -> Result<Reservation, ScheduleRepositoryError>;

    /// Clear any hold carrying `token`. Returns whether one was cleared.
    async fn release_hold(&self, token: HoldToken) -> Result<bool, ScheduleRepositoryError>;

    /// Move a reservation to another slot on the same day.
    ///
    /// Fails with `NotFound` when the reservation or target is absent and
    /// `Conflict` when the target is reserved.
    async fn reassign(
        &self,
        reservation_id: ReservationId,
        target: SlotTime,
        now: DateTime<Utc>,
    ) -> Result<Reservation, ScheduleRepositoryError>;

    /// Delete a reservation and free its slot. Fails with `NotFound` when
    /// absent.
    async fn cancel(
        &self,
        reservation_id: ReservationId,
    ) -> Result<Reservation, ScheduleRepositoryError>;

    /// Cancel each listed reservation that belongs to the site and date,
    /// skipping the rest. Returns the number actually cancelled.
    async fn cancel_many_on_day(
        &self,
        site_id: SiteId,
        date: NaiveDate,
        reservation_ids: &[ReservationId],
    ) -> Result<usize, ScheduleRepositoryError>;

    /// Reservations for a day, ordered by slot time.
    async fn list_reservations(
        &self,
        site_id: SiteId,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, ScheduleRepositoryError>;

    /// Reservation carrying a manage token.
    async fn find_by_manage_token(
        &self,
        token: ManageToken,
    ) -> Result<Option<Reservation>, ScheduleRepositoryError>;
}
