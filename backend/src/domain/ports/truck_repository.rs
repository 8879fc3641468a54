//! Port for truck queue entries and their alert ledger.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{
    LineType, NewTruck, NotificationKind, PhoneNumber, QueueCode, SiteId, Truck, TruckChange,
    TruckId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by truck repository adapters.
    pub enum TruckRepositoryError for "truck repository" {
        /// The truck does not exist.
        NotFound { id: i64 } => "truck {id} not found" as not_found,
    }
}

/// Truck queue storage.
///
/// Each `(site, date, phone)` has at most one current entry, replaced when a
/// new row is created for the same triple. Older rows remain for history.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TruckRepository: Send + Sync {
    /// Truck by identifier.
    async fn find_truck(&self, id: TruckId) -> Result<Option<Truck>, TruckRepositoryError>;

    /// Current entry for a phone on a date, at one site or, when `site_id`
    /// is `None`, the most recently created across sites.
    async fn current_entry(
        &self,
        date: NaiveDate,
        phone: &PhoneNumber,
        site_id: Option<SiteId>,
    ) -> Result<Option<Truck>, TruckRepositoryError>;

    /// Insert a row and make it the current entry for its triple.
    async fn create_truck(&self, truck: NewTruck) -> Result<Truck, TruckRepositoryError>;

    /// Apply `change` to the stored row while holding it and return the
    /// result. Timestamps already stamped by another writer are kept.
    async fn apply_change(
        &self,
        id: TruckId,
        change: TruckChange,
    ) -> Result<Truck, TruckRepositoryError>;

    /// Latest row at a site on a date carrying `code`.
    async fn find_by_queue_code(
        &self,
        site_id: SiteId,
        date: NaiveDate,
        code: &QueueCode,
    ) -> Result<Option<Truck>, TruckRepositoryError>;

    /// All rows for a site and date, ordered by id.
    async fn list_trucks_for_day(
        &self,
        site_id: SiteId,
        date: NaiveDate,
    ) -> Result<Vec<Truck>, TruckRepositoryError>;

    /// Rows for a site across an inclusive date range, optionally one line.
    async fn list_trucks_in_range(
        &self,
        site_id: SiteId,
        start: NaiveDate,
        end: NaiveDate,
        line_type: Option<LineType>,
    ) -> Result<Vec<Truck>, TruckRepositoryError>;

    /// Whether an alert of `kind` was recorded for the truck.
    async fn has_notification(
        &self,
        truck_id: TruckId,
        kind: NotificationKind,
    ) -> Result<bool, TruckRepositoryError>;

    /// Append an alert to the ledger.
    async fn record_notification(
        &self,
        truck_id: TruckId,
        kind: NotificationKind,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<(), TruckRepositoryError>;

    /// Stamp `eta_prompted_at` and record an `ETA_EXPIRED` alert together.
    /// Does nothing and returns `false` unless the truck is still `EN_ROUTE`
    /// with an unprompted promise due before `now`, so a promise renewed
    /// after the tick read the row stays armed.
    async fn mark_eta_prompted(
        &self,
        truck_id: TruckId,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, TruckRepositoryError>;
}
