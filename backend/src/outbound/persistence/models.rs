//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    facility_info, notifications, otp_codes, site_settings, sites, slot_reservations,
    time_slots, trucks,
};

// ---------------------------------------------------------------------------
// Sites and schedules
// ---------------------------------------------------------------------------

/// Row struct for the sites table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = sites)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SiteRow {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub min_interval_minutes: i32,
}

/// Row struct for reading and upserting day settings.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = site_settings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SiteSettingsRow {
    pub site_id: i32,
    pub date: NaiveDate,
    pub loads_target: i32,
    pub open_time: i32,
    pub close_time: i32,
    pub workins_per_hour: i32,
    pub paused: bool,
}

/// Row struct for reading slots.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = time_slots)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TimeSlotRow {
    pub id: i64,
    pub site_id: i32,
    pub date: NaiveDate,
    pub slot_time: i32,
    pub is_workin: bool,
    pub reserved_truck_id: Option<i64>,
    pub reserved_at: Option<DateTime<Utc>>,
    pub hold_token: Option<Uuid>,
    pub hold_expires_at: Option<DateTime<Utc>>,
}

/// Insertable struct for new slots; occupancy starts empty.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = time_slots)]
pub(crate) struct NewTimeSlotRow {
    pub site_id: i32,
    pub date: NaiveDate,
    pub slot_time: i32,
    pub is_workin: bool,
}

/// Changeset writing every occupancy column, including clears.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = time_slots)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct SlotOccupancyUpdate {
    pub reserved_truck_id: Option<i64>,
    pub reserved_at: Option<DateTime<Utc>>,
    pub hold_token: Option<Uuid>,
    pub hold_expires_at: Option<DateTime<Utc>>,
}

/// Row struct for reading reservations.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = slot_reservations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReservationRow {
    pub id: i64,
    pub site_id: i32,
    pub date: NaiveDate,
    pub slot_time: i32,
    pub license_plate: Option<String>,
    pub driver_name: Option<String>,
    pub driver_phone: Option<String>,
    pub vendor_name: Option<String>,
    pub farm_or_ticket: Option<String>,
    pub est_amount: Option<f64>,
    pub est_unit: Option<String>,
    pub manage_token: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for new reservations.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = slot_reservations)]
pub(crate) struct NewReservationRow<'a> {
    pub site_id: i32,
    pub date: NaiveDate,
    pub slot_time: i32,
    pub license_plate: Option<&'a str>,
    pub driver_name: Option<&'a str>,
    pub driver_phone: Option<&'a str>,
    pub vendor_name: Option<&'a str>,
    pub farm_or_ticket: Option<&'a str>,
    pub est_amount: Option<f64>,
    pub est_unit: Option<&'a str>,
    pub manage_token: Uuid,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Truck queue
// ---------------------------------------------------------------------------

/// Row struct for reading trucks.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = trucks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TruckRow {
    pub id: i64,
    pub site_id: i32,
    pub checkin_date: NaiveDate,
    pub phone: String,
    pub status: String,
    pub line_type: String,
    pub queue_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub enroute_at: Option<DateTime<Utc>>,
    pub arrived_at: Option<DateTime<Utc>>,
    pub loading_at: Option<DateTime<Utc>>,
    pub departed_at: Option<DateTime<Utc>>,
    pub eta_minutes: Option<i32>,
    pub eta_at: Option<DateTime<Utc>>,
    pub eta_prompted_at: Option<DateTime<Utc>>,
    pub product: Option<String>,
    pub load_number: Option<String>,
    pub bill_of_lading: Option<String>,
}

/// Insertable struct for new trucks.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = trucks)]
pub(crate) struct NewTruckRow<'a> {
    pub site_id: i32,
    pub checkin_date: NaiveDate,
    pub phone: &'a str,
    pub status: &'a str,
    pub line_type: &'a str,
    pub queue_code: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub enroute_at: Option<DateTime<Utc>>,
    pub arrived_at: Option<DateTime<Utc>>,
    pub loading_at: Option<DateTime<Utc>>,
    pub departed_at: Option<DateTime<Utc>>,
}

/// Changeset for the columns a status or ETA change touches. Only written
/// while the row is locked.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = trucks)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct TruckUpdate<'a> {
    pub status: &'a str,
    pub enroute_at: Option<DateTime<Utc>>,
    pub arrived_at: Option<DateTime<Utc>>,
    pub loading_at: Option<DateTime<Utc>>,
    pub departed_at: Option<DateTime<Utc>>,
    pub eta_minutes: Option<i32>,
    pub eta_at: Option<DateTime<Utc>>,
    pub eta_prompted_at: Option<DateTime<Utc>>,
}

/// Insertable struct for alert ledger entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub(crate) struct NewNotificationRow<'a> {
    pub truck_id: i64,
    pub kind: &'a str,
    pub message: &'a str,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Row struct for reading active login codes.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = otp_codes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OtpCodeRow {
    pub id: i64,
    pub code_hash: String,
    pub attempts_left: i32,
}

/// Insertable struct for new login codes.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = otp_codes)]
pub(crate) struct NewOtpCodeRow<'a> {
    pub phone: &'a str,
    pub code_hash: &'a str,
    pub expires_at: DateTime<Utc>,
    pub attempts_left: i32,
}

/// Row struct for the facility contact record.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = facility_info)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FacilityInfoRow {
    pub facility_phone: Option<String>,
    pub support_phone: Option<String>,
}
