//! Durable bookings created from confirmed holds.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::phone::PhoneNumber;
use super::site::SiteId;
use super::slot_time::SlotTime;

/// Reservation identifier assigned by storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(i64);

impl ReservationId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Credential a driver uses to manage their own booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManageToken(Uuid);

impl ManageToken {
    /// Issue a fresh token.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap a stored token.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ManageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ManageToken {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Driver, vehicle, and load details captured at confirmation.
///
/// Every field is optional. Blank strings collapse to `None` and the unit is
/// upper-cased.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    /// Vehicle licence plate.
    pub license_plate: Option<String>,
    /// Driver name.
    pub driver_name: Option<String>,
    /// Driver contact number.
    pub driver_phone: Option<PhoneNumber>,
    /// Vendor or hauler.
    pub vendor_name: Option<String>,
    /// Farm name or scale ticket.
    pub farm_or_ticket: Option<String>,
    /// Estimated quantity.
    pub est_amount: Option<f64>,
    /// Unit of `est_amount`, e.g. `BU`.
    pub est_unit: Option<String>,
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}

impl BookingDetails {
    /// Build details from raw request fields.
    #[must_use]
    pub fn from_raw(
        license_plate: Option<String>,
        driver_name: Option<String>,
        driver_phone: Option<String>,
        vendor_name: Option<String>,
        farm_or_ticket: Option<String>,
        est_amount: Option<f64>,
        est_unit: Option<String>,
    ) -> Self {
        Self {
            license_plate: clean(license_plate),
            driver_name: clean(driver_name),
            driver_phone: driver_phone.as_deref().and_then(PhoneNumber::normalize),
            vendor_name: clean(vendor_name),
            farm_or_ticket: clean(farm_or_ticket),
            est_amount: est_amount.filter(|amount| amount.is_finite() && *amount != 0.0),
            est_unit: clean(est_unit).map(|unit| unit.to_uppercase()),
        }
    }
}

/// A booking occupying one slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    /// Identifier.
    pub id: ReservationId,
    /// Site of the occupied slot.
    pub site_id: SiteId,
    /// Date of the occupied slot.
    pub date: NaiveDate,
    /// Time of the occupied slot; follows the slot on reassignment.
    pub slot_time: SlotTime,
    /// Captured booking details.
    #[serde(flatten)]
    pub details: BookingDetails,
    /// Self-service credential.
    pub manage_token: ManageToken,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}

/// Outcome of a successful confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    /// New reservation.
    pub reservation_id: ReservationId,
    /// Self-service credential.
    pub manage_token: ManageToken,
    /// Booked time.
    pub slot_time: SlotTime,
}
