//! Truck queue entries and their status lifecycle.
//!
//! Status order is advisory: any actor may set any status. Each status has a
//! first-entry timestamp that is stamped once and never refreshed, whichever
//! channel (staff, driver, SMS) performs the transition.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::phone::PhoneNumber;
use super::site::SiteId;

/// Truck row identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TruckId(i64);

impl TruckId {
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

impl fmt::Display for TruckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unrecognised status or line type text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised value {0:?}")]
pub struct ParseTruckFieldError(String);

impl ParseTruckFieldError {
    pub(crate) fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

/// Queue status of a truck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TruckStatus {
    /// Legacy waiting state kept for old rows.
    Queued,
    /// Driving to the site.
    EnRoute,
    /// On site, waiting.
    Arrived,
    /// Being loaded or unloaded.
    Loading,
    /// Finished and gone.
    Departed,
}

impl TruckStatus {
    /// Statuses staff may set from the dashboard.
    pub const STAFF_SETTABLE: [Self; 4] = [Self::EnRoute, Self::Arrived, Self::Loading, Self::Departed];

    /// Stored token, e.g. `EN_ROUTE`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "QUEUED",
            Self::EnRoute => "EN_ROUTE",
            Self::Arrived => "ARRIVED",
            Self::Loading => "LOADING",
            Self::Departed => "DEPARTED",
        }
    }

    /// Whether the truck is physically in line (waiting or being served).
    #[must_use]
    pub const fn is_in_line(self) -> bool {
        matches!(self, Self::Queued | Self::Arrived | Self::Loading)
    }
}

impl fmt::Display for TruckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TruckStatus {
    type Err = ParseTruckFieldError;

    /// Accepts `EN ROUTE` as well as `EN_ROUTE`, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_ascii_uppercase().replace(' ', "_");
        match token.as_str() {
            "QUEUED" => Ok(Self::Queued),
            "EN_ROUTE" => Ok(Self::EnRoute),
            "ARRIVED" => Ok(Self::Arrived),
            "LOADING" => Ok(Self::Loading),
            "DEPARTED" => Ok(Self::Departed),
            _ => Err(ParseTruckFieldError(s.to_owned())),
        }
    }
}

/// Which line a truck joins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LineType {
    /// Outbound loading.
    #[default]
    Load,
    /// Inbound delivery.
    Deliver,
}

impl LineType {
    /// Stored token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Load => "LOAD",
            Self::Deliver => "DELIVER",
        }
    }
}

impl fmt::Display for LineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LineType {
    type Err = ParseTruckFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOAD" => Ok(Self::Load),
            "DELIVER" => Ok(Self::Deliver),
            _ => Err(ParseTruckFieldError(s.to_owned())),
        }
    }
}

/// Driver-promised arrival, in minutes from now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct EtaMinutes(u32);

/// ETA outside `1..=1440` minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("eta minutes must be between 1 and {max}, got {0}", max = EtaMinutes::MAX)]
pub struct EtaMinutesError(pub u32);

impl EtaMinutes {
    /// Longest accepted promise.
    pub const MAX: u32 = 1440;

    /// Validate a minute count.
    pub fn new(minutes: u32) -> Result<Self, EtaMinutesError> {
        if (1..=Self::MAX).contains(&minutes) {
            Ok(Self(minutes))
        } else {
            Err(EtaMinutesError(minutes))
        }
    }

    /// Raw minutes.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for EtaMinutes {
    type Error = EtaMinutesError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EtaMinutes> for u32 {
    fn from(value: EtaMinutes) -> Self {
        value.0
    }
}

/// Four-digit code a driver quotes at the scale house.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QueueCode(String);

/// Text that is not exactly four ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("queue code must be 4 digits, got {0:?}")]
pub struct QueueCodeError(String);

impl QueueCode {
    /// Digits in a code.
    pub const LEN: usize = 4;

    /// Validate a code, ignoring surrounding whitespace.
    pub fn parse(raw: &str) -> Result<Self, QueueCodeError> {
        let trimmed = raw.trim();
        if trimmed.len() == Self::LEN && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(trimmed.to_owned()))
        } else {
            Err(QueueCodeError(raw.to_owned()))
        }
    }

    /// Uniformly random code, leading zeros kept.
    #[must_use]
    pub fn random() -> Self {
        Self(format!("{:04}", rand::thread_rng().gen_range(0..10_000)))
    }

    /// Code text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for QueueCode {
    type Error = QueueCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<QueueCode> for String {
    fn from(value: QueueCode) -> Self {
        value.0
    }
}

/// Fields for a new queue entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTruck {
    /// Site joined.
    pub site_id: SiteId,
    /// Local operating date.
    pub checkin_date: NaiveDate,
    /// Driver phone.
    pub phone: PhoneNumber,
    /// Line joined.
    pub line_type: LineType,
    /// Initial status.
    pub status: TruckStatus,
    /// Scale-house code.
    pub queue_code: QueueCode,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}

/// One visit of a truck to a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Truck {
    /// Identifier.
    pub id: TruckId,
    /// Site joined.
    pub site_id: SiteId,
    /// Local operating date of the visit.
    pub checkin_date: NaiveDate,
    /// Driver phone.
    pub phone: PhoneNumber,
    /// Current status.
    pub status: TruckStatus,
    /// Line joined.
    pub line_type: LineType,
    /// Scale-house code; absent on rows created before codes were issued.
    pub queue_code: Option<QueueCode>,
    /// Row creation instant.
    pub created_at: DateTime<Utc>,
    /// First entry into `EN_ROUTE`.
    pub enroute_at: Option<DateTime<Utc>>,
    /// First entry into `ARRIVED`.
    pub arrived_at: Option<DateTime<Utc>>,
    /// First entry into `LOADING`.
    pub loading_at: Option<DateTime<Utc>>,
    /// First entry into `DEPARTED`.
    pub departed_at: Option<DateTime<Utc>>,
    /// Latest promised ETA.
    pub eta_minutes: Option<u32>,
    /// Instant the latest promise falls due.
    pub eta_at: Option<DateTime<Utc>>,
    /// When the driver was asked about a missed ETA.
    pub eta_prompted_at: Option<DateTime<Utc>>,
    /// Product carried.
    pub product: Option<String>,
    /// Load number.
    pub load_number: Option<String>,
    /// Bill of lading reference.
    pub bill_of_lading: Option<String>,
}

impl Truck {
    /// Materialise a freshly inserted row.
    #[must_use]
    pub fn from_new(id: TruckId, new: NewTruck) -> Self {
        let mut truck = Self {
            id,
            site_id: new.site_id,
            checkin_date: new.checkin_date,
            phone: new.phone,
            status: TruckStatus::Queued,
            line_type: new.line_type,
            queue_code: Some(new.queue_code),
            created_at: new.created_at,
            enroute_at: None,
            arrived_at: None,
            loading_at: None,
            departed_at: None,
            eta_minutes: None,
            eta_at: None,
            eta_prompted_at: None,
            product: None,
            load_number: None,
            bill_of_lading: None,
        };
        truck.transition_to(new.status, new.created_at);
        truck
    }

    /// Set the status and stamp its first-entry time if still unset.
    pub fn transition_to(&mut self, status: TruckStatus, now: DateTime<Utc>) {
        self.status = status;
        let stamp = match status {
            TruckStatus::Queued => return,
            TruckStatus::EnRoute => &mut self.enroute_at,
            TruckStatus::Arrived => &mut self.arrived_at,
            TruckStatus::Loading => &mut self.loading_at,
            TruckStatus::Departed => &mut self.departed_at,
        };
        stamp.get_or_insert(now);
    }

    /// Record a fresh ETA promise. Clears any previous missed-ETA prompt so the
    /// new promise is checked once.
    pub fn promise_eta(&mut self, eta: EtaMinutes, now: DateTime<Utc>) {
        self.eta_minutes = Some(eta.get());
        self.eta_at = Some(now + Duration::minutes(i64::from(eta.get())));
        self.eta_prompted_at = None;
    }

    /// Instant used to order the physical line.
    #[must_use]
    pub fn queue_anchor(&self) -> DateTime<Utc> {
        self.arrived_at.unwrap_or(self.created_at)
    }

    /// Arrival to loading, in minutes.
    #[must_use]
    pub fn wait_minutes(&self) -> Option<f64> {
        span_minutes(self.arrived_at, self.loading_at)
    }

    /// Arrival to departure, in minutes.
    #[must_use]
    pub fn total_minutes(&self) -> Option<f64> {
        span_minutes(self.arrived_at, self.departed_at)
    }

    /// Whole minutes elapsed since arrival at `now`.
    #[must_use]
    pub fn minutes_since_arrival(&self, now: DateTime<Utc>) -> Option<i64> {
        self.arrived_at
            .map(|arrived| now.signed_duration_since(arrived).num_minutes())
    }
}

/// One queue transition, applied by the repository to the stored row while it
/// holds the row, so concurrent changes compose instead of overwriting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruckChange {
    /// Status to enter, if any.
    pub status: Option<TruckStatus>,
    /// Fresh ETA promise, if any.
    pub eta: Option<EtaMinutes>,
    /// Instant of the change.
    pub at: DateTime<Utc>,
}

impl TruckChange {
    /// Enter `status` at `at`.
    #[must_use]
    pub const fn status(status: TruckStatus, at: DateTime<Utc>) -> Self {
        Self {
            status: Some(status),
            eta: None,
            at,
        }
    }

    /// Promise `eta` at `at` without touching the status.
    #[must_use]
    pub const fn eta(eta: EtaMinutes, at: DateTime<Utc>) -> Self {
        Self {
            status: None,
            eta: Some(eta),
            at,
        }
    }

    /// Also promise `eta`.
    #[must_use]
    pub const fn with_eta(mut self, eta: Option<EtaMinutes>) -> Self {
        self.eta = eta;
        self
    }

    /// Apply to the current row.
    pub fn apply_to(&self, truck: &mut Truck) {
        if let Some(status) = self.status {
            truck.transition_to(status, self.at);
        }
        if let Some(eta) = self.eta {
            truck.promise_eta(eta, self.at);
        }
    }
}

fn span_minutes(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Option<f64> {
    let (from, to) = (from?, to?);
    let millis = to.signed_duration_since(from).num_milliseconds();
    // Zero-length spans carry no signal and are excluded from averages.
    if millis == 0 {
        return None;
    }
    Some(millis as f64 / 60_000.0)
}

/// Mean of the present values, or `None` when there are none.
#[must_use]
pub fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
#[path = "truck_tests.rs"]
mod tests;
