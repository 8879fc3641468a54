//! Sites and their per-day schedule settings.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::slot_time::SlotTime;

/// Numeric site identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(i32);

impl SiteId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Raw identifier.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validation errors for [`SiteCode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SiteCodeError {
    /// Empty after trimming.
    #[error("site code must not be empty")]
    Empty,
    /// Contains characters other than ASCII letters and digits.
    #[error("site code {0:?} must be alphanumeric")]
    InvalidCharacters(String),
    /// Longer than [`SiteCode::MAX_LEN`].
    #[error("site code {0:?} is longer than 8 characters")]
    TooLong(String),
}

/// External site key such as `CIF` or `CCR`, always upper case.
///
/// # Examples
/// ```
/// use yardline::domain::SiteCode;
///
/// let code = SiteCode::new(" ccr ").unwrap();
/// assert_eq!(code.as_str(), "CCR");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SiteCode(String);

impl SiteCode {
    /// Longest accepted code.
    pub const MAX_LEN: usize = 8;

    /// Validate and upper-case a code.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, SiteCodeError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(SiteCodeError::Empty);
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(SiteCodeError::InvalidCharacters(trimmed.to_owned()));
        }
        if trimmed.len() > Self::MAX_LEN {
            return Err(SiteCodeError::TooLong(trimmed.to_owned()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Borrow the code text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SiteCode {
    type Error = SiteCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SiteCode> for String {
    fn from(value: SiteCode) -> Self {
        value.0
    }
}

/// A receiving or shipping site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    /// Identifier.
    pub id: SiteId,
    /// External code.
    pub code: SiteCode,
    /// Display name.
    pub name: String,
    /// Floor applied to the regular slot interval.
    pub min_interval_minutes: u32,
}

/// Inputs for one site's schedule on one date.
///
/// Saving settings for an existing `(site, date)` replaces every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySettings {
    /// Site the schedule belongs to.
    pub site_id: SiteId,
    /// Operating date.
    pub date: NaiveDate,
    /// Number of regular loads to spread across the day.
    pub loads_target: u32,
    /// First bookable time.
    pub open_time: SlotTime,
    /// Last bookable time (inclusive).
    pub close_time: SlotTime,
    /// Work-in slots per clock hour.
    pub workins_per_hour: u32,
    /// Whether staff have paused bookings for the day.
    pub paused: bool,
}
