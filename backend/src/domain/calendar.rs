//! Local operating day and hour for a yard.
//!
//! Queue entries are partitioned by the local date, and the daily digest fires
//! at a local hour. Both derive from one fixed UTC offset.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Timelike, Utc};

/// Offset outside ±23:59.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("utc offset of {0} minutes is out of range")]
pub struct CalendarOffsetError(pub i32);

/// Maps instants to the yard's local calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatingCalendar {
    offset: FixedOffset,
}

impl OperatingCalendar {
    /// Calendar for a fixed offset east of UTC, in minutes.
    pub fn from_offset_minutes(minutes: i32) -> Result<Self, CalendarOffsetError> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(|offset| Self { offset })
            .ok_or(CalendarOffsetError(minutes))
    }

    /// Calendar aligned with UTC.
    #[must_use]
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    /// Local date containing `now`.
    #[must_use]
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset).date_naive()
    }

    /// Local clock hour containing `now`.
    #[must_use]
    pub fn local_hour(&self, now: DateTime<Utc>) -> u32 {
        now.with_timezone(&self.offset).hour()
    }
}

impl Default for OperatingCalendar {
    fn default() -> Self {
        Self::utc()
    }
}
