//! Minute-of-day value used for slot times and opening hours.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Minutes in one day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Validation errors for [`SlotTime`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotTimeError {
    /// Text was not `HH:MM`.
    #[error("time must be formatted as HH:MM, got {0:?}")]
    Malformed(String),
    /// Hour or minute out of range.
    #[error("time {0:?} is outside 00:00..=23:59")]
    OutOfRange(String),
}

/// A wall-clock time within a day, stored as minutes after midnight.
///
/// Serialises as zero-padded `HH:MM`, the same text stored in the slot table.
///
/// # Examples
/// ```
/// use yardline::domain::SlotTime;
///
/// let t: SlotTime = "7:05".parse().unwrap();
/// assert_eq!(t.minutes(), 425);
/// assert_eq!(t.to_string(), "07:05");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotTime(u16);

impl SlotTime {
    /// `00:00`.
    pub const MIDNIGHT: Self = Self(0);

    /// Build from minutes after midnight.
    pub fn from_minutes(minutes: u32) -> Result<Self, SlotTimeError> {
        if minutes >= MINUTES_PER_DAY {
            return Err(SlotTimeError::OutOfRange(minutes.to_string()));
        }
        u16::try_from(minutes)
            .map(Self)
            .map_err(|_| SlotTimeError::OutOfRange(minutes.to_string()))
    }

    /// Minutes after midnight.
    #[must_use]
    pub fn minutes(self) -> u32 {
        u32::from(self.0)
    }

    /// Hour component.
    #[must_use]
    pub fn hour(self) -> u32 {
        self.minutes().div_euclid(60)
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let minutes = self.minutes();
        write!(f, "{:02}:{:02}", minutes.div_euclid(60), minutes.rem_euclid(60))
    }
}

impl FromStr for SlotTime {
    type Err = SlotTimeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let (hours, minutes) = trimmed
            .split_once(':')
            .ok_or_else(|| SlotTimeError::Malformed(raw.to_owned()))?;
        let valid_part = |part: &str, max_len: usize| {
            !part.is_empty() && part.len() <= max_len && part.chars().all(|c| c.is_ascii_digit())
        };
        if !valid_part(hours, 2) || minutes.len() != 2 || !valid_part(minutes, 2) {
            return Err(SlotTimeError::Malformed(raw.to_owned()));
        }
        let hours: u32 = hours
            .parse()
            .map_err(|_| SlotTimeError::Malformed(raw.to_owned()))?;
        let minutes: u32 = minutes
            .parse()
            .map_err(|_| SlotTimeError::Malformed(raw.to_owned()))?;
        if hours > 23 || minutes > 59 {
            return Err(SlotTimeError::OutOfRange(raw.to_owned()));
        }
        Self::from_minutes(hours * 60 + minutes)
    }
}

impl TryFrom<String> for SlotTime {
    type Error = SlotTimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SlotTime> for String {
    fn from(value: SlotTime) -> Self {
        value.to_string()
    }
}
