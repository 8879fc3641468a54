//! One-shot alert ledger entries.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::truck::{ParseTruckFieldError, TruckId};

/// Kind of alert recorded against a truck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// Driver asked about a missed ETA.
    EtaExpired,
    /// Staff told about a long wait.
    LongWait,
}

impl NotificationKind {
    /// Stored token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EtaExpired => "ETA_EXPIRED",
            Self::LongWait => "LONG_WAIT",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = ParseTruckFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ETA_EXPIRED" => Ok(Self::EtaExpired),
            "LONG_WAIT" => Ok(Self::LongWait),
            other => Err(ParseTruckFieldError::new(other)),
        }
    }
}

/// A recorded alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Truck concerned.
    pub truck_id: TruckId,
    /// Alert kind.
    pub kind: NotificationKind,
    /// Text that was sent.
    pub message: String,
    /// When it was recorded.
    pub created_at: DateTime<Utc>,
}
