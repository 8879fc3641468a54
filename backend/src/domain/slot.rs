//! Slot occupancy as an explicit state machine.
//!
//! A slot is exactly one of open, held, or reserved. Hold expiry is evaluated
//! at the moment a transition is attempted: a hold whose expiry has passed
//! behaves as open. Storage adapters load a slot under lock, ask
//! [`SlotState`] for the next state, and write it back in the same
//! transaction.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::reservation::ReservationId;
use super::site::SiteId;
use super::slot_time::SlotTime;

/// Opaque credential issued with a hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HoldToken(Uuid);

impl HoldToken {
    /// Issue a fresh random token.
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

impl fmt::Display for HoldToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for HoldToken {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Natural key of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotKey {
    /// Owning site.
    pub site_id: SiteId,
    /// Operating date.
    pub date: NaiveDate,
    /// Time within the day.
    pub time: SlotTime,
}

/// Occupancy of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Free to hold.
    Open,
    /// Claimed by a hold until `expires_at`.
    Held {
        /// Credential required to confirm or release.
        token: HoldToken,
        /// Instant after which the hold no longer counts.
        expires_at: DateTime<Utc>,
    },
    /// Occupied by a reservation.
    Reserved {
        /// Owning reservation.
        reservation_id: ReservationId,
        /// When the reservation took the slot.
        reserved_at: DateTime<Utc>,
    },
}

/// Reasons a slot transition is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SlotTransitionError {
    /// The slot belongs to a reservation.
    #[error("slot reserved")]
    Reserved,
    /// Another live hold owns the slot.
    #[error("slot on hold")]
    OnHold,
    /// The presented hold token is expired or does not own the slot.
    #[error("hold expired or invalid")]
    HoldInvalid,
}

/// Nullable column set used by relational storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotColumns {
    /// `reserved_truck_id` column (reservation reference).
    pub reservation_id: Option<i64>,
    /// `reserved_at` column.
    pub reserved_at: Option<DateTime<Utc>>,
    /// `hold_token` column.
    pub hold_token: Option<Uuid>,
    /// `hold_expires_at` column.
    pub hold_expires_at: Option<DateTime<Utc>>,
}

/// Stored columns that describe no valid state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("slot columns are inconsistent: {0}")]
pub struct SlotColumnsError(&'static str);

impl SlotState {
    /// State as seen at `now`: an expired hold reads as open.
    #[must_use]
    pub fn at(self, now: DateTime<Utc>) -> Self {
        match self {
            Self::Held { expires_at, .. } if expires_at <= now => Self::Open,
            other => other,
        }
    }

    /// Whether a new hold could be placed at `now`.
    #[must_use]
    pub fn is_available(self, now: DateTime<Utc>) -> bool {
        matches!(self.at(now), Self::Open)
    }

    /// Place a hold. Reserved slots and live holds refuse; expired holds are
    /// overwritten.
    pub fn hold(
        self,
        token: HoldToken,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Self, SlotTransitionError> {
        match self.at(now) {
            Self::Open => Ok(Self::Held { token, expires_at }),
            Self::Held { .. } => Err(SlotTransitionError::OnHold),
            Self::Reserved { .. } => Err(SlotTransitionError::Reserved),
        }
    }

    /// Turn a live hold owned by `token` into a reservation.
    pub fn confirm(
        self,
        token: HoldToken,
        reservation_id: ReservationId,
        now: DateTime<Utc>,
    ) -> Result<Self, SlotTransitionError> {
        match self.at(now) {
            Self::Held { token: held, .. } if held == token => Ok(Self::Reserved {
                reservation_id,
                reserved_at: now,
            }),
            _ => Err(SlotTransitionError::HoldInvalid),
        }
    }

    /// Drop a hold owned by `token`; any other state is left untouched.
    #[must_use]
    pub fn release(self, token: HoldToken) -> Self {
        match self {
            Self::Held { token: held, .. } if held == token => Self::Open,
            other => other,
        }
    }

    /// Occupy the slot as a reassignment target. Only a reservation blocks;
    /// any hold, live or expired, is displaced.
    pub fn occupy(
        self,
        reservation_id: ReservationId,
        now: DateTime<Utc>,
    ) -> Result<Self, SlotTransitionError> {
        match self {
            Self::Reserved { .. } => Err(SlotTransitionError::Reserved),
            Self::Open | Self::Held { .. } => Ok(Self::Reserved {
                reservation_id,
                reserved_at: now,
            }),
        }
    }

    /// Free the slot if, and only if, `reservation_id` still owns it.
    #[must_use]
    pub fn vacate(self, reservation_id: ReservationId) -> Self {
        match self {
            Self::Reserved {
                reservation_id: owner,
                ..
            } if owner == reservation_id => Self::Open,
            other => other,
        }
    }

    /// Reservation owning the slot, if any.
    #[must_use]
    pub fn reservation_id(self) -> Option<ReservationId> {
        match self {
            Self::Reserved { reservation_id, .. } => Some(reservation_id),
            _ => None,
        }
    }

    /// Rebuild a state from stored columns.
    pub fn from_columns(columns: SlotColumns) -> Result<Self, SlotColumnsError> {
        match columns {
            SlotColumns {
                reservation_id: None,
                reserved_at: None,
                hold_token: None,
                hold_expires_at: None,
            } => Ok(Self::Open),
            SlotColumns {
                reservation_id: None,
                reserved_at: None,
                hold_token: Some(token),
                hold_expires_at: Some(expires_at),
            } => Ok(Self::Held {
                token: HoldToken::from_uuid(token),
                expires_at,
            }),
            SlotColumns {
                reservation_id: Some(id),
                reserved_at: Some(reserved_at),
                hold_token: None,
                hold_expires_at: None,
            } => Ok(Self::Reserved {
                reservation_id: ReservationId::new(id),
                reserved_at,
            }),
            SlotColumns {
                reservation_id: Some(_),
                hold_token: Some(_),
                ..
            } => Err(SlotColumnsError("both hold and reservation set")),
            _ => Err(SlotColumnsError("partially populated state")),
        }
    }

    /// Flatten into stored columns.
    #[must_use]
    pub fn to_columns(self) -> SlotColumns {
        match self {
            Self::Open => SlotColumns::default(),
            Self::Held { token, expires_at } => SlotColumns {
                hold_token: Some(*token.as_uuid()),
                hold_expires_at: Some(expires_at),
                ..SlotColumns::default()
            },
            Self::Reserved {
                reservation_id,
                reserved_at,
            } => SlotColumns {
                reservation_id: Some(reservation_id.get()),
                reserved_at: Some(reserved_at),
                ..SlotColumns::default()
            },
        }
    }
}

/// A slot row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// Natural key.
    pub key: SlotKey,
    /// Work-in flag, fixed at creation.
    pub is_workin: bool,
    /// Current occupancy.
    pub state: SlotState,
}

/// A granted hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hold {
    /// Credential for confirm and release.
    pub token: HoldToken,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
#[path = "slot_tests.rs"]
mod tests;
