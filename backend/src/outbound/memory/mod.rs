//! In-process adapters for every driven port.
//!
//! [`InMemoryYardStore`] keeps the whole yard behind one mutex, so each port
//! call is trivially atomic. Slot transitions go through the same
//! [`crate::domain::SlotState`] rules as the PostgreSQL adapters. Used when no
//! database is configured and by the integration tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{
    DaySettings, FacilityInfo, Notification, PhoneNumber, Reservation, ReservationId, Site,
    SiteId, SlotState, SlotTime, Truck, TruckId,
};

mod accounts;
mod schedule;
mod trucks;

type SlotIndex = (SiteId, NaiveDate, SlotTime);

#[derive(Debug, Clone, Copy)]
struct SlotRecord {
    is_workin: bool,
    state: SlotState,
}

#[derive(Debug, Clone, Default)]
struct UserRecord {
    is_banned: bool,
    last_login_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
struct OtpRecord {
    id: i64,
    phone: PhoneNumber,
    code_hash: String,
    expires_at: DateTime<Utc>,
    attempts_left: u32,
    consumed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct YardState {
    sites: BTreeMap<SiteId, Site>,
    days: HashMap<(SiteId, NaiveDate), DaySettings>,
    slots: BTreeMap<SlotIndex, SlotRecord>,
    reservations: BTreeMap<ReservationId, Reservation>,
    last_reservation_id: i64,
    trucks: BTreeMap<TruckId, Truck>,
    current_entries: HashMap<(SiteId, NaiveDate, PhoneNumber), TruckId>,
    last_truck_id: i64,
    notifications: Vec<Notification>,
    digest_dates: HashSet<NaiveDate>,
    users: HashMap<PhoneNumber, UserRecord>,
    admins: HashSet<PhoneNumber>,
    otp_codes: Vec<OtpRecord>,
    last_otp_id: i64,
    facility: FacilityInfo,
}

/// Shared in-memory store. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryYardStore {
    state: Arc<Mutex<YardState>>,
}

impl InMemoryYardStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `phone` as banned, creating its user row if needed.
    pub fn ban(&self, phone: &PhoneNumber) {
        self.lock().users.entry(phone.clone()).or_default().is_banned = true;
    }

    /// Recorded alerts, oldest first.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().notifications.clone()
    }

    /// Last successful login for `phone`.
    #[must_use]
    pub fn last_login(&self, phone: &PhoneNumber) -> Option<DateTime<Utc>> {
        self.lock()
            .users
            .get(phone)
            .and_then(|user| user.last_login_at)
    }

    fn lock(&self) -> MutexGuard<'_, YardState> {
        // Mutations are computed before they are stored, so a poisoned
        // guard still holds consistent data.
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
