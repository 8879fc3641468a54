//! Slot and reservation storage.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::ports::{ScheduleRepository, ScheduleRepositoryError};
use crate::domain::{
    BookingDetails, DaySettings, GridSlot, Hold, HoldToken, ManageToken, Reservation,
    ReservationId, SiteId, Slot, SlotKey, SlotState, SlotTime,
};

use super::{InMemoryYardStore, SlotIndex, SlotRecord, YardState};

fn index(key: &SlotKey) -> SlotIndex {
    (key.site_id, key.date, key.time)
}

impl YardState {
    fn held_by(&self, token: HoldToken) -> Option<SlotIndex> {
        self.slots.iter().find_map(|(idx, record)| match record.state {
            SlotState::Held { token: held, .. } if held == token => Some(*idx),
            _ => None,
        })
    }

    /// Free the reservation's slot and drop the reservation.
    fn remove_reservation(&mut self, id: ReservationId) -> Option<Reservation> {
        let reservation = self.reservations.remove(&id)?;
        let idx = (reservation.site_id, reservation.date, reservation.slot_time);
        if let Some(record) = self.slots.get_mut(&idx) {
            record.state = record.state.vacate(id);
        }
        Some(reservation)
    }
}

#[async_trait]
impl ScheduleRepository for InMemoryYardStore {
    async fn save_day(
        &self,
        settings: &DaySettings,
        slots: &[GridSlot],
    ) -> Result<usize, ScheduleRepositoryError> {
        let mut state = self.lock();
        state
            .days
            .insert((settings.site_id, settings.date), settings.clone());
        let mut created = 0;
        for slot in slots {
            let idx = (settings.site_id, settings.date, slot.time);
            if !state.slots.contains_key(&idx) {
                state.slots.insert(
                    idx,
                    SlotRecord {
                        is_workin: slot.is_workin,
                        state: SlotState::Open,
                    },
                );
                created += 1;
            }
        }
        Ok(created)
    }

    async fn day_settings(
        &self,
        site_id: SiteId,
        date: NaiveDate,
    ) -> Result<Option<DaySettings>, ScheduleRepositoryError> {
        Ok(self.lock().days.get(&(site_id, date)).cloned())
    }

    async fn list_slots(
        &self,
        site_id: SiteId,
        date: NaiveDate,
    ) -> Result<Vec<Slot>, ScheduleRepositoryError> {
        let state = self.lock();
        Ok(state
            .slots
            .range((site_id, date, SlotTime::MIDNIGHT)..)
            .take_while(|((site, day, _), _)| *site == site_id && *day == date)
            .map(|((site, day, time), record)| Slot {
                key: SlotKey {
                    site_id: *site,
                    date: *day,
                    time: *time,
                },
                is_workin: record.is_workin,
                state: record.state,
            })
            .collect())
    }

    async fn place_hold(
        &self,
        key: &SlotKey,
        token: HoldToken,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Hold, ScheduleRepositoryError> {
        let mut state = self.lock();
        let record = state
            .slots
            .get_mut(&index(key))
            .ok_or_else(|| ScheduleRepositoryError::not_found("slot not found"))?;
        record.state = record.state.hold(token, expires_at, now)?;
        Ok(Hold { token, expires_at })
    }

    async fn confirm_hold(
        &self,
        token: HoldToken,
        details: &BookingDetails,
        manage_token: ManageToken,
        now: DateTime<Utc>,
    ) -> Result<Reservation, ScheduleRepositoryError> {
        let mut state = self.lock();
        let idx = state
            .held_by(token)
            .ok_or_else(|| ScheduleRepositoryError::gone("hold expired or invalid"))?;
        let reservation_id = ReservationId::new(state.last_reservation_id + 1);
        let current = state.slots.get(&idx).map(|record| record.state);
        let next = current
            .ok_or_else(|| ScheduleRepositoryError::gone("hold expired or invalid"))?
            .confirm(token, reservation_id, now)?;

        let (site_id, date, slot_time) = idx;
        let reservation = Reservation {
            id: reservation_id,
            site_id,
            date,
            slot_time,
            details: details.clone(),
            manage_token,
            created_at: now,
        };
        state.last_reservation_id = reservation_id.get();
        state.reservations.insert(reservation_id, reservation.clone());
        if let Some(record) = state.slots.get_mut(&idx) {
            record.state = next;
        }
        Ok(reservation)
    }

    async fn release_hold(&self, token: HoldToken) -> Result<bool, ScheduleRepositoryError> {
        let mut state = self.lock();
        let Some(idx) = state.held_by(token) else {
            return Ok(false);
        };
        if let Some(record) = state.slots.get_mut(&idx) {
            record.state = record.state.release(token);
        }
        Ok(true)
    }

    async fn reassign(
        &self,
        reservation_id: ReservationId,
        target: SlotTime,
        now: DateTime<Utc>,
    ) -> Result<Reservation, ScheduleRepositoryError> {
        let mut state = self.lock();
        let reservation = state
            .reservations
            .get(&reservation_id)
            .cloned()
            .ok_or_else(|| ScheduleRepositoryError::not_found("reservation not found"))?;
        let source = (reservation.site_id, reservation.date, reservation.slot_time);
        let target_idx = (reservation.site_id, reservation.date, target);
        let occupied = state
            .slots
            .get(&target_idx)
            .ok_or_else(|| ScheduleRepositoryError::not_found("target slot not found"))?
            .state
            .occupy(reservation_id, now)?;

        if let Some(record) = state.slots.get_mut(&source) {
            record.state = record.state.vacate(reservation_id);
        }
        if let Some(record) = state.slots.get_mut(&target_idx) {
            record.state = occupied;
        }
        let updated = Reservation {
            slot_time: target,
            ..reservation
        };
        state.reservations.insert(reservation_id, updated.clone());
        Ok(updated)
    }

    async fn cancel(
        &self,
        reservation_id: ReservationId,
    ) -> Result<Reservation, ScheduleRepositoryError> {
        self.lock()
            .remove_reservation(reservation_id)
            .ok_or_else(|| ScheduleRepositoryError::not_found("reservation not found"))
    }

    async fn cancel_many_on_day(
        &self,
        site_id: SiteId,
        date: NaiveDate,
        reservation_ids: &[ReservationId],
    ) -> Result<usize, ScheduleRepositoryError> {
        let mut state = self.lock();
        let mut canceled = 0;
        for id in reservation_ids {
            let on_day = state
                .reservations
                .get(id)
                .is_some_and(|r| r.site_id == site_id && r.date == date);
            if on_day && state.remove_reservation(*id).is_some() {
                canceled += 1;
            }
        }
        Ok(canceled)
    }

    async fn list_reservations(
        &self,
        site_id: SiteId,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, ScheduleRepositoryError> {
        let state = self.lock();
        let mut reservations: Vec<Reservation> = state
            .reservations
            .values()
            .filter(|r| r.site_id == site_id && r.date == date)
            .cloned()
            .collect();
        reservations.sort_by_key(|r| (r.slot_time, r.id));
        Ok(reservations)
    }

    async fn find_by_manage_token(
        &self,
        token: ManageToken,
    ) -> Result<Option<Reservation>, ScheduleRepositoryError> {
        Ok(self
            .lock()
            .reservations
            .values()
            .find(|r| r.manage_token == token)
            .cloned())
    }
}
