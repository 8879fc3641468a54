//! Truck queue storage and the alert ledger.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::ports::{TruckRepository, TruckRepositoryError};
use crate::domain::{
    LineType, NewTruck, Notification, NotificationKind, PhoneNumber, QueueCode, SiteId, Truck,
    TruckChange, TruckId, TruckStatus,
};

use super::InMemoryYardStore;

#[async_trait]
impl TruckRepository for InMemoryYardStore {
    async fn find_truck(&self, id: TruckId) -> Result<Option<Truck>, TruckRepositoryError> {
        Ok(self.lock().trucks.get(&id).cloned())
    }

    async fn current_entry(
        &self,
        date: NaiveDate,
        phone: &PhoneNumber,
        site_id: Option<SiteId>,
    ) -> Result<Option<Truck>, TruckRepositoryError> {
        let state = self.lock();
        let id = state
            .current_entries
            .iter()
            .filter(|((site, day, owner), _)| {
                *day == date && owner == phone && site_id.is_none_or(|wanted| wanted == *site)
            })
            .map(|(_, id)| *id)
            .max();
        Ok(id.and_then(|id| state.trucks.get(&id).cloned()))
    }

    async fn create_truck(&self, truck: NewTruck) -> Result<Truck, TruckRepositoryError> {
        let mut state = self.lock();
        let id = TruckId::new(state.last_truck_id + 1);
        state.last_truck_id = id.get();
        let key = (truck.site_id, truck.checkin_date, truck.phone.clone());
        let created = Truck::from_new(id, truck);
        state.trucks.insert(id, created.clone());
        state.current_entries.insert(key, id);
        Ok(created)
    }

    async fn apply_change(
        &self,
        id: TruckId,
        change: TruckChange,
    ) -> Result<Truck, TruckRepositoryError> {
        let mut state = self.lock();
        let stored = state
            .trucks
            .get_mut(&id)
            .ok_or_else(|| TruckRepositoryError::not_found(id.get()))?;
        change.apply_to(stored);
        Ok(stored.clone())
    }

    async fn find_by_queue_code(
        &self,
        site_id: SiteId,
        date: NaiveDate,
        code: &QueueCode,
    ) -> Result<Option<Truck>, TruckRepositoryError> {
        Ok(self
            .lock()
            .trucks
            .values()
            .filter(|t| {
                t.site_id == site_id && t.checkin_date == date && t.queue_code.as_ref() == Some(code)
            })
            .max_by_key(|t| t.id)
            .cloned())
    }

    async fn list_trucks_for_day(
        &self,
        site_id: SiteId,
        date: NaiveDate,
    ) -> Result<Vec<Truck>, TruckRepositoryError> {
        Ok(self
            .lock()
            .trucks
            .values()
            .filter(|t| t.site_id == site_id && t.checkin_date == date)
            .cloned()
            .collect())
    }

    async fn list_trucks_in_range(
        &self,
        site_id: SiteId,
        start: NaiveDate,
        end: NaiveDate,
        line_type: Option<LineType>,
    ) -> Result<Vec<Truck>, TruckRepositoryError> {
        Ok(self
            .lock()
            .trucks
            .values()
            .filter(|t| {
                t.site_id == site_id
                    && (start..=end).contains(&t.checkin_date)
                    && line_type.is_none_or(|line| line == t.line_type)
            })
            .cloned()
            .collect())
    }

    async fn has_notification(
        &self,
        truck_id: TruckId,
        kind: NotificationKind,
    ) -> Result<bool, TruckRepositoryError> {
        Ok(self
            .lock()
            .notifications
            .iter()
            .any(|n| n.truck_id == truck_id && n.kind == kind))
    }

    async fn record_notification(
        &self,
        truck_id: TruckId,
        kind: NotificationKind,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<(), TruckRepositoryError> {
        self.lock().notifications.push(Notification {
            truck_id,
            kind,
            message: message.to_owned(),
            created_at: now,
        });
        Ok(())
    }

    async fn mark_eta_prompted(
        &self,
        truck_id: TruckId,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, TruckRepositoryError> {
        let mut state = self.lock();
        let truck = state
            .trucks
            .get_mut(&truck_id)
            .ok_or_else(|| TruckRepositoryError::not_found(truck_id.get()))?;
        let due = truck.eta_at.is_some_and(|eta_at| eta_at < now);
        if truck.status != TruckStatus::EnRoute || !due || truck.eta_prompted_at.is_some() {
            return Ok(false);
        }
        truck.eta_prompted_at = Some(now);
        state.notifications.push(Notification {
            truck_id,
            kind: NotificationKind::EtaExpired,
            message: message.to_owned(),
            created_at: now,
        });
        Ok(true)
    }
}
