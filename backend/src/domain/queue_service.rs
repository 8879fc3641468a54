//! Truck queue services.
//!
//! Implements [`QueueCommand`] and [`QueueQuery`]. Staff actions, the driver
//! self-service endpoint, and inbound SMS all express their effect as a
//! [`TruckChange`] that the repository applies to the stored row, so
//! first-entry timestamps behave identically whichever channel moves a truck
//! and simultaneous writers cannot undo each other.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    EnRouteRequest, InboundSms, QueueCommand, QueueQuery, SiteRepository, TruckRepository,
};
use crate::domain::{
    Error, EtaMinutes, HistoryQuery, HistoryReport, LineType, LineView, NewTruck,
    OperatingCalendar, PhoneNumber, PublicLine, PublicLines, QueueCode, Site, SiteCode,
    SmsCommand, SmsHints, SmsReply, TodayQueue, Truck, TruckChange, TruckId, TruckStatus,
};

/// Queue service implementing the truck queue driving ports.
#[derive(Clone)]
pub struct QueueService<T, S> {
    truck_repo: Arc<T>,
    site_repo: Arc<S>,
    clock: Arc<dyn Clock>,
    calendar: OperatingCalendar,
}

impl<T, S> QueueService<T, S> {
    /// Create a service with a UTC calendar.
    pub fn new(truck_repo: Arc<T>, site_repo: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            truck_repo,
            site_repo,
            clock,
            calendar: OperatingCalendar::utc(),
        }
    }

    /// Use `calendar` to resolve the operating day.
    #[must_use]
    pub fn with_calendar(mut self, calendar: OperatingCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.calendar.today(now)
    }
}

impl<T, S> QueueService<T, S>
where
    T: TruckRepository,
    S: SiteRepository,
{
    async fn site_by_code(&self, code: &SiteCode) -> Result<Site, Error> {
        self.site_repo
            .find_site_by_code(code)
            .await
            .map_err(Error::from)?
            .ok_or_else(|| Error::not_found(format!("unknown site {code}")))
    }

    async fn apply(&self, id: TruckId, change: TruckChange) -> Result<Truck, Error> {
        self.truck_repo
            .apply_change(id, change)
            .await
            .map_err(Error::from)
    }

    async fn create(
        &self,
        site: &Site,
        phone: PhoneNumber,
        line_type: LineType,
        now: DateTime<Utc>,
    ) -> Result<Truck, Error> {
        let truck = self
            .truck_repo
            .create_truck(NewTruck {
                site_id: site.id,
                checkin_date: self.today(now),
                phone,
                line_type,
                status: TruckStatus::EnRoute,
                queue_code: QueueCode::random(),
                created_at: now,
            })
            .await
            .map_err(Error::from)?;
        info!(
            truck_id = %truck.id,
            site = %site.code,
            line = %line_type,
            queue_code = ?truck.queue_code,
            "queue entry created"
        );
        Ok(truck)
    }

    /// Today's current entry for `phone`, or a new one at the hinted site.
    async fn sms_entry(
        &self,
        phone: &PhoneNumber,
        hints: &SmsHints,
        now: DateTime<Utc>,
    ) -> Result<Option<Truck>, Error> {
        let existing = self
            .truck_repo
            .current_entry(self.today(now), phone, None)
            .await
            .map_err(Error::from)?;
        if existing.is_some() {
            return Ok(existing);
        }
        let sites = self
            .site_repo
            .list_sites()
            .await
            .map_err(Error::from)?;
        let site = sites
            .iter()
            .find(|site| hints.mentions_site(&site.code))
            .or_else(|| sites.first());
        match site {
            Some(site) => self
                .create(site, phone.clone(), hints.line_type(), now)
                .await
                .map(Some),
            None => Ok(None),
        }
    }

    fn sms_change(
        truck: &Truck,
        command: SmsCommand,
        now: DateTime<Utc>,
    ) -> (SmsReply, Option<TruckChange>) {
        match command {
            SmsCommand::Arrived => (
                SmsReply::Arrived,
                Some(TruckChange::status(TruckStatus::Arrived, now)),
            ),
            SmsCommand::Loading => (
                SmsReply::Loading(truck.line_type),
                Some(TruckChange::status(TruckStatus::Loading, now)),
            ),
            SmsCommand::Departed => (
                SmsReply::Departed,
                Some(TruckChange::status(TruckStatus::Departed, now)),
            ),
            SmsCommand::Cancel => (
                SmsReply::Canceled,
                Some(TruckChange::status(TruckStatus::Departed, now)),
            ),
            SmsCommand::SetEta(minutes) => match EtaMinutes::new(minutes) {
                Ok(eta) => (
                    SmsReply::EtaUpdated(eta),
                    Some(TruckChange::status(TruckStatus::EnRoute, now).with_eta(Some(eta))),
                ),
                Err(_) => (SmsReply::EtaInvalid, None),
            },
            SmsCommand::Help => (SmsReply::Help, None),
            SmsCommand::Unknown => (SmsReply::Unknown, None),
        }
    }
}

#[async_trait]
impl<T, S> QueueCommand for QueueService<T, S>
where
    T: TruckRepository,
    S: SiteRepository,
{
    async fn update_status(&self, truck_id: TruckId, status: TruckStatus) -> Result<Truck, Error> {
        if !TruckStatus::STAFF_SETTABLE.contains(&status) {
            return Err(Error::invalid_request(format!("invalid status {status}")));
        }
        let truck = self
            .apply(truck_id, TruckChange::status(status, self.now()))
            .await?;
        info!(%truck_id, %status, "status updated by staff");
        Ok(truck)
    }

    async fn set_eta(&self, truck_id: TruckId, eta: EtaMinutes) -> Result<Truck, Error> {
        let truck = self.apply(truck_id, TruckChange::eta(eta, self.now())).await?;
        info!(%truck_id, eta_minutes = eta.get(), "eta set by staff");
        Ok(truck)
    }

    async fn mark_en_route(&self, request: EnRouteRequest) -> Result<Truck, Error> {
        let phone = PhoneNumber::normalize(&request.phone)
            .ok_or_else(|| Error::invalid_request("phone required"))?;
        let site = self.site_by_code(&request.site).await?;
        let now = self.now();

        let current = self
            .truck_repo
            .current_entry(self.today(now), &phone, Some(site.id))
            .await
            .map_err(Error::from)?;
        let entry = match current {
            Some(truck) => truck,
            None => self.create(&site, phone, LineType::Load, now).await?,
        };
        let change = TruckChange::status(TruckStatus::EnRoute, now).with_eta(request.eta);
        let truck = self.apply(entry.id, change).await?;
        info!(truck_id = %truck.id, site = %site.code, "driver en route");
        Ok(truck)
    }

    async fn handle_sms(&self, message: InboundSms) -> Result<SmsReply, Error> {
        let body = message.body.trim();
        let Some(phone) = PhoneNumber::normalize(&message.from) else {
            return Ok(SmsReply::MissingFields);
        };
        if body.is_empty() {
            return Ok(SmsReply::MissingFields);
        }

        let now = self.now();
        let command = SmsCommand::classify(body);
        let hints = SmsHints::new(body);
        let Some(entry) = self.sms_entry(&phone, &hints, now).await? else {
            return Ok(SmsReply::NoSites);
        };

        let (reply, change) = Self::sms_change(&entry, command, now);
        if let Some(change) = change {
            let truck = self.apply(entry.id, change).await?;
            info!(truck_id = %truck.id, status = %truck.status, "status updated by sms");
        }
        Ok(reply)
    }
}

#[async_trait]
impl<T, S> QueueQuery for QueueService<T, S>
where
    T: TruckRepository,
    S: SiteRepository,
{
    async fn today_queue(&self, site: &SiteCode) -> Result<TodayQueue, Error> {
        let site = self.site_by_code(site).await?;
        let trucks = self
            .truck_repo
            .list_trucks_for_day(site.id, self.today(self.now()))
            .await
            .map_err(Error::from)?;
        Ok(TodayQueue {
            site: site.code,
            count: trucks.len(),
            trucks,
        })
    }

    async fn public_line(&self, site: &SiteCode, line: LineType) -> Result<PublicLine, Error> {
        let site = self.site_by_code(site).await?;
        let trucks = self
            .truck_repo
            .list_trucks_for_day(site.id, self.today(self.now()))
            .await
            .map_err(Error::from)?;
        Ok(PublicLine {
            site: site.code,
            line_type: line,
            line: LineView::build(&trucks, line),
        })
    }

    async fn public_lines(&self, site: &SiteCode) -> Result<PublicLines, Error> {
        let site = self.site_by_code(site).await?;
        let trucks = self
            .truck_repo
            .list_trucks_for_day(site.id, self.today(self.now()))
            .await
            .map_err(Error::from)?;
        Ok(PublicLines::build(site.code, &trucks))
    }

    async fn history(&self, site: &SiteCode, query: HistoryQuery) -> Result<HistoryReport, Error> {
        if query.start > query.end {
            return Err(Error::invalid_request("start must not be after end"));
        }
        let site = self.site_by_code(site).await?;
        let trucks = self
            .truck_repo
            .list_trucks_in_range(site.id, query.start, query.end, query.filter.line_type())
            .await
            .map_err(Error::from)?;
        Ok(HistoryReport::build(site.code, query, trucks))
    }

    async fn verify_code(
        &self,
        site: &SiteCode,
        code: &QueueCode,
        date: Option<NaiveDate>,
    ) -> Result<Truck, Error> {
        let site = self.site_by_code(site).await?;
        let date = date.unwrap_or_else(|| self.today(self.now()));
        self.truck_repo
            .find_by_queue_code(site.id, date, code)
            .await
            .map_err(Error::from)?
            .ok_or_else(|| {
                Error::not_found(format!("no truck with code {code} at {} on {date}", site.code))
            })
    }
}

#[cfg(test)]
#[path = "queue_service_tests.rs"]
mod tests;
