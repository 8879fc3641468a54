//! Periodic scan for missed ETAs, long waits, and the daily digest.
//!
//! Every alert decision is safe to recompute: missed ETAs are guarded by the
//! truck's prompted timestamp, long waits by the notification ledger, and the
//! digest by a per-date ledger claim. A failed send leaves its guard untouched
//! so the next tick retries it.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use tracing::{debug, error, info, warn};

use crate::domain::ports::{
    DigestLedger, EmailMessage, EmailSender, SiteRepository, SmsSender, TruckRepository,
};
use crate::domain::{
    DailyDigest, NotificationKind, OperatingCalendar, PhoneNumber, Site, SiteDigest, Truck,
    TruckStatus,
};

/// Tunables for the anomaly tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSettings {
    /// Minutes an arrived truck may wait before staff are alerted.
    pub alert_wait_minutes: i64,
    /// Local hour at which the digest is sent.
    pub digest_hour_local: u32,
    /// Recipient of long-wait alerts.
    pub alert_sms_to: Option<PhoneNumber>,
    /// Recipient of the SMS digest.
    pub digest_sms_to: Option<PhoneNumber>,
    /// Public origin used in driver links.
    pub base_url: String,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            alert_wait_minutes: 90,
            digest_hour_local: 18,
            alert_sms_to: None,
            digest_sms_to: None,
            base_url: String::new(),
        }
    }
}

/// What one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Drivers prompted about a missed ETA.
    pub eta_prompts: usize,
    /// Long-wait alerts sent to staff.
    pub long_wait_alerts: usize,
    /// Whether this tick sent the daily digest.
    pub digest_sent: bool,
    /// Sends or lookups that failed and will be retried.
    pub failures: usize,
}

/// Runs the anomaly and digest checks against live queue state.
pub struct AnomalyMonitor<T, S, L> {
    truck_repo: Arc<T>,
    site_repo: Arc<S>,
    digest_ledger: Arc<L>,
    sms: Arc<dyn SmsSender>,
    email: Arc<dyn EmailSender>,
    clock: Arc<dyn Clock>,
    calendar: OperatingCalendar,
    settings: MonitorSettings,
}

impl<T, S, L> AnomalyMonitor<T, S, L>
where
    T: TruckRepository,
    S: SiteRepository,
    L: DigestLedger,
{
    /// Create a monitor with a UTC calendar and default settings.
    pub fn new(
        truck_repo: Arc<T>,
        site_repo: Arc<S>,
        digest_ledger: Arc<L>,
        sms: Arc<dyn SmsSender>,
        email: Arc<dyn EmailSender>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            truck_repo,
            site_repo,
            digest_ledger,
            sms,
            email,
            clock,
            calendar: OperatingCalendar::utc(),
            settings: MonitorSettings::default(),
        }
    }

    /// Use `calendar` for the operating day and digest hour.
    #[must_use]
    pub fn with_calendar(mut self, calendar: OperatingCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// Replace the tunables.
    #[must_use]
    pub fn with_settings(mut self, settings: MonitorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Run one pass over every site, then consider the digest.
    pub async fn tick(&self) -> TickReport {
        let now = self.clock.utc();
        let today = self.calendar.today(now);
        let mut report = TickReport::default();

        let sites = match self.site_repo.list_sites().await {
            Ok(sites) => sites,
            Err(err) => {
                error!(error = %err, "anomaly tick could not list sites");
                report.failures += 1;
                return report;
            }
        };

        for site in &sites {
            let trucks = match self.truck_repo.list_trucks_for_day(site.id, today).await {
                Ok(trucks) => trucks,
                Err(err) => {
                    error!(site = %site.code, error = %err, "anomaly tick could not list trucks");
                    report.failures += 1;
                    continue;
                }
            };
            for truck in &trucks {
                if is_eta_overdue(truck, now) {
                    self.prompt_missed_eta(truck, now, &mut report).await;
                }
            }
            for truck in &trucks {
                self.check_long_wait(site, truck, now, &mut report).await;
            }
        }

        if self.calendar.local_hour(now) == self.settings.digest_hour_local {
            self.maybe_send_digest(&sites, today, now, &mut report).await;
        }
        debug!(?report, "anomaly tick finished");
        report
    }

    async fn prompt_missed_eta(&self, truck: &Truck, now: DateTime<Utc>, report: &mut TickReport) {
        let message = format!(
            "Your ETA has passed. Have you arrived? Update here: {}/driver-eta.html?truck={}",
            self.settings.base_url.trim_end_matches('/'),
            truck.id
        );
        if let Err(err) = self.sms.send(&truck.phone, &message).await {
            warn!(truck_id = %truck.id, error = %err, "eta prompt sms failed");
            report.failures += 1;
            return;
        }
        match self
            .truck_repo
            .mark_eta_prompted(truck.id, &message, now)
            .await
        {
            Ok(true) => {
                info!(truck_id = %truck.id, "driver prompted about missed eta");
                report.eta_prompts += 1;
            }
            Ok(false) => debug!(truck_id = %truck.id, "eta prompt already recorded"),
            Err(err) => {
                error!(truck_id = %truck.id, error = %err, "could not record eta prompt");
                report.failures += 1;
            }
        }
    }

    async fn check_long_wait(
        &self,
        site: &Site,
        truck: &Truck,
        now: DateTime<Utc>,
        report: &mut TickReport,
    ) {
        if truck.status != TruckStatus::Arrived {
            return;
        }
        let Some(waited) = truck.minutes_since_arrival(now) else {
            return;
        };
        if waited < self.settings.alert_wait_minutes {
            return;
        }
        match self
            .truck_repo
            .has_notification(truck.id, NotificationKind::LongWait)
            .await
        {
            Ok(false) => {}
            Ok(true) => return,
            Err(err) => {
                error!(truck_id = %truck.id, error = %err, "could not read notification ledger");
                report.failures += 1;
                return;
            }
        }
        let Some(recipient) = self.settings.alert_sms_to.as_ref() else {
            debug!(truck_id = %truck.id, "long wait detected but no alert recipient configured");
            return;
        };

        let message = format!(
            "[{}] Truck {} waiting {waited} min since arrival.",
            site.code, truck.phone
        );
        if let Err(err) = self.sms.send(recipient, &message).await {
            warn!(truck_id = %truck.id, error = %err, "long wait sms failed");
            report.failures += 1;
            return;
        }
        if let Err(err) = self
            .truck_repo
            .record_notification(truck.id, NotificationKind::LongWait, &message, now)
            .await
        {
            error!(truck_id = %truck.id, error = %err, "could not record long wait alert");
            report.failures += 1;
            return;
        }
        info!(truck_id = %truck.id, site = %site.code, waited, "long wait alert sent");
        report.long_wait_alerts += 1;
    }

    async fn maybe_send_digest(
        &self,
        sites: &[Site],
        today: NaiveDate,
        now: DateTime<Utc>,
        report: &mut TickReport,
    ) {
        match self.digest_ledger.claim(today, now).await {
            Ok(true) => {}
            Ok(false) => return,
            Err(err) => {
                error!(date = %today, error = %err, "could not claim digest date");
                report.failures += 1;
                return;
            }
        }

        let mut summaries = Vec::with_capacity(sites.len());
        for site in sites {
            match self.truck_repo.list_trucks_for_day(site.id, today).await {
                Ok(trucks) => summaries.push(SiteDigest::build(site, &trucks)),
                Err(err) => {
                    error!(site = %site.code, error = %err, "digest could not list trucks");
                    report.failures += 1;
                }
            }
        }
        let digest = DailyDigest {
            date: today,
            sites: summaries,
        };

        if let Some(recipient) = self.settings.digest_sms_to.as_ref() {
            if let Err(err) = self.sms.send(recipient, &digest.sms_text()).await {
                warn!(date = %today, error = %err, "digest sms failed");
                report.failures += 1;
            }
        }
        let email = EmailMessage {
            subject: digest.subject(),
            html: digest.html(),
        };
        if let Err(err) = self.email.send(&email).await {
            warn!(date = %today, error = %err, "digest email failed");
            report.failures += 1;
        }
        info!(date = %today, sites = digest.sites.len(), "daily digest dispatched");
        report.digest_sent = true;
    }
}

fn is_eta_overdue(truck: &Truck, now: DateTime<Utc>) -> bool {
    truck.status == TruckStatus::EnRoute
        && truck.eta_prompted_at.is_none()
        && truck.eta_at.is_some_and(|due| due < now)
}

#[cfg(test)]
#[path = "anomaly_monitor_tests.rs"]
mod tests;
