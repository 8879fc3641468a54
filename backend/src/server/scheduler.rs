//! Periodic driver for the anomaly monitor.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use yardline::domain::{AnomalyMonitor, TickReport};
use yardline::domain::ports::{DigestLedger, SiteRepository, TruckRepository};

/// Spawn a task that ticks `monitor` every `period` on the current runtime.
///
/// Ticks never overlap: a slow tick delays the next one and missed ticks are
/// skipped rather than replayed in a burst.
pub(crate) fn spawn_monitor<T, S, L>(
    monitor: Arc<AnomalyMonitor<T, S, L>>,
    period: Duration,
) -> JoinHandle<()>
where
    T: TruckRepository + 'static,
    S: SiteRepository + 'static,
    L: DigestLedger + 'static,
{
    actix_web::rt::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(period_secs = period.as_secs(), "anomaly monitor started");
        loop {
            ticker.tick().await;
            let report = monitor.tick().await;
            if report == TickReport::default() {
                debug!("anomaly tick idle");
            } else {
                info!(
                    eta_prompts = report.eta_prompts,
                    long_wait_alerts = report.long_wait_alerts,
                    digest_sent = report.digest_sent,
                    failures = report.failures,
                    "anomaly tick"
                );
            }
        }
    })
}
