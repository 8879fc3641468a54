//! Builders wiring repositories, transports, and services into HTTP state.

use std::io;
use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use yardline::config::{AppSettings, SettingsError};
use yardline::domain::ports::{
    AuthRepository, DigestLedger, EmailSender, FacilityInfoRepository, ScheduleRepository,
    SiteRepository, SmsSender, TruckRepository,
};
use yardline::domain::{
    AnomalyMonitor, PhoneLoginService, QueueService, ScheduleService, YardSeeder, default_sites,
};
use yardline::inbound::http::state::{HttpState, HttpStatePorts};
use yardline::outbound::email::{HttpEmailSender, LoggingEmailSender};
use yardline::outbound::memory::InMemoryYardStore;
use yardline::outbound::persistence::{
    DbPool, DieselAuthRepository, DieselDigestLedger, DieselFacilityInfoRepository,
    DieselScheduleRepository, DieselSiteRepository, DieselTruckRepository,
};
use yardline::outbound::sms::{LoggingSmsSender, TwilioSmsSender};

use super::ServerConfig;
use super::scheduler::spawn_monitor;

/// Driven-port implementations shared by every service.
struct Repositories<R, S, T, A, L> {
    schedule: Arc<R>,
    sites: Arc<S>,
    trucks: Arc<T>,
    auth: Arc<A>,
    ledger: Arc<L>,
    facility: Arc<dyn FacilityInfoRepository>,
}

/// Outbound message transports.
struct Transports {
    sms: Arc<dyn SmsSender>,
    email: Arc<dyn EmailSender>,
}

fn settings_error(err: SettingsError) -> io::Error {
    io::Error::other(format!("invalid configuration: {err}"))
}

fn build_transports(settings: &AppSettings) -> io::Result<Transports> {
    let timeout = settings.transport_timeout();

    let sms: Arc<dyn SmsSender> = match settings.twilio_credentials() {
        Some(credentials) => Arc::new(
            TwilioSmsSender::new(credentials, timeout)
                .map_err(|err| io::Error::other(format!("sms transport: {err}")))?,
        ),
        None => {
            warn!("twilio credentials missing; SMS will only be logged");
            Arc::new(LoggingSmsSender)
        }
    };

    let email: Arc<dyn EmailSender> = match settings.email_relay().map_err(settings_error)? {
        Some(relay) => Arc::new(
            HttpEmailSender::new(relay, timeout)
                .map_err(|err| io::Error::other(format!("email transport: {err}")))?,
        ),
        None => {
            warn!("email relay not configured; digests will only be logged");
            Arc::new(LoggingEmailSender)
        }
    };

    Ok(Transports { sms, email })
}

/// Seed reference data, build the services, and start the anomaly monitor.
async fn wire<R, S, T, A, L>(
    repos: Repositories<R, S, T, A, L>,
    config: &ServerConfig,
) -> io::Result<HttpState>
where
    R: ScheduleRepository + 'static,
    S: SiteRepository + 'static,
    T: TruckRepository + 'static,
    A: AuthRepository + 'static,
    L: DigestLedger + 'static,
{
    let settings = &config.settings;
    let calendar = settings.calendar().map_err(settings_error)?;
    let monitor_settings = settings.monitor_settings().map_err(settings_error)?;
    let Transports { sms, email } = build_transports(settings)?;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let report = YardSeeder::new(repos.sites.clone(), repos.auth.clone())
        .seed(&default_sites(), settings.admin_phone().as_ref())
        .await
        .map_err(|err| io::Error::other(format!("seeding failed: {err}")))?;
    info!(
        sites_inserted = report.sites_inserted,
        admin_granted = report.admin_granted,
        "reference data seeded"
    );

    let schedule = Arc::new(
        ScheduleService::new(repos.schedule, repos.sites.clone(), clock.clone())
            .with_calendar(calendar)
            .with_hold_window(settings.hold_window()),
    );
    let queue = Arc::new(
        QueueService::new(repos.trucks.clone(), repos.sites.clone(), clock.clone())
            .with_calendar(calendar),
    );
    let login = Arc::new(PhoneLoginService::new(repos.auth, sms.clone(), clock.clone()));
    let monitor = Arc::new(
        AnomalyMonitor::new(repos.trucks, repos.sites, repos.ledger, sms, email, clock)
            .with_calendar(calendar)
            .with_settings(monitor_settings),
    );
    spawn_monitor(monitor, config.check_period);

    Ok(HttpState::new(HttpStatePorts {
        schedule: schedule.clone(),
        schedule_query: schedule,
        queue: queue.clone(),
        queue_query: queue,
        login,
        facility: repos.facility,
    }))
}

/// Build HTTP state backed by PostgreSQL when a pool is configured, otherwise
/// by a fresh in-memory store.
pub(super) async fn build_http_state(config: &ServerConfig) -> io::Result<HttpState> {
    match &config.db_pool {
        Some(pool) => wire(diesel_repositories(pool), config).await,
        None => {
            warn!("no database configured; yard state is held in memory");
            let store = Arc::new(InMemoryYardStore::new());
            let repos = Repositories {
                schedule: store.clone(),
                sites: store.clone(),
                trucks: store.clone(),
                auth: store.clone(),
                ledger: store.clone(),
                facility: store,
            };
            wire(repos, config).await
        }
    }
}

fn diesel_repositories(
    pool: &DbPool,
) -> Repositories<
    DieselScheduleRepository,
    DieselSiteRepository,
    DieselTruckRepository,
    DieselAuthRepository,
    DieselDigestLedger,
> {
    Repositories {
        schedule: Arc::new(DieselScheduleRepository::new(pool.clone())),
        sites: Arc::new(DieselSiteRepository::new(pool.clone())),
        trucks: Arc::new(DieselTruckRepository::new(pool.clone())),
        auth: Arc::new(DieselAuthRepository::new(pool.clone())),
        ledger: Arc::new(DieselDigestLedger::new(pool.clone())),
        facility: Arc::new(DieselFacilityInfoRepository::new(pool.clone())),
    }
}
