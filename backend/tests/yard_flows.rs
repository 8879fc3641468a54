//! End-to-end yard flows over the in-memory store.
//!
//! Services run against `InMemoryYardStore` with a mutable clock and
//! recording transports, so each scenario drives the same code paths the
//! binary wires up without touching the network.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use futures::future::join_all;
use rstest::{fixture, rstest};
use yardline::domain::ports::{
    ConfigureDayRequest, EnRouteRequest, InboundSms, QueueCommand, QueueQuery, ScheduleCommand,
    ScheduleQuery,
};
use yardline::domain::{
    AnomalyMonitor, BookingDetails, ErrorCode, MonitorSettings, PhoneNumber, QueueService,
    Reservation, ReservationId, ScheduleService, SiteCode, SiteId, SlotKey, SlotTime, SmsReply,
    TruckStatus, YardSeeder, default_sites,
};
use yardline::outbound::memory::InMemoryYardStore;
use yardline::test_support::{MutableClock, RecordingEmailSender, RecordingSmsSender};

type Schedule = ScheduleService<InMemoryYardStore, InMemoryYardStore>;
type Queue = QueueService<InMemoryYardStore, InMemoryYardStore>;
type Monitor = AnomalyMonitor<InMemoryYardStore, InMemoryYardStore, InMemoryYardStore>;

const SITE: SiteId = SiteId::new(100);
const DRIVER: &str = "+15155550142";

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 14, 0, 0)
        .single()
        .expect("valid start")
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date")
}

fn time(raw: &str) -> SlotTime {
    raw.parse().expect("valid slot time")
}

fn key(raw: &str) -> SlotKey {
    SlotKey {
        site_id: SITE,
        date: day(),
        time: time(raw),
    }
}

struct Yard {
    store: Arc<InMemoryYardStore>,
    clock: Arc<MutableClock>,
    sms: Arc<RecordingSmsSender>,
    schedule: Schedule,
    queue: Queue,
    monitor: Monitor,
}

impl Yard {
    async fn book(&self, at: &str) -> Reservation {
        let hold = self.schedule.hold(key(at)).await.expect("hold");
        let confirmation = self
            .schedule
            .confirm(hold.token, BookingDetails::default())
            .await
            .expect("confirm");
        self.schedule
            .find_by_manage_token(confirmation.manage_token)
            .await
            .expect("reservation")
    }

    async fn open_times(&self) -> Vec<String> {
        self.schedule
            .open_slots(SITE, Some(day()))
            .await
            .expect("open slots")
            .slots
            .iter()
            .map(|slot| slot.time.to_string())
            .collect()
    }

    async fn booked_times(&self) -> Vec<String> {
        self.schedule
            .appointments(SITE, Some(day()))
            .await
            .expect("appointments")
            .iter()
            .map(|reservation| reservation.slot_time.to_string())
            .collect()
    }
}

fn day_request(loads_target: u32) -> ConfigureDayRequest {
    ConfigureDayRequest {
        site_id: SITE,
        date: day(),
        open_time: time("08:00"),
        close_time: time("12:00"),
        loads_target,
        workins_per_hour: 0,
        paused: false,
    }
}

#[fixture]
async fn yard() -> Yard {
    let store = Arc::new(InMemoryYardStore::new());
    let clock = Arc::new(MutableClock::new(start()));
    let sms = Arc::new(RecordingSmsSender::default());
    let email = Arc::new(RecordingEmailSender::default());

    YardSeeder::new(store.clone(), store.clone())
        .seed(&default_sites(), None)
        .await
        .expect("seed sites");

    let schedule = ScheduleService::new(store.clone(), store.clone(), clock.clone());
    let queue = QueueService::new(store.clone(), store.clone(), clock.clone());
    let monitor = AnomalyMonitor::new(
        store.clone(),
        store.clone(),
        store.clone(),
        sms.clone(),
        email,
        clock.clone(),
    )
    .with_settings(MonitorSettings {
        digest_hour_local: 23,
        base_url: "https://yard.example.test".to_owned(),
        ..MonitorSettings::default()
    });

    // 08:00 to 12:00 with five loads gives hourly slots.
    schedule
        .configure_day(day_request(5))
        .await
        .expect("configure day");

    Yard {
        store,
        clock,
        sms,
        schedule,
        queue,
        monitor,
    }
}

#[rstest]
#[tokio::test]
async fn concurrent_holds_on_one_slot_admit_a_single_winner(#[future] yard: Yard) {
    let yard = yard.await;

    let attempts = join_all((0..8).map(|_| yard.schedule.hold(key("09:00")))).await;

    let winners = attempts.iter().filter(|attempt| attempt.is_ok()).count();
    assert_eq!(winners, 1);
    assert!(
        attempts
            .iter()
            .filter_map(|attempt| attempt.as_ref().err())
            .all(|err| err.code() == ErrorCode::Conflict)
    );
    assert!(!yard.open_times().await.contains(&"09:00".to_owned()));
}

#[rstest]
#[tokio::test]
async fn expired_hold_frees_the_slot(#[future] yard: Yard) {
    let yard = yard.await;
    let stale = yard.schedule.hold(key("10:00")).await.expect("first hold");

    yard.clock.advance_seconds(121);

    let fresh = yard.schedule.hold(key("10:00")).await.expect("second hold");
    assert_ne!(stale.token, fresh.token);
    let err = yard
        .schedule
        .confirm(stale.token, BookingDetails::default())
        .await
        .expect_err("stale hold");
    assert_eq!(err.code(), ErrorCode::Gone);
}

#[rstest]
#[tokio::test]
async fn failed_reassign_leaves_both_slots_untouched(#[future] yard: Yard) {
    let yard = yard.await;
    let moving = yard.book("08:00").await;
    yard.book("09:00").await;

    let err = yard
        .schedule
        .reassign(moving.id, time("09:00"))
        .await
        .expect_err("target reserved");

    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(yard.booked_times().await, ["08:00", "09:00"]);
    assert!(!yard.open_times().await.contains(&"08:00".to_owned()));
}

#[rstest]
#[tokio::test]
async fn reassign_moves_the_booking_and_frees_the_source(#[future] yard: Yard) {
    let yard = yard.await;
    let moving = yard.book("08:00").await;

    let moved = yard
        .schedule
        .reassign(moving.id, time("11:00"))
        .await
        .expect("reassign");

    assert_eq!(moved.slot_time, time("11:00"));
    assert_eq!(moved.manage_token, moving.manage_token);
    let open = yard.open_times().await;
    assert!(open.contains(&"08:00".to_owned()));
    assert!(!open.contains(&"11:00".to_owned()));
}

#[rstest]
#[tokio::test]
async fn mass_cancel_frees_every_slot(#[future] yard: Yard) {
    let yard = yard.await;
    let mut ids = Vec::new();
    for at in ["08:00", "09:00", "10:00"] {
        ids.push(yard.book(at).await.id);
    }

    let outcome = yard
        .schedule
        .mass_cancel(SITE, day(), ids)
        .await
        .expect("mass cancel");

    assert_eq!(outcome.canceled, 3);
    assert!(yard.booked_times().await.is_empty());
    assert_eq!(yard.open_times().await.len(), 5);
}

#[rstest]
#[tokio::test]
async fn mass_cancel_counts_unknown_ids_as_attempted(#[future] yard: Yard) {
    let yard = yard.await;
    let first = yard.book("08:00").await.id;
    let second = yard.book("11:00").await.id;

    let outcome = yard
        .schedule
        .mass_cancel(SITE, day(), vec![first, ReservationId::new(9_999), second])
        .await
        .expect("mass cancel");

    assert_eq!(outcome.canceled, 3);
    assert!(yard.booked_times().await.is_empty());
}

#[rstest]
#[tokio::test]
async fn cancelled_slot_can_be_held_again(#[future] yard: Yard) {
    let yard = yard.await;
    let booked = yard.book("10:00").await;

    yard.schedule.cancel(booked.id).await.expect("cancel");

    yard.schedule
        .hold(key("10:00"))
        .await
        .expect("slot is free again");
}

#[rstest]
#[tokio::test]
async fn manage_token_cancels_exactly_once(#[future] yard: Yard) {
    let yard = yard.await;
    let booked = yard.book("12:00").await;

    yard.schedule
        .cancel_by_manage_token(booked.manage_token)
        .await
        .expect("self-service cancel");

    let err = yard
        .schedule
        .find_by_manage_token(booked.manage_token)
        .await
        .expect_err("gone after cancel");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert!(yard.open_times().await.contains(&"12:00".to_owned()));
}

#[rstest]
#[tokio::test]
async fn regenerating_a_day_keeps_bookings(#[future] yard: Yard) {
    let yard = yard.await;
    yard.book("09:00").await;

    let again = yard
        .schedule
        .configure_day(day_request(5))
        .await
        .expect("regenerate");

    assert_eq!(again.slots_created, 0);
    assert_eq!(yard.booked_times().await, ["09:00"]);
}

#[rstest]
#[tokio::test]
async fn paused_day_offers_no_slots(#[future] yard: Yard) {
    let yard = yard.await;
    yard.schedule
        .configure_day(ConfigureDayRequest {
            paused: true,
            ..day_request(5)
        })
        .await
        .expect("pause");

    let open = yard
        .schedule
        .open_slots(SITE, Some(day()))
        .await
        .expect("open slots");
    assert!(open.paused);
}

#[rstest]
#[tokio::test]
async fn missed_eta_prompts_driver_once(#[future] yard: Yard) {
    let yard = yard.await;
    let reply = yard
        .queue
        .handle_sms(InboundSms {
            from: DRIVER.to_owned(),
            body: "ETA 30".to_owned(),
        })
        .await
        .expect("sms handled");
    assert!(matches!(reply, SmsReply::EtaUpdated(_)));

    yard.clock.advance_minutes(31);
    let first = yard.monitor.tick().await;
    yard.clock.advance_minutes(4);
    let second = yard.monitor.tick().await;

    assert_eq!(first.eta_prompts, 1);
    assert_eq!(second.eta_prompts, 0);
    let driver = PhoneNumber::normalize(DRIVER).expect("valid phone");
    let prompts: Vec<_> = yard
        .sms
        .sent()
        .into_iter()
        .filter(|(to, body)| *to == driver && body.contains("driver-eta.html"))
        .collect();
    assert_eq!(prompts.len(), 1);
    assert_eq!(yard.store.notifications().len(), 1);
}

#[rstest]
#[tokio::test]
async fn sms_lifecycle_drives_the_public_line(#[future] yard: Yard) {
    let yard = yard.await;
    let site = SiteCode::new("CIF").expect("valid code");
    for body in ["ETA 15", "ARRIVED"] {
        yard.queue
            .handle_sms(InboundSms {
                from: DRIVER.to_owned(),
                body: body.to_owned(),
            })
            .await
            .expect("sms handled");
    }

    let queue = yard.queue.today_queue(&site).await.expect("today queue");
    let truck = queue.trucks.first().expect("one truck");
    assert_eq!(truck.status, TruckStatus::Arrived);
    assert!(truck.arrived_at.is_some());

    yard.queue
        .handle_sms(InboundSms {
            from: DRIVER.to_owned(),
            body: "DEPARTED".to_owned(),
        })
        .await
        .expect("sms handled");
    let queue = yard.queue.today_queue(&site).await.expect("today queue");
    assert_eq!(queue.trucks[0].status, TruckStatus::Departed);
}

impl Yard {
    async fn text(&self, body: &str) -> SmsReply {
        self.queue
            .handle_sms(InboundSms {
                from: DRIVER.to_owned(),
                body: body.to_owned(),
            })
            .await
            .expect("sms handled")
    }
}

#[rstest]
#[tokio::test]
async fn renewed_eta_is_checked_again(#[future] yard: Yard) {
    let yard = yard.await;
    yard.text("ETA 30").await;
    yard.clock.advance_minutes(31);
    let first = yard.monitor.tick().await;

    yard.text("ETA 20").await;
    yard.clock.advance_minutes(10);
    let early = yard.monitor.tick().await;
    yard.clock.advance_minutes(11);
    let late = yard.monitor.tick().await;

    assert_eq!(first.eta_prompts, 1);
    assert_eq!(early.eta_prompts, 0);
    assert_eq!(late.eta_prompts, 1);
    assert_eq!(yard.store.notifications().len(), 2);
}

#[rstest]
#[tokio::test]
async fn simultaneous_staff_and_driver_updates_keep_both_stamps(#[future] yard: Yard) {
    let yard = yard.await;
    let entry = yard
        .queue
        .mark_en_route(EnRouteRequest {
            phone: DRIVER.to_owned(),
            site: SiteCode::new("CIF").expect("valid code"),
            eta: None,
        })
        .await
        .expect("en route");

    let (staff, driver) = futures::join!(
        yard.queue.update_status(entry.id, TruckStatus::Loading),
        yard.queue.handle_sms(InboundSms {
            from: DRIVER.to_owned(),
            body: "ARRIVED".to_owned(),
        }),
    );
    staff.expect("staff update");
    driver.expect("sms update");

    let queue = yard
        .queue
        .today_queue(&SiteCode::new("CIF").expect("valid code"))
        .await
        .expect("queue");
    let stored = queue
        .trucks
        .iter()
        .find(|t| t.id == entry.id)
        .expect("entry listed");
    assert_eq!(stored.loading_at, Some(start()));
    assert_eq!(stored.arrived_at, Some(start()));
    assert_eq!(stored.enroute_at, Some(start()));
}

#[rstest]
#[tokio::test]
async fn scale_code_finds_todays_entry(#[future] yard: Yard) {
    let yard = yard.await;
    let site = SiteCode::new("CIF").expect("valid code");
    let entry = yard
        .queue
        .mark_en_route(EnRouteRequest {
            phone: DRIVER.to_owned(),
            site: site.clone(),
            eta: None,
        })
        .await
        .expect("en route");
    let code = entry.queue_code.clone().expect("code issued");

    let found = yard
        .queue
        .verify_code(&site, &code, None)
        .await
        .expect("code verified");
    let other_day = yard
        .queue
        .verify_code(&site, &code, day().pred_opt())
        .await
        .expect_err("code is per day");

    assert_eq!(found.id, entry.id);
    assert_eq!(other_day.code(), ErrorCode::NotFound);
}
