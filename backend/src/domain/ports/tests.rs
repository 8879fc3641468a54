//! Behaviour of port fixtures and port error constructors.

use super::*;
use crate::domain::{ErrorCode, SiteCode, SiteId, SlotKey, SlotTime};
use actix_rt::System;
use chrono::NaiveDate;
use rstest::{fixture, rstest};

#[fixture]
fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date")
}

#[rstest]
fn port_error_constructors_render_messages() {
    assert_eq!(
        ScheduleRepositoryError::conflict("slot on hold").to_string(),
        "slot on hold"
    );
    assert_eq!(
        TruckRepositoryError::not_found(42_i64).to_string(),
        "truck 42 not found"
    );
    assert_eq!(
        SmsSenderError::rejected(400_u16, "bad number").to_string(),
        "sms provider rejected message with status 400: bad number"
    );
}

#[rstest]
fn fixture_schedule_command_reports_interval(date: NaiveDate) {
    let request = ConfigureDayRequest {
        site_id: SiteId::new(100),
        date,
        open_time: "07:00".parse::<SlotTime>().expect("time"),
        close_time: "17:00".parse::<SlotTime>().expect("time"),
        loads_target: 3,
        workins_per_hour: 0,
        paused: false,
    };

    System::new().block_on(async move {
        let outcome = FixtureScheduleCommand
            .configure_day(request)
            .await
            .expect("fixture accepts configuration");
        assert_eq!(outcome.interval_min, 300);
    });
}

#[rstest]
#[tokio::test]
async fn fixture_schedule_command_holds_any_slot(date: NaiveDate) {
    let key = SlotKey {
        site_id: SiteId::new(100),
        date,
        time: "09:00".parse().expect("time"),
    };
    let hold = FixtureScheduleCommand.hold(key).await.expect("hold");
    assert!(hold.expires_at > chrono::Utc::now());
}

#[rstest]
#[tokio::test]
async fn fixture_mass_cancel_counts_submissions(date: NaiveDate) {
    let ids = vec![
        crate::domain::ReservationId::new(1),
        crate::domain::ReservationId::new(2),
    ];
    let outcome = FixtureScheduleCommand
        .mass_cancel(SiteId::new(100), date, ids)
        .await
        .expect("mass cancel");
    assert_eq!(outcome.canceled, 2);
}

#[rstest]
#[tokio::test]
async fn fixture_queue_query_returns_empty_lines() {
    let site = SiteCode::new("CIF").expect("code");
    let lines = FixtureQueueQuery
        .public_lines(&site)
        .await
        .expect("public lines");
    assert_eq!(lines.total_en_route, 0);
    assert!(lines.load.queued.is_empty());
}

#[rstest]
#[tokio::test]
async fn fixture_queue_query_knows_no_codes() {
    let err = FixtureQueueQuery
        .verify_code(
            &SiteCode::new("CIF").expect("code"),
            &crate::domain::QueueCode::parse("0421").expect("valid code"),
            None,
        )
        .await
        .expect_err("fixture has no trucks");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn fixture_queue_command_reports_missing_trucks() {
    let err = FixtureQueueCommand
        .update_status(crate::domain::TruckId::new(9), crate::domain::TruckStatus::Arrived)
        .await
        .expect_err("fixture has no trucks");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn fixture_digest_ledger_never_claims(date: NaiveDate) {
    let claimed = FixtureDigestLedger
        .claim(date, chrono::Utc::now())
        .await
        .expect("claim");
    assert!(!claimed);
}

#[rstest]
#[tokio::test]
async fn fixture_site_repository_is_empty() {
    let sites = FixtureSiteRepository.list_sites().await.expect("list");
    assert!(sites.is_empty());
}
