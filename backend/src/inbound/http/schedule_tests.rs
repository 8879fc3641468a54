//! Tests for slot scheduling HTTP handlers.

use super::*;
use crate::domain::ports::{MockScheduleCommand, MockScheduleQuery};
use crate::domain::SlotTime;
use crate::domain::ports::OpenSlot;
use crate::inbound::http::auth::verify_code;
use crate::inbound::http::state::HttpStatePorts;
use crate::inbound::http::test_utils::{login_cookie, test_session_middleware};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test};
use chrono::{NaiveDate, Utc};
use serde_json::{Value, json};
use std::sync::Arc;

fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .service(
            web::scope("/api/v1")
                .service(verify_code)
                .service(configure_day)
                .service(open_slots)
                .service(appointments)
                .service(hold_slot)
                .service(confirm_hold)
                .service(release_hold)
                .service(reassign)
                .service(cancel_reservation)
                .service(mass_cancel)
                .service(get_managed)
                .service(cancel_managed),
        )
}

fn with_schedule(command: MockScheduleCommand) -> HttpState {
    HttpState::new(HttpStatePorts {
        schedule: Arc::new(command),
        ..HttpStatePorts::default()
    })
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date")
}

fn time(raw: &str) -> SlotTime {
    raw.parse().expect("valid time")
}

#[actix_web::test]
async fn hold_returns_token_and_expiry() {
    let mut command = MockScheduleCommand::new();
    command
        .expect_hold()
        .withf(|key| key.site_id == SiteId::new(1) && key.time.minutes() == 435)
        .times(1)
        .returning(|_| {
            Ok(Hold {
                token: HoldToken::generate(),
                expires_at: Utc::now(),
            })
        });
    let app = actix_test::init_service(test_app(with_schedule(command))).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/schedule/holds")
            .set_json(json!({"siteId": 1, "date": "2026-03-02", "time": "07:15"}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(res).await;
    assert!(body["token"].is_string());
    assert!(body["expiresAt"].is_string());
}

#[actix_web::test]
async fn held_slot_is_a_conflict() {
    let mut command = MockScheduleCommand::new();
    command
        .expect_hold()
        .returning(|_| Err(Error::conflict("slot is already held")));
    let app = actix_test::init_service(test_app(with_schedule(command))).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/schedule/holds")
            .set_json(json!({"siteId": 1, "date": "2026-03-02", "time": "07:15"}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["code"], "conflict");
}

#[actix_web::test]
async fn malformed_time_names_the_field() {
    let app = actix_test::init_service(test_app(with_schedule(MockScheduleCommand::new()))).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/schedule/holds")
            .set_json(json!({"siteId": 1, "date": "2026-03-02", "time": "quarter past"}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], "time");
}

#[actix_web::test]
async fn expired_hold_confirmation_is_gone() {
    let app = actix_test::init_service(test_app(crate::inbound::http::test_utils::fixture_state()))
        .await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!(
                "/api/v1/schedule/holds/{}/confirm",
                HoldToken::generate()
            ))
            .set_json(json!({"driverName": "Pat"}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::GONE);
}

#[actix_web::test]
async fn confirm_passes_cleaned_details() {
    let mut command = MockScheduleCommand::new();
    command
        .expect_confirm()
        .withf(|_, details| {
            details.driver_name.as_deref() == Some("Pat")
                && details.license_plate.is_none()
                && details.est_unit.as_deref() == Some("BU")
        })
        .times(1)
        .returning(|_, _| {
            Ok(Confirmation {
                reservation_id: ReservationId::new(17),
                manage_token: ManageToken::generate(),
                slot_time: "07:15".parse().expect("valid time"),
            })
        });
    let app = actix_test::init_service(test_app(with_schedule(command))).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!(
                "/api/v1/schedule/holds/{}/confirm",
                HoldToken::generate()
            ))
            .set_json(json!({"driverName": " Pat ", "licensePlate": "  ", "estUnit": "bu"}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["reservationId"], 17);
    assert_eq!(body["slotTime"], "07:15");
}

#[actix_web::test]
async fn configure_day_requires_login() {
    let app = actix_test::init_service(test_app(with_schedule(MockScheduleCommand::new()))).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri("/api/v1/schedule/day")
            .set_json(json!({
                "siteId": 1,
                "date": "2026-03-02",
                "openTime": "07:00",
                "closeTime": "17:00",
                "loadsTarget": 40
            }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn configure_day_reports_interval() {
    let mut command = MockScheduleCommand::new();
    command
        .expect_configure_day()
        .withf(|request| {
            request.date == day()
                && request.open_time == time("07:00")
                && request.close_time == time("17:00")
                && request.workins_per_hour == 2
                && !request.paused
        })
        .times(1)
        .returning(|_| {
            Ok(DayConfigured {
                interval_min: 15,
                slots_generated: 41,
                slots_created: 41,
            })
        });
    let app = actix_test::init_service(test_app(with_schedule(command))).await;
    let cookie = login_cookie(&app).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri("/api/v1/schedule/day")
            .cookie(cookie)
            .set_json(json!({
                "siteId": 1,
                "date": "2026-03-02",
                "openTime": "07:00",
                "closeTime": "17:00",
                "loadsTarget": 40,
                "workinsPerHour": 2
            }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["intervalMin"], 15);
    assert_eq!(body["slotsCreated"], 41);
}

#[actix_web::test]
async fn open_slots_parse_the_date() {
    let mut query = MockScheduleQuery::new();
    query
        .expect_open_slots()
        .withf(|site, date| *site == SiteId::new(2) && *date == Some(day()))
        .times(1)
        .returning(|site_id, date| {
            Ok(OpenSlots {
                site_id,
                date: date.unwrap_or_else(day),
                paused: true,
                slots: vec![OpenSlot {
                    time: "07:00".parse().expect("valid time"),
                    is_workin: false,
                }],
            })
        });
    let state = HttpState::new(HttpStatePorts {
        schedule_query: Arc::new(query),
        ..HttpStatePorts::default()
    });
    let app = actix_test::init_service(test_app(state)).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/schedule/open-slots?siteId=2&date=2026-03-02")
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["paused"], true);
    assert_eq!(body["slots"][0]["time"], "07:00");
    assert_eq!(body["slots"][0]["isWorkin"], false);
}

#[actix_web::test]
async fn mass_cancel_reports_submitted_count() {
    let mut command = MockScheduleCommand::new();
    command
        .expect_mass_cancel()
        .withf(|site, date, ids| {
            *site == SiteId::new(1)
                && *date == day()
                && ids
                    == &vec![
                        ReservationId::new(1),
                        ReservationId::new(2),
                        ReservationId::new(3),
                    ]
        })
        .times(1)
        .returning(|_, _, ids| Ok(MassCancelOutcome { canceled: ids.len() }));
    let app = actix_test::init_service(test_app(with_schedule(command))).await;
    let cookie = login_cookie(&app).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/reservations/mass-cancel")
            .cookie(cookie)
            .set_json(json!({"siteId": 1, "date": "2026-03-02", "reservationIds": [1, 2, 3]}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["canceled"], 3);
}

#[actix_web::test]
async fn reassign_onto_taken_slot_is_a_conflict() {
    let mut command = MockScheduleCommand::new();
    command
        .expect_reassign()
        .withf(|id, target| *id == ReservationId::new(9) && target.minutes() == 570)
        .times(1)
        .returning(|_, _| Err(Error::conflict("target slot unavailable")));
    let app = actix_test::init_service(test_app(with_schedule(command))).await;
    let cookie = login_cookie(&app).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/reservations/9/reassign")
            .cookie(cookie)
            .set_json(json!({"slotTime": "09:30"}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn unknown_manage_token_is_not_found() {
    let app = actix_test::init_service(test_app(crate::inbound::http::test_utils::fixture_state()))
        .await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/manage/{}", ManageToken::generate()))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn release_always_succeeds() {
    let app = actix_test::init_service(test_app(crate::inbound::http::test_utils::fixture_state()))
        .await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/schedule/holds/{}", HoldToken::generate()))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}
