//! HTTP surface over real services and the in-memory store.
//!
//! Requests go through the session middleware and the production handlers;
//! only the clock and the SMS transport are test doubles.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use chrono::{TimeZone, Utc};
use rstest::rstest;
use serde_json::{Value, json};
use yardline::Trace;
use yardline::domain::{
    PhoneLoginService, PhoneNumber, QueueService, ScheduleService, YardSeeder, default_sites,
};
use yardline::inbound::http::auth::{request_code, verify_code};
use yardline::inbound::http::facility::{get_facility_info, update_facility_info};
use yardline::inbound::http::queue::{public_lines, today_queue};
use yardline::inbound::http::schedule::{
    appointments, configure_day, confirm_hold, get_managed, hold_slot, open_slots,
};
use yardline::inbound::http::sms::inbound_sms;
use yardline::inbound::http::state::{HttpState, HttpStatePorts};
use yardline::outbound::memory::InMemoryYardStore;
use yardline::test_support::{MutableClock, RecordingSmsSender};

const ADMIN: &str = "+15155550100";
const DRIVER: &str = "+15155550142";
const DATE: &str = "2026-03-02";

struct Harness {
    state: HttpState,
    sms: Arc<RecordingSmsSender>,
}

async fn harness() -> Harness {
    let store = Arc::new(InMemoryYardStore::new());
    let clock = Arc::new(MutableClock::new(
        Utc.with_ymd_and_hms(2026, 3, 2, 13, 0, 0)
            .single()
            .expect("valid instant"),
    ));
    let sms = Arc::new(RecordingSmsSender::default());
    let admin = PhoneNumber::normalize(ADMIN).expect("valid admin phone");
    YardSeeder::new(store.clone(), store.clone())
        .seed(&default_sites(), Some(&admin))
        .await
        .expect("seed");

    let schedule = Arc::new(ScheduleService::new(
        store.clone(),
        store.clone(),
        clock.clone(),
    ));
    let queue = Arc::new(QueueService::new(store.clone(), store.clone(), clock.clone()));
    let login = Arc::new(PhoneLoginService::new(store.clone(), sms.clone(), clock));
    let state = HttpState::new(HttpStatePorts {
        schedule: schedule.clone(),
        schedule_query: schedule,
        queue: queue.clone(),
        queue_query: queue,
        login,
        facility: store,
    });
    Harness { state, sms }
}

fn app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build();
    App::new().app_data(web::Data::new(state)).wrap(Trace).service(
        web::scope("/api/v1")
            .wrap(session)
            .service(request_code)
            .service(verify_code)
            .service(configure_day)
            .service(open_slots)
            .service(appointments)
            .service(hold_slot)
            .service(confirm_hold)
            .service(get_managed)
            .service(today_queue)
            .service(public_lines)
            .service(inbound_sms)
            .service(get_facility_info)
            .service(update_facility_info),
    )
}

async fn login<S>(app: &S, sms: &RecordingSmsSender, phone: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/auth/request-code")
            .set_json(json!({ "phone": phone }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let (_, body) = sms.sent().pop().expect("login code texted");
    let code = body
        .split_whitespace()
        .last()
        .expect("code in message")
        .to_owned();

    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/auth/verify")
            .set_json(json!({ "phone": phone, "code": code }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

#[rstest]
#[actix_web::test]
async fn staff_configure_and_driver_books_through_the_api() {
    let Harness { state, sms } = harness().await;
    let app = test::init_service(app(state)).await;
    let staff = login(&app, &sms, ADMIN).await;

    let configured: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::put()
            .uri("/api/v1/schedule/day")
            .cookie(staff.clone())
            .set_json(json!({
                "siteId": 100,
                "date": DATE,
                "openTime": "08:00",
                "closeTime": "10:00",
                "loadsTarget": 3
            }))
            .to_request(),
    )
    .await;
    assert_eq!(configured["intervalMin"], 60);
    assert_eq!(configured["slotsCreated"], 3);

    let hold = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/schedule/holds")
            .set_json(json!({ "siteId": 100, "date": DATE, "time": "09:00" }))
            .to_request(),
    )
    .await;
    assert_eq!(hold.status(), StatusCode::CREATED);
    let hold: Value = test::read_body_json(hold).await;
    let token = hold["token"].as_str().expect("hold token").to_owned();

    let confirmed = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/schedule/holds/{token}/confirm"))
            .set_json(json!({ "driverName": "Dana", "licensePlate": "IA 123" }))
            .to_request(),
    )
    .await;
    assert_eq!(confirmed.status(), StatusCode::CREATED);
    let confirmed: Value = test::read_body_json(confirmed).await;
    assert_eq!(confirmed["slotTime"], "09:00");
    let manage = confirmed["manageToken"].as_str().expect("manage token");

    let managed: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/manage/{manage}"))
            .to_request(),
    )
    .await;
    assert_eq!(managed["driverName"], "Dana");

    let open: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/schedule/open-slots?siteId=100&date={DATE}"))
            .to_request(),
    )
    .await;
    let times: Vec<&str> = open["slots"]
        .as_array()
        .expect("slots")
        .iter()
        .filter_map(|slot| slot["time"].as_str())
        .collect();
    assert_eq!(times, ["08:00", "10:00"]);

    let booked: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/schedule/appointments?siteId=100&date={DATE}"))
            .cookie(staff)
            .to_request(),
    )
    .await;
    assert_eq!(booked.as_array().map(Vec::len), Some(1));
}

#[rstest]
#[actix_web::test]
async fn drivers_cannot_reach_staff_endpoints() {
    let Harness { state, sms } = harness().await;
    let app = test::init_service(app(state)).await;
    let driver = login(&app, &sms, DRIVER).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/sites/CIF/queue")
            .cookie(driver.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/api/v1/facility")
            .cookie(driver)
            .set_json(json!({ "facilityPhone": "515-555-0100" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[rstest]
#[actix_web::test]
async fn texted_arrival_shows_on_the_public_line() {
    let Harness { state, sms } = harness().await;
    let app = test::init_service(app(state)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/sms/inbound")
            .set_form([("From", DRIVER), ("Body", "ARRIVED CIF")])
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let twiml = test::read_body(res).await;
    let twiml = std::str::from_utf8(&twiml).expect("utf-8 body");
    assert!(twiml.starts_with("<Response><Message>"));

    let lines: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/sites/CIF/line")
            .to_request(),
    )
    .await;
    assert_eq!(lines["load"]["queued"].as_array().map(Vec::len), Some(1));

    let staff = login(&app, &sms, ADMIN).await;
    let queue: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/sites/CIF/queue")
            .cookie(staff)
            .to_request(),
    )
    .await;
    assert_eq!(queue["count"], 1);
    assert_eq!(queue["trucks"][0]["status"], "ARRIVED");
}
