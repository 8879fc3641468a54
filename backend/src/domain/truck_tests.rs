//! Status lifecycle and duration derivation for queue entries.

use chrono::TimeZone;
use rstest::{fixture, rstest};

use super::*;

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 13, 0, 0)
        .single()
        .expect("valid fixture time")
}

fn truck(now: DateTime<Utc>, status: TruckStatus) -> Truck {
    Truck::from_new(
        TruckId::new(1),
        NewTruck {
            site_id: SiteId::new(100),
            checkin_date: now.date_naive(),
            phone: PhoneNumber::from_stored("+15155550142"),
            line_type: LineType::Load,
            status,
            queue_code: QueueCode::parse("0421").expect("valid code"),
            created_at: now,
        },
    )
}

#[rstest]
#[case("EN ROUTE", TruckStatus::EnRoute)]
#[case("en_route", TruckStatus::EnRoute)]
#[case(" arrived ", TruckStatus::Arrived)]
#[case("LOADING", TruckStatus::Loading)]
#[case("Departed", TruckStatus::Departed)]
#[case("queued", TruckStatus::Queued)]
fn statuses_parse_loosely(#[case] raw: &str, #[case] expected: TruckStatus) {
    assert_eq!(raw.parse::<TruckStatus>(), Ok(expected));
}

#[rstest]
fn unknown_status_is_rejected() {
    assert!("PARKED".parse::<TruckStatus>().is_err());
}

#[rstest]
fn new_truck_stamps_initial_status(now: DateTime<Utc>) {
    let truck = truck(now, TruckStatus::EnRoute);
    assert_eq!(truck.status, TruckStatus::EnRoute);
    assert_eq!(truck.enroute_at, Some(now));
    assert_eq!(truck.arrived_at, None);
}

#[rstest]
fn reentering_a_status_keeps_first_timestamp(now: DateTime<Utc>) {
    let mut truck = truck(now, TruckStatus::EnRoute);
    truck.transition_to(TruckStatus::Arrived, now + Duration::minutes(5));
    truck.transition_to(TruckStatus::EnRoute, now + Duration::minutes(6));
    truck.transition_to(TruckStatus::Arrived, now + Duration::minutes(9));

    assert_eq!(truck.status, TruckStatus::Arrived);
    assert_eq!(truck.enroute_at, Some(now));
    assert_eq!(truck.arrived_at, Some(now + Duration::minutes(5)));
}

#[rstest]
fn any_status_may_be_set_directly(now: DateTime<Utc>) {
    let mut truck = truck(now, TruckStatus::EnRoute);
    truck.transition_to(TruckStatus::Departed, now);
    assert_eq!(truck.status, TruckStatus::Departed);
    assert_eq!(truck.departed_at, Some(now));
    assert_eq!(truck.loading_at, None);
}

#[rstest]
fn promising_an_eta_resets_the_prompt(now: DateTime<Utc>) {
    let mut truck = truck(now, TruckStatus::EnRoute);
    truck.eta_prompted_at = Some(now);
    truck.promise_eta(EtaMinutes::new(30).expect("in range"), now);

    assert_eq!(truck.eta_minutes, Some(30));
    assert_eq!(truck.eta_at, Some(now + Duration::minutes(30)));
    assert_eq!(truck.eta_prompted_at, None);
}

#[rstest]
#[case(0)]
#[case(1441)]
fn eta_out_of_range_is_rejected(#[case] minutes: u32) {
    assert_eq!(EtaMinutes::new(minutes), Err(EtaMinutesError(minutes)));
}

#[rstest]
fn durations_need_both_endpoints(now: DateTime<Utc>) {
    let mut truck = truck(now, TruckStatus::Arrived);
    assert_eq!(truck.wait_minutes(), None);
    truck.transition_to(TruckStatus::Loading, now + Duration::seconds(45 * 60 + 30));
    truck.transition_to(TruckStatus::Departed, now + Duration::minutes(80));

    assert_eq!(truck.wait_minutes(), Some(45.5));
    assert_eq!(truck.total_minutes(), Some(80.0));
    assert_eq!(truck.minutes_since_arrival(now + Duration::minutes(91)), Some(91));
}

#[rstest]
fn queue_anchor_prefers_arrival(now: DateTime<Utc>) {
    let mut truck = truck(now, TruckStatus::EnRoute);
    assert_eq!(truck.queue_anchor(), now);
    truck.transition_to(TruckStatus::Arrived, now + Duration::minutes(20));
    assert_eq!(truck.queue_anchor(), now + Duration::minutes(20));
}

#[rstest]
fn average_ignores_empty_input() {
    assert_eq!(average(&[]), None);
    assert_eq!(average(&[10.0, 20.0]), Some(15.0));
}
