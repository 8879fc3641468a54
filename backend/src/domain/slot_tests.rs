//! Transition rules for slot occupancy.

use chrono::{Duration, TimeZone};
use rstest::{fixture, rstest};

use super::*;

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 14, 0, 0)
        .single()
        .expect("valid fixture time")
}

fn held(token: HoldToken, now: DateTime<Utc>, seconds: i64) -> SlotState {
    SlotState::Held {
        token,
        expires_at: now + Duration::seconds(seconds),
    }
}

fn reserved(id: i64, now: DateTime<Utc>) -> SlotState {
    SlotState::Reserved {
        reservation_id: ReservationId::new(id),
        reserved_at: now,
    }
}

#[rstest]
fn open_slot_accepts_hold(now: DateTime<Utc>) {
    let token = HoldToken::generate();
    let expires_at = now + Duration::seconds(120);
    let next = SlotState::Open
        .hold(token, expires_at, now)
        .expect("open slot is holdable");
    assert_eq!(next, SlotState::Held { token, expires_at });
}

#[rstest]
fn live_hold_refuses_second_hold(now: DateTime<Utc>) {
    let state = held(HoldToken::generate(), now, 30);
    let result = state.hold(HoldToken::generate(), now + Duration::seconds(120), now);
    assert_eq!(result, Err(SlotTransitionError::OnHold));
}

#[rstest]
fn expired_hold_is_overwritten(now: DateTime<Utc>) {
    let state = held(HoldToken::generate(), now, -1);
    let token = HoldToken::generate();
    let next = state
        .hold(token, now + Duration::seconds(120), now)
        .expect("expired hold counts as open");
    assert!(matches!(next, SlotState::Held { token: t, .. } if t == token));
}

#[rstest]
fn hold_expiring_exactly_now_is_expired(now: DateTime<Utc>) {
    assert!(held(HoldToken::generate(), now, 0).is_available(now));
}

#[rstest]
fn reserved_slot_refuses_hold(now: DateTime<Utc>) {
    let result = reserved(7, now).hold(HoldToken::generate(), now, now);
    assert_eq!(result, Err(SlotTransitionError::Reserved));
}

#[rstest]
fn confirm_requires_matching_live_token(now: DateTime<Utc>) {
    let token = HoldToken::generate();
    let state = held(token, now, 60);

    let wrong = state.confirm(HoldToken::generate(), ReservationId::new(1), now);
    assert_eq!(wrong, Err(SlotTransitionError::HoldInvalid));

    let later = now + Duration::seconds(61);
    let expired = state.confirm(token, ReservationId::new(1), later);
    assert_eq!(expired, Err(SlotTransitionError::HoldInvalid));

    let ok = state
        .confirm(token, ReservationId::new(1), now)
        .expect("live token confirms");
    assert_eq!(ok.reservation_id(), Some(ReservationId::new(1)));
}

#[rstest]
fn release_ignores_foreign_tokens(now: DateTime<Utc>) {
    let token = HoldToken::generate();
    let state = held(token, now, 60);
    assert_eq!(state.release(HoldToken::generate()), state);
    assert_eq!(state.release(token), SlotState::Open);
    assert_eq!(reserved(3, now).release(token), reserved(3, now));
}

#[rstest]
fn occupy_displaces_holds_but_not_reservations(now: DateTime<Utc>) {
    let id = ReservationId::new(9);
    assert!(held(HoldToken::generate(), now, 60).occupy(id, now).is_ok());
    assert_eq!(
        reserved(2, now).occupy(id, now),
        Err(SlotTransitionError::Reserved)
    );
}

#[rstest]
fn vacate_only_frees_the_owner(now: DateTime<Utc>) {
    let state = reserved(4, now);
    assert_eq!(state.vacate(ReservationId::new(5)), state);
    assert_eq!(state.vacate(ReservationId::new(4)), SlotState::Open);
}

#[rstest]
fn columns_round_trip_each_state(now: DateTime<Utc>) {
    for state in [
        SlotState::Open,
        held(HoldToken::generate(), now, 60),
        reserved(11, now),
    ] {
        let rebuilt = SlotState::from_columns(state.to_columns()).expect("consistent columns");
        assert_eq!(rebuilt, state);
    }
}

#[rstest]
fn columns_with_hold_and_reservation_are_rejected(now: DateTime<Utc>) {
    let columns = SlotColumns {
        reservation_id: Some(1),
        reserved_at: Some(now),
        hold_token: Some(Uuid::new_v4()),
        hold_expires_at: Some(now),
    };
    assert!(SlotState::from_columns(columns).is_err());
}
