//! Test utilities for the backend crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled when running tests or
//! with the `test-support` feature.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::PhoneNumber;
use crate::domain::ports::{
    Delivery, EmailMessage, EmailSender, EmailSenderError, SmsSender, SmsSenderError,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Clock whose time only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, delta: Duration) {
        let delta = match TimeDelta::from_std(delta) {
            Ok(delta) => delta,
            Err(error) => {
                panic!("failed to convert Duration to TimeDelta: {error}; delta={delta:?}",)
            }
        };
        *lock(&self.0) += delta;
    }

    pub fn advance_minutes(&self, minutes: i64) {
        *lock(&self.0) += TimeDelta::minutes(minutes);
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *lock(&self.0) += TimeDelta::seconds(seconds);
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *lock(&self.0) = now;
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *lock(&self.0)
    }
}

/// SMS transport that keeps every message in memory.
#[derive(Default)]
pub struct RecordingSmsSender {
    sent: Mutex<Vec<(PhoneNumber, String)>>,
    failing: Mutex<bool>,
}

impl RecordingSmsSender {
    /// Messages accepted so far, oldest first.
    pub fn sent(&self) -> Vec<(PhoneNumber, String)> {
        lock(&self.sent).clone()
    }

    /// Make subsequent sends fail with a transport error.
    pub fn set_failing(&self, failing: bool) {
        *lock(&self.failing) = failing;
    }
}

#[async_trait]
impl SmsSender for RecordingSmsSender {
    async fn send(&self, to: &PhoneNumber, body: &str) -> Result<Delivery, SmsSenderError> {
        if *lock(&self.failing) {
            return Err(SmsSenderError::transport("recording sender set to fail"));
        }
        lock(&self.sent).push((to.clone(), body.to_owned()));
        Ok(Delivery::Sent)
    }
}

/// Email transport that keeps every message in memory.
#[derive(Default)]
pub struct RecordingEmailSender {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingEmailSender {
    /// Messages accepted so far, oldest first.
    pub fn sent(&self) -> Vec<EmailMessage> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<Delivery, EmailSenderError> {
        lock(&self.sent).push(message.clone());
        Ok(Delivery::Sent)
    }
}
