//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    FacilityInfoRepository, FixtureFacilityInfoRepository, FixturePhoneLogin,
    FixtureQueueCommand, FixtureQueueQuery, FixtureScheduleCommand, FixtureScheduleQuery,
    PhoneLogin, QueueCommand, QueueQuery, ScheduleCommand, ScheduleQuery,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub schedule: Arc<dyn ScheduleCommand>,
    pub schedule_query: Arc<dyn ScheduleQuery>,
    pub queue: Arc<dyn QueueCommand>,
    pub queue_query: Arc<dyn QueueQuery>,
    pub login: Arc<dyn PhoneLogin>,
    pub facility: Arc<dyn FacilityInfoRepository>,
}

impl Default for HttpStatePorts {
    fn default() -> Self {
        Self {
            schedule: Arc::new(FixtureScheduleCommand),
            schedule_query: Arc::new(FixtureScheduleQuery),
            queue: Arc::new(FixtureQueueCommand),
            queue_query: Arc::new(FixtureQueueQuery),
            login: Arc::new(FixturePhoneLogin),
            facility: Arc::new(FixtureFacilityInfoRepository),
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub schedule: Arc<dyn ScheduleCommand>,
    pub schedule_query: Arc<dyn ScheduleQuery>,
    pub queue: Arc<dyn QueueCommand>,
    pub queue_query: Arc<dyn QueueQuery>,
    pub login: Arc<dyn PhoneLogin>,
    pub facility: Arc<dyn FacilityInfoRepository>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use yardline::domain::ports::FixtureScheduleQuery;
    /// use yardline::inbound::http::state::{HttpState, HttpStatePorts};
    ///
    /// let state = HttpState::new(HttpStatePorts {
    ///     schedule_query: Arc::new(FixtureScheduleQuery),
    ///     ..HttpStatePorts::default()
    /// });
    /// let _query = state.schedule_query.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            schedule,
            schedule_query,
            queue,
            queue_query,
            login,
            facility,
        } = ports;
        Self {
            schedule,
            schedule_query,
            queue,
            queue_query,
            login,
            facility,
        }
    }
}
