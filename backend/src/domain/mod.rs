//! Domain primitives, aggregates, and services.
//!
//! Purpose: Define the strongly typed yard model used by the API and
//! persistence layers, plus the services implementing the driving ports.
//! Types document their invariants and serialisation contracts in Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifiers.
//! - Slot model: [`SlotTime`], [`SlotState`], [`TimeGrid`], [`Reservation`].
//! - Queue model: [`Truck`], [`TruckStatus`], [`SmsCommand`], queue views.
//! - Services: [`ScheduleService`], [`QueueService`], [`AnomalyMonitor`],
//!   [`PhoneLoginService`], [`YardSeeder`].

pub mod anomaly_monitor;
pub mod calendar;
pub mod digest;
pub mod error;
pub mod facility;
pub mod notification;
pub mod otp;
pub mod phone;
pub mod phone_login_service;
pub mod ports;
pub mod queue_service;
pub mod queue_view;
pub mod reservation;
pub mod schedule_service;
pub mod seeding;
pub mod site;
pub mod slot;
pub mod slot_time;
pub mod sms_command;
pub mod time_grid;
pub mod trace_id;
pub mod truck;

pub use self::anomaly_monitor::{AnomalyMonitor, MonitorSettings, TickReport};
pub use self::calendar::{CalendarOffsetError, OperatingCalendar};
pub use self::digest::{DIGEST_SMS_LIMIT, DailyDigest, SiteDigest};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::facility::FacilityInfo;
pub use self::notification::{Notification, NotificationKind};
pub use self::otp::{
    ActiveOtpCode, NewOtpCode, OTP_CODE_LEN, OTP_MAX_ATTEMPTS, hash_code, is_well_formed,
    otp_lifetime,
};
pub use self::phone::PhoneNumber;
pub use self::phone_login_service::{CodeGenerator, PhoneLoginService, RandomCodeGenerator};
pub use self::queue_service::QueueService;
pub use self::queue_view::{
    EnRouteEntry, HistoryAnalytics, HistoryFilter, HistoryQuery, HistoryReport, HistoryRow,
    LineView, PublicLine, PublicLines, QueuedEntry, TodayQueue,
};
pub use self::reservation::{
    BookingDetails, Confirmation, ManageToken, Reservation, ReservationId,
};
pub use self::schedule_service::{DEFAULT_HOLD_WINDOW_SECONDS, ScheduleService};
pub use self::seeding::{SeedReport, YardSeeder, default_sites};
pub use self::site::{DaySettings, Site, SiteCode, SiteCodeError, SiteId};
pub use self::slot::{
    Hold, HoldToken, Slot, SlotColumns, SlotColumnsError, SlotKey, SlotState, SlotTransitionError,
};
pub use self::slot_time::{MINUTES_PER_DAY, SlotTime, SlotTimeError};
pub use self::sms_command::{SmsCommand, SmsHints, SmsReply};
pub use self::time_grid::{GridSlot, TimeGrid, generate_time_grid, regular_interval};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::truck::{
    EtaMinutes, EtaMinutesError, LineType, NewTruck, ParseTruckFieldError, QueueCode,
    QueueCodeError, Truck, TruckChange, TruckId, TruckStatus, average,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use yardline::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
