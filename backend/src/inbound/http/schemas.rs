//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the serialised shape of their domain types but
//! live in the inbound adapter layer where framework concerns belong.
#![expect(
    dead_code,
    reason = "Schema wrappers exist only for OpenAPI generation via utoipa"
)]

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// Missing or malformed input.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Login required.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Banned phone or missing admin capability.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// Site, slot, reservation, or truck absent.
    #[schema(rename = "not_found")]
    NotFound,
    /// Slot already held or reserved.
    #[schema(rename = "conflict")]
    Conflict,
    /// Hold expired or unknown.
    #[schema(rename = "gone")]
    Gone,
    /// A backing store or transport is unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "conflict")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "slot is already held")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::ports::DayConfigured`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::DayConfigured)]
#[schema(rename_all = "camelCase")]
pub struct DayConfiguredSchema {
    /// Regular spacing in minutes; zero for at most one load.
    #[schema(example = 15)]
    interval_min: u32,
    /// Slots on the generated grid.
    slots_generated: usize,
    /// Slots that did not exist before.
    slots_created: usize,
}

/// OpenAPI schema for [`crate::domain::ports::OpenSlot`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::OpenSlot)]
#[schema(rename_all = "camelCase")]
pub struct OpenSlotSchema {
    #[schema(example = "07:15")]
    time: String,
    is_workin: bool,
}

/// OpenAPI schema for [`crate::domain::ports::OpenSlots`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::OpenSlots)]
#[schema(rename_all = "camelCase")]
pub struct OpenSlotsSchema {
    site_id: i32,
    #[schema(example = "2026-03-02")]
    date: String,
    paused: bool,
    slots: Vec<OpenSlotSchema>,
}

/// OpenAPI schema for [`crate::domain::Hold`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Hold)]
#[schema(rename_all = "camelCase")]
pub struct HoldSchema {
    #[schema(value_type = String, format = Uuid)]
    token: String,
    #[schema(value_type = String, format = DateTime)]
    expires_at: String,
}

/// OpenAPI schema for [`crate::domain::Confirmation`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Confirmation)]
#[schema(rename_all = "camelCase")]
pub struct ConfirmationSchema {
    reservation_id: i64,
    #[schema(value_type = String, format = Uuid)]
    manage_token: String,
    #[schema(example = "07:15")]
    slot_time: String,
}

/// OpenAPI schema for [`crate::domain::Reservation`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Reservation)]
#[schema(rename_all = "camelCase")]
pub struct ReservationSchema {
    id: i64,
    site_id: i32,
    #[schema(example = "2026-03-02")]
    date: String,
    #[schema(example = "07:15")]
    slot_time: String,
    license_plate: Option<String>,
    driver_name: Option<String>,
    #[schema(example = "+15155550142")]
    driver_phone: Option<String>,
    vendor_name: Option<String>,
    farm_or_ticket: Option<String>,
    est_amount: Option<f64>,
    est_unit: Option<String>,
    #[schema(value_type = String, format = Uuid)]
    manage_token: String,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::ports::MassCancelOutcome`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::MassCancelOutcome)]
pub struct MassCancelOutcomeSchema {
    /// Ids submitted, matched or not.
    canceled: usize,
}

/// OpenAPI schema for [`crate::domain::TruckStatus`].
#[derive(ToSchema)]
#[schema(as = crate::domain::TruckStatus)]
pub enum TruckStatusSchema {
    #[schema(rename = "QUEUED")]
    Queued,
    #[schema(rename = "EN_ROUTE")]
    EnRoute,
    #[schema(rename = "ARRIVED")]
    Arrived,
    #[schema(rename = "LOADING")]
    Loading,
    #[schema(rename = "DEPARTED")]
    Departed,
}

/// OpenAPI schema for [`crate::domain::LineType`].
#[derive(ToSchema)]
#[schema(as = crate::domain::LineType)]
pub enum LineTypeSchema {
    #[schema(rename = "LOAD")]
    Load,
    #[schema(rename = "DELIVER")]
    Deliver,
}

/// OpenAPI schema for [`crate::domain::Truck`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Truck)]
#[schema(rename_all = "camelCase")]
pub struct TruckSchema {
    id: i64,
    site_id: i32,
    #[schema(example = "2026-03-02")]
    checkin_date: String,
    #[schema(example = "+15155550142")]
    phone: String,
    status: TruckStatusSchema,
    line_type: LineTypeSchema,
    #[schema(example = "0421")]
    queue_code: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
    #[schema(value_type = Option<String>, format = DateTime)]
    enroute_at: Option<String>,
    #[schema(value_type = Option<String>, format = DateTime)]
    arrived_at: Option<String>,
    #[schema(value_type = Option<String>, format = DateTime)]
    loading_at: Option<String>,
    #[schema(value_type = Option<String>, format = DateTime)]
    departed_at: Option<String>,
    eta_minutes: Option<u32>,
    #[schema(value_type = Option<String>, format = DateTime)]
    eta_at: Option<String>,
    #[schema(value_type = Option<String>, format = DateTime)]
    eta_prompted_at: Option<String>,
    product: Option<String>,
    load_number: Option<String>,
    bill_of_lading: Option<String>,
}

/// OpenAPI schema for [`crate::domain::TodayQueue`].
#[derive(ToSchema)]
#[schema(as = crate::domain::TodayQueue)]
pub struct TodayQueueSchema {
    #[schema(example = "CIF")]
    site: String,
    count: usize,
    trucks: Vec<TruckSchema>,
}

/// OpenAPI schema for [`crate::domain::QueuedEntry`].
#[derive(ToSchema)]
#[schema(as = crate::domain::QueuedEntry)]
#[schema(rename_all = "camelCase")]
pub struct QueuedEntrySchema {
    id: i64,
    /// Masked phone.
    #[schema(example = "+15***42")]
    phone: String,
    product: Option<String>,
    load_number: Option<String>,
    bol: Option<String>,
    #[schema(value_type = Option<String>, format = DateTime)]
    arrived_at: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::EnRouteEntry`].
#[derive(ToSchema)]
#[schema(as = crate::domain::EnRouteEntry)]
#[schema(rename_all = "camelCase")]
pub struct EnRouteEntrySchema {
    id: i64,
    #[schema(example = "+15***42")]
    phone: String,
    eta_minutes: Option<u32>,
    #[schema(value_type = Option<String>, format = DateTime)]
    eta_at: Option<String>,
}

/// OpenAPI schema for [`crate::domain::LineView`].
#[derive(ToSchema)]
#[schema(as = crate::domain::LineView)]
#[schema(rename_all = "camelCase")]
pub struct LineViewSchema {
    queued: Vec<QueuedEntrySchema>,
    en_route_count: usize,
    en_route_eta: Vec<EnRouteEntrySchema>,
}

/// OpenAPI schema for [`crate::domain::PublicLine`].
#[derive(ToSchema)]
#[schema(as = crate::domain::PublicLine)]
#[schema(rename_all = "camelCase")]
pub struct PublicLineSchema {
    #[schema(example = "CIF")]
    site: String,
    line_type: LineTypeSchema,
    queued: Vec<QueuedEntrySchema>,
    en_route_count: usize,
    en_route_eta: Vec<EnRouteEntrySchema>,
}

/// OpenAPI schema for [`crate::domain::PublicLines`].
#[derive(ToSchema)]
#[schema(as = crate::domain::PublicLines)]
#[schema(rename_all = "camelCase")]
pub struct PublicLinesSchema {
    #[schema(example = "CIF")]
    site: String,
    load: LineViewSchema,
    deliver: LineViewSchema,
    total_en_route: usize,
}

/// OpenAPI schema for [`crate::domain::HistoryRow`].
#[derive(ToSchema)]
#[schema(as = crate::domain::HistoryRow)]
#[schema(rename_all = "camelCase")]
pub struct HistoryRowSchema {
    id: i64,
    checkin_date: String,
    phone: String,
    status: TruckStatusSchema,
    line_type: LineTypeSchema,
    product: Option<String>,
    load_number: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
    #[schema(value_type = Option<String>, format = DateTime)]
    arrived_at: Option<String>,
    #[schema(value_type = Option<String>, format = DateTime)]
    loading_at: Option<String>,
    #[schema(value_type = Option<String>, format = DateTime)]
    departed_at: Option<String>,
    wait_minutes: Option<f64>,
    total_minutes: Option<f64>,
}

/// OpenAPI schema for [`crate::domain::HistoryAnalytics`].
#[derive(ToSchema)]
#[schema(as = crate::domain::HistoryAnalytics)]
#[schema(rename_all = "camelCase")]
pub struct HistoryAnalyticsSchema {
    avg_wait_min: Option<f64>,
    avg_total_min: Option<f64>,
    n_waits: usize,
    n_totals: usize,
}

/// OpenAPI schema for [`crate::domain::HistoryReport`].
#[derive(ToSchema)]
#[schema(as = crate::domain::HistoryReport)]
pub struct HistoryReportSchema {
    site: String,
    start: String,
    end: String,
    analytics: HistoryAnalyticsSchema,
    count: usize,
    rows: Vec<HistoryRowSchema>,
}

/// OpenAPI schema for [`crate::domain::FacilityInfo`].
#[derive(ToSchema)]
#[schema(as = crate::domain::FacilityInfo)]
#[schema(rename_all = "camelCase")]
pub struct FacilityInfoSchema {
    #[schema(example = "+15155550100")]
    facility_phone: Option<String>,
    #[schema(example = "+15155550199")]
    support_phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::PartialSchema;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[test]
    fn error_schema_has_expected_name() {
        let schema_json = schema_to_json::<ErrorSchema>();
        // utoipa replaces :: with . in schema names
        assert_eq!(ErrorSchema::name(), "crate.domain.Error");
        assert!(schema_json.contains("traceId"), "fields are camelCase");
    }

    #[test]
    fn error_code_schema_lists_every_variant() {
        let schema_json = schema_to_json::<ErrorCodeSchema>();
        for code in [
            "invalid_request",
            "unauthorized",
            "forbidden",
            "not_found",
            "conflict",
            "gone",
            "service_unavailable",
            "internal_error",
        ] {
            assert!(schema_json.contains(code), "missing {code}");
        }
    }

    #[test]
    fn truck_status_schema_uses_stored_tokens() {
        let schema_json = schema_to_json::<TruckStatusSchema>();
        assert!(schema_json.contains("EN_ROUTE"));
        assert!(schema_json.contains("DEPARTED"));
    }

    #[test]
    fn reservation_schema_flattens_booking_details() {
        let schema_json = schema_to_json::<ReservationSchema>();
        assert!(schema_json.contains("licensePlate"));
        assert!(schema_json.contains("manageToken"));
    }
}
