//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the inbound layer, the schema
//! wrappers from [`crate::inbound::http::schemas`], and the session cookie
//! security scheme. Swagger UI serves it in debug builds.

use crate::inbound::http::auth::{RequestCodeRequest, VerifiedResponse, VerifyCodeRequest};
use crate::inbound::http::facility::FacilityInfoBody;
use crate::inbound::http::queue::{EnRouteBody, EtaBody, StatusBody};
use crate::inbound::http::schedule::{
    ConfigureDayBody, ConfirmBody, HoldBody, MassCancelBody, ReassignBody,
};
use crate::inbound::http::schemas::{
    ConfirmationSchema, DayConfiguredSchema, EnRouteEntrySchema, ErrorCodeSchema, ErrorSchema,
    FacilityInfoSchema, HistoryAnalyticsSchema, HistoryReportSchema, HistoryRowSchema,
    HoldSchema, LineTypeSchema, LineViewSchema, MassCancelOutcomeSchema, OpenSlotSchema,
    OpenSlotsSchema, PublicLineSchema, PublicLinesSchema, QueuedEntrySchema, ReservationSchema,
    TodayQueueSchema, TruckSchema, TruckStatusSchema,
};
use crate::inbound::http::sms::InboundSmsForm;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/verify.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Yardline API",
        description = "Appointment slots, truck queue, and driver SMS commands for grain yards."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::request_code,
        crate::inbound::http::auth::verify_code,
        crate::inbound::http::auth::logout,
        crate::inbound::http::schedule::configure_day,
        crate::inbound::http::schedule::open_slots,
        crate::inbound::http::schedule::appointments,
        crate::inbound::http::schedule::hold_slot,
        crate::inbound::http::schedule::confirm_hold,
        crate::inbound::http::schedule::release_hold,
        crate::inbound::http::schedule::reassign,
        crate::inbound::http::schedule::cancel_reservation,
        crate::inbound::http::schedule::mass_cancel,
        crate::inbound::http::schedule::get_managed,
        crate::inbound::http::schedule::cancel_managed,
        crate::inbound::http::queue::today_queue,
        crate::inbound::http::queue::history,
        crate::inbound::http::queue::public_lines,
        crate::inbound::http::queue::public_line,
        crate::inbound::http::queue::update_status,
        crate::inbound::http::queue::set_eta,
        crate::inbound::http::queue::mark_en_route,
        crate::inbound::http::queue::verify_queue_code,
        crate::inbound::http::sms::inbound_sms,
        crate::inbound::http::facility::get_facility_info,
        crate::inbound::http::facility::update_facility_info,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RequestCodeRequest,
        VerifyCodeRequest,
        VerifiedResponse,
        ConfigureDayBody,
        HoldBody,
        ConfirmBody,
        ReassignBody,
        MassCancelBody,
        StatusBody,
        EtaBody,
        EnRouteBody,
        InboundSmsForm,
        FacilityInfoBody,
        DayConfiguredSchema,
        OpenSlotSchema,
        OpenSlotsSchema,
        HoldSchema,
        ConfirmationSchema,
        ReservationSchema,
        MassCancelOutcomeSchema,
        TruckStatusSchema,
        LineTypeSchema,
        TruckSchema,
        TodayQueueSchema,
        QueuedEntrySchema,
        EnRouteEntrySchema,
        LineViewSchema,
        PublicLineSchema,
        PublicLinesSchema,
        HistoryRowSchema,
        HistoryAnalyticsSchema,
        HistoryReportSchema,
        FacilityInfoSchema,
    )),
    tags(
        (name = "auth", description = "Phone login by texted code"),
        (name = "schedule", description = "Day configuration, holds, and confirmations"),
        (name = "reservations", description = "Reservation changes and self-service"),
        (name = "queue", description = "Truck queue for staff and drivers"),
        (name = "sms", description = "Driver text commands"),
        (name = "facility", description = "Facility contact numbers"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated OpenAPI document.

    use super::*;
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";
    const RESERVATION_SCHEMA_NAME: &str = "crate.domain.Reservation";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn openapi_error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
        assert_object_schema_has_field(error_schema, "traceId");
    }

    #[test]
    fn openapi_reservation_schema_carries_manage_token() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas
            .get(RESERVATION_SCHEMA_NAME)
            .expect("Reservation schema");

        assert_object_schema_has_field(schema, "manageToken");
        assert_object_schema_has_field(schema, "slotTime");
    }

    #[rstest]
    #[case("/api/v1/schedule/holds")]
    #[case("/api/v1/schedule/holds/{token}/confirm")]
    #[case("/api/v1/reservations/mass-cancel")]
    #[case("/api/v1/sites/{site}/line/{lineType}")]
    #[case("/api/v1/sms/inbound")]
    #[case("/health/ready")]
    fn openapi_lists_path(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(
            doc.paths.paths.contains_key(path),
            "missing path {path}"
        );
    }
}
