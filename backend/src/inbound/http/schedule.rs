//! Slot scheduling handlers.
//!
//! ```text
//! PUT    /api/v1/schedule/day                       (staff)
//! GET    /api/v1/schedule/open-slots?siteId=1&date=2026-03-02
//! GET    /api/v1/schedule/appointments?siteId=1     (staff)
//! POST   /api/v1/schedule/holds
//! POST   /api/v1/schedule/holds/{token}/confirm
//! DELETE /api/v1/schedule/holds/{token}
//! POST   /api/v1/reservations/{id}/reassign         (staff)
//! DELETE /api/v1/reservations/{id}                  (staff)
//! POST   /api/v1/reservations/mass-cancel           (staff)
//! GET    /api/v1/manage/{token}
//! DELETE /api/v1/manage/{token}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::{ConfigureDayRequest, DayConfigured, MassCancelOutcome, OpenSlots};
use crate::domain::{
    BookingDetails, Confirmation, Error, Hold, HoldToken, ManageToken, Reservation,
    ReservationId, SiteId, SlotKey,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    ConfirmationSchema, DayConfiguredSchema, ErrorSchema, HoldSchema, MassCancelOutcomeSchema,
    OpenSlotsSchema, ReservationSchema,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_date, parse_optional_date, parse_slot_time,
};

/// Site and optional day selector. The day defaults to today.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SiteDayParams {
    /// Numeric site identifier.
    pub site_id: i32,
    /// Day formatted `YYYY-MM-DD`.
    pub date: Option<String>,
}

/// Body of `PUT /api/v1/schedule/day`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureDayBody {
    pub site_id: i32,
    #[schema(example = "2026-03-02")]
    pub date: String,
    #[schema(example = "07:00")]
    pub open_time: String,
    #[schema(example = "17:00")]
    pub close_time: String,
    #[schema(example = 40)]
    pub loads_target: u32,
    #[serde(default)]
    pub workins_per_hour: u32,
    #[serde(default)]
    pub paused: bool,
}

impl TryFrom<ConfigureDayBody> for ConfigureDayRequest {
    type Error = Error;

    fn try_from(body: ConfigureDayBody) -> Result<Self, Self::Error> {
        Ok(Self {
            site_id: SiteId::new(body.site_id),
            date: parse_date(&body.date, FieldName::new("date"))?,
            open_time: parse_slot_time(&body.open_time, FieldName::new("openTime"))?,
            close_time: parse_slot_time(&body.close_time, FieldName::new("closeTime"))?,
            loads_target: body.loads_target,
            workins_per_hour: body.workins_per_hour,
            paused: body.paused,
        })
    }
}

/// Body of `POST /api/v1/schedule/holds`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HoldBody {
    pub site_id: i32,
    #[schema(example = "2026-03-02")]
    pub date: String,
    #[schema(example = "07:15")]
    pub time: String,
}

impl TryFrom<HoldBody> for SlotKey {
    type Error = Error;

    fn try_from(body: HoldBody) -> Result<Self, Self::Error> {
        Ok(Self {
            site_id: SiteId::new(body.site_id),
            date: parse_date(&body.date, FieldName::new("date"))?,
            time: parse_slot_time(&body.time, FieldName::new("time"))?,
        })
    }
}

/// Booking details sent with a confirmation. Every field is optional.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmBody {
    pub license_plate: Option<String>,
    pub driver_name: Option<String>,
    pub driver_phone: Option<String>,
    pub vendor_name: Option<String>,
    pub farm_or_ticket: Option<String>,
    pub est_amount: Option<f64>,
    #[schema(example = "BU")]
    pub est_unit: Option<String>,
}

impl From<ConfirmBody> for BookingDetails {
    fn from(body: ConfirmBody) -> Self {
        BookingDetails::from_raw(
            body.license_plate,
            body.driver_name,
            body.driver_phone,
            body.vendor_name,
            body.farm_or_ticket,
            body.est_amount,
            body.est_unit,
        )
    }
}

/// Body of `POST /api/v1/reservations/{id}/reassign`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReassignBody {
    #[schema(example = "09:30")]
    pub slot_time: String,
}

/// Body of `POST /api/v1/reservations/mass-cancel`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MassCancelBody {
    pub site_id: i32,
    #[schema(example = "2026-03-02")]
    pub date: String,
    pub reservation_ids: Vec<i64>,
}

/// Save a day's settings and create its missing slots.
///
/// Regenerating a day never removes or alters existing slots.
#[utoipa::path(
    put,
    path = "/api/v1/schedule/day",
    request_body = ConfigureDayBody,
    responses(
        (status = 200, description = "Day configured", body = DayConfiguredSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Admin access required", body = ErrorSchema),
        (status = 404, description = "Unknown site", body = ErrorSchema)
    ),
    tags = ["schedule"],
    operation_id = "configureDay"
)]
#[put("/schedule/day")]
pub async fn configure_day(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ConfigureDayBody>,
) -> ApiResult<web::Json<DayConfigured>> {
    session.require_admin(state.login.as_ref()).await?;
    let request = ConfigureDayRequest::try_from(payload.into_inner())?;
    let configured = state.schedule.configure_day(request).await?;
    Ok(web::Json(configured))
}

/// Slots neither reserved nor under a live hold.
#[utoipa::path(
    get,
    path = "/api/v1/schedule/open-slots",
    params(SiteDayParams),
    responses(
        (status = 200, description = "Open slots", body = OpenSlotsSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["schedule"],
    operation_id = "listOpenSlots",
    security([])
)]
#[get("/schedule/open-slots")]
pub async fn open_slots(
    state: web::Data<HttpState>,
    params: web::Query<SiteDayParams>,
) -> ApiResult<web::Json<OpenSlots>> {
    let date = parse_optional_date(params.date.as_deref(), FieldName::new("date"))?;
    let slots = state
        .schedule_query
        .open_slots(SiteId::new(params.site_id), date)
        .await?;
    Ok(web::Json(slots))
}

/// Reservations for a day ordered by slot time.
#[utoipa::path(
    get,
    path = "/api/v1/schedule/appointments",
    params(SiteDayParams),
    responses(
        (status = 200, description = "Reservations", body = [ReservationSchema]),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Admin access required", body = ErrorSchema)
    ),
    tags = ["schedule"],
    operation_id = "listAppointments"
)]
#[get("/schedule/appointments")]
pub async fn appointments(
    state: web::Data<HttpState>,
    session: SessionContext,
    params: web::Query<SiteDayParams>,
) -> ApiResult<web::Json<Vec<Reservation>>> {
    session.require_admin(state.login.as_ref()).await?;
    let date = parse_optional_date(params.date.as_deref(), FieldName::new("date"))?;
    let reservations = state
        .schedule_query
        .appointments(SiteId::new(params.site_id), date)
        .await?;
    Ok(web::Json(reservations))
}

/// Place a short hold on a slot.
#[utoipa::path(
    post,
    path = "/api/v1/schedule/holds",
    request_body = HoldBody,
    responses(
        (status = 201, description = "Hold placed", body = HoldSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Slot not found", body = ErrorSchema),
        (status = 409, description = "Slot unavailable", body = ErrorSchema)
    ),
    tags = ["schedule"],
    operation_id = "holdSlot",
    security([])
)]
#[post("/schedule/holds")]
pub async fn hold_slot(
    state: web::Data<HttpState>,
    payload: web::Json<HoldBody>,
) -> ApiResult<HttpResponse> {
    let key = SlotKey::try_from(payload.into_inner())?;
    let hold: Hold = state.schedule.hold(key).await?;
    Ok(HttpResponse::Created().json(hold))
}

/// Turn a live hold into a reservation.
#[utoipa::path(
    post,
    path = "/api/v1/schedule/holds/{token}/confirm",
    params(("token" = Uuid, Path, description = "Hold token")),
    request_body = ConfirmBody,
    responses(
        (status = 201, description = "Reservation created", body = ConfirmationSchema),
        (status = 410, description = "Hold expired or invalid", body = ErrorSchema)
    ),
    tags = ["schedule"],
    operation_id = "confirmHold",
    security([])
)]
#[post("/schedule/holds/{token}/confirm")]
pub async fn confirm_hold(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
    payload: web::Json<ConfirmBody>,
) -> ApiResult<HttpResponse> {
    let token = HoldToken::from_uuid(path.into_inner());
    let confirmation: Confirmation = state
        .schedule
        .confirm(token, payload.into_inner().into())
        .await?;
    info!(
        reservation_id = %confirmation.reservation_id,
        slot_time = %confirmation.slot_time,
        "hold confirmed"
    );
    Ok(HttpResponse::Created().json(confirmation))
}

/// Drop a hold. Unknown tokens succeed.
#[utoipa::path(
    delete,
    path = "/api/v1/schedule/holds/{token}",
    params(("token" = Uuid, Path, description = "Hold token")),
    responses((status = 204, description = "Hold released")),
    tags = ["schedule"],
    operation_id = "releaseHold",
    security([])
)]
#[delete("/schedule/holds/{token}")]
pub async fn release_hold(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    state
        .schedule
        .release(HoldToken::from_uuid(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Move a reservation to another free slot on its day.
#[utoipa::path(
    post,
    path = "/api/v1/reservations/{id}/reassign",
    params(("id" = i64, Path, description = "Reservation id")),
    request_body = ReassignBody,
    responses(
        (status = 200, description = "Reservation moved", body = ReservationSchema),
        (status = 404, description = "Reservation or slot not found", body = ErrorSchema),
        (status = 409, description = "Target slot unavailable", body = ErrorSchema)
    ),
    tags = ["reservations"],
    operation_id = "reassignReservation"
)]
#[post("/reservations/{id}/reassign")]
pub async fn reassign(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<ReassignBody>,
) -> ApiResult<web::Json<Reservation>> {
    session.require_admin(state.login.as_ref()).await?;
    let target = parse_slot_time(&payload.slot_time, FieldName::new("slotTime"))?;
    let moved = state
        .schedule
        .reassign(ReservationId::new(path.into_inner()), target)
        .await?;
    Ok(web::Json(moved))
}

/// Cancel a reservation and free its slot.
#[utoipa::path(
    delete,
    path = "/api/v1/reservations/{id}",
    params(("id" = i64, Path, description = "Reservation id")),
    responses(
        (status = 204, description = "Reservation canceled"),
        (status = 404, description = "Reservation not found", body = ErrorSchema)
    ),
    tags = ["reservations"],
    operation_id = "cancelReservation"
)]
#[delete("/reservations/{id}")]
pub async fn cancel_reservation(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    session.require_admin(state.login.as_ref()).await?;
    state
        .schedule
        .cancel(ReservationId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Cancel many reservations of one day.
///
/// Ids that do not belong to the day are skipped; the reply counts every id
/// submitted.
#[utoipa::path(
    post,
    path = "/api/v1/reservations/mass-cancel",
    request_body = MassCancelBody,
    responses(
        (status = 200, description = "Reservations canceled", body = MassCancelOutcomeSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["reservations"],
    operation_id = "massCancelReservations"
)]
#[post("/reservations/mass-cancel")]
pub async fn mass_cancel(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<MassCancelBody>,
) -> ApiResult<web::Json<MassCancelOutcome>> {
    session.require_admin(state.login.as_ref()).await?;
    let MassCancelBody {
        site_id,
        date,
        reservation_ids,
    } = payload.into_inner();
    let date = parse_date(&date, FieldName::new("date"))?;
    let ids = reservation_ids.into_iter().map(ReservationId::new).collect();
    let outcome = state
        .schedule
        .mass_cancel(SiteId::new(site_id), date, ids)
        .await?;
    Ok(web::Json(outcome))
}

/// Look up a booking by its manage token.
#[utoipa::path(
    get,
    path = "/api/v1/manage/{token}",
    params(("token" = Uuid, Path, description = "Manage token")),
    responses(
        (status = 200, description = "Reservation", body = ReservationSchema),
        (status = 404, description = "Unknown token", body = ErrorSchema)
    ),
    tags = ["reservations"],
    operation_id = "getManagedReservation",
    security([])
)]
#[get("/manage/{token}")]
pub async fn get_managed(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Reservation>> {
    let reservation = state
        .schedule_query
        .find_by_manage_token(ManageToken::from_uuid(path.into_inner()))
        .await?;
    Ok(web::Json(reservation))
}

/// Cancel a booking by its manage token.
#[utoipa::path(
    delete,
    path = "/api/v1/manage/{token}",
    params(("token" = Uuid, Path, description = "Manage token")),
    responses(
        (status = 204, description = "Reservation canceled"),
        (status = 404, description = "Unknown token", body = ErrorSchema)
    ),
    tags = ["reservations"],
    operation_id = "cancelManagedReservation",
    security([])
)]
#[delete("/manage/{token}")]
pub async fn cancel_managed(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    state
        .schedule
        .cancel_by_manage_token(ManageToken::from_uuid(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
