//! Truck queue handlers.
//!
//! ```text
//! GET  /api/v1/sites/{site}/queue                    (staff)
//! GET  /api/v1/sites/{site}/queue/history?start=..&end=..&type=LOAD (staff)
//! GET  /api/v1/sites/{site}/line
//! GET  /api/v1/sites/{site}/line/{lineType}
//! POST /api/v1/trucks/{id}/status                    (staff)
//! POST /api/v1/trucks/{id}/eta                       (staff)
//! POST /api/v1/enroute
//! GET  /api/v1/scale/verify?code=0421&site=CIF&date=.. (staff)
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::EnRouteRequest;
use crate::domain::{
    Error, HistoryQuery, HistoryReport, PublicLine, PublicLines, TodayQueue, Truck, TruckId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    ErrorSchema, HistoryReportSchema, PublicLineSchema, PublicLinesSchema, TodayQueueSchema,
    TruckSchema,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_date, parse_eta, parse_history_filter, parse_line, parse_optional_date,
    parse_queue_code, parse_site_code, parse_status,
};

/// Body of `POST /api/v1/trucks/{id}/status`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusBody {
    #[schema(example = "ARRIVED")]
    pub status: String,
}

/// Body of `POST /api/v1/trucks/{id}/eta`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EtaBody {
    #[schema(example = 30)]
    pub eta_minutes: u32,
}

/// Body of `POST /api/v1/enroute`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnRouteBody {
    #[schema(example = "515-555-0142")]
    pub phone: String,
    #[schema(example = "CIF")]
    pub site: String,
    pub eta_minutes: Option<u32>,
}

impl TryFrom<EnRouteBody> for EnRouteRequest {
    type Error = Error;

    fn try_from(body: EnRouteBody) -> Result<Self, Self::Error> {
        if body.phone.trim().is_empty() {
            return Err(Error::invalid_request("phone and site required"));
        }
        Ok(Self {
            site: parse_site_code(&body.site, FieldName::new("site"))?,
            eta: body
                .eta_minutes
                .map(|minutes| parse_eta(minutes, FieldName::new("etaMinutes")))
                .transpose()?,
            phone: body.phone,
        })
    }
}

/// Date range and line filter for the history report.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct HistoryParams {
    /// First day, `YYYY-MM-DD`.
    pub start: String,
    /// Last day, `YYYY-MM-DD`, inclusive.
    pub end: String,
    /// `LOAD`, `DELIVER`, or `ALL` (default).
    #[serde(rename = "type")]
    pub line_type: Option<String>,
}

/// Scale-house lookup of a driver's code.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ScaleVerifyParams {
    /// Four-digit queue code.
    pub code: String,
    /// Site code.
    pub site: String,
    /// Operating day, `YYYY-MM-DD`; today when absent.
    pub date: Option<String>,
}

/// Staff list of today's trucks, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/sites/{site}/queue",
    params(("site" = String, Path, description = "Site code")),
    responses(
        (status = 200, description = "Today's queue", body = TodayQueueSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Admin access required", body = ErrorSchema),
        (status = 404, description = "Unknown site", body = ErrorSchema)
    ),
    tags = ["queue"],
    operation_id = "todayQueue"
)]
#[get("/sites/{site}/queue")]
pub async fn today_queue(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<TodayQueue>> {
    session.require_admin(state.login.as_ref()).await?;
    let site = parse_site_code(&path, FieldName::new("site"))?;
    Ok(web::Json(state.queue_query.today_queue(&site).await?))
}

/// Historical truck rows with wait and total averages.
#[utoipa::path(
    get,
    path = "/api/v1/sites/{site}/queue/history",
    params(("site" = String, Path, description = "Site code"), HistoryParams),
    responses(
        (status = 200, description = "History report", body = HistoryReportSchema),
        (status = 400, description = "Invalid date range", body = ErrorSchema),
        (status = 403, description = "Admin access required", body = ErrorSchema)
    ),
    tags = ["queue"],
    operation_id = "queueHistory"
)]
#[get("/sites/{site}/queue/history")]
pub async fn history(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    params: web::Query<HistoryParams>,
) -> ApiResult<web::Json<HistoryReport>> {
    session.require_admin(state.login.as_ref()).await?;
    let site = parse_site_code(&path, FieldName::new("site"))?;
    let query = HistoryQuery {
        start: parse_date(&params.start, FieldName::new("start"))?,
        end: parse_date(&params.end, FieldName::new("end"))?,
        filter: parse_history_filter(params.line_type.as_deref(), FieldName::new("type"))?,
    };
    Ok(web::Json(state.queue_query.history(&site, query).await?))
}

/// Public masked view of both lines.
#[utoipa::path(
    get,
    path = "/api/v1/sites/{site}/line",
    params(("site" = String, Path, description = "Site code")),
    responses(
        (status = 200, description = "Both lines", body = PublicLinesSchema),
        (status = 404, description = "Unknown site", body = ErrorSchema)
    ),
    tags = ["queue"],
    operation_id = "publicLines",
    security([])
)]
#[get("/sites/{site}/line")]
pub async fn public_lines(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<PublicLines>> {
    let site = parse_site_code(&path, FieldName::new("site"))?;
    Ok(web::Json(state.queue_query.public_lines(&site).await?))
}

/// Public masked view of one line.
#[utoipa::path(
    get,
    path = "/api/v1/sites/{site}/line/{lineType}",
    params(
        ("site" = String, Path, description = "Site code"),
        ("lineType" = String, Path, description = "LOAD or DELIVER")
    ),
    responses(
        (status = 200, description = "One line", body = PublicLineSchema),
        (status = 400, description = "Unknown line type", body = ErrorSchema),
        (status = 404, description = "Unknown site", body = ErrorSchema)
    ),
    tags = ["queue"],
    operation_id = "publicLine",
    security([])
)]
#[get("/sites/{site}/line/{line_type}")]
pub async fn public_line(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<PublicLine>> {
    let (site, line) = path.into_inner();
    let site = parse_site_code(&site, FieldName::new("site"))?;
    let line = parse_line(&line, FieldName::new("lineType"))?;
    Ok(web::Json(state.queue_query.public_line(&site, line).await?))
}

/// Staff sets a truck's status.
#[utoipa::path(
    post,
    path = "/api/v1/trucks/{id}/status",
    params(("id" = i64, Path, description = "Truck id")),
    request_body = StatusBody,
    responses(
        (status = 200, description = "Updated truck", body = TruckSchema),
        (status = 400, description = "Unknown status", body = ErrorSchema),
        (status = 404, description = "Unknown truck", body = ErrorSchema)
    ),
    tags = ["queue"],
    operation_id = "updateTruckStatus"
)]
#[post("/trucks/{id}/status")]
pub async fn update_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<StatusBody>,
) -> ApiResult<web::Json<Truck>> {
    session.require_admin(state.login.as_ref()).await?;
    let status = parse_status(&payload.status, FieldName::new("status"))?;
    let truck = state
        .queue
        .update_status(TruckId::new(path.into_inner()), status)
        .await?;
    Ok(web::Json(truck))
}

/// Staff records an ETA for a truck.
#[utoipa::path(
    post,
    path = "/api/v1/trucks/{id}/eta",
    params(("id" = i64, Path, description = "Truck id")),
    request_body = EtaBody,
    responses(
        (status = 200, description = "Updated truck", body = TruckSchema),
        (status = 400, description = "ETA out of range", body = ErrorSchema),
        (status = 404, description = "Unknown truck", body = ErrorSchema)
    ),
    tags = ["queue"],
    operation_id = "setTruckEta"
)]
#[post("/trucks/{id}/eta")]
pub async fn set_eta(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<EtaBody>,
) -> ApiResult<web::Json<Truck>> {
    session.require_admin(state.login.as_ref()).await?;
    let eta = parse_eta(payload.eta_minutes, FieldName::new("etaMinutes"))?;
    let truck = state
        .queue
        .set_eta(TruckId::new(path.into_inner()), eta)
        .await?;
    Ok(web::Json(truck))
}

/// Driver reports being on the way.
#[utoipa::path(
    post,
    path = "/api/v1/enroute",
    request_body = EnRouteBody,
    responses(
        (status = 200, description = "Truck entry", body = TruckSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Phone is banned", body = ErrorSchema),
        (status = 404, description = "Unknown site", body = ErrorSchema)
    ),
    tags = ["queue"],
    operation_id = "markEnRoute",
    security([])
)]
#[post("/enroute")]
pub async fn mark_en_route(
    state: web::Data<HttpState>,
    payload: web::Json<EnRouteBody>,
) -> ApiResult<web::Json<Truck>> {
    let request = EnRouteRequest::try_from(payload.into_inner())?;
    Ok(web::Json(state.queue.mark_en_route(request).await?))
}

/// Scale house confirms which truck a quoted code belongs to.
#[utoipa::path(
    get,
    path = "/api/v1/scale/verify",
    params(ScaleVerifyParams),
    responses(
        (status = 200, description = "Latest truck with the code", body = TruckSchema),
        (status = 400, description = "Code is not 4 digits", body = ErrorSchema),
        (status = 403, description = "Admin access required", body = ErrorSchema),
        (status = 404, description = "No truck for site and date", body = ErrorSchema)
    ),
    tags = ["queue"],
    operation_id = "verifyQueueCode"
)]
#[get("/scale/verify")]
pub async fn verify_queue_code(
    state: web::Data<HttpState>,
    session: SessionContext,
    params: web::Query<ScaleVerifyParams>,
) -> ApiResult<web::Json<Truck>> {
    session.require_admin(state.login.as_ref()).await?;
    let code = parse_queue_code(&params.code, FieldName::new("code"))?;
    let site = parse_site_code(&params.site, FieldName::new("site"))?;
    let date = parse_optional_date(params.date.as_deref(), FieldName::new("date"))?;
    let truck = state.queue_query.verify_code(&site, &code, date).await?;
    Ok(web::Json(truck))
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
