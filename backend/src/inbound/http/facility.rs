//! Facility contact info handlers.
//!
//! ```text
//! GET /api/v1/facility
//! PUT /api/v1/facility {"facilityPhone":"+15155550100","supportPhone":null}  (staff)
//! ```

use actix_web::{get, put, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{Error, FacilityInfo};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, FacilityInfoSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Body of `PUT /api/v1/facility`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FacilityInfoBody {
    pub facility_phone: Option<String>,
    pub support_phone: Option<String>,
}

/// Public contact numbers for the facility.
#[utoipa::path(
    get,
    path = "/api/v1/facility",
    responses(
        (status = 200, description = "Contact numbers", body = FacilityInfoSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["facility"],
    operation_id = "getFacilityInfo",
    security([])
)]
#[get("/facility")]
pub async fn get_facility_info(state: web::Data<HttpState>) -> ApiResult<web::Json<FacilityInfo>> {
    let info = state.facility.get().await.map_err(Error::from)?;
    Ok(web::Json(info))
}

/// Replace the facility contact numbers. Blank values clear a number.
#[utoipa::path(
    put,
    path = "/api/v1/facility",
    request_body = FacilityInfoBody,
    responses(
        (status = 200, description = "Stored contact numbers", body = FacilityInfoSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Admin access required", body = ErrorSchema)
    ),
    tags = ["facility"],
    operation_id = "updateFacilityInfo"
)]
#[put("/facility")]
pub async fn update_facility_info(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<FacilityInfoBody>,
) -> ApiResult<web::Json<FacilityInfo>> {
    let admin = session.require_admin(state.login.as_ref()).await?;
    let FacilityInfoBody {
        facility_phone,
        support_phone,
    } = payload.into_inner();
    let info = FacilityInfo {
        facility_phone,
        support_phone,
    }
    .normalized();
    state
        .facility
        .update(&info)
        .await
        .map_err(Error::from)?;
    info!(admin = %admin.masked(), "facility info updated");
    Ok(web::Json(info))
}
