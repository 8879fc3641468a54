//! Phone login handlers.
//!
//! ```text
//! POST /api/v1/auth/request-code {"phone":"515-555-0142"}
//! POST /api/v1/auth/verify {"phone":"515-555-0142","code":"123456"}
//! POST /api/v1/auth/logout
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};

use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Body of `POST /api/v1/auth/request-code`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestCodeRequest {
    pub phone: String,
}

/// Body of `POST /api/v1/auth/verify`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCodeRequest {
    pub phone: String,
    pub code: String,
}

/// Reply to a successful verification.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedResponse {
    #[schema(example = "+15155550142")]
    pub phone: String,
}

/// Text a six digit login code to the phone.
#[utoipa::path(
    post,
    path = "/api/v1/auth/request-code",
    request_body = RequestCodeRequest,
    responses(
        (status = 204, description = "Code sent"),
        (status = 400, description = "Invalid phone", body = ErrorSchema),
        (status = 403, description = "Phone is banned", body = ErrorSchema),
        (status = 503, description = "SMS transport unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "requestLoginCode",
    security([])
)]
#[post("/auth/request-code")]
pub async fn request_code(
    state: web::Data<HttpState>,
    payload: web::Json<RequestCodeRequest>,
) -> ApiResult<HttpResponse> {
    state.login.request_code(&payload.phone).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Check a login code and start a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/verify",
    request_body = VerifyCodeRequest,
    responses(
        (status = 200, description = "Logged in", body = VerifiedResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Wrong, expired, or exhausted code", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "verifyLoginCode",
    security([])
)]
#[post("/auth/verify")]
pub async fn verify_code(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<VerifyCodeRequest>,
) -> ApiResult<web::Json<VerifiedResponse>> {
    let VerifyCodeRequest { phone, code } = payload.into_inner();
    let phone = state.login.verify_code(&phone, &code).await?;
    session.persist_phone(&phone)?;
    Ok(web::Json(VerifiedResponse {
        phone: phone.to_string(),
    }))
}

/// End the session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}
