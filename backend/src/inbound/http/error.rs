//! HTTP rendering of domain errors.
//!
//! Drivers and yard staff see the same JSON payload for every failure. Store
//! outages and internal faults are logged in full and answered with a generic
//! message, so backend names and connection strings stay server side. Outages
//! also carry `Retry-After` so kiosk clients back off instead of hammering the
//! booking endpoints.

use std::fmt::Display;

use actix_web::http::header::{self, HeaderValue};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode, web};
use serde_json::json;
use tracing::{error, warn};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

pub use crate::domain::ApiResult;

/// Seconds a client should wait before retrying after a store outage.
pub const RETRY_AFTER_SECS: u32 = 30;

const OUTAGE_MESSAGE: &str = "yard service temporarily unavailable";
const INTERNAL_MESSAGE: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::Gone => StatusCode::GONE,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Payload a client is allowed to see for `error`.
fn public_view(error: &Error) -> Error {
    let generic = match error.code() {
        ErrorCode::InternalError => Error::internal(INTERNAL_MESSAGE),
        ErrorCode::ServiceUnavailable => Error::service_unavailable(OUTAGE_MESSAGE),
        _ => return error.clone(),
    };
    match error.trace_id() {
        Some(id) => generic.with_trace_id(id.to_owned()),
        None => generic,
    }
}

fn log_server_fault(error: &Error) {
    let trace_id = error.trace_id().unwrap_or("-");
    match error.code() {
        ErrorCode::InternalError => {
            error!(trace_id, detail = error.message(), "request failed");
        }
        ErrorCode::ServiceUnavailable => {
            warn!(trace_id, detail = error.message(), "store unavailable");
        }
        _ => {}
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        log_server_fault(self);
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        if self.code() == ErrorCode::ServiceUnavailable {
            builder.insert_header((header::RETRY_AFTER, HeaderValue::from(RETRY_AFTER_SECS)));
        }

        builder.json(public_view(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        if err.as_response_error().status_code().is_client_error() {
            return Error::invalid_request(err.to_string());
        }
        error!(error = %err, "actix error promoted to domain error");
        Error::internal(INTERNAL_MESSAGE)
    }
}

fn malformed(part: &str, err: &dyn Display) -> actix_web::Error {
    Error::invalid_request(format!("malformed request {part}"))
        .with_details(json!({ "reason": err.to_string() }))
        .into()
}

/// JSON body extractor settings reporting bad bodies as `invalid_request`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| malformed("body", &err))
}

/// Query string extractor settings reporting bad parameters as `invalid_request`.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req: &HttpRequest| malformed("query", &err))
}

/// Form extractor settings for the SMS webhook.
pub fn form_config() -> web::FormConfig {
    web::FormConfig::default().error_handler(|err, _req: &HttpRequest| malformed("form", &err))
}

#[cfg(test)]
mod tests;
