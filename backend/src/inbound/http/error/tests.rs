//! Tests for HTTP error mapping.

use super::*;
use crate::domain::Error;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use actix_web::{App, HttpResponse, ResponseError, post, web};
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[fixture]
fn internal_error_case(expected_trace_id: String) -> Error {
    Error::internal("boom")
        .with_trace_id(expected_trace_id)
        .with_details(json!({"secret": "x"}))
}

#[fixture]
fn invalid_request_case(expected_trace_id: String) -> Error {
    Error::invalid_request("bad")
        .with_trace_id(expected_trace_id)
        .with_details(json!({"field": "name"}))
}

#[rstest]
fn status_code_matches_error_code() {
    let cases = [
        (Error::invalid_request("bad"), StatusCode::BAD_REQUEST),
        (Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED),
        (Error::forbidden("denied"), StatusCode::FORBIDDEN),
        (Error::not_found("missing"), StatusCode::NOT_FOUND),
        (Error::conflict("slot reserved"), StatusCode::CONFLICT),
        (Error::gone("hold expired or invalid"), StatusCode::GONE),
        (
            Error::service_unavailable("database offline"),
            StatusCode::SERVICE_UNAVAILABLE,
        ),
        (Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (err, status) in cases {
        assert_eq!(ResponseError::status_code(&err), status);
    }
}

async fn assert_error_response(
    error: Error,
    expected_status: StatusCode,
    expected_trace_id: Option<&str>,
) -> Error {
    let response = ResponseError::error_response(&error);
    assert_eq!(response.status(), expected_status);

    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .or_else(|| response.headers().get("Trace-Id"));
    match expected_trace_id {
        Some(expected) => {
            let trace_id = header
                .expect("Trace-Id header is set by error_response")
                .to_str()
                .expect("Trace-Id not valid UTF-8");
            assert_eq!(trace_id, expected);
        }
        None => assert!(header.is_none(), "Trace-Id header should not be present"),
    }

    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");

    serde_json::from_slice(&bytes).expect("Error JSON deserialisation succeeds")
}

#[rstest]
#[actix_web::test]
async fn error_responses_include_trace_id_and_payloads(
    #[from(internal_error_case)] internal_error: Error,
    #[from(invalid_request_case)] invalid_request: Error,
    expected_trace_id: String,
) {
    let redacted = assert_error_response(
        internal_error,
        StatusCode::INTERNAL_SERVER_ERROR,
        Some(expected_trace_id.as_str()),
    )
    .await;
    assert_eq!(redacted.code(), ErrorCode::InternalError);
    assert_eq!(redacted.message(), "Internal server error");
    assert!(redacted.details().is_none());

    let payload = assert_error_response(
        invalid_request,
        StatusCode::BAD_REQUEST,
        Some(expected_trace_id.as_str()),
    )
    .await;
    assert_eq!(payload.code(), ErrorCode::InvalidRequest);
    assert_eq!(payload.message(), "bad");
    assert_eq!(payload.details(), Some(&json!({"field": "name"})));
}

#[rstest]
#[actix_web::test]
async fn error_without_trace_id_omits_trace_header() {
    let error = Error::invalid_request("bad").with_details(json!({"field": "name"}));

    let payload = assert_error_response(error, StatusCode::BAD_REQUEST, None).await;
    assert_eq!(payload.code(), ErrorCode::InvalidRequest);
    assert_eq!(payload.message(), "bad");
    assert_eq!(payload.trace_id(), None);
    assert_eq!(payload.details(), Some(&json!({"field": "name"})));
}

#[rstest]
fn forbidden_maps_to_403() {
    assert_eq!(super::status_for(ErrorCode::Forbidden), StatusCode::FORBIDDEN);
}

#[rstest]
fn public_view_hides_internal_messages() {
    let internal = Error::internal("pool exhausted")
        .with_trace_id(TRACE_ID)
        .with_details(json!({"secret": true}));
    let redacted = super::public_view(&internal);
    assert_eq!(redacted.message(), "Internal server error");
    assert_eq!(redacted.trace_id(), Some(TRACE_ID));
    assert!(redacted.details().is_none());

    let conflict = Error::conflict("slot already held");
    assert_eq!(super::public_view(&conflict), conflict);
}

#[rstest]
#[actix_web::test]
async fn store_outage_hides_backend_and_asks_for_retry() {
    let outage = Error::service_unavailable("site repository unavailable: connection refused")
        .with_trace_id(TRACE_ID);
    let response = ResponseError::error_response(&outage);
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let retry_after = response
        .headers()
        .get(actix_web::http::header::RETRY_AFTER)
        .expect("Retry-After header is set")
        .to_str()
        .expect("Retry-After is ASCII");
    assert_eq!(retry_after, RETRY_AFTER_SECS.to_string());

    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let payload: Error = serde_json::from_slice(&bytes).expect("Error JSON deserialisation succeeds");
    assert_eq!(payload.code(), ErrorCode::ServiceUnavailable);
    assert_eq!(payload.message(), "yard service temporarily unavailable");
    assert_eq!(payload.trace_id(), Some(TRACE_ID));
}

#[rstest]
fn gone_responses_carry_no_retry_hint() {
    assert!(
        ResponseError::error_response(&Error::gone("hold expired or invalid"))
            .headers()
            .get(actix_web::http::header::RETRY_AFTER)
            .is_none()
    );
}

#[test]
fn actix_client_errors_become_invalid_requests() {
    let err: Error = actix_web::error::ErrorBadRequest("missing site").into();

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), "missing site");
}

#[test]
fn actix_server_errors_are_redacted() {
    let err: Error = actix_web::error::ErrorInternalServerError("pool poisoned").into();

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Internal server error");
    assert_eq!(err.details(), None);
}

#[derive(serde::Deserialize)]
struct EtaBody {
    minutes: u32,
}

#[post("/eta")]
async fn eta_echo(body: web::Json<EtaBody>) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "minutes": body.minutes }))
}

#[actix_web::test]
async fn malformed_json_body_is_an_invalid_request_payload() {
    let app = actix_test::init_service(
        App::new()
            .app_data(json_config())
            .service(eta_echo),
    )
    .await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/eta")
            .insert_header(("content-type", "application/json"))
            .set_payload(r#"{"minutes": "soon"}"#)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let payload: Error = actix_test::read_body_json(res).await;
    assert_eq!(payload.code(), ErrorCode::InvalidRequest);
    assert_eq!(payload.message(), "malformed request body");
    assert!(payload.details().is_some_and(|d| d.get("reason").is_some()));
}
