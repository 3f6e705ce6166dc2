//! Tests for HTTP error mapping.

use super::*;
use crate::domain::Error;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use actix_web::{App, ResponseError, web};
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[fixture]
fn internal_error_case(expected_trace_id: String) -> Error {
    Error::internal("connection refused by db-1")
        .with_trace_id(expected_trace_id)
        .with_details(json!({"secret": "x"}))
}

#[fixture]
fn invalid_request_case(expected_trace_id: String) -> Error {
    Error::invalid_request("bad")
        .with_trace_id(expected_trace_id)
        .with_details(json!({"field": "email"}))
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("invalid token"), StatusCode::UNAUTHORIZED)]
#[case(Error::conflict("email already registered"), StatusCode::CONFLICT)]
#[case(Error::payload_too_large("too big"), StatusCode::PAYLOAD_TOO_LARGE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] err: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&err), status);
}

async fn assert_error_response(
    error: Error,
    expected_status: StatusCode,
    expected_trace_id: Option<&str>,
) -> Error {
    let response = ResponseError::error_response(&error);
    assert_eq!(response.status(), expected_status);

    let header = response.headers().get(TRACE_ID_HEADER);
    match expected_trace_id {
        Some(expected) => {
            let trace_id = header
                .expect("trace-id header is set by error_response")
                .to_str()
                .expect("trace-id is valid UTF-8");
            assert_eq!(trace_id, expected);
        }
        None => assert!(header.is_none(), "trace-id header should not be present"),
    }

    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");

    serde_json::from_slice(&bytes).expect("Error JSON deserialisation succeeds")
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted_but_keep_trace_id(
    #[from(internal_error_case)] internal_error: Error,
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
}

#[rstest]
#[actix_web::test]
async fn client_errors_pass_through_unchanged(
    #[from(invalid_request_case)] invalid_request: Error,
    expected_trace_id: String,
) {
    let payload = assert_error_response(
        invalid_request,
        StatusCode::BAD_REQUEST,
        Some(expected_trace_id.as_str()),
    )
    .await;
    assert_eq!(payload.code(), ErrorCode::InvalidRequest);
    assert_eq!(payload.message(), "bad");
    assert_eq!(payload.details(), Some(&json!({"field": "email"})));
}

#[rstest]
#[actix_web::test]
async fn error_without_trace_id_omits_trace_header() {
    let error = Error::conflict("email already registered");

    let payload = assert_error_response(error, StatusCode::CONFLICT, None).await;
    assert_eq!(payload.code(), ErrorCode::Conflict);
    assert_eq!(payload.trace_id(), None);
}

#[test]
fn from_actix_error_is_redacted_internal_error() {
    let err: Error = actix_web::error::ErrorBadRequest("boom").into();

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Internal server error");
    assert_eq!(err.details(), None);
}

#[derive(serde::Deserialize)]
struct Probe {
    #[expect(dead_code, reason = "the field only drives deserialisation")]
    value: String,
}

async fn echo(_body: web::Json<Probe>) -> actix_web::HttpResponse {
    actix_web::HttpResponse::NoContent().finish()
}

#[rstest]
#[case("{\"value\":\"a\"}".repeat(4), StatusCode::PAYLOAD_TOO_LARGE, ErrorCode::PayloadTooLarge)]
#[case("{not json".to_owned(), StatusCode::BAD_REQUEST, ErrorCode::InvalidRequest)]
#[actix_web::test]
async fn json_extractor_failures_use_the_envelope(
    #[case] body: String,
    #[case] status: StatusCode,
    #[case] code: ErrorCode,
) {
    let app = actix_test::init_service(
        App::new()
            .app_data(
                web::JsonConfig::default()
                    .limit(32)
                    .error_handler(json_error_handler),
            )
            .route("/", web::post().to(echo)),
    )
    .await;
    let req = actix_test::TestRequest::post()
        .uri("/")
        .insert_header(("content-type", "application/json"))
        .set_payload(body)
        .to_request();

    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), status);
    let payload: Error = actix_test::read_body_json(res).await;
    assert_eq!(payload.code(), code);
}
