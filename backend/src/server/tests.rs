//! Tests for server construction, covering readiness signalling and CORS.

use super::*;
use actix_web::http::StatusCode;
use actix_web::test;
use filelocker::domain::{PasswordHasher, TokenSecret};
use filelocker::outbound::memory::MemoryDatabase;
use rstest::{fixture, rstest};

const ALLOWED_ORIGIN: &str = "http://localhost:3000";

#[fixture]
fn health_state() -> web::Data<HealthState> {
    web::Data::new(HealthState::new())
}

#[fixture]
fn server_config() -> ServerConfig {
    ServerConfig::new(
        "127.0.0.1:0".parse().expect("socket address"),
        Storage::InMemory(MemoryDatabase::new()),
        TokenSecret::new(vec![9_u8; 32]).expect("secret"),
        PasswordHasher::new(4).expect("hasher"),
    )
    .with_cors_origins(vec![ALLOWED_ORIGIN.to_owned()])
}

#[rstest]
#[actix_rt::test]
async fn create_server_marks_ready(health_state: web::Data<HealthState>, server_config: ServerConfig) {
    assert_eq!(server_config.bind_addr().port(), 0);
    assert!(!health_state.is_ready(), "state should start unready");

    let _server =
        create_server(health_state.clone(), server_config).expect("server should bind");

    assert!(health_state.is_ready(), "server creation should mark readiness");
}

fn app_dependencies(config: &ServerConfig) -> AppDependencies {
    let health_state = web::Data::new(HealthState::new());
    health_state.mark_ready();
    AppDependencies {
        health_state,
        http_state: build_http_state(config),
        cors_origins: config.cors_origins.clone(),
    }
}

#[rstest]
#[actix_rt::test]
async fn preflight_from_allowed_origin_is_accepted(server_config: ServerConfig) {
    let app = test::init_service(build_app(app_dependencies(&server_config))).await;
    let req = test::TestRequest::default()
        .method(Method::OPTIONS)
        .uri("/files")
        .insert_header((header::ORIGIN, ALLOWED_ORIGIN))
        .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
        .insert_header((header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization"))
        .to_request();

    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok()),
        Some(ALLOWED_ORIGIN)
    );
}

#[rstest]
#[actix_rt::test]
async fn responses_carry_trace_id(server_config: ServerConfig) {
    let app = test::init_service(build_app(app_dependencies(&server_config))).await;
    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/health/ready").to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("trace-id"));
}

#[cfg(debug_assertions)]
#[rstest]
#[actix_rt::test]
async fn openapi_document_is_served_in_debug_builds(server_config: ServerConfig) {
    let app = test::init_service(build_app(app_dependencies(&server_config))).await;
    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api-docs/openapi.json").to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
}
