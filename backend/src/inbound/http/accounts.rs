//! Account lifecycle handlers.
//!
//! ```text
//! POST /register {"email":"ada@example.com","password":"pw","name":"Ada"}
//! POST /login    {"email":"ada@example.com","password":"pw"}
//! GET  /protected   (Authorization: Bearer <token>)
//! POST /logout      (Authorization: Bearer <token>)
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::account_service::INVALID_CREDENTIALS;
use crate::domain::ports::AuthSession;
use crate::domain::{CredentialsValidationError, Error, LoginCredentials, Registration, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::state::HttpState;

/// Registration body for `POST /register`.
///
/// Absent fields deserialise as empty strings so they surface as validation
/// errors naming the field.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct RegisterRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "correct horse battery staple")]
    pub password: String,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
}

/// Login body for `POST /login`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "correct horse battery staple")]
    pub password: String,
}

/// Account plus the token that is now its only live credential.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: User,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl From<AuthSession> for SessionResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            user: session.user,
            token: session.token.token.as_str().to_owned(),
            expires_at: session.token.expires_at,
        }
    }
}

/// Body of `GET /protected`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProtectedResponse {
    pub message: String,
    pub email: String,
}

/// Plain acknowledgement.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

fn field_error(message: impl Into<String>, field: &str, code: &str) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field, "code": code }))
}

fn map_registration_error(err: CredentialsValidationError) -> Error {
    let message = err.to_string();
    match err {
        CredentialsValidationError::EmptyEmail => field_error(message, "email", "empty_email"),
        CredentialsValidationError::InvalidEmail(_) => {
            field_error(message, "email", "invalid_email")
        }
        CredentialsValidationError::EmptyPassword => {
            field_error(message, "password", "empty_password")
        }
        CredentialsValidationError::EmptyName => field_error(message, "name", "empty_name"),
        CredentialsValidationError::InvalidName(_) => field_error(message, "name", "invalid_name"),
    }
}

fn map_login_error(err: CredentialsValidationError) -> Error {
    match err {
        // A malformed address can never be registered, so it is reported
        // exactly like an unknown account.
        CredentialsValidationError::InvalidEmail(_) => Error::unauthorized(INVALID_CREDENTIALS),
        other => map_registration_error(other),
    }
}

/// Create an account and sign it in.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = SessionResponse),
        (status = 400, description = "Missing or invalid field", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        email,
        password,
        name,
    } = payload.into_inner();
    let registration =
        Registration::try_from_parts(&email, &password, &name).map_err(map_registration_error)?;
    let session = state.accounts.register(registration).await?;
    Ok(HttpResponse::Created().json(SessionResponse::from(session)))
}

/// Verify credentials and issue a fresh token, revoking the previous one.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionResponse),
        (status = 400, description = "Missing field", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<SessionResponse>> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&email, &password).map_err(map_login_error)?;
    let session = state.accounts.login(credentials).await?;
    Ok(web::Json(session.into()))
}

/// Confirm the bearer token is live.
#[utoipa::path(
    get,
    path = "/protected",
    responses(
        (status = 200, description = "Token accepted", body = ProtectedResponse),
        (status = 401, description = "Missing or invalid token", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "protected",
    security(("bearer" = []))
)]
#[get("/protected")]
pub async fn protected(user: Authenticated) -> web::Json<ProtectedResponse> {
    web::Json(ProtectedResponse {
        message: "token is valid".to_owned(),
        email: user.email().to_string(),
    })
}

/// Revoke the caller's live token.
#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "logout",
    security(("bearer" = []))
)]
#[post("/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    user: Authenticated,
) -> ApiResult<web::Json<MessageResponse>> {
    state.accounts.logout(&user).await?;
    Ok(web::Json(MessageResponse {
        message: "logged out".to_owned(),
    }))
}
