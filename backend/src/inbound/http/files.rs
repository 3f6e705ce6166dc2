//! Owner-scoped file handlers.
//!
//! ```text
//! POST /files {"file_name":"notes.txt","file_data":"aGVsbG8="}
//! GET  /files
//! ```
//!
//! Both routes require a live bearer token; the caller only ever sees files
//! it uploaded.

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Error, UploadRequest, UploadValidationError, UserFile};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::state::HttpState;

/// Upload body for `POST /files`. Accepts snake_case or camelCase keys.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct UploadFileRequest {
    #[serde(alias = "fileName")]
    #[schema(example = "notes.txt")]
    pub file_name: String,
    /// Standard base64 with padding.
    #[serde(alias = "fileData")]
    #[schema(example = "aGVsbG8=")]
    pub file_data: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadFileResponse {
    pub id: Uuid,
    pub message: String,
}

/// A stored file as listed to its owner.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserFileResponse {
    pub id: Uuid,
    pub file_name: String,
    /// Standard base64 with padding.
    pub file_data: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserFile> for UserFileResponse {
    fn from(file: UserFile) -> Self {
        Self {
            id: *file.id.as_uuid(),
            file_name: file.file_name.as_ref().to_owned(),
            file_data: file.payload.to_base64(),
            created_at: file.created_at,
        }
    }
}

fn map_upload_error(err: UploadValidationError) -> Error {
    let message = err.to_string();
    let (field, code) = match err {
        UploadValidationError::TooLarge { max } => {
            return Error::payload_too_large(message)
                .with_details(json!({ "field": "file_data", "maxBytes": max }));
        }
        UploadValidationError::EmptyFileName => ("file_name", "empty_file_name"),
        UploadValidationError::FileNameTooLong { .. } => ("file_name", "file_name_too_long"),
        UploadValidationError::FileNameInvalidCharacters => ("file_name", "invalid_file_name"),
        UploadValidationError::EmptyFileData => ("file_data", "empty_file_data"),
        UploadValidationError::InvalidEncoding => ("file_data", "invalid_encoding"),
        UploadValidationError::EmptyPayload => ("file_data", "empty_payload"),
    };
    Error::invalid_request(message).with_details(json!({ "field": field, "code": code }))
}

/// Store a file for the caller.
#[utoipa::path(
    post,
    path = "/files",
    request_body = UploadFileRequest,
    responses(
        (status = 201, description = "File stored", body = UploadFileResponse),
        (status = 400, description = "Missing field or bad encoding", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 413, description = "Payload too large", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["files"],
    operation_id = "uploadFile",
    security(("bearer" = []))
)]
#[post("/files")]
pub async fn upload_file(
    state: web::Data<HttpState>,
    user: Authenticated,
    payload: web::Json<UploadFileRequest>,
) -> ApiResult<HttpResponse> {
    let UploadFileRequest {
        file_name,
        file_data,
    } = payload.into_inner();
    let upload = UploadRequest::decode(&file_name, &file_data, state.upload_limits)
        .map_err(map_upload_error)?;
    let id = state.files.upload(&user, upload).await?;
    Ok(HttpResponse::Created().json(UploadFileResponse {
        id: *id.as_uuid(),
        message: "file uploaded".to_owned(),
    }))
}

/// List the caller's files, oldest first.
#[utoipa::path(
    get,
    path = "/files",
    responses(
        (status = 200, description = "Caller's files", body = [UserFileResponse]),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["files"],
    operation_id = "listFiles",
    security(("bearer" = []))
)]
#[get("/files")]
pub async fn list_files(
    state: web::Data<HttpState>,
    user: Authenticated,
) -> ApiResult<web::Json<Vec<UserFileResponse>>> {
    let files = state.files_query.list(&user).await?;
    Ok(web::Json(files.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AuthenticatedUser, EmailAddress, ErrorCode, FileId, FileName, FilePayload, UploadLimits,
        UserId,
    };
    use crate::inbound::http::test_utils::{MockPorts, error_body};
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;
    use serde_json::{Value, json};

    fn owner_id() -> UserId {
        UserId::from_uuid(Uuid::from_u128(7))
    }

    fn authenticated_ports() -> MockPorts {
        let mut ports = MockPorts::default();
        ports.authenticator.expect_authenticate().returning(|_| {
            Ok(AuthenticatedUser::new(
                owner_id(),
                EmailAddress::new("ada@example.com").expect("email"),
            ))
        });
        ports
    }

    async fn send(ports: MockPorts, req: test::TestRequest) -> actix_web::dev::ServiceResponse {
        let app = test::init_service(
            App::new()
                .app_data(ports.into_state())
                .service(upload_file)
                .service(list_files),
        )
        .await;
        let req = req.insert_header(("Authorization", "Bearer live")).to_request();
        test::call_service(&app, req).await
    }

    fn upload(body: Value) -> test::TestRequest {
        test::TestRequest::post().uri("/files").set_json(body)
    }

    #[rstest]
    #[case(json!({"file_name": "x.txt", "file_data": "aGVsbG8="}))]
    #[case(json!({"fileName": "x.txt", "fileData": "aGVsbG8="}))]
    #[actix_web::test]
    async fn upload_stores_decoded_payload(#[case] body: Value) {
        let mut ports = authenticated_ports();
        let stored = FileId::random();
        ports
            .files
            .expect_upload()
            .withf(|owner, upload| {
                owner.id() == &owner_id()
                    && upload.file_name().as_ref() == "x.txt"
                    && upload.payload().as_bytes() == b"hello"
            })
            .times(1)
            .returning(move |_, _| Ok(stored));

        let res = send(ports, upload(body)).await;

        assert_eq!(res.status(), StatusCode::CREATED);
        let body: UploadFileResponse = test::read_body_json(res).await;
        assert_eq!(body.id, *stored.as_uuid());
    }

    #[rstest]
    #[case(json!({"file_name": "", "file_data": "aGVsbG8="}), "file_name")]
    #[case(json!({"file_data": "aGVsbG8="}), "file_name")]
    #[case(json!({"file_name": "x.txt", "file_data": ""}), "file_data")]
    #[case(json!({"file_name": "x.txt", "file_data": "%%%"}), "file_data")]
    #[actix_web::test]
    async fn invalid_uploads_never_reach_the_service(#[case] body: Value, #[case] field: &str) {
        let res = send(authenticated_ports(), upload(body)).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let err = error_body(res).await;
        assert_eq!(err.details().and_then(|d| d.get("field")), Some(&json!(field)));
    }

    #[rstest]
    #[actix_web::test]
    async fn oversized_upload_is_payload_too_large() {
        let mut ports = authenticated_ports();
        ports.upload_limits = UploadLimits::new(8);

        let res = send(
            ports,
            upload(json!({"file_name": "x.txt", "file_data": "aGVsbG8gd29ybGQ="})),
        )
        .await;

        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(error_body(res).await.code(), ErrorCode::PayloadTooLarge);
    }

    #[rstest]
    #[actix_web::test]
    async fn list_encodes_payloads_as_base64() {
        let mut ports = authenticated_ports();
        ports.files_query.expect_list().times(1).returning(|owner| {
            Ok(vec![UserFile {
                id: FileId::random(),
                owner: *owner.id(),
                file_name: FileName::new("x.txt").expect("name"),
                payload: FilePayload::from_bytes(b"hello".to_vec()),
                created_at: Utc::now(),
            }])
        });

        let res = send(ports, test::TestRequest::get().uri("/files")).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body[0]["fileName"], "x.txt");
        assert_eq!(body[0]["fileData"], "aGVsbG8=");
        assert!(body[0].get("createdAt").is_some());
    }

    #[rstest]
    #[actix_web::test]
    async fn listing_requires_a_token() {
        let app = test::init_service(
            App::new()
                .app_data(MockPorts::default().into_state())
                .service(list_files),
        )
        .await;
        let res =
            test::call_service(&app, test::TestRequest::get().uri("/files").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
