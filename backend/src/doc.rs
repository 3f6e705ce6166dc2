//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every HTTP path plus the request and response
//! schemas, and registers the bearer token security scheme. Swagger UI serves
//! it in debug builds; `cargo run --bin openapi-dump` exports it for tooling.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, User};
use crate::inbound::http::accounts::{
    LoginRequest, MessageResponse, ProtectedResponse, RegisterRequest, SessionResponse,
};
use crate::inbound::http::files::{UploadFileRequest, UploadFileResponse, UserFileResponse};

/// Registers the `bearer` scheme referenced by protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token returned by POST /register or POST /login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "filelocker API",
        description = "Account registration, bearer token sessions and per-user file storage."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::protected,
        crate::inbound::http::accounts::logout,
        crate::inbound::http::files::upload_file,
        crate::inbound::http::files::list_files,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        RegisterRequest,
        LoginRequest,
        SessionResponse,
        ProtectedResponse,
        MessageResponse,
        UploadFileRequest,
        UploadFileResponse,
        UserFileResponse,
    )),
    tags(
        (name = "accounts", description = "Registration, login and token lifecycle"),
        (name = "files", description = "Files owned by the authenticated caller"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("Error", "code")]
    #[case("Error", "message")]
    #[case("User", "name")]
    #[case("SessionResponse", "expiresAt")]
    #[case("UserFileResponse", "fileData")]
    fn schemas_expose_wire_field_names(#[case] schema: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let found = schemas.get(schema).expect("schema registered");
        assert_object_schema_has_field(found, field);
    }

    #[rstest]
    fn user_schema_never_exposes_credentials() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let RefOr::T(Schema::Object(user)) = schemas.get("User").expect("User schema") else {
            panic!("expected Object schema");
        };
        assert!(!user.properties.contains_key("password_hash"));
        assert!(!user.properties.contains_key("token"));
    }

    #[rstest]
    #[case("/register")]
    #[case("/login")]
    #[case("/protected")]
    #[case("/logout")]
    #[case("/files")]
    #[case("/health/ready")]
    fn every_route_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "{path} missing");
    }

    #[rstest]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(matches!(
            components.security_schemes.get("bearer"),
            Some(SecurityScheme::Http(_))
        ));
    }
}
