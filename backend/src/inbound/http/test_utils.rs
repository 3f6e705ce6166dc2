//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::ServiceResponse;
use actix_web::{test, web};

use crate::domain::Error;
use crate::domain::UploadLimits;
use crate::domain::ports::{
    MockAccountCommand, MockTokenAuthenticator, MockUserFilesCommand, MockUserFilesQuery,
};

use super::state::{HttpState, HttpStatePorts};

/// Mocks for every driving port. Unset expectations panic when called.
#[derive(Default)]
pub struct MockPorts {
    pub accounts: MockAccountCommand,
    pub authenticator: MockTokenAuthenticator,
    pub files: MockUserFilesCommand,
    pub files_query: MockUserFilesQuery,
    pub upload_limits: UploadLimits,
}

impl MockPorts {
    pub fn into_state(self) -> web::Data<HttpState> {
        let ports = HttpStatePorts {
            accounts: Arc::new(self.accounts),
            authenticator: Arc::new(self.authenticator),
            files: Arc::new(self.files),
            files_query: Arc::new(self.files_query),
        };
        web::Data::new(HttpState::new(ports, self.upload_limits))
    }
}

/// State whose only configured port is the authenticator.
pub fn state_with_authenticator(authenticator: MockTokenAuthenticator) -> web::Data<HttpState> {
    MockPorts {
        authenticator,
        ..MockPorts::default()
    }
    .into_state()
}

/// Decode the error envelope from a response.
pub async fn error_body(res: ServiceResponse) -> Error {
    test::read_body_json(res).await
}
