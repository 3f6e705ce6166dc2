//! Wiring of domain services over the configured storage.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::info;

use filelocker::domain::TokenIssuer;
use filelocker::inbound::http::state::{HttpState, HttpStatePorts, ServiceDeps};
use filelocker::outbound::persistence::{DieselCredentialStore, DieselUserFileRepository};

use super::{ServerConfig, Storage};

fn service_deps(config: &ServerConfig, clock: Arc<dyn Clock>) -> ServiceDeps {
    ServiceDeps {
        hasher: config.hasher.clone(),
        tokens: Arc::new(TokenIssuer::new(&config.token_secret, clock.clone())),
        clock,
    }
}

fn build_ports(config: &ServerConfig, clock: Arc<dyn Clock>) -> HttpStatePorts {
    let deps = service_deps(config, clock);
    match &config.storage {
        Storage::Postgres(pool) => {
            info!(storage = "postgres", "wiring HTTP ports");
            HttpStatePorts::from_adapters(
                Arc::new(DieselCredentialStore::new(pool.clone())),
                Arc::new(DieselUserFileRepository::new(pool.clone())),
                deps,
            )
        }
        Storage::InMemory(db) => {
            info!(storage = "memory", "wiring HTTP ports");
            HttpStatePorts::from_adapters(
                Arc::new(db.credential_store()),
                Arc::new(db.user_file_repository()),
                deps,
            )
        }
    }
}

/// Build the shared HTTP state from the configured storage.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let ports = build_ports(config, Arc::new(DefaultClock));
    web::Data::new(HttpState::new(ports, config.upload_limits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use filelocker::domain::{
        BearerToken, ErrorCode, LoginCredentials, PasswordHasher,
        Registration, TokenSecret, UploadLimits, UploadRequest,
    };
    use filelocker::outbound::memory::MemoryDatabase;
    use rstest::rstest;

    fn memory_config() -> ServerConfig {
        ServerConfig::new(
            "127.0.0.1:0".parse().expect("socket address"),
            Storage::InMemory(MemoryDatabase::new()),
            TokenSecret::new(vec![7_u8; 32]).expect("secret"),
            PasswordHasher::new(4).expect("hasher"),
        )
        .with_upload_limits(UploadLimits::new(64))
    }

    #[rstest]
    #[tokio::test]
    async fn in_memory_ports_share_one_account_table() {
        let state = build_http_state(&memory_config());
        assert_eq!(state.upload_limits, UploadLimits::new(64));

        let registration =
            Registration::try_from_parts("ada@example.com", "pw", "Ada").expect("registration");
        let session = state.accounts.register(registration).await.expect("register");
        let caller = state
            .authenticator
            .authenticate(&session.token.token)
            .await
            .expect("fresh token authenticates");

        let upload = UploadRequest::decode("x.txt", "aGVsbG8=", UploadLimits::new(64))
            .expect("upload");
        state.files.upload(&caller, upload).await.expect("upload");
        assert_eq!(state.files_query.list(&caller).await.expect("list").len(), 1);

        let login = LoginCredentials::try_from_parts("ada@example.com", "pw").expect("creds");
        state.accounts.login(login).await.expect("login");
        let stale = state
            .authenticator
            .authenticate(&session.token.token)
            .await
            .expect_err("first token was rotated out");
        assert_eq!(stale.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_token_is_rejected() {
        let state = build_http_state(&memory_config());
        let token = BearerToken::new("not-a-jwt").expect("token");
        let err = state
            .authenticator
            .authenticate(&token)
            .await
            .expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }
}
