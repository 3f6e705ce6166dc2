//! Bearer authentication for HTTP handlers.
//!
//! Handlers that need a caller identity take [`Authenticated`] as an
//! argument. Extraction parses the `Authorization` header and resolves it
//! through the [`TokenAuthenticator`](crate::domain::ports::TokenAuthenticator)
//! port, so revocation is checked on every request.

use std::ops::Deref;

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use crate::domain::{AuthenticatedUser, BearerToken, Error};

use super::state::HttpState;

pub(crate) const MISSING_TOKEN: &str = "missing token";

/// Identity of the caller, resolved from a live bearer token.
#[derive(Debug, Clone)]
pub struct Authenticated(pub AuthenticatedUser);

impl Authenticated {
    pub fn into_inner(self) -> AuthenticatedUser {
        self.0
    }
}

impl Deref for Authenticated {
    type Target = AuthenticatedUser;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn bearer_from_request(req: &HttpRequest) -> Result<BearerToken, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .map(|value| value.to_str().unwrap_or_default());
    BearerToken::from_authorization_header(header).map_err(|reason| {
        debug!(%reason, "request rejected without a usable bearer token");
        Error::unauthorized(MISSING_TOKEN)
    })
}

impl FromRequest for Authenticated {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_from_request(req);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let token = token?;
            let state =
                state.ok_or_else(|| Error::internal("HTTP state is not registered with the app"))?;
            let user = state.authenticator.authenticate(&token).await?;
            Ok(Self(user))
        })
    }
}
