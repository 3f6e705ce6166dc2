//! HTTP inbound adapter exposing the REST endpoints.

pub mod accounts;
pub mod auth;
pub mod error;
pub mod files;
pub mod health;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod token_config;

use actix_web::web;

use crate::domain::UploadLimits;

pub use error::{ApiResult, json_error_handler};

use state::HttpState;

/// Room for the JSON envelope around a maximum-size upload.
pub const JSON_ENVELOPE_BYTES: usize = 64 * 1024;

/// JSON extractor config sized for the largest accepted upload.
pub fn json_config(limits: UploadLimits) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limits.max_encoded_bytes().saturating_add(JSON_ENVELOPE_BYTES))
        .error_handler(json_error_handler)
}

/// Register the account and file routes with their shared state.
///
/// # Examples
/// ```no_run
/// use actix_web::{App, web};
/// use filelocker::inbound::http::{configure, state::HttpState};
///
/// fn app(state: web::Data<HttpState>) {
///     let _app = App::new().configure(configure(state));
/// }
/// ```
pub fn configure(state: web::Data<HttpState>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(json_config(state.upload_limits))
            .app_data(state)
            .service(accounts::register)
            .service(accounts::login)
            .service(accounts::protected)
            .service(accounts::logout)
            .service(files::upload_file)
            .service(files::list_files);
    }
}
