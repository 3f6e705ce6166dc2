//! Backend entry-point: loads settings, prepares storage and serves the API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use filelocker::domain::{PasswordHasher, UploadLimits};
use filelocker::inbound::http::health::HealthState;
use filelocker::inbound::http::token_config::{BuildMode, token_secret_from_env};
use filelocker::outbound::memory::MemoryDatabase;
use filelocker::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use filelocker::settings::AppSettings;
use server::{ServerConfig, Storage, create_server};

async fn build_storage(settings: &AppSettings, mode: BuildMode) -> Result<Storage> {
    let Some(database_url) = settings.database_url() else {
        if settings.allow_in_memory && mode == BuildMode::Debug {
            warn!("no database configured; serving from process memory (dev only)");
            return Ok(Storage::InMemory(MemoryDatabase::new()));
        }
        return Err(eyre!(
            "FILELOCKER_DATABASE_URL is required (in-memory storage is only allowed in debug builds)"
        ));
    };

    run_pending_migrations(database_url)
        .await
        .wrap_err("failed to apply database migrations")?;

    let pool = DbPool::new(
        PoolConfig::new(database_url).with_max_size(settings.db_max_connections()),
    )
    .await
    .wrap_err("failed to create database pool")?;
    info!(max_connections = settings.db_max_connections(), "database pool ready");
    Ok(Storage::Postgres(pool))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(%error, "tracing init failed");
    }

    let settings = AppSettings::load().wrap_err("failed to load settings")?;
    let mode = BuildMode::from_debug_assertions();
    let token_secret = token_secret_from_env(&DefaultEnv::new(), mode)
        .wrap_err("failed to resolve token secret")?;
    let hasher =
        PasswordHasher::new(settings.bcrypt_cost()).wrap_err("invalid bcrypt cost setting")?;
    let storage = build_storage(&settings, mode).await?;
    let bind_addr = settings
        .bind_addr()
        .wrap_err("invalid FILELOCKER_HOST/FILELOCKER_PORT")?;

    let config = ServerConfig::new(bind_addr, storage, token_secret, hasher)
        .with_upload_limits(UploadLimits::new(settings.max_upload_bytes()))
        .with_cors_origins(settings.cors_allowed_origins());

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    server.await?;
    Ok(())
}
