//! Application settings loaded via OrthoConfig.
//!
//! Values come from `FILELOCKER_*` environment variables, CLI flags or a
//! config file. The token secret is deliberately not part of this struct; see
//! [`crate::inbound::http::token_config`].

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Deserializer};

use crate::domain::{DEFAULT_BCRYPT_COST, DEFAULT_MAX_UPLOAD_BYTES};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// The environment layer yields a plain string for one origin and a sequence
/// once the value contains a comma.
#[derive(Deserialize)]
#[serde(untagged)]
enum OriginList {
    One(String),
    Many(Vec<String>),
}

fn origin_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<OriginList>::deserialize(deserializer)?.map(|origins| match origins {
            OriginList::One(origin) => vec![origin],
            OriginList::Many(origins) => origins,
        }),
    )
}

/// Runtime configuration for the HTTP server and its adapters.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FILELOCKER")]
pub struct AppSettings {
    /// Interface to bind.
    pub host: Option<String>,
    /// Port to bind.
    pub port: Option<u16>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Serve from process memory when no database is configured. Debug builds only.
    #[ortho_config(default = false)]
    pub allow_in_memory: bool,
    /// Allowed CORS origins; the environment form is comma-separated.
    #[serde(default, deserialize_with = "origin_list")]
    pub cors_allowed_origins: Option<Vec<String>>,
    /// Ceiling on the base64-encoded upload size, in bytes.
    pub max_upload_bytes: Option<usize>,
    /// bcrypt work factor for new password digests.
    pub bcrypt_cost: Option<u32>,
}

impl AppSettings {
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Socket address built from [`Self::host`] and [`Self::port`].
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host(), self.port()).parse()
    }

    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    /// Allowed CORS origins, trimmed, with empty entries dropped.
    pub fn cors_allowed_origins(&self) -> Vec<String> {
        let origins: Vec<String> = self
            .cors_allowed_origins
            .iter()
            .flatten()
            .map(|origin| origin.trim())
            .filter(|origin| !origin.is_empty())
            .map(str::to_owned)
            .collect();
        if origins.is_empty() {
            vec![DEFAULT_CORS_ORIGIN.to_owned()]
        } else {
            origins
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }

    pub fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost.unwrap_or(DEFAULT_BCRYPT_COST)
    }
}
