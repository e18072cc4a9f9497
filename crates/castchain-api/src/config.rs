//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::time::Duration;

use castchain_catalog::jikan::{DEFAULT_CAST_LANGUAGE, DEFAULT_JIKAN_BASE_URL};

use crate::error::AppError;
use crate::state::DEFAULT_ENDED_SESSION_TTL;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CATALOG_TIMEOUT_SECS: u64 = 10;

/// Settings for the API process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Root of the Jikan-compatible catalog API.
    pub catalog_base_url: String,
    /// Voice actor language kept in rosters.
    pub catalog_language: String,
    /// Per-request timeout for catalog calls.
    pub catalog_timeout: Duration,
    /// How long an ended session stays readable before it is released.
    pub ended_session_ttl: Duration,
}

impl AppConfig {
    /// Reads `HOST`, `PORT`, `CATALOG_BASE_URL`, `CATALOG_LANGUAGE`,
    /// `CATALOG_TIMEOUT_SECS` and `ENDED_SESSION_TTL_SECS`, falling back to
    /// defaults for unset variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a numeric variable does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => DEFAULT_PORT,
        };
        let timeout_secs = match lookup("CATALOG_TIMEOUT_SECS") {
            Some(raw) => raw.parse().map_err(|e| {
                AppError::Config(format!("CATALOG_TIMEOUT_SECS must be whole seconds: {e}"))
            })?,
            None => DEFAULT_CATALOG_TIMEOUT_SECS,
        };
        let ended_session_ttl = match lookup("ENDED_SESSION_TTL_SECS") {
            Some(raw) => Duration::from_secs(raw.parse().map_err(|e| {
                AppError::Config(format!("ENDED_SESSION_TTL_SECS must be whole seconds: {e}"))
            })?),
            None => DEFAULT_ENDED_SESSION_TTL,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            port,
            catalog_base_url: lookup("CATALOG_BASE_URL")
                .unwrap_or_else(|| DEFAULT_JIKAN_BASE_URL.to_owned()),
            catalog_language: lookup("CATALOG_LANGUAGE")
                .unwrap_or_else(|| DEFAULT_CAST_LANGUAGE.to_owned()),
            catalog_timeout: Duration::from_secs(timeout_secs),
            ended_session_ttl,
        })
    }

    /// Address the server binds to.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `host:port` is not a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}
