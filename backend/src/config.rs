//! Runtime configuration.
//!
//! Values come from the environment; a `.env` file next to the binary is
//! loaded first when present.
//!
//! | Variable | Used for |
//! |----------|----------|
//! | `SUPABASE_URL` | base URL of the hosted store |
//! | `SUPABASE_ANON_KEY` | project api key |
//! | `SUPABASE_ACCESS_TOKEN` | optional user token (scopes calls to the user's wedding) |
//! | `GUESTLIST_PORT` | HTTP port, default 3000 |
//! | `GUESTLIST_MAX_UPLOAD_MB` | upload size limit, default 10 |
//! | `GUESTLIST_SESSION_IDLE_MINUTES` | idle time before an import session is dropped, default 30 |

use std::env;

use crate::error::ConfigError;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_UPLOAD_MB: usize = 10;
pub const DEFAULT_SESSION_IDLE_MINUTES: u32 = 30;

const BYTES_PER_MB: usize = 1024 * 1024;

/// Connection settings for the hosted store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub url: String,
    pub api_key: String,
    pub access_token: Option<String>,
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source; blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Self {
            url: get("SUPABASE_URL").ok_or(ConfigError::MissingVar("SUPABASE_URL"))?,
            api_key: get("SUPABASE_ANON_KEY").ok_or(ConfigError::MissingVar("SUPABASE_ANON_KEY"))?,
            access_token: get("SUPABASE_ACCESS_TOKEN"),
        })
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub max_upload_bytes: usize,
    pub session_idle_minutes: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * BYTES_PER_MB,
            session_idle_minutes: DEFAULT_SESSION_IDLE_MINUTES,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("GUESTLIST_PORT") {
            config.port = value.trim().parse().map_err(|_| ConfigError::InvalidVar {
                name: "GUESTLIST_PORT",
                value: value.clone(),
            })?;
        }

        if let Some(value) = lookup("GUESTLIST_MAX_UPLOAD_MB") {
            let invalid = || ConfigError::InvalidVar {
                name: "GUESTLIST_MAX_UPLOAD_MB",
                value: value.clone(),
            };
            let mb: usize = value.trim().parse().map_err(|_| invalid())?;
            config.max_upload_bytes = mb.checked_mul(BYTES_PER_MB).ok_or_else(invalid)?;
        }

        if let Some(value) = lookup("GUESTLIST_SESSION_IDLE_MINUTES") {
            config.session_idle_minutes = value.trim().parse().map_err(|_| ConfigError::InvalidVar {
                name: "GUESTLIST_SESSION_IDLE_MINUTES",
                value: value.clone(),
            })?;
        }

        Ok(config)
    }
}
