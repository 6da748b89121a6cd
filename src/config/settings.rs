//! Server settings loaded from environment variables.
//!
//! Every variable has a default so the server starts with an empty environment.
//! The JWT secret default is only suitable for development and is logged as such.

use crate::{
    core::auth::AuthConfig,
    errors::{Error, Result},
};
use std::{env, fmt::Display, path::PathBuf, str::FromStr};
use tracing::{info, warn};

const DEV_JWT_SECRET: &str = "fallback_secret_key_for_dev";

/// Settings for the HTTP server and the auth gate.
#[derive(Debug, Clone)]
pub struct Settings {
    /// TCP port to listen on (`PORT`)
    pub port: u16,
    /// Token signing and password hashing parameters
    pub auth: AuthConfig,
    /// Location of the optional seed file (`CLINIC_CONFIG`)
    pub seed_path: PathBuf,
}

impl Settings {
    /// Reads all settings from the environment.
    ///
    /// # Errors
    /// Returns `Error::Config` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set, using the development fallback secret");
            DEV_JWT_SECRET.to_string()
        });

        Ok(Self {
            port: try_load("PORT", 3000)?,
            auth: AuthConfig {
                jwt_secret,
                token_ttl: chrono::Duration::days(try_load("TOKEN_TTL_DAYS", 7)?),
                bcrypt_cost: try_load("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            },
            seed_path: PathBuf::from(
                env::var("CLINIC_CONFIG").unwrap_or_else(|_| "config.toml".to_string()),
            ),
        })
    }
}

fn try_load<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e| Error::Config {
            message: format!("Invalid {key} value {raw:?}: {e}"),
        }),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
