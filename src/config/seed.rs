//! Seed data loading from config.toml
//!
//! The seed file bootstraps a fresh database: an initial admin account (without one,
//! nobody could log in to create users) and a starting service catalogue. Each part is
//! only applied to an empty table, so restarting the server never duplicates rows.

use crate::{
    core::{auth::AuthConfig, service, user},
    entities::{Role, Service, User},
    errors::{Error, Result},
};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

/// Configuration structure representing the entire seed file
#[derive(Debug, Default, Deserialize)]
pub struct SeedConfig {
    /// Bootstrap administrator account
    pub admin: Option<AdminSeed>,
    /// Services to create on first start
    #[serde(default)]
    pub services: Vec<ServiceSeed>,
}

/// Credentials for the bootstrap administrator
#[derive(Debug, Clone, Deserialize)]
pub struct AdminSeed {
    /// Login name
    pub username: String,
    /// Plain text; hashed before it is stored
    pub password: String,
}

/// A single service catalogue entry
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSeed {
    /// Service name shown on visits and reports
    pub name: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Price in the clinic's currency
    pub price: f64,
    /// Optional grouping, e.g. "diagnostics"
    pub category: Option<String>,
}

/// Loads seed configuration from a TOML file.
///
/// A missing file is not an error: it yields an empty configuration.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or is not valid TOML.
pub fn load_seed_config<P: AsRef<Path>>(path: P) -> Result<SeedConfig> {
    let path = path.as_ref();
    if !path.exists() {
        info!("No seed file at {}, skipping seeding", path.display());
        return Ok(SeedConfig::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read seed file {}: {e}", path.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse seed file {}: {e}", path.display()),
    })
}

/// Applies the seed configuration to empty tables.
pub async fn apply_seed(
    db: &DatabaseConnection,
    seed: &SeedConfig,
    auth: &AuthConfig,
) -> Result<()> {
    if let Some(admin) = &seed.admin {
        if User::find().count(db).await? == 0 {
            user::create_user(
                db,
                auth,
                user::NewUser {
                    username: admin.username.clone(),
                    password: admin.password.clone(),
                    role: Role::Admin,
                    owner_id: None,
                },
            )
            .await?;
            info!("Seeded admin account '{}'", admin.username);
        } else {
            warn!("Users already exist, not seeding admin account");
        }
    }

    if !seed.services.is_empty() && Service::find().count(db).await? == 0 {
        for entry in &seed.services {
            service::create_service(
                db,
                service::ServiceInput {
                    name: entry.name.clone(),
                    description: entry.description.clone(),
                    price: entry.price,
                    category: entry.category.clone(),
                },
            )
            .await?;
        }
        info!("Seeded {} services", seed.services.len());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{setup_test_db, test_auth_config};

    const SEED: &str = r#"
        [admin]
        username = "admin"
        password = "changeme"

        [[services]]
        name = "Consultation"
        price = 30.0
        category = "general"

        [[services]]
        name = "Vaccination"
        description = "Annual vaccine"
        price = 45.5
    "#;

    #[test]
    fn test_parse_seed_config() {
        let config: SeedConfig = toml::from_str(SEED).unwrap();
        assert_eq!(config.admin.unwrap().username, "admin");
        assert_eq!(config.services.len(), 2);
        assert_eq!(config.services[1].price, 45.5);
        assert!(config.services[1].category.is_none());
    }

    #[test]
    fn test_missing_seed_file_is_empty() {
        let config = load_seed_config("definitely/not/here.toml").unwrap();
        assert!(config.admin.is_none());
        assert!(config.services.is_empty());
    }

    #[tokio::test]
    async fn test_apply_seed_only_into_empty_tables() -> Result<()> {
        let db = setup_test_db().await?;
        let config: SeedConfig = toml::from_str(SEED).unwrap();
        let auth = test_auth_config();

        apply_seed(&db, &config, &auth).await?;
        apply_seed(&db, &config, &auth).await?;

        assert_eq!(User::find().count(&db).await?, 1);
        assert_eq!(Service::find().count(&db).await?, 2);
        Ok(())
    }
}
