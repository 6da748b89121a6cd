//! Shared test utilities for the clinic crate.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        animal::{self, NewAnimal},
        auth::AuthConfig,
        disease::{self, DiseaseInput},
        owner::{self, OwnerInput},
        service::{self, ServiceInput},
        user::{self, NewUser},
        visit::{self, NewVisit},
    },
    entities::{self, Role, VisitStatus},
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Date given to every visit made by [`create_test_visit`].
pub const TEST_VISIT_DATE: &str = "2024-03-10T12:00:00Z";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Auth settings with the cheapest bcrypt cost so tests stay fast.
#[must_use]
pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test-secret".to_string(),
        token_ttl: chrono::Duration::days(7),
        // lowest cost bcrypt accepts
        bcrypt_cost: 4,
    }
}

/// Creates a user with the given role and no linked owner.
pub async fn create_test_user(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
    role: Role,
) -> Result<entities::user::Model> {
    user::create_user(
        db,
        &test_auth_config(),
        NewUser {
            username: username.to_string(),
            password: password.to_string(),
            role,
            owner_id: None,
        },
    )
    .await
}

/// Creates an owner with only a name and an optional phone.
pub async fn create_test_owner(
    db: &DatabaseConnection,
    full_name: &str,
    phone: Option<&str>,
) -> Result<entities::owner::Model> {
    owner::create_owner(
        db,
        OwnerInput {
            full_name: full_name.to_string(),
            phone: phone.map(str::to_string),
            ..Default::default()
        },
    )
    .await
}

/// Creates a dog with an optional owner and no medical history.
pub async fn create_test_animal(
    db: &DatabaseConnection,
    name: &str,
    owner_id: Option<i64>,
) -> Result<entities::animal::Model> {
    let details = animal::create_animal(
        db,
        NewAnimal {
            name: name.to_string(),
            species: "dog".to_string(),
            owner_id,
            ..Default::default()
        },
    )
    .await?;
    Ok(details.animal)
}

/// Creates a disease with only a name.
pub async fn create_test_disease(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::disease::Model> {
    disease::create_disease(
        db,
        DiseaseInput {
            name: name.to_string(),
            ..Default::default()
        },
    )
    .await
}

/// Creates an uncategorized service at the given price.
pub async fn create_test_service(
    db: &DatabaseConnection,
    name: &str,
    price: f64,
) -> Result<entities::service::Model> {
    service::create_service(
        db,
        ServiceInput {
            name: name.to_string(),
            description: None,
            price,
            category: None,
        },
    )
    .await
}

/// Creates a visit for the animal on [`TEST_VISIT_DATE`].
///
/// Uses the animal's owner, or creates one if the animal has none.
pub async fn create_test_visit(
    db: &DatabaseConnection,
    animal: &entities::animal::Model,
    status: VisitStatus,
    service_ids: &[i64],
) -> Result<entities::visit::Model> {
    let owner_id = match animal.owner_id {
        Some(owner_id) => owner_id,
        None => create_test_owner(db, "Visit Owner", None).await?.id,
    };

    let details = visit::create_visit(
        db,
        NewVisit {
            animal_id: animal.id,
            owner_id,
            date: TEST_VISIT_DATE.to_string(),
            status: Some(status),
            service_ids: service_ids.to_vec(),
            ..Default::default()
        },
    )
    .await?;
    Ok(details.visit)
}

/// Sets up a complete test environment with an owned animal.
/// Returns (db, animal) for visit and report tests.
pub async fn setup_with_animal() -> Result<(DatabaseConnection, entities::animal::Model)> {
    let db = setup_test_db().await?;
    let owner = create_test_owner(&db, "Test Owner", Some("555-0000")).await?;
    let animal = create_test_animal(&db, "Test Animal", Some(owner.id)).await?;
    Ok((db, animal))
}
