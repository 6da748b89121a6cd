//! Service business logic - the clinic's price catalogue.
//!
//! Deleting a service is deliberately unguarded: visits keep their own cost snapshot and
//! the report aggregator treats missing services as contributing nothing.

use crate::{
    entities::{Service, service},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;

/// Fields accepted when creating or updating a service.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceInput {
    /// Required; becomes the name reports rank by
    pub name: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Finite and non-negative
    pub price: f64,
    /// Optional grouping
    pub category: Option<String>,
}

fn validate(input: &ServiceInput) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(Error::validation("Service name cannot be empty"));
    }

    if input.price < 0.0 || !input.price.is_finite() {
        return Err(Error::InvalidAmount {
            amount: input.price,
        });
    }

    Ok(())
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Lists all services ordered by name.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_services(db: &DatabaseConnection) -> Result<Vec<service::Model>> {
    Service::find()
        .order_by_asc(service::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a service by id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_service_by_id(
    db: &DatabaseConnection,
    service_id: i64,
) -> Result<Option<service::Model>> {
    Service::find_by_id(service_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a service after checking the name is present and the price is a
/// finite, non-negative number.
///
/// # Errors
/// - `Validation` for an empty name
/// - `InvalidAmount` for a negative or non-finite price
pub async fn create_service(
    db: &DatabaseConnection,
    input: ServiceInput,
) -> Result<service::Model> {
    validate(&input)?;

    let service = service::ActiveModel {
        name: Set(input.name.trim().to_string()),
        description: Set(trimmed(input.description)),
        price: Set(input.price),
        category: Set(trimmed(input.category)),
        ..Default::default()
    };
    service.insert(db).await.map_err(Into::into)
}

/// Replaces every mutable field of a service.
///
/// Existing visits keep their `total_cost`; only future cost computations and
/// reports see the new price.
///
/// # Errors
/// Same as [`create_service`], plus `NotFound` if the service does not exist.
pub async fn update_service(
    db: &DatabaseConnection,
    service_id: i64,
    input: ServiceInput,
) -> Result<service::Model> {
    validate(&input)?;

    let mut service: service::ActiveModel = Service::find_by_id(service_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Service", service_id))?
        .into();

    service.name = Set(input.name.trim().to_string());
    service.description = Set(trimmed(input.description));
    service.price = Set(input.price);
    service.category = Set(trimmed(input.category));

    service.update(db).await.map_err(Into::into)
}

/// Deletes a service. Visits that listed it keep their cost snapshot.
///
/// # Errors
/// Returns `NotFound` if the service does not exist.
pub async fn delete_service(db: &DatabaseConnection, service_id: i64) -> Result<()> {
    let result = Service::delete_by_id(service_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Service", service_id));
    }
    Ok(())
}
