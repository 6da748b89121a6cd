//! Client portal booking: owner, animal and a planned visit in one request.
//!
//! The three writes are separate steps, not one transaction. If a later step fails, the
//! owner (and animal) written before it stay in place. The owner is looked up by phone
//! first, so resubmitting a failed booking reuses that owner instead of duplicating it.

use crate::{
    core::{
        animal::{self, NewAnimal},
        owner::{self, OwnerInput},
        period,
        visit::{self, NewVisit, VisitDetails},
    },
    entities::VisitStatus,
    errors::Result,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use tracing::info;

/// The pet being booked in.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingAnimal {
    /// Pet name
    pub name: String,
    /// Species, e.g. "cat"
    pub species: String,
    /// Breed, if known
    pub breed: Option<String>,
    /// Age in years
    pub age: Option<i32>,
}

/// A booking request from the client portal.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingInput {
    /// Reused when an owner with the same phone exists
    pub owner: OwnerInput,
    /// Always created as a new animal
    pub animal: BookingAnimal,
    /// Requested appointment date or timestamp
    pub date: String,
    /// Reason for the visit
    pub notes: Option<String>,
}

/// Books a planned visit, creating the owner and animal as needed.
///
/// # Errors
/// Returns `Error::Validation` for a missing or unparsable date before anything is
/// written. Errors from the owner, animal and visit steps are passed through.
pub async fn create_booking(db: &DatabaseConnection, input: BookingInput) -> Result<VisitDetails> {
    period::parse_instant(&input.date)?;

    let phone = input.owner.phone.as_deref().unwrap_or_default().trim();
    let existing = if phone.is_empty() {
        None
    } else {
        owner::get_owners(db, Some(phone)).await?.into_iter().next()
    };
    let owner = match existing {
        Some(owner) => owner,
        None => owner::create_owner(db, input.owner).await?,
    };

    let animal = animal::create_animal(
        db,
        NewAnimal {
            name: input.animal.name,
            species: input.animal.species,
            breed: input.animal.breed,
            age: input.animal.age,
            owner_id: Some(owner.id),
            ..Default::default()
        },
    )
    .await?;

    let visit = visit::create_visit(
        db,
        NewVisit {
            animal_id: animal.animal.id,
            owner_id: owner.id,
            date: input.date,
            notes: input.notes,
            status: Some(VisitStatus::Planned),
            ..Default::default()
        },
    )
    .await?;

    info!(
        owner_id = owner.id,
        animal_id = animal.animal.id,
        visit_id = visit.visit.id,
        "Booking created"
    );
    Ok(visit)
}
