//! Animal business logic, including the embedded medical history.
//!
//! An animal and its medical history entries are written together in one database
//! transaction. Creating an inline owner (`new_owner`, `owner_data`) happens *before* that
//! transaction and is not rolled back if the animal write fails afterwards.
//!
//! Medical history edits carry over to the animal's visits:
//! - adding an entry fills in the disease on visits that have none,
//! - replacing an entry re-points visits from the old disease to the new one,
//! - removing an entry clears the disease on visits that pointed at it.

use crate::{
    core::{
        disease::{self, DiseaseInput},
        owner::{self, OwnerInput},
    },
    entities::{
        Animal, Disease, MedicalRecord, Owner, Visit, animal, disease as disease_entity,
        medical_record, owner as owner_entity, visit,
    },
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Reference to a disease in a submitted medical history.
#[derive(Debug, Clone, Deserialize)]
pub struct MedicalHistoryRef {
    /// Must name an existing disease
    pub disease_id: i64,
}

/// Fields accepted when creating an animal.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAnimal {
    /// Required, trimmed
    pub name: String,
    /// Required, trimmed; matched exactly by species search
    pub species: String,
    /// Breed, if known; blank values are stored as `None`
    pub breed: Option<String>,
    /// Age in years, never negative
    pub age: Option<i32>,
    /// Existing owner to link
    pub owner_id: Option<i64>,
    /// Owner to create first; takes precedence over `owner_id`
    pub new_owner: Option<OwnerInput>,
    /// Initial medical history entries
    #[serde(default)]
    pub medical_history: Vec<MedicalHistoryRef>,
}

/// Fields accepted when updating an animal.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAnimal {
    /// Required, trimmed
    pub name: String,
    /// Required, trimmed
    pub species: String,
    /// Breed; `None` clears it
    pub breed: Option<String>,
    /// Age in years; `None` clears it
    pub age: Option<i32>,
    /// Owner to link; `None` unlinks the animal unless `owner_data` creates one
    pub owner_id: Option<i64>,
    /// With `owner_id`: replaces that owner's fields. Without: creates a new owner.
    pub owner_data: Option<OwnerInput>,
}

/// A new medical history entry: either an existing disease by id, or a disease by
/// name that is created on the fly if the clinic does not know it yet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MedicalRecordInput {
    /// Existing disease; takes precedence over `disease_name`
    pub disease_id: Option<i64>,
    /// Disease looked up by name, created if unknown
    pub disease_name: Option<String>,
    /// Stored as the description of a newly created disease
    pub symptoms: Option<String>,
    /// Stored as the treatment of a newly created disease
    pub treatment: Option<String>,
}

/// One medical history entry with its disease resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicalEntry {
    /// Id of the entry itself, used to replace or remove it
    pub id: i64,
    /// Disease the entry refers to
    pub disease_id: i64,
    /// The disease row, absent if it has since been deleted
    pub disease: Option<disease_entity::Model>,
}

/// An animal with its owner and medical history resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimalDetails {
    #[serde(flatten)]
    /// The animal row
    pub animal: animal::Model,
    /// Linked owner, if any
    pub owner: Option<owner_entity::Model>,
    /// Entries in insertion order
    pub medical_history: Vec<MedicalEntry>,
}

struct AnimalFields {
    name: String,
    species: String,
    breed: Option<String>,
    age: Option<i32>,
}

fn validate_fields(
    name: &str,
    species: &str,
    breed: Option<String>,
    age: Option<i32>,
) -> Result<AnimalFields> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(Error::validation("Animal name cannot be empty"));
    }

    let species = species.trim().to_string();
    if species.is_empty() {
        return Err(Error::validation("Animal species cannot be empty"));
    }

    if let Some(age) = age.filter(|a| *a < 0) {
        return Err(Error::validation(format!(
            "Animal age cannot be negative: {age}"
        )));
    }

    Ok(AnimalFields {
        name,
        species,
        breed: breed
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty()),
        age,
    })
}

async fn load_details<C: ConnectionTrait>(
    db: &C,
    animals: Vec<animal::Model>,
) -> Result<Vec<AnimalDetails>> {
    if animals.is_empty() {
        return Ok(Vec::new());
    }

    let owner_ids: Vec<i64> = animals.iter().filter_map(|a| a.owner_id).collect();
    let owners: HashMap<i64, owner_entity::Model> = Owner::find()
        .filter(owner_entity::Column::Id.is_in(owner_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|o| (o.id, o))
        .collect();

    let animal_ids = animals.iter().map(|a| a.id);
    let records = MedicalRecord::find()
        .filter(medical_record::Column::AnimalId.is_in(animal_ids))
        .order_by_asc(medical_record::Column::Id)
        .all(db)
        .await?;

    let disease_ids = records.iter().map(|r| r.disease_id);
    let diseases: HashMap<i64, disease_entity::Model> = Disease::find()
        .filter(disease_entity::Column::Id.is_in(disease_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|d| (d.id, d))
        .collect();

    let mut history: HashMap<i64, Vec<MedicalEntry>> = HashMap::new();
    for record in records {
        history
            .entry(record.animal_id)
            .or_default()
            .push(MedicalEntry {
                id: record.id,
                disease_id: record.disease_id,
                disease: diseases.get(&record.disease_id).cloned(),
            });
    }

    Ok(animals
        .into_iter()
        .map(|animal| AnimalDetails {
            owner: animal.owner_id.and_then(|id| owners.get(&id).cloned()),
            medical_history: history.remove(&animal.id).unwrap_or_default(),
            animal,
        })
        .collect())
}

async fn load_one<C: ConnectionTrait>(db: &C, animal_id: i64) -> Result<AnimalDetails> {
    let animal = require_animal(db, animal_id).await?;
    load_details(db, vec![animal])
        .await?
        .pop()
        .ok_or_else(|| Error::not_found("Animal", animal_id))
}

/// Lists every animal with owner and medical history resolved.
///
/// # Errors
/// Returns an error if a database query fails.
pub async fn get_all_animals(db: &DatabaseConnection) -> Result<Vec<AnimalDetails>> {
    let animals = Animal::find()
        .order_by_asc(animal::Column::Id)
        .all(db)
        .await?;
    load_details(db, animals).await
}

/// Lists animals of exactly the given species.
pub async fn search_animals_by_species(
    db: &DatabaseConnection,
    species: &str,
) -> Result<Vec<AnimalDetails>> {
    let animals = Animal::find()
        .filter(animal::Column::Species.eq(species.trim()))
        .order_by_asc(animal::Column::Id)
        .all(db)
        .await?;
    load_details(db, animals).await
}

/// Fetches one animal with owner and medical history, or `None` if it does not exist.
///
/// # Errors
/// Returns an error if a database query fails.
pub async fn get_animal(db: &DatabaseConnection, animal_id: i64) -> Result<Option<AnimalDetails>> {
    let Some(animal) = Animal::find_by_id(animal_id).one(db).await? else {
        return Ok(None);
    };
    Ok(load_details(db, vec![animal]).await?.pop())
}

/// Fetches the bare animal row, failing with `NotFound` if it does not exist.
pub async fn require_animal<C: ConnectionTrait>(db: &C, animal_id: i64) -> Result<animal::Model> {
    Animal::find_by_id(animal_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Animal", animal_id))
}

/// Creates an animal, an optional inline owner, and its initial medical history.
///
/// `new_owner` is written before the animal's own transaction and stays if the
/// animal write fails afterwards.
///
/// # Errors
/// - `Validation` for an empty name or species, or a negative age
/// - `NotFound` for an unknown `owner_id` or a history entry naming an unknown disease
pub async fn create_animal(db: &DatabaseConnection, input: NewAnimal) -> Result<AnimalDetails> {
    let fields = validate_fields(&input.name, &input.species, input.breed, input.age)?;

    let owner_id = match input.new_owner {
        Some(new_owner) => Some(owner::create_owner(db, new_owner).await?.id),
        None => match input.owner_id {
            Some(owner_id) => Some(owner::require_owner(db, owner_id).await?.id),
            None => None,
        },
    };

    let txn = db.begin().await?;

    let animal = animal::ActiveModel {
        name: Set(fields.name),
        species: Set(fields.species),
        breed: Set(fields.breed),
        age: Set(fields.age),
        owner_id: Set(owner_id),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for entry in input.medical_history {
        disease::get_disease_by_id(&txn, entry.disease_id)
            .await?
            .ok_or_else(|| Error::not_found("Disease", entry.disease_id))?;

        medical_record::ActiveModel {
            animal_id: Set(animal.id),
            disease_id: Set(entry.disease_id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    debug!(animal_id = animal.id, "Animal created");

    load_one(db, animal.id).await
}

/// Replaces an animal's fields and optionally updates or creates its owner.
pub async fn update_animal(
    db: &DatabaseConnection,
    animal_id: i64,
    input: UpdateAnimal,
) -> Result<AnimalDetails> {
    let fields = validate_fields(&input.name, &input.species, input.breed, input.age)?;
    let mut animal: animal::ActiveModel = require_animal(db, animal_id).await?.into();

    let owner_id = match (input.owner_data, input.owner_id) {
        (Some(owner_data), Some(owner_id)) => {
            Some(owner::update_owner(db, owner_id, owner_data).await?.id)
        }
        (Some(owner_data), None) => Some(owner::create_owner(db, owner_data).await?.id),
        (None, Some(owner_id)) => Some(owner::require_owner(db, owner_id).await?.id),
        (None, None) => None,
    };

    animal.name = Set(fields.name);
    animal.species = Set(fields.species);
    animal.breed = Set(fields.breed);
    animal.age = Set(fields.age);
    animal.owner_id = Set(owner_id);
    animal.update(db).await?;

    load_one(db, animal_id).await
}

/// Deletes an animal and its medical history.
///
/// # Errors
/// - `NotFound` if the animal does not exist
/// - `Conflict` while any visit references the animal
pub async fn delete_animal(db: &DatabaseConnection, animal_id: i64) -> Result<()> {
    require_animal(db, animal_id).await?;

    let visits = Visit::find()
        .filter(visit::Column::AnimalId.eq(animal_id))
        .count(db)
        .await?;
    if visits > 0 {
        return Err(Error::conflict("animal still has visits"));
    }

    let txn = db.begin().await?;
    MedicalRecord::delete_many()
        .filter(medical_record::Column::AnimalId.eq(animal_id))
        .exec(&txn)
        .await?;
    Animal::delete_by_id(animal_id).exec(&txn).await?;
    txn.commit().await?;

    Ok(())
}

async fn require_record<C: ConnectionTrait>(
    db: &C,
    animal_id: i64,
    record_id: i64,
) -> Result<medical_record::Model> {
    MedicalRecord::find_by_id(record_id)
        .filter(medical_record::Column::AnimalId.eq(animal_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Medical record", record_id))
}

/// Sets `disease_id` on the animal's visits that currently match `current`.
async fn repoint_visits<C: ConnectionTrait>(
    db: &C,
    animal_id: i64,
    current: Option<i64>,
    replacement: Option<i64>,
) -> Result<u64> {
    let matching = match current {
        Some(disease_id) => visit::Column::DiseaseId.eq(disease_id),
        None => visit::Column::DiseaseId.is_null(),
    };

    let result = Visit::update_many()
        .col_expr(visit::Column::DiseaseId, Expr::value(replacement))
        .filter(visit::Column::AnimalId.eq(animal_id))
        .filter(matching)
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Appends a medical history entry and fills the disease in on the animal's visits
/// that have none.
///
/// # Errors
/// - `Validation` when neither `disease_id` nor a non-empty `disease_name` is given
/// - `NotFound` for an unknown animal or `disease_id`
pub async fn add_medical_record(
    db: &DatabaseConnection,
    animal_id: i64,
    input: MedicalRecordInput,
) -> Result<AnimalDetails> {
    require_animal(db, animal_id).await?;

    let txn = db.begin().await?;

    let disease = match (input.disease_id, input.disease_name) {
        (Some(disease_id), _) => disease::get_disease_by_id(&txn, disease_id)
            .await?
            .ok_or_else(|| Error::not_found("Disease", disease_id))?,
        (None, Some(name)) if !name.trim().is_empty() => {
            match disease::get_disease_by_name(&txn, &name).await? {
                Some(existing) => existing,
                None => {
                    disease::create_disease(
                        &txn,
                        DiseaseInput {
                            name,
                            description: input.symptoms,
                            treatment: input.treatment,
                        },
                    )
                    .await?
                }
            }
        }
        _ => {
            return Err(Error::validation(
                "either disease_id or disease_name is required",
            ));
        }
    };

    medical_record::ActiveModel {
        animal_id: Set(animal_id),
        disease_id: Set(disease.id),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let touched = repoint_visits(&txn, animal_id, None, Some(disease.id)).await?;
    txn.commit().await?;
    debug!(
        animal_id,
        disease_id = disease.id,
        touched,
        "Medical record added"
    );

    load_one(db, animal_id).await
}

/// Points an existing medical history entry at a different disease, moving the
/// animal's visits from the old disease to the new one.
///
/// # Errors
/// - `Validation` without a `disease_id`
/// - `NotFound` for an unknown animal, entry or disease
pub async fn replace_medical_record(
    db: &DatabaseConnection,
    animal_id: i64,
    record_id: i64,
    disease_id: Option<i64>,
) -> Result<AnimalDetails> {
    require_animal(db, animal_id).await?;
    let record = require_record(db, animal_id, record_id).await?;
    let disease_id = disease_id
        .ok_or_else(|| Error::validation("disease_id of the new disease is required"))?;
    disease::get_disease_by_id(db, disease_id)
        .await?
        .ok_or_else(|| Error::not_found("Disease", disease_id))?;

    let previous = record.disease_id;
    let txn = db.begin().await?;

    let mut record: medical_record::ActiveModel = record.into();
    record.disease_id = Set(disease_id);
    record.update(&txn).await?;

    repoint_visits(&txn, animal_id, Some(previous), Some(disease_id)).await?;
    txn.commit().await?;

    load_one(db, animal_id).await
}

/// Removes a medical history entry and clears that disease from the animal's visits.
///
/// # Errors
/// Returns `NotFound` for an unknown animal or entry.
pub async fn remove_medical_record(
    db: &DatabaseConnection,
    animal_id: i64,
    record_id: i64,
) -> Result<AnimalDetails> {
    require_animal(db, animal_id).await?;
    let record = require_record(db, animal_id, record_id).await?;

    let txn = db.begin().await?;
    MedicalRecord::delete_by_id(record.id).exec(&txn).await?;
    repoint_visits(&txn, animal_id, Some(record.disease_id), None).await?;
    txn.commit().await?;

    load_one(db, animal_id).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{entities::VisitStatus, test_utils::*};

    #[tokio::test]
    async fn test_create_animal_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let no_species = create_animal(
            &db,
            NewAnimal {
                name: "Rex".to_string(),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(no_species.unwrap_err(), Error::Validation { .. }));

        let negative_age = create_animal(
            &db,
            NewAnimal {
                name: "Rex".to_string(),
                species: "dog".to_string(),
                age: Some(-1),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(
            negative_age.unwrap_err(),
            Error::Validation { .. }
        ));

        let unknown_owner = create_animal(
            &db,
            NewAnimal {
                name: "Rex".to_string(),
                species: "dog".to_string(),
                owner_id: Some(77),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(unknown_owner.unwrap_err(), Error::NotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_animal_with_new_owner_and_history() -> Result<()> {
        let db = setup_test_db().await?;
        let flu = create_test_disease(&db, "Flu").await?;

        let details = create_animal(
            &db,
            NewAnimal {
                name: "Murka".to_string(),
                species: "cat".to_string(),
                new_owner: Some(OwnerInput {
                    full_name: "Anna".to_string(),
                    phone: Some("555-0101".to_string()),
                    ..Default::default()
                }),
                medical_history: vec![MedicalHistoryRef { disease_id: flu.id }],
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(details.owner.as_ref().unwrap().full_name, "Anna");
        assert_eq!(details.medical_history.len(), 1);
        let flu_entry = details.medical_history[0].disease.as_ref().unwrap();
        assert_eq!(flu_entry.name, "Flu");

        Ok(())
    }

    #[tokio::test]
    async fn test_search_by_species() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_animal(&db, "Rex", None).await?;
        create_animal(
            &db,
            NewAnimal {
                name: "Murka".to_string(),
                species: "cat".to_string(),
                ..Default::default()
            },
        )
        .await?;

        let cats = search_animals_by_species(&db, "cat").await?;
        assert_eq!(cats.len(), 1);
        assert_eq!(cats[0].animal.name, "Murka");
        assert_eq!(get_all_animals(&db).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_animal_creates_owner_from_owner_data() -> Result<()> {
        let db = setup_test_db().await?;
        let animal = create_test_animal(&db, "Rex", None).await?;

        let updated = update_animal(
            &db,
            animal.id,
            UpdateAnimal {
                name: "Rex II".to_string(),
                species: "dog".to_string(),
                owner_data: Some(OwnerInput {
                    full_name: "Boris".to_string(),
                    ..Default::default()
                }),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.animal.name, "Rex II");
        let owner = updated.owner.unwrap();
        assert_eq!(owner.full_name, "Boris");

        // owner_data with owner_id edits the existing owner in place
        let updated = update_animal(
            &db,
            animal.id,
            UpdateAnimal {
                name: "Rex II".to_string(),
                species: "dog".to_string(),
                owner_id: Some(owner.id),
                owner_data: Some(OwnerInput {
                    full_name: "Boris Ivanov".to_string(),
                    ..Default::default()
                }),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.owner.unwrap().full_name, "Boris Ivanov");
        assert_eq!(owner::get_owners(&db, None).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_medical_history_follows_into_visits() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_owner(&db, "Anna", None).await?;
        let animal = create_test_animal(&db, "Rex", Some(owner.id)).await?;
        let visit = create_test_visit(&db, &animal, VisitStatus::Planned, &[]).await?;

        // Add by name: creates the disease and fills the visit's empty disease
        let details = add_medical_record(
            &db,
            animal.id,
            MedicalRecordInput {
                disease_name: Some("Otitis".to_string()),
                symptoms: Some("Ear scratching".to_string()),
                ..Default::default()
            },
        )
        .await?;
        let otitis = details.medical_history[0].disease.clone().unwrap();
        assert_eq!(otitis.description.as_deref(), Some("Ear scratching"));
        let reloaded = Visit::find_by_id(visit.id).one(&db).await?.unwrap();
        assert_eq!(reloaded.disease_id, Some(otitis.id));

        // Replace: visit follows to the new disease
        let flu = create_test_disease(&db, "Flu").await?;
        let record_id = details.medical_history[0].id;
        let details = replace_medical_record(&db, animal.id, record_id, Some(flu.id)).await?;
        assert_eq!(details.medical_history[0].disease_id, flu.id);
        let reloaded = Visit::find_by_id(visit.id).one(&db).await?.unwrap();
        assert_eq!(reloaded.disease_id, Some(flu.id));

        // Remove: visit's disease is cleared
        let details = remove_medical_record(&db, animal.id, record_id).await?;
        assert!(details.medical_history.is_empty());
        let reloaded = Visit::find_by_id(visit.id).one(&db).await?.unwrap();
        assert_eq!(reloaded.disease_id, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_medical_record_errors() -> Result<()> {
        let db = setup_test_db().await?;
        let animal = create_test_animal(&db, "Rex", None).await?;

        let empty = add_medical_record(&db, animal.id, MedicalRecordInput::default()).await;
        assert!(matches!(empty.unwrap_err(), Error::Validation { .. }));

        let unknown = add_medical_record(
            &db,
            animal.id,
            MedicalRecordInput {
                disease_id: Some(404),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(unknown.unwrap_err(), Error::NotFound { .. }));

        let no_record = remove_medical_record(&db, animal.id, 404).await;
        assert!(matches!(no_record.unwrap_err(), Error::NotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_animal_guarded_by_visits() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_owner(&db, "Anna", None).await?;
        let animal = create_test_animal(&db, "Rex", Some(owner.id)).await?;
        let visit = create_test_visit(&db, &animal, VisitStatus::Planned, &[]).await?;

        let blocked = delete_animal(&db, animal.id).await;
        assert!(matches!(blocked.unwrap_err(), Error::Conflict { .. }));

        crate::core::visit::delete_visit(&db, visit.id).await?;
        delete_animal(&db, animal.id).await?;
        assert!(get_animal(&db, animal.id).await?.is_none());
        Ok(())
    }
}
