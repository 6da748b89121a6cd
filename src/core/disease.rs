//! Disease business logic.
//!
//! Disease names are unique. A disease cannot be deleted while any animal's medical
//! history still references it.

use crate::{
    entities::{Disease, MedicalRecord, disease, medical_record},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};
use serde::Deserialize;

/// Fields accepted when creating or updating a disease.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiseaseInput {
    /// Unique, trimmed
    pub name: String,
    /// Symptoms or other notes
    pub description: Option<String>,
    /// Recommended treatment
    pub treatment: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn ensure_name_available<C: ConnectionTrait>(
    db: &C,
    name: &str,
    except_id: Option<i64>,
) -> Result<()> {
    let existing = Disease::find()
        .filter(disease::Column::Name.eq(name))
        .one(db)
        .await?;

    match existing {
        Some(found) if Some(found.id) != except_id => Err(Error::conflict(format!(
            "a disease named '{name}' already exists"
        ))),
        _ => Ok(()),
    }
}

/// Lists every disease ordered by name.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_diseases(db: &DatabaseConnection) -> Result<Vec<disease::Model>> {
    Disease::find()
        .order_by_asc(disease::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a disease by id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_disease_by_id<C: ConnectionTrait>(
    db: &C,
    disease_id: i64,
) -> Result<Option<disease::Model>> {
    Disease::find_by_id(disease_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a disease by its exact (trimmed) name.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_disease_by_name<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<Option<disease::Model>> {
    Disease::find()
        .filter(disease::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a disease, rejecting empty and duplicate names.
///
/// # Errors
/// - `Validation` for an empty name
/// - `Conflict` if the name is taken
pub async fn create_disease<C: ConnectionTrait>(
    db: &C,
    input: DiseaseInput,
) -> Result<disease::Model> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(Error::validation("Disease name cannot be empty"));
    }
    ensure_name_available(db, &name, None).await?;

    let disease = disease::ActiveModel {
        name: Set(name),
        description: Set(non_empty(input.description)),
        treatment: Set(non_empty(input.treatment)),
        ..Default::default()
    };
    disease.insert(db).await.map_err(Into::into)
}

/// Replaces a disease's name, description and treatment.
///
/// # Errors
/// - `Validation` for an empty name
/// - `NotFound` if the disease does not exist
/// - `Conflict` if another disease has the name
pub async fn update_disease(
    db: &DatabaseConnection,
    disease_id: i64,
    input: DiseaseInput,
) -> Result<disease::Model> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(Error::validation("Disease name cannot be empty"));
    }

    let mut disease: disease::ActiveModel = Disease::find_by_id(disease_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Disease", disease_id))?
        .into();
    ensure_name_available(db, &name, Some(disease_id)).await?;

    disease.name = Set(name);
    disease.description = Set(non_empty(input.description));
    disease.treatment = Set(non_empty(input.treatment));

    disease.update(db).await.map_err(Into::into)
}

/// Deletes a disease that no medical history entry references.
///
/// # Errors
/// - `Conflict` while a medical history entry references the disease
/// - `NotFound` if the disease does not exist
pub async fn delete_disease(db: &DatabaseConnection, disease_id: i64) -> Result<()> {
    let references = MedicalRecord::find()
        .filter(medical_record::Column::DiseaseId.eq(disease_id))
        .count(db)
        .await?;
    if references > 0 {
        return Err(Error::conflict(
            "disease is referenced by medical history entries",
        ));
    }

    let result = Disease::delete_by_id(disease_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Disease", disease_id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_disease_names_are_unique() -> Result<()> {
        let db = setup_test_db().await?;
        let flu = create_test_disease(&db, "Flu").await?;
        let rabies = create_test_disease(&db, "Rabies").await?;

        let duplicate = create_test_disease(&db, " Flu ").await;
        assert!(matches!(duplicate.unwrap_err(), Error::Conflict { .. }));

        let rename_clash = update_disease(
            &db,
            rabies.id,
            DiseaseInput {
                name: "Flu".to_string(),
                description: None,
                treatment: None,
            },
        )
        .await;
        assert!(matches!(rename_clash.unwrap_err(), Error::Conflict { .. }));

        // Keeping its own name is not a clash
        let same = update_disease(
            &db,
            flu.id,
            DiseaseInput {
                name: "Flu".to_string(),
                description: Some("Fever".to_string()),
                treatment: None,
            },
        )
        .await?;
        assert_eq!(same.description.as_deref(), Some("Fever"));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_disease_guarded_by_medical_history() -> Result<()> {
        let db = setup_test_db().await?;
        let disease = create_test_disease(&db, "Mange").await?;
        let animal = create_test_animal(&db, "Rex", None).await?;
        let animal = crate::core::animal::add_medical_record(
            &db,
            animal.id,
            crate::core::animal::MedicalRecordInput {
                disease_id: Some(disease.id),
                ..Default::default()
            },
        )
        .await?;

        let blocked = delete_disease(&db, disease.id).await;
        assert!(matches!(blocked.unwrap_err(), Error::Conflict { .. }));

        let record_id = animal.medical_history[0].id;
        crate::core::animal::remove_medical_record(&db, animal.animal.id, record_id).await?;
        delete_disease(&db, disease.id).await?;

        let missing = delete_disease(&db, disease.id).await;
        assert!(matches!(missing.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }
}
