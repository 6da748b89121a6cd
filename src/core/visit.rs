//! Visit business logic.
//!
//! A visit and its ordered service list are always written in one transaction. Whenever
//! the service list is written, `total_cost` is recomputed from current service prices
//! (see [`crate::core::pricing`]).

use crate::{
    core::{animal::require_animal, owner::require_owner, period::parse_instant, pricing},
    entities::{
        Animal, Disease, Owner, User, Visit, VisitService, VisitStatus, animal, disease, owner,
        service, user, visit, visit_service,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Fields accepted when creating a visit.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewVisit {
    /// Must reference an existing animal
    pub animal_id: i64,
    /// Must reference an existing owner
    pub owner_id: i64,
    /// Date or timestamp, see [`parse_instant`]
    pub date: String,
    /// Diagnosis, if known
    pub disease_id: Option<i64>,
    /// Free text, trimmed; blank notes are stored as `None`
    pub notes: Option<String>,
    /// Defaults to `planned`
    pub status: Option<VisitStatus>,
    /// Services performed, in order; repeats are kept but priced once
    #[serde(default)]
    pub service_ids: Vec<i64>,
    /// Attending vet's user id
    pub vet_id: Option<i64>,
}

/// Fields accepted when updating a visit. Absent optional fields keep their value;
/// a present `service_ids` replaces the list and recomputes `total_cost`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateVisit {
    /// Always replaced
    pub date: String,
    /// New notes, if given
    pub notes: Option<String>,
    /// New status, if given
    pub status: Option<VisitStatus>,
    /// Replacement service list, if given
    pub service_ids: Option<Vec<i64>>,
}

/// A visit with every reference resolved to the referenced record's current state.
/// References to records that no longer exist resolve to `None` (or are left out of
/// `services`); `service_ids` still lists what was submitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisitDetails {
    /// The visit row
    #[serde(flatten)]
    pub visit: visit::Model,
    /// Submitted service ids, in submitted order
    pub service_ids: Vec<i64>,
    /// The animal seen
    pub animal: Option<animal::Model>,
    /// The animal's owner
    pub owner: Option<owner::Model>,
    /// Diagnosis
    pub disease: Option<disease::Model>,
    /// Services that still exist, each listed once
    pub services: Vec<service::Model>,
    /// Attending vet; the password hash is never serialized
    pub vet: Option<user::Model>,
}

fn clean_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

/// Submitted service ids per visit, in submitted order.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn service_ids_by_visit<C: ConnectionTrait>(
    db: &C,
    visit_ids: impl IntoIterator<Item = i64>,
) -> Result<HashMap<i64, Vec<i64>>> {
    let rows = VisitService::find()
        .filter(visit_service::Column::VisitId.is_in(visit_ids))
        .order_by_asc(visit_service::Column::VisitId)
        .order_by_asc(visit_service::Column::Position)
        .all(db)
        .await?;

    let mut ids: HashMap<i64, Vec<i64>> = HashMap::new();
    for row in rows {
        ids.entry(row.visit_id).or_default().push(row.service_id);
    }
    Ok(ids)
}

async fn load_details<C: ConnectionTrait>(
    db: &C,
    visits: Vec<visit::Model>,
) -> Result<Vec<VisitDetails>> {
    if visits.is_empty() {
        return Ok(Vec::new());
    }

    let animal_ids = visits.iter().map(|v| v.animal_id);
    let owner_ids = visits.iter().map(|v| v.owner_id);
    let disease_ids = visits.iter().filter_map(|v| v.disease_id);
    let vet_ids = visits.iter().filter_map(|v| v.vet_id);

    let animals: HashMap<i64, animal::Model> = Animal::find()
        .filter(animal::Column::Id.is_in(animal_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();
    let owners: HashMap<i64, owner::Model> = Owner::find()
        .filter(owner::Column::Id.is_in(owner_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|o| (o.id, o))
        .collect();
    let diseases: HashMap<i64, disease::Model> = Disease::find()
        .filter(disease::Column::Id.is_in(disease_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|d| (d.id, d))
        .collect();
    let vets: HashMap<i64, user::Model> = User::find()
        .filter(user::Column::Id.is_in(vet_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let mut service_ids = service_ids_by_visit(db, visits.iter().map(|v| v.id)).await?;
    let price_list = pricing::load_price_list(db, service_ids.values().flatten().copied()).await?;

    Ok(visits
        .into_iter()
        .map(|visit| {
            let ids = service_ids.remove(&visit.id).unwrap_or_default();
            VisitDetails {
                services: pricing::resolve(&price_list, &ids)
                    .into_iter()
                    .cloned()
                    .collect(),
                service_ids: ids,
                animal: animals.get(&visit.animal_id).cloned(),
                owner: owners.get(&visit.owner_id).cloned(),
                disease: visit.disease_id.and_then(|id| diseases.get(&id).cloned()),
                vet: visit.vet_id.and_then(|id| vets.get(&id).cloned()),
                visit,
            }
        })
        .collect())
}

async fn load_one<C: ConnectionTrait>(db: &C, visit_id: i64) -> Result<VisitDetails> {
    let visit = Visit::find_by_id(visit_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Visit", visit_id))?;
    load_details(db, vec![visit])
        .await?
        .pop()
        .ok_or_else(|| Error::not_found("Visit", visit_id))
}

async fn write_service_list<C: ConnectionTrait>(
    db: &C,
    visit_id: i64,
    service_ids: &[i64],
) -> Result<()> {
    VisitService::delete_many()
        .filter(visit_service::Column::VisitId.eq(visit_id))
        .exec(db)
        .await?;

    if service_ids.is_empty() {
        return Ok(());
    }

    let rows = (0_i32..)
        .zip(service_ids)
        .map(|(position, service_id)| visit_service::ActiveModel {
            visit_id: Set(visit_id),
            service_id: Set(*service_id),
            position: Set(position),
            ..Default::default()
        })
        .collect::<Vec<_>>();

    VisitService::insert_many(rows).exec(db).await?;
    Ok(())
}

/// Lists all visits, oldest first, with references resolved.
///
/// # Errors
/// Returns an error if a database query fails.
pub async fn get_all_visits(db: &DatabaseConnection) -> Result<Vec<VisitDetails>> {
    let visits = Visit::find()
        .order_by_asc(visit::Column::Date)
        .order_by_asc(visit::Column::Id)
        .all(db)
        .await?;
    load_details(db, visits).await
}

/// Fetches one visit with references resolved, or `None` if it does not exist.
///
/// # Errors
/// Returns an error if a database query fails.
pub async fn get_visit(db: &DatabaseConnection, visit_id: i64) -> Result<Option<VisitDetails>> {
    match load_one(db, visit_id).await {
        Ok(details) => Ok(Some(details)),
        Err(Error::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Creates a visit and snapshots its cost from current service prices.
///
/// The animal and owner must exist, as must the disease and vet when given. Unknown
/// service ids are stored but cost nothing.
///
/// # Errors
/// - `Validation` if the date cannot be parsed
/// - `NotFound` for a missing animal, owner, disease or vet
pub async fn create_visit(db: &DatabaseConnection, input: NewVisit) -> Result<VisitDetails> {
    let date = parse_instant(&input.date)?;
    require_animal(db, input.animal_id).await?;
    require_owner(db, input.owner_id).await?;

    if let Some(disease_id) = input.disease_id {
        Disease::find_by_id(disease_id)
            .one(db)
            .await?
            .ok_or_else(|| Error::not_found("Disease", disease_id))?;
    }
    if let Some(vet_id) = input.vet_id {
        User::find_by_id(vet_id)
            .one(db)
            .await?
            .ok_or_else(|| Error::not_found("User", vet_id))?;
    }

    let txn = db.begin().await?;
    let services = pricing::resolve_services(&txn, &input.service_ids).await?;

    let visit = visit::ActiveModel {
        animal_id: Set(input.animal_id),
        owner_id: Set(input.owner_id),
        date: Set(date),
        disease_id: Set(input.disease_id),
        notes: Set(clean_notes(input.notes)),
        status: Set(input.status.unwrap_or_default()),
        total_cost: Set(pricing::total_price(&services)),
        vet_id: Set(input.vet_id),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    write_service_list(&txn, visit.id, &input.service_ids).await?;
    txn.commit().await?;
    debug!(
        visit_id = visit.id,
        total_cost = visit.total_cost,
        "Visit created"
    );

    load_one(db, visit.id).await
}

/// Updates a visit's date, notes, status and service list.
///
/// # Errors
/// - `Validation` if the date cannot be parsed
/// - `NotFound` if the visit does not exist
pub async fn update_visit(
    db: &DatabaseConnection,
    visit_id: i64,
    input: UpdateVisit,
) -> Result<VisitDetails> {
    let date = parse_instant(&input.date)?;

    let txn = db.begin().await?;
    let mut visit: visit::ActiveModel = Visit::find_by_id(visit_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Visit", visit_id))?
        .into();

    visit.date = Set(date);
    if input.notes.is_some() {
        visit.notes = Set(clean_notes(input.notes));
    }
    if let Some(status) = input.status {
        visit.status = Set(status);
    }
    if let Some(service_ids) = &input.service_ids {
        let services = pricing::resolve_services(&txn, service_ids).await?;
        visit.total_cost = Set(pricing::total_price(&services));
        write_service_list(&txn, visit_id, service_ids).await?;
    }

    visit.update(&txn).await?;
    txn.commit().await?;

    load_one(db, visit_id).await
}

/// Deletes a visit and its service list.
///
/// # Errors
/// Returns `NotFound` if the visit does not exist.
pub async fn delete_visit(db: &DatabaseConnection, visit_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    VisitService::delete_many()
        .filter(visit_service::Column::VisitId.eq(visit_id))
        .exec(&txn)
        .await?;

    let result = Visit::delete_by_id(visit_id).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Visit", visit_id));
    }

    txn.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_visit_snapshots_cost() -> Result<()> {
        let (db, animal) = setup_with_animal().await?;
        let x = create_test_service(&db, "X", 100.0).await?;
        let y = create_test_service(&db, "Y", 50.0).await?;

        let details = create_visit(
            &db,
            NewVisit {
                animal_id: animal.id,
                owner_id: animal.owner_id.unwrap(),
                date: "2024-03-10T10:00:00Z".to_string(),
                notes: Some("  first visit ".to_string()),
                service_ids: vec![y.id, x.id],
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(details.visit.status, VisitStatus::Planned);
        assert_eq!(details.visit.total_cost, 150.0);
        assert_eq!(details.visit.notes.as_deref(), Some("first visit"));
        assert_eq!(details.service_ids, vec![y.id, x.id]);
        assert_eq!(details.services[0].name, "Y");
        assert_eq!(details.animal.unwrap().id, animal.id);

        // A later price change does not touch the stored snapshot
        crate::core::service::update_service(
            &db,
            x.id,
            crate::core::service::ServiceInput {
                name: "X".to_string(),
                description: None,
                price: 500.0,
                category: None,
            },
        )
        .await?;
        let reloaded = get_visit(&db, details.visit.id).await?.unwrap();
        assert_eq!(reloaded.visit.total_cost, 150.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_visit_rejects_unknown_references() -> Result<()> {
        let (db, animal) = setup_with_animal().await?;

        let bad_animal = create_visit(
            &db,
            NewVisit {
                animal_id: 404,
                owner_id: animal.owner_id.unwrap(),
                date: "2024-03-10".to_string(),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(bad_animal.unwrap_err(), Error::NotFound { .. }));

        let bad_date = create_visit(
            &db,
            NewVisit {
                animal_id: animal.id,
                owner_id: animal.owner_id.unwrap(),
                date: "tomorrow".to_string(),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(bad_date.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_visit_recomputes_cost() -> Result<()> {
        let (db, animal) = setup_with_animal().await?;
        let x = create_test_service(&db, "X", 100.0).await?;
        let visit = create_test_visit(&db, &animal, VisitStatus::Planned, &[x.id]).await?;
        assert_eq!(visit.total_cost, 100.0);

        // Without service_ids the list and cost stay as they were
        let updated = update_visit(
            &db,
            visit.id,
            UpdateVisit {
                date: "2024-03-11".to_string(),
                status: Some(VisitStatus::Completed),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.visit.status, VisitStatus::Completed);
        assert_eq!(updated.visit.total_cost, 100.0);
        assert_eq!(updated.service_ids, vec![x.id]);

        // Clearing the services brings the cost to zero
        let updated = update_visit(
            &db,
            visit.id,
            UpdateVisit {
                date: "2024-03-11".to_string(),
                service_ids: Some(Vec::new()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.visit.total_cost, 0.0);
        assert!(updated.services.is_empty());

        let missing = update_visit(
            &db,
            404,
            UpdateVisit {
                date: "2024-03-11".to_string(),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(missing.unwrap_err(), Error::NotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_deleted_service_drops_out_of_details() -> Result<()> {
        let (db, animal) = setup_with_animal().await?;
        let x = create_test_service(&db, "X", 100.0).await?;
        let visit = create_test_visit(&db, &animal, VisitStatus::Completed, &[x.id]).await?;

        crate::core::service::delete_service(&db, x.id).await?;

        let details = get_visit(&db, visit.id).await?.unwrap();
        assert_eq!(details.service_ids, vec![x.id]);
        assert!(details.services.is_empty());
        assert_eq!(details.visit.total_cost, 100.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_visit() -> Result<()> {
        let (db, animal) = setup_with_animal().await?;
        let visit = create_test_visit(&db, &animal, VisitStatus::Planned, &[]).await?;

        delete_visit(&db, visit.id).await?;
        assert!(get_visit(&db, visit.id).await?.is_none());

        let again = delete_visit(&db, visit.id).await;
        assert!(matches!(again.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }
}
