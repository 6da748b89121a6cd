//! Owner business logic - Handles all owner-related operations.
//!
//! Owners can be created and looked up without authentication (public intake). An owner
//! cannot be deleted while animals, visits, or client accounts still reference it.

use crate::{
    entities::{Animal, Owner, User, Visit, animal, owner, user, visit},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};
use serde::Deserialize;

/// Owner fields as submitted by clients.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwnerInput {
    /// Required, trimmed
    pub full_name: String,
    /// Used as the lookup key for bookings
    pub phone: Option<String>,
    /// Postal address
    pub address: Option<String>,
    /// Checked for a `local@domain.tld` shape
    pub email: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Loose `something@domain.tld` shape check.
fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !local.is_empty() && !host.is_empty() && !tld.is_empty()
}

fn validate(input: OwnerInput) -> Result<OwnerInput> {
    let full_name = input.full_name.trim().to_string();
    if full_name.is_empty() {
        return Err(Error::validation("Owner full name cannot be empty"));
    }

    let email = non_empty(input.email);
    if let Some(email) = email.as_deref().filter(|e| !looks_like_email(e)) {
        return Err(Error::validation(format!("Invalid email: {email}")));
    }

    Ok(OwnerInput {
        full_name,
        phone: non_empty(input.phone),
        address: non_empty(input.address),
        email,
    })
}

/// Lists owners, optionally only those with an exact phone match.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_owners(db: &DatabaseConnection, phone: Option<&str>) -> Result<Vec<owner::Model>> {
    let mut query = Owner::find();
    if let Some(phone) = phone.map(str::trim).filter(|p| !p.is_empty()) {
        query = query.filter(owner::Column::Phone.eq(phone));
    }

    query
        .order_by_asc(owner::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an owner by id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_owner_by_id<C: ConnectionTrait>(
    db: &C,
    owner_id: i64,
) -> Result<Option<owner::Model>> {
    Owner::find_by_id(owner_id).one(db).await.map_err(Into::into)
}

/// Like [`get_owner_by_id`] but a missing owner is an error.
///
/// # Errors
/// Returns `NotFound` if the owner does not exist.
pub async fn require_owner<C: ConnectionTrait>(db: &C, owner_id: i64) -> Result<owner::Model> {
    get_owner_by_id(db, owner_id)
        .await?
        .ok_or_else(|| Error::not_found("Owner", owner_id))
}

/// Creates an owner after trimming and validating the fields.
///
/// # Errors
/// Returns `Validation` for an empty name or a malformed email.
pub async fn create_owner<C: ConnectionTrait>(db: &C, input: OwnerInput) -> Result<owner::Model> {
    let input = validate(input)?;

    let owner = owner::ActiveModel {
        full_name: Set(input.full_name),
        phone: Set(input.phone),
        address: Set(input.address),
        email: Set(input.email),
        ..Default::default()
    };
    owner.insert(db).await.map_err(Into::into)
}

/// Replaces every mutable field of an owner.
///
/// # Errors
/// - `Validation` for an empty name or a malformed email
/// - `NotFound` if the owner does not exist
pub async fn update_owner<C: ConnectionTrait>(
    db: &C,
    owner_id: i64,
    input: OwnerInput,
) -> Result<owner::Model> {
    let input = validate(input)?;
    let mut owner: owner::ActiveModel = require_owner(db, owner_id).await?.into();

    owner.full_name = Set(input.full_name);
    owner.phone = Set(input.phone);
    owner.address = Set(input.address);
    owner.email = Set(input.email);

    owner.update(db).await.map_err(Into::into)
}

/// Deletes an owner nothing references anymore.
///
/// # Errors
/// - `Conflict` while animals, visits or a client account reference the owner
/// - `NotFound` if the owner does not exist
pub async fn delete_owner(db: &DatabaseConnection, owner_id: i64) -> Result<()> {
    let animals = Animal::find()
        .filter(animal::Column::OwnerId.eq(owner_id))
        .count(db)
        .await?;
    if animals > 0 {
        return Err(Error::conflict("owner still has animals"));
    }

    let visits = Visit::find()
        .filter(visit::Column::OwnerId.eq(owner_id))
        .count(db)
        .await?;
    if visits > 0 {
        return Err(Error::conflict("owner still has visits"));
    }

    let accounts = User::find()
        .filter(user::Column::OwnerId.eq(owner_id))
        .count(db)
        .await?;
    if accounts > 0 {
        return Err(Error::conflict("owner is linked to a client account"));
    }

    let result = Owner::delete_by_id(owner_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Owner", owner_id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_looks_like_email() {
        assert!(looks_like_email("anna@example.com"));
        assert!(!looks_like_email("anna@example"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("anna.example.com"));
    }

    #[tokio::test]
    async fn test_create_owner_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let blank = create_owner(&db, OwnerInput::default()).await;
        assert!(matches!(blank.unwrap_err(), Error::Validation { .. }));

        let bad_email = create_owner(
            &db,
            OwnerInput {
                full_name: "Anna".to_string(),
                email: Some("nope".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(bad_email.unwrap_err(), Error::Validation { .. }));

        let owner = create_owner(
            &db,
            OwnerInput {
                full_name: "  Anna Petrova ".to_string(),
                phone: Some("555-0101".to_string()),
                address: Some("   ".to_string()),
                email: Some("anna@example.com".to_string()),
            },
        )
        .await?;
        assert_eq!(owner.full_name, "Anna Petrova");
        assert!(owner.address.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_get_owners_by_phone() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_owner(&db, "Anna", Some("555-0101")).await?;
        create_test_owner(&db, "Boris", Some("555-0202")).await?;

        assert_eq!(get_owners(&db, None).await?.len(), 2);

        let found = get_owners(&db, Some("555-0202")).await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].full_name, "Boris");

        assert!(get_owners(&db, Some("000")).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_owner_guarded_by_animals() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_owner(&db, "Anna", None).await?;
        let animal = create_test_animal(&db, "Murka", Some(owner.id)).await?;

        let blocked = delete_owner(&db, owner.id).await;
        assert!(matches!(blocked.unwrap_err(), Error::Conflict { .. }));

        crate::core::animal::delete_animal(&db, animal.id).await?;
        delete_owner(&db, owner.id).await?;
        assert!(get_owner_by_id(&db, owner.id).await?.is_none());

        let missing = delete_owner(&db, owner.id).await;
        assert!(matches!(missing.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_owner_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let result = update_owner(
            &db,
            404,
            OwnerInput {
                full_name: "Ghost".to_string(),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }
}
