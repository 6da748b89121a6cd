//! User account management.
//!
//! Passwords are hashed with bcrypt before storage. Only `client` accounts may be
//! linked to an owner record.

use crate::{
    core::{
        auth::{AuthConfig, hash_password},
        owner::require_owner,
    },
    entities::{Role, User, user},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::info;

/// Fields accepted when creating a user.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    /// Unique, trimmed
    pub username: String,
    /// Plain text; only the bcrypt hash is stored
    pub password: String,
    /// Access level
    pub role: Role,
    /// Linked owner, allowed for `client` accounts only
    pub owner_id: Option<i64>,
}

/// Fields accepted when updating a user. The password is only changed when given.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUser {
    /// Unique, trimmed
    pub username: String,
    /// Access level
    pub role: Role,
    /// Linked owner, allowed for `client` accounts only
    pub owner_id: Option<i64>,
    /// New password; `None` keeps the current hash
    pub password: Option<String>,
}

async fn validate_account(
    db: &DatabaseConnection,
    username: &str,
    role: Role,
    owner_id: Option<i64>,
    except_id: Option<i64>,
) -> Result<()> {
    if username.is_empty() {
        return Err(Error::validation("Username cannot be empty"));
    }

    if let Some(owner_id) = owner_id {
        if role != Role::Client {
            return Err(Error::validation(
                "only client accounts can be linked to an owner",
            ));
        }
        require_owner(db, owner_id).await?;
    }

    let taken = User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?
        .is_some_and(|existing| Some(existing.id) != except_id);
    if taken {
        return Err(Error::conflict(format!(
            "username '{username}' is already taken"
        )));
    }

    Ok(())
}

/// Lists every account, ordered by username.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_users(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    User::find()
        .order_by_asc(user::Column::Username)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an account by id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Creates an account with a freshly hashed password.
///
/// # Errors
/// - `Validation` for an empty username or password, or an owner link on a non-client
/// - `NotFound` if the linked owner does not exist
/// - `Conflict` if the username is taken
pub async fn create_user(
    db: &DatabaseConnection,
    auth: &AuthConfig,
    input: NewUser,
) -> Result<user::Model> {
    let username = input.username.trim().to_string();
    validate_account(db, &username, input.role, input.owner_id, None).await?;

    if input.password.is_empty() {
        return Err(Error::validation("Password cannot be empty"));
    }

    let password_hash = hash_password(&input.password, auth.bcrypt_cost).await?;
    let user = user::ActiveModel {
        username: Set(username),
        password_hash: Set(password_hash),
        role: Set(input.role),
        owner_id: Set(input.owner_id),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(user_id = user.id, role = ?user.role, "User created");
    Ok(user)
}

/// Replaces an account's username, role and owner link, and its password when one is
/// given.
///
/// # Errors
/// Same as [`create_user`], plus `NotFound` if the account does not exist.
pub async fn update_user(
    db: &DatabaseConnection,
    auth: &AuthConfig,
    user_id: i64,
    input: UpdateUser,
) -> Result<user::Model> {
    let mut user: user::ActiveModel = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("User", user_id))?
        .into();

    let username = input.username.trim().to_string();
    validate_account(db, &username, input.role, input.owner_id, Some(user_id)).await?;

    user.username = Set(username);
    user.role = Set(input.role);
    user.owner_id = Set(input.owner_id);
    match input.password.as_deref() {
        Some("") => return Err(Error::validation("Password cannot be empty")),
        Some(password) => {
            user.password_hash = Set(hash_password(password, auth.bcrypt_cost).await?);
        }
        None => {}
    }

    user.update(db).await.map_err(Into::into)
}

/// Deletes an account. Visits and reports that name it keep the dangling id.
///
/// # Errors
/// Returns `NotFound` if the account does not exist.
pub async fn delete_user(db: &DatabaseConnection, user_id: i64) -> Result<()> {
    let result = User::delete_by_id(user_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("User", user_id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{core::auth, test_utils::*};

    #[tokio::test]
    async fn test_create_user_hashes_password() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "doctor", "s3cret", Role::Vet).await?;

        assert_ne!(user.password_hash, "s3cret");
        assert!(auth::verify_password("s3cret", &user.password_hash).await?);

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "vet");
        Ok(())
    }

    #[tokio::test]
    async fn test_create_user_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let auth = test_auth_config();
        create_test_user(&db, "doctor", "s3cret", Role::Vet).await?;

        let duplicate = create_test_user(&db, " doctor ", "other", Role::Admin).await;
        assert!(matches!(duplicate.unwrap_err(), Error::Conflict { .. }));

        let owner = create_test_owner(&db, "Anna", None).await?;
        let vet_with_owner = create_user(
            &db,
            &auth,
            NewUser {
                username: "vet2".to_string(),
                password: "pw".to_string(),
                role: Role::Vet,
                owner_id: Some(owner.id),
            },
        )
        .await;
        assert!(matches!(
            vet_with_owner.unwrap_err(),
            Error::Validation { .. }
        ));

        let client = create_user(
            &db,
            &auth,
            NewUser {
                username: "anna".to_string(),
                password: "pw".to_string(),
                role: Role::Client,
                owner_id: Some(owner.id),
            },
        )
        .await?;
        assert_eq!(client.owner_id, Some(owner.id));

        let empty_password = create_test_user(&db, "nopw", "", Role::Vet).await;
        assert!(matches!(
            empty_password.unwrap_err(),
            Error::Validation { .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_user_keeps_password_unless_given() -> Result<()> {
        let db = setup_test_db().await?;
        let auth = test_auth_config();
        let user = create_test_user(&db, "doctor", "s3cret", Role::Vet).await?;

        let renamed = update_user(
            &db,
            &auth,
            user.id,
            UpdateUser {
                username: "dr_house".to_string(),
                role: Role::Vet,
                owner_id: None,
                password: None,
            },
        )
        .await?;
        assert_eq!(renamed.username, "dr_house");
        assert_eq!(renamed.password_hash, user.password_hash);

        let repassworded = update_user(
            &db,
            &auth,
            user.id,
            UpdateUser {
                username: "dr_house".to_string(),
                role: Role::Admin,
                owner_id: None,
                password: Some("new-secret".to_string()),
            },
        )
        .await?;
        assert_eq!(repassworded.role, Role::Admin);
        let new_hash = &repassworded.password_hash;
        assert!(auth::verify_password("new-secret", new_hash).await?);

        delete_user(&db, user.id).await?;
        assert!(get_user_by_id(&db, user.id).await?.is_none());
        Ok(())
    }
}
