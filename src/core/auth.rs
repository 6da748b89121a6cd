//! Authentication and authorization primitives.
//!
//! Tokens are HS256 JWTs carrying `{userId, role, owner_id, exp}`. A missing credential
//! is `Unauthenticated`; a credential that fails verification is `Forbidden`, the same
//! error an authenticated caller gets when their role is not allowed.

use crate::{
    entities::{Role, User, user},
    errors::{Error, Result},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tokio::task;
use tracing::{info, instrument, warn};

/// Parameters for signing tokens and hashing passwords.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Symmetric HS256 key
    pub jwt_secret: String,
    /// Lifetime of issued tokens
    pub token_ttl: chrono::Duration,
    /// bcrypt work factor for new password hashes
    pub bcrypt_cost: u32,
}

/// Decoded token claims, attached to every authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Id of the user the token was issued to
    #[serde(rename = "userId")]
    pub user_id: i64,
    /// Role at the time the token was issued
    pub role: Role,
    /// Linked owner, set for client accounts
    pub owner_id: Option<i64>,
    /// Expiry as a unix timestamp
    pub exp: i64,
}

/// What a successful login hands back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    /// Always `true`; failed logins are reported as errors
    pub success: bool,
    /// Signed bearer token
    pub token: String,
    /// Role of the logged-in account
    pub role: Role,
    /// Linked owner for client accounts
    pub owner_id: Option<i64>,
}

/// Signs a token for the given user.
pub fn issue_token(auth: &AuthConfig, user: &user::Model) -> Result<String> {
    let claims = Claims {
        user_id: user.id,
        role: user.role,
        owner_id: user.owner_id,
        exp: (chrono::Utc::now() + auth.token_ttl).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
    )
    .map_err(Into::into)
}

/// Verifies signature and expiry, returning the claims.
///
/// Every verification failure maps to `Error::Forbidden`.
pub fn verify_token(auth: &AuthConfig, token: &str) -> Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        warn!("Token verification failed: {e}");
        Error::Forbidden {
            reason: "invalid token".to_string(),
        }
    })
}

/// Role gate: passes if the claims carry one of the allowed roles.
pub fn require_role(claims: &Claims, allowed: &[Role]) -> Result<()> {
    if allowed.contains(&claims.role) {
        Ok(())
    } else {
        Err(Error::Forbidden {
            reason: "insufficient permissions for this operation".to_string(),
        })
    }
}

/// Hashes a password with bcrypt at the given cost.
///
/// bcrypt is CPU-bound, so the work runs on the blocking thread pool.
pub async fn hash_password(password: &str, cost: u32) -> Result<String> {
    let password = password.to_string();
    task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await?
        .map_err(Into::into)
}

/// Checks a password against a stored bcrypt hash, off the async workers.
pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let password = password.to_string();
    let password_hash = password_hash.to_string();
    task::spawn_blocking(move || bcrypt::verify(password, &password_hash))
        .await?
        .map_err(Into::into)
}

/// Checks a username/password pair and issues a token on success.
///
/// Unknown usernames and wrong passwords fail identically with
/// `Error::InvalidCredentials`.
#[instrument(skip(db, auth, password))]
pub async fn login(
    db: &DatabaseConnection,
    auth: &AuthConfig,
    username: &str,
    password: &str,
) -> Result<Session> {
    let Some(user) = User::find()
        .filter(user::Column::Username.eq(username.trim()))
        .one(db)
        .await?
    else {
        warn!("Login attempt for unknown user");
        return Err(Error::InvalidCredentials);
    };

    if !verify_password(password, &user.password_hash).await? {
        warn!("Login attempt with wrong password");
        return Err(Error::InvalidCredentials);
    }

    let token = issue_token(auth, &user)?;
    info!(user_id = user.id, "User logged in");

    Ok(Session {
        success: true,
        token,
        role: user.role,
        owner_id: user.owner_id,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    fn claims_for(role: Role) -> Claims {
        Claims {
            user_id: 1,
            role,
            owner_id: None,
            exp: 0,
        }
    }

    #[test]
    fn test_require_role() {
        let admin = claims_for(Role::Admin);
        let vet = claims_for(Role::Vet);

        assert!(require_role(&admin, &[Role::Admin]).is_ok());
        assert!(require_role(&vet, &[Role::Admin, Role::Vet]).is_ok());
        assert!(matches!(
            require_role(&claims_for(Role::Client), &[Role::Admin]),
            Err(Error::Forbidden { .. })
        ));
    }

    #[test]
    fn test_token_round_trip_carries_claims() {
        let auth = test_auth_config();
        let user = user::Model {
            id: 42,
            username: "client".to_string(),
            password_hash: String::new(),
            role: Role::Client,
            owner_id: Some(7),
        };

        let token = issue_token(&auth, &user).unwrap();
        let claims = verify_token(&auth, &token).unwrap();

        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.role, Role::Client);
        assert_eq!(claims.owner_id, Some(7));
    }

    #[test]
    fn test_verify_token_rejects_wrong_secret() {
        let auth = test_auth_config();
        let other = AuthConfig {
            jwt_secret: "another-secret".to_string(),
            ..test_auth_config()
        };
        let user = user::Model {
            id: 1,
            username: "admin".to_string(),
            password_hash: String::new(),
            role: Role::Admin,
            owner_id: None,
        };

        let token = issue_token(&other, &user).unwrap();
        assert!(matches!(
            verify_token(&auth, &token),
            Err(Error::Forbidden { .. })
        ));
        assert!(matches!(
            verify_token(&auth, "not-a-jwt"),
            Err(Error::Forbidden { .. })
        ));
    }

    #[test]
    fn test_verify_token_rejects_expired() {
        let auth = AuthConfig {
            token_ttl: chrono::Duration::hours(-2),
            ..test_auth_config()
        };
        let user = user::Model {
            id: 1,
            username: "admin".to_string(),
            password_hash: String::new(),
            role: Role::Admin,
            owner_id: None,
        };

        let token = issue_token(&auth, &user).unwrap();
        assert!(matches!(
            verify_token(&auth, &token),
            Err(Error::Forbidden { .. })
        ));
    }

    #[tokio::test]
    async fn test_password_hash_round_trip() -> Result<()> {
        let hash = hash_password("s3cret", test_auth_config().bcrypt_cost).await?;

        assert_ne!(hash, "s3cret");
        assert!(verify_password("s3cret", &hash).await?);
        assert!(!verify_password("wrong", &hash).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_login() -> Result<()> {
        let db = setup_test_db().await?;
        let auth = test_auth_config();
        create_test_user(&db, "doctor", "s3cret", Role::Vet).await?;

        let session = login(&db, &auth, "doctor", "s3cret").await?;
        assert!(session.success);
        assert_eq!(session.role, Role::Vet);
        assert_eq!(verify_token(&auth, &session.token)?.role, Role::Vet);

        let wrong_password = login(&db, &auth, "doctor", "wrong").await;
        assert!(matches!(wrong_password, Err(Error::InvalidCredentials)));

        let unknown_user = login(&db, &auth, "nobody", "s3cret").await;
        assert!(matches!(unknown_user, Err(Error::InvalidCredentials)));

        Ok(())
    }
}
