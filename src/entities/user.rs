//! User entity - A login account for staff or the client portal.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account role, carried in the token claims and checked by the role gate.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Clinic administrator
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Veterinarian
    #[sea_orm(string_value = "vet")]
    Vet,
    /// Client portal account, linked to an owner
    #[sea_orm(string_value = "client")]
    Client,
}

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login name, unique
    #[sea_orm(unique)]
    pub username: String,
    /// bcrypt hash; never leaves the server
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Account role
    pub role: Role,
    /// Linked owner record; only set for `client` accounts
    pub owner_id: Option<i64>,
}

/// Users have no declared relations; visits and reports keep plain user ids.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
