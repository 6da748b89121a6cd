//! Owner entity - Represents a pet owner (a clinic client).
//!
//! Owners are referenced by animals, visits, and client portal accounts.
//! Deleting an owner is refused while any of those still point at it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Owner database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "owners")]
pub struct Model {
    /// Unique identifier for the owner
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Full name, always trimmed and non-empty
    pub full_name: String,
    /// Contact phone; also the lookup key for the booking flow
    pub phone: Option<String>,
    /// Postal address
    pub address: Option<String>,
    /// Contact email
    pub email: Option<String>,
}

/// Defines relationships between Owner and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One owner has many animals
    #[sea_orm(has_many = "super::animal::Entity")]
    Animals,
    /// One owner has many visits
    #[sea_orm(has_many = "super::visit::Entity")]
    Visits,
}

impl Related<super::animal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Animals.def()
    }
}

impl Related<super::visit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Visits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
