//! Animal entity - A patient of the clinic.
//!
//! The medical history is stored as child rows in `medical_records`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Animal database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "animals")]
pub struct Model {
    /// Unique identifier for the animal
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name of the animal
    pub name: String,
    /// Species (e.g., "cat", "dog")
    pub species: String,
    /// Breed, if known
    pub breed: Option<String>,
    /// Age in years, never negative
    pub age: Option<i32>,
    /// ID of the owner, if one is recorded
    pub owner_id: Option<i64>,
}

/// Defines relationships between Animal and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each animal optionally belongs to one owner
    #[sea_orm(
        belongs_to = "super::owner::Entity",
        from = "Column::OwnerId",
        to = "super::owner::Column::Id"
    )]
    Owner,
    /// One animal has many medical history entries
    #[sea_orm(has_many = "super::medical_record::Entity")]
    MedicalRecords,
    /// One animal has many visits
    #[sea_orm(has_many = "super::visit::Entity")]
    Visits,
}

impl Related<super::owner::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::medical_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MedicalRecords.def()
    }
}

impl Related<super::visit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Visits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
