//! Disease entity - A diagnosis that can appear in medical histories and visits.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Disease database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "diseases")]
pub struct Model {
    /// Unique identifier for the disease
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Disease name, unique across the clinic
    #[sea_orm(unique)]
    pub name: String,
    /// Symptoms or general description
    pub description: Option<String>,
    /// Recommended treatment
    pub treatment: Option<String>,
}

/// Defines relationships between Disease and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One disease appears in many medical history entries
    #[sea_orm(has_many = "super::medical_record::Entity")]
    MedicalRecords,
}

impl Related<super::medical_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MedicalRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
