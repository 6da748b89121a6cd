//! Visit entity - One clinical encounter.
//!
//! Each visit links an animal and its owner, an optional disease and vet, and an ordered
//! list of services (stored in `visit_services`). `total_cost` is the sum of the service
//! prices at the time the service list was last written.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a visit. Only completed visits count toward reports.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum VisitStatus {
    /// Booked but not yet happened
    #[default]
    #[sea_orm(string_value = "planned")]
    Planned,
    /// Took place; billable
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Called off
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Visit database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "visits")]
pub struct Model {
    /// Unique identifier for the visit
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the animal seen
    pub animal_id: i64,
    /// ID of the owner who brought the animal
    pub owner_id: i64,
    /// When the visit takes (or took) place
    pub date: DateTimeUtc,
    /// Diagnosed disease, if any. Not a foreign key.
    pub disease_id: Option<i64>,
    /// Free-text notes
    pub notes: Option<String>,
    /// Current lifecycle status
    pub status: VisitStatus,
    /// Cost snapshot, see module docs
    pub total_cost: f64,
    /// Attending veterinarian (a user), if any. Not a foreign key.
    pub vet_id: Option<i64>,
}

/// Defines relationships between Visit and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each visit belongs to one animal
    #[sea_orm(
        belongs_to = "super::animal::Entity",
        from = "Column::AnimalId",
        to = "super::animal::Column::Id"
    )]
    Animal,
    /// Each visit belongs to one owner
    #[sea_orm(
        belongs_to = "super::owner::Entity",
        from = "Column::OwnerId",
        to = "super::owner::Column::Id"
    )]
    Owner,
    /// One visit has many service rows
    #[sea_orm(has_many = "super::visit_service::Entity")]
    VisitServices,
}

impl Related<super::animal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Animal.def()
    }
}

impl Related<super::owner::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::visit_service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VisitServices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
