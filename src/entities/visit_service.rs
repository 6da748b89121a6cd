//! Visit/service join rows, preserving the submitted order of `service_ids`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Visit/service join database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "visit_services")]
pub struct Model {
    /// Unique identifier for the row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the owning visit
    pub visit_id: i64,
    /// Not a foreign key: services may be deleted underneath historical visits
    pub service_id: i64,
    /// Zero-based position within the visit's service list
    pub position: i32,
}

/// Defines relationships between VisitService and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each row belongs to one visit
    #[sea_orm(
        belongs_to = "super::visit::Entity",
        from = "Column::VisitId",
        to = "super::visit::Column::Id"
    )]
    Visit,
}

impl Related<super::visit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Visit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
