//! Service entity - A billable clinic service with a current price.
//!
//! Visits reference services through `visit_services` without a foreign key, so deleting
//! a service leaves historical references dangling. Price resolution treats a dangling
//! reference as contributing nothing.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Service database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "services")]
pub struct Model {
    /// Unique identifier for the service
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name of the service (e.g., "Vaccination")
    pub name: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Current price, never negative
    pub price: f64,
    /// Optional grouping category
    pub category: Option<String>,
}

/// Services have no declared relations; see the module docs.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
