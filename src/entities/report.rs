//! Report entity - An immutable revenue snapshot for a date range.
//!
//! Reports are only ever inserted by the aggregator, then read, listed, or deleted.

use sea_orm::{FromJsonQueryResult, entity::prelude::*};
use serde::{Deserialize, Serialize};

/// Ranked service names, most frequent first. Stored as a JSON array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct ServiceNames(pub Vec<String>);

/// Report database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reports")]
pub struct Model {
    /// Unique identifier for the report
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Inclusive start of the period
    pub period_start: DateTimeUtc,
    /// Inclusive end of the period, normalized to 23:59:59.999
    pub period_end: DateTimeUtc,
    /// When the report was generated
    pub generated_at: DateTimeUtc,
    /// ID of the user who requested the report
    pub generated_by: i64,
    /// Number of completed visits in the period
    pub visit_count: i64,
    /// Sum of service prices over those visits
    pub total_revenue: f64,
    /// Up to five service names, most frequent first
    #[sea_orm(column_type = "Json")]
    pub top_services: ServiceNames,
}

/// `Report` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
