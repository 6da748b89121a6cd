//! Service price resolution.
//!
//! This is the one place that turns service references into prices, and both callers
//! resolve against the *current* service catalogue:
//!
//! - Visits call it on create/update and store the result in `total_cost`. That value is a
//!   snapshot and is not refreshed when a service price changes later.
//! - The report aggregator calls it at generation time, so revenue always reflects current
//!   prices. Aggregating the same visits again after a price change yields a different total.
//!
//! Within one visit a service id counts once, however often it was submitted. References to
//! services that no longer exist resolve to nothing and contribute zero.

use crate::{
    entities::{Service, service},
    errors::Result,
};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use std::collections::{HashMap, HashSet};

/// Current services keyed by id.
pub type PriceList = HashMap<i64, service::Model>;

/// Fetches the current state of every listed service that still exists.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn load_price_list<C, I>(db: &C, service_ids: I) -> Result<PriceList>
where
    C: ConnectionTrait,
    I: IntoIterator<Item = i64>,
{
    let ids: HashSet<i64> = service_ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(PriceList::new());
    }

    let services = Service::find()
        .filter(service::Column::Id.is_in(ids))
        .all(db)
        .await?;

    Ok(services.into_iter().map(|s| (s.id, s)).collect())
}

/// Resolves one visit's references against a price list, in first-seen order.
#[must_use]
pub fn resolve<'a>(price_list: &'a PriceList, service_ids: &[i64]) -> Vec<&'a service::Model> {
    let mut seen = HashSet::new();
    service_ids
        .iter()
        .filter(|id| seen.insert(**id))
        .filter_map(|id| price_list.get(id))
        .collect()
}

/// Sum of the resolved services' prices.
#[must_use]
pub fn total_price<'a, I>(services: I) -> f64
where
    I: IntoIterator<Item = &'a service::Model>,
{
    services.into_iter().map(|s| s.price).sum()
}

/// Resolves a single visit's services directly from the database.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn resolve_services<C: ConnectionTrait>(
    db: &C,
    service_ids: &[i64],
) -> Result<Vec<service::Model>> {
    let price_list = load_price_list(db, service_ids.iter().copied()).await?;
    Ok(resolve(&price_list, service_ids)
        .into_iter()
        .cloned()
        .collect())
}
