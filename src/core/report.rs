//! Revenue report generation.
//!
//! A report summarizes the completed visits of a date range: how many there were, what
//! they earned at *current* service prices, and which services were rendered most often.
//! Each generation inserts a new immutable row; overlapping or repeated requests are not
//! deduplicated.

use crate::{
    core::{period::ReportPeriod, pricing, visit::service_ids_by_visit},
    entities::{Report, User, Visit, VisitStatus, report, service, user, visit},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, instrument};

/// Number of service names kept in `top_services`.
pub const TOP_SERVICES_LIMIT: usize = 5;

/// Figures computed for one reporting period, before they are persisted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportStats {
    /// Number of completed visits in the period
    pub visit_count: i64,
    /// Sum of current prices of the services those visits rendered
    pub total_revenue: f64,
    /// At most [`TOP_SERVICES_LIMIT`] names, most frequent first
    pub top_services: Vec<String>,
}

/// A stored report together with the name of the user who generated it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDetails {
    /// The stored report row
    #[serde(flatten)]
    pub report: report::Model,
    /// `None` once the generating account has been deleted
    pub generated_by_username: Option<String>,
}

/// Computes report figures from the resolved services of each selected visit.
///
/// Every item is one visit. Revenue is the sum of the given prices. Service names are
/// ranked by how many visits rendered them; equal counts keep first-seen order.
#[must_use]
pub fn aggregate<'a, V, S>(visits: V) -> ReportStats
where
    V: IntoIterator<Item = S>,
    S: IntoIterator<Item = &'a service::Model>,
{
    let mut stats = ReportStats::default();
    let mut counts: Vec<(&str, u64)> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();

    for services in visits {
        stats.visit_count += 1;
        for service in services {
            stats.total_revenue += service.price;

            let name = service.name.as_str();
            if name.is_empty() {
                continue;
            }
            match slots.get(name) {
                Some(&slot) => counts[slot].1 += 1,
                None => {
                    slots.insert(name, counts.len());
                    counts.push((name, 1));
                }
            }
        }
    }

    // sort_by is stable, so ties stay in first-seen order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    stats.top_services = counts
        .into_iter()
        .take(TOP_SERVICES_LIMIT)
        .map(|(name, _)| name.to_string())
        .collect();

    stats
}

/// Completed visits dated inside the period, oldest first.
async fn completed_visits_in(
    db: &DatabaseConnection,
    period: &ReportPeriod,
) -> Result<Vec<visit::Model>> {
    Visit::find()
        .filter(visit::Column::Status.eq(VisitStatus::Completed))
        .filter(visit::Column::Date.between(period.start, period.end))
        .order_by_asc(visit::Column::Date)
        .order_by_asc(visit::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Computes the figures for a period without storing anything.
///
/// # Errors
/// Returns an error if a database query fails.
pub async fn compute_stats(db: &DatabaseConnection, period: &ReportPeriod) -> Result<ReportStats> {
    let visits = completed_visits_in(db, period).await?;
    let service_ids = service_ids_by_visit(db, visits.iter().map(|v| v.id)).await?;
    let price_list = pricing::load_price_list(db, service_ids.values().flatten().copied()).await?;

    Ok(aggregate(visits.iter().map(|visit| {
        let ids = service_ids.get(&visit.id).map_or(&[][..], Vec::as_slice);
        pricing::resolve(&price_list, ids)
    })))
}

/// Generates and stores a report for the given period.
///
/// Both bounds are required. `period_end` is moved to the last millisecond of its day,
/// and a start later than that is rejected before anything is read or written.
///
/// # Errors
/// - `Validation` for a missing or unparsable bound, or a start after the end
/// - `Database` if reading visits or storing the report fails
#[instrument(skip(db))]
pub async fn generate_report(
    db: &DatabaseConnection,
    generated_by: i64,
    period_start: Option<&str>,
    period_end: Option<&str>,
) -> Result<report::Model> {
    let period = ReportPeriod::parse(period_start, period_end)?;
    let stats = compute_stats(db, &period).await?;

    let report = report::ActiveModel {
        period_start: Set(period.start),
        period_end: Set(period.end),
        generated_at: Set(Utc::now()),
        generated_by: Set(generated_by),
        visit_count: Set(stats.visit_count),
        total_revenue: Set(stats.total_revenue),
        top_services: Set(report::ServiceNames(stats.top_services)),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        report_id = report.id,
        visit_count = report.visit_count,
        total_revenue = report.total_revenue,
        "Report generated"
    );
    Ok(report)
}

async fn with_usernames(
    db: &DatabaseConnection,
    reports: Vec<report::Model>,
) -> Result<Vec<ReportDetails>> {
    let user_ids = reports.iter().map(|r| r.generated_by);
    let usernames: HashMap<i64, String> = User::find()
        .filter(user::Column::Id.is_in(user_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect();

    Ok(reports
        .into_iter()
        .map(|report| ReportDetails {
            generated_by_username: usernames.get(&report.generated_by).cloned(),
            report,
        })
        .collect())
}

/// Lists all reports, newest first.
///
/// # Errors
/// Returns an error if a database query fails.
pub async fn list_reports(db: &DatabaseConnection) -> Result<Vec<ReportDetails>> {
    let reports = Report::find()
        .order_by_desc(report::Column::GeneratedAt)
        .order_by_desc(report::Column::Id)
        .all(db)
        .await?;
    with_usernames(db, reports).await
}

/// Fetches one report with the generating user's name.
///
/// # Errors
/// Returns `NotFound` if the report does not exist.
pub async fn get_report(db: &DatabaseConnection, report_id: i64) -> Result<ReportDetails> {
    let report = Report::find_by_id(report_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Report", report_id))?;

    with_usernames(db, vec![report])
        .await?
        .pop()
        .ok_or_else(|| Error::not_found("Report", report_id))
}

/// Deletes a report and returns what was deleted.
///
/// # Errors
/// Returns `NotFound` if the report does not exist.
pub async fn delete_report(db: &DatabaseConnection, report_id: i64) -> Result<report::Model> {
    let report = Report::find_by_id(report_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Report", report_id))?;

    Report::delete_by_id(report_id).exec(db).await?;
    info!(report_id, "Report deleted");
    Ok(report)
}
