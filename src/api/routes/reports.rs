//! Revenue reports, admin only.

use crate::{
    api::{
        AppState,
        auth::{ApiJson, ApiPath, RequireAdmin},
    },
    core::report::{self, ReportDetails},
    entities::report::Model,
    errors::Result,
};
use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};

/// Requested period; both bounds are validated by the aggregator.
#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    /// First day of the period
    pub period_start: Option<String>,
    /// Last day of the period, inclusive
    pub period_end: Option<String>,
}

/// `GET /api/reports`, newest first.
pub async fn list_reports(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<ReportDetails>>> {
    report::list_reports(&state.db).await.map(Json)
}

/// `POST /api/reports`
pub async fn generate_report(
    RequireAdmin(claims): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ReportRequest>,
) -> Result<Json<Model>> {
    report::generate_report(
        &state.db,
        claims.user_id,
        body.period_start.as_deref(),
        body.period_end.as_deref(),
    )
    .await
    .map(Json)
}

/// `GET /api/reports/{id}`
pub async fn get_report(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ReportDetails>> {
    report::get_report(&state.db, id).await.map(Json)
}

/// `DELETE /api/reports/{id}`; echoes the removed report.
pub async fn delete_report(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Value>> {
    let report = report::delete_report(&state.db, id).await?;
    let body = json!({ "message": "Report deleted", "report": report });
    Ok(Json(body))
}
