//! Visits. Creating a visit is a public intake endpoint.

use super::deleted;
use crate::{
    api::{
        AppState,
        auth::{ApiJson, ApiPath, Authenticated},
    },
    core::visit::{self, NewVisit, UpdateVisit, VisitDetails},
    errors::{Error, Result},
};
use axum::{Json, extract::State, http::StatusCode};
use serde_json::Value;

/// `GET /api/visits`
pub async fn list_visits(
    _caller: Authenticated,
    State(state): State<AppState>,
) -> Result<Json<Vec<VisitDetails>>> {
    visit::get_all_visits(&state.db).await.map(Json)
}

/// `POST /api/visits`, no token required.
pub async fn create_visit(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewVisit>,
) -> Result<(StatusCode, Json<VisitDetails>)> {
    let created = visit::create_visit(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/visits/{id}`
pub async fn get_visit(
    _caller: Authenticated,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<VisitDetails>> {
    visit::get_visit(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| Error::not_found("Visit", id))
}

/// `PUT /api/visits/{id}`
pub async fn update_visit(
    _caller: Authenticated,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<UpdateVisit>,
) -> Result<Json<VisitDetails>> {
    visit::update_visit(&state.db, id, input).await.map(Json)
}

/// `DELETE /api/visits/{id}`
pub async fn delete_visit(
    _caller: Authenticated,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Value>> {
    visit::delete_visit(&state.db, id).await?;
    Ok(deleted("Visit deleted"))
}
