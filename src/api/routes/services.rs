//! Service catalogue, admin only.

use super::deleted;
use crate::{
    api::{
        AppState,
        auth::{ApiJson, ApiPath, RequireAdmin},
    },
    core::service::{self, ServiceInput},
    entities::service::Model,
    errors::{Error, Result},
};
use axum::{Json, extract::State, http::StatusCode};
use serde_json::Value;

/// `GET /api/services`
pub async fn list_services(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Model>>> {
    service::get_all_services(&state.db).await.map(Json)
}

/// `POST /api/services`
pub async fn create_service(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ServiceInput>,
) -> Result<(StatusCode, Json<Model>)> {
    let created = service::create_service(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/services/{id}`
pub async fn get_service(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Model>> {
    service::get_service_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| Error::not_found("Service", id))
}

/// `PUT /api/services/{id}`
pub async fn update_service(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<ServiceInput>,
) -> Result<Json<Model>> {
    service::update_service(&state.db, id, input)
        .await
        .map(Json)
}

/// `DELETE /api/services/{id}`
pub async fn delete_service(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Value>> {
    service::delete_service(&state.db, id).await?;
    Ok(deleted("Service deleted"))
}
