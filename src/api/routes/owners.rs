//! Owners. Creating and listing are public intake endpoints.

use super::deleted;
use crate::{
    api::{
        AppState,
        auth::{ApiJson, ApiPath, ApiQuery, Authenticated},
    },
    core::owner::{self, OwnerInput},
    entities::owner::Model,
    errors::{Error, Result},
};
use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::Value;

/// Optional filter for the owner list.
#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    /// Exact phone number match
    pub phone: Option<String>,
}

/// `GET /api/owners`, optionally filtered by `?phone=`.
pub async fn list_owners(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<OwnerQuery>,
) -> Result<Json<Vec<Model>>> {
    owner::get_owners(&state.db, query.phone.as_deref())
        .await
        .map(Json)
}

/// `POST /api/owners`, no token required.
pub async fn create_owner(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<OwnerInput>,
) -> Result<(StatusCode, Json<Model>)> {
    let created = owner::create_owner(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/owners/{id}`
pub async fn get_owner(
    _caller: Authenticated,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Model>> {
    owner::get_owner_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| Error::not_found("Owner", id))
}

/// `PUT /api/owners/{id}`
pub async fn update_owner(
    _caller: Authenticated,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<OwnerInput>,
) -> Result<Json<Model>> {
    owner::update_owner(&state.db, id, input).await.map(Json)
}

/// `DELETE /api/owners/{id}`
pub async fn delete_owner(
    _caller: Authenticated,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Value>> {
    owner::delete_owner(&state.db, id).await?;
    Ok(deleted("Owner deleted"))
}
