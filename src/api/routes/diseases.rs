//! Disease catalogue, available to any authenticated user.

use super::deleted;
use crate::{
    api::{
        AppState,
        auth::{ApiJson, ApiPath, Authenticated},
    },
    core::disease::{self, DiseaseInput},
    entities::disease::Model,
    errors::{Error, Result},
};
use axum::{Json, extract::State, http::StatusCode};
use serde_json::Value;

/// `GET /api/diseases`
pub async fn list_diseases(
    _caller: Authenticated,
    State(state): State<AppState>,
) -> Result<Json<Vec<Model>>> {
    disease::get_all_diseases(&state.db).await.map(Json)
}

/// `POST /api/diseases`
pub async fn create_disease(
    _caller: Authenticated,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<DiseaseInput>,
) -> Result<(StatusCode, Json<Model>)> {
    let created = disease::create_disease(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/diseases/{id}`
pub async fn get_disease(
    _caller: Authenticated,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Model>> {
    disease::get_disease_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| Error::not_found("Disease", id))
}

/// `PUT /api/diseases/{id}`
pub async fn update_disease(
    _caller: Authenticated,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<DiseaseInput>,
) -> Result<Json<Model>> {
    disease::update_disease(&state.db, id, input)
        .await
        .map(Json)
}

/// `DELETE /api/diseases/{id}`
pub async fn delete_disease(
    _caller: Authenticated,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Value>> {
    disease::delete_disease(&state.db, id).await?;
    Ok(deleted("Disease deleted"))
}
