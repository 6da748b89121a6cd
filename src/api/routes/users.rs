//! User accounts, admin only.

use super::deleted;
use crate::{
    api::{
        AppState,
        auth::{ApiJson, ApiPath, RequireAdmin},
    },
    core::user::{self, NewUser, UpdateUser},
    entities::user::Model,
    errors::{Error, Result},
};
use axum::{Json, extract::State, http::StatusCode};
use serde_json::Value;

/// `GET /api/users`
pub async fn list_users(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Model>>> {
    user::get_all_users(&state.db).await.map(Json)
}

/// `POST /api/users`
pub async fn create_user(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewUser>,
) -> Result<(StatusCode, Json<Model>)> {
    let created = user::create_user(&state.db, &state.auth, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/users/{id}`
pub async fn get_user(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Model>> {
    user::get_user_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| Error::not_found("User", id))
}

/// `PUT /api/users/{id}`
pub async fn update_user(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<UpdateUser>,
) -> Result<Json<Model>> {
    user::update_user(&state.db, &state.auth, id, input)
        .await
        .map(Json)
}

/// `DELETE /api/users/{id}`
pub async fn delete_user(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Value>> {
    user::delete_user(&state.db, id).await?;
    Ok(deleted("User deleted"))
}
