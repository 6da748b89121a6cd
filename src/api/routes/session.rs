//! Login.

use crate::{
    api::{AppState, auth::ApiJson},
    core::auth::{self, Session},
    errors::Result,
};
use axum::{Json, extract::State};
use serde::Deserialize;

/// Credentials posted to the login endpoint.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Account name
    pub username: String,
    /// Plain text password
    pub password: String,
}

/// `POST /api/login`
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<Session>> {
    auth::login(&state.db, &state.auth, &body.username, &body.password)
        .await
        .map(Json)
}
