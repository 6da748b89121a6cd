//! Request extractors for the auth gate, JSON bodies, paths and query strings.

use crate::{
    api::AppState,
    core::auth::{Claims, require_role, verify_token},
    entities::Role,
    errors::Error,
};
use axum::{
    extract::{FromRequest, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

/// Claims of a caller that presented a valid bearer token.
///
/// No `Authorization` header, or one without a token part, rejects with
/// `Error::Unauthenticated`. A token that fails verification rejects with
/// `Error::Forbidden`.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Claims);

#[axum::async_trait]
impl FromRequestParts<AppState> for Authenticated {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Error> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(' ').nth(1))
            .filter(|token| !token.is_empty())
            .ok_or(Error::Unauthenticated)?;

        verify_token(&state.auth, token).map(Self)
    }
}

/// An authenticated caller with the `admin` role.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Claims);

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Error> {
        let Authenticated(claims) = Authenticated::from_request_parts(parts, state).await?;
        require_role(&claims, &[Role::Admin])?;
        Ok(Self(claims))
    }
}

/// `axum::Json` whose rejection is reported as a validation error.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Path` whose rejection is reported as a validation error.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct ApiPath<T>(pub T);

/// `axum::extract::Query` whose rejection is reported as a validation error.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct ApiQuery<T>(pub T);
