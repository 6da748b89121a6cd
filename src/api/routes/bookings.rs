//! Client portal booking, open to any authenticated role.

use crate::{
    api::{
        AppState,
        auth::{ApiJson, Authenticated},
    },
    core::{
        booking::{self, BookingInput},
        visit::VisitDetails,
    },
    errors::Result,
};
use axum::{Json, extract::State, http::StatusCode};
use tracing::debug;

/// `POST /api/bookings`, open to every role.
pub async fn create_booking(
    Authenticated(claims): Authenticated,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<BookingInput>,
) -> Result<(StatusCode, Json<VisitDetails>)> {
    debug!(user_id = claims.user_id, "Booking requested");
    let visit = booking::create_booking(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(visit)))
}
