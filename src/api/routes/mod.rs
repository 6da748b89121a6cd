//! Route handlers, one module per resource.

/// `/api/animals`
pub mod animals;
/// `/api/bookings`
pub mod bookings;
/// `/api/diseases`
pub mod diseases;
/// `/api/owners`
pub mod owners;
/// `/api/reports`
pub mod reports;
/// `/api/services`
pub mod services;
/// `/api/login`
pub mod session;
/// `/api/users`
pub mod users;
/// `/api/visits`
pub mod visits;

use axum::Json;
use serde_json::{Value, json};

/// Confirmation body for successful deletes.
fn deleted(message: &str) -> Json<Value> {
    Json(json!({ "message": message }))
}
