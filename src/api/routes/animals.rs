//! Animals and their medical history. Creating an animal is a public intake endpoint.

use super::deleted;
use crate::{
    api::{
        AppState,
        auth::{ApiJson, ApiPath, ApiQuery, Authenticated},
    },
    core::animal::{self, AnimalDetails, MedicalRecordInput, NewAnimal, UpdateAnimal},
    errors::{Error, Result},
};
use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::Value;

/// Query string of the species search.
#[derive(Debug, Deserialize)]
pub struct SpeciesQuery {
    /// Case-insensitive species name
    pub species: Option<String>,
}

/// Body of a medical history replacement.
#[derive(Debug, Deserialize)]
pub struct ReplaceRecord {
    /// Disease the entry should point at
    pub disease_id: Option<i64>,
}

/// `GET /api/animals`
pub async fn list_animals(
    _caller: Authenticated,
    State(state): State<AppState>,
) -> Result<Json<Vec<AnimalDetails>>> {
    animal::get_all_animals(&state.db).await.map(Json)
}

/// `GET /api/animals/search?species=...`
pub async fn search_animals(
    _caller: Authenticated,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SpeciesQuery>,
) -> Result<Json<Vec<AnimalDetails>>> {
    let species = query
        .species
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| Error::validation("species is required"))?;
    animal::search_animals_by_species(&state.db, &species)
        .await
        .map(Json)
}

/// `POST /api/animals`, no token required.
pub async fn create_animal(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewAnimal>,
) -> Result<(StatusCode, Json<AnimalDetails>)> {
    let created = animal::create_animal(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/animals/{id}`
pub async fn get_animal(
    _caller: Authenticated,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<AnimalDetails>> {
    animal::get_animal(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| Error::not_found("Animal", id))
}

/// `PUT /api/animals/{id}`
pub async fn update_animal(
    _caller: Authenticated,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<UpdateAnimal>,
) -> Result<Json<AnimalDetails>> {
    animal::update_animal(&state.db, id, input).await.map(Json)
}

/// `DELETE /api/animals/{id}`, refused while visits reference the animal.
pub async fn delete_animal(
    _caller: Authenticated,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Value>> {
    animal::delete_animal(&state.db, id).await?;
    Ok(deleted("Animal deleted"))
}

/// `POST /api/animals/{id}/medical-history`
pub async fn add_medical_record(
    _caller: Authenticated,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<MedicalRecordInput>,
) -> Result<Json<AnimalDetails>> {
    animal::add_medical_record(&state.db, id, input)
        .await
        .map(Json)
}

/// `PUT /api/animals/{id}/medical-history/{record_id}`
pub async fn replace_medical_record(
    _caller: Authenticated,
    State(state): State<AppState>,
    ApiPath((id, record_id)): ApiPath<(i64, i64)>,
    ApiJson(body): ApiJson<ReplaceRecord>,
) -> Result<Json<AnimalDetails>> {
    animal::replace_medical_record(&state.db, id, record_id, body.disease_id)
        .await
        .map(Json)
}

/// `DELETE /api/animals/{id}/medical-history/{record_id}`
pub async fn remove_medical_record(
    _caller: Authenticated,
    State(state): State<AppState>,
    ApiPath((id, record_id)): ApiPath<(i64, i64)>,
) -> Result<Json<AnimalDetails>> {
    animal::remove_medical_record(&state.db, id, record_id)
        .await
        .map(Json)
}
