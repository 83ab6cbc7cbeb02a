use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::delivery::http::v1::validate_payload;
use crate::domain::accommodation::{
    Accommodation, AccommodationDraft, AccommodationPatch, AccommodationType, GeocodedAddress,
};
use crate::domain::role::RoleToken;
use crate::usecase::accommodations::{OwnerRef, SearchHit};
use crate::usecase::contracts::AccommodationFilter;
use crate::usecase::error::UsecaseError;
use crate::AppState;

#[derive(Serialize)]
pub struct AccommodationResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub accommodation_type: AccommodationType,
    pub address: String,
    pub building_name: Option<String>,
    pub room_number: Option<String>,
    pub flat_number: Option<String>,
    pub floor_number: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub geo_address: Option<String>,
    pub available_from: NaiveDate,
    pub available_until: NaiveDate,
    pub beds: i32,
    pub bedrooms: i32,
    pub daily_price: f64,
    pub owner_id: Uuid,
    pub specialist_id: Option<Uuid>,
    pub universities: Vec<String>,
    pub average_rating: Option<f64>,
    pub rating_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

#[derive(Deserialize, Validate)]
pub struct NewOwnerRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 50))]
    #[serde(default)]
    pub phone: String,
}

#[derive(Deserialize, Validate)]
pub struct CreateAccommodationRequest {
    #[serde(rename = "type")]
    pub accommodation_type: AccommodationType,
    #[validate(length(min = 1, max = 500))]
    pub address: String,
    #[validate(length(max = 200))]
    pub building_name: Option<String>,
    pub room_number: Option<String>,
    pub flat_number: Option<String>,
    pub floor_number: Option<String>,
    pub available_from: NaiveDate,
    pub available_until: NaiveDate,
    pub beds: i32,
    pub bedrooms: i32,
    pub daily_price: f64,
    #[validate(length(min = 1))]
    pub universities: Vec<String>,
    pub owner_id: Option<Uuid>,
    #[validate(nested)]
    pub owner: Option<NewOwnerRequest>,
}

#[derive(Deserialize, Validate)]
pub struct UpdateAccommodationRequest {
    #[serde(rename = "type")]
    pub accommodation_type: Option<AccommodationType>,
    #[validate(length(min = 1, max = 500))]
    pub address: Option<String>,
    #[validate(length(max = 200))]
    pub building_name: Option<String>,
    pub room_number: Option<String>,
    pub flat_number: Option<String>,
    pub floor_number: Option<String>,
    pub available_from: Option<NaiveDate>,
    pub available_until: Option<NaiveDate>,
    pub beds: Option<i32>,
    pub bedrooms: Option<i32>,
    pub daily_price: Option<f64>,
    pub owner_id: Option<Uuid>,
    #[validate(length(min = 1))]
    pub universities: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(rename = "type")]
    pub accommodation_type: Option<AccommodationType>,
    pub beds: Option<i32>,
    pub min_beds: Option<i32>,
    pub bedrooms: Option<i32>,
    pub min_bedrooms: Option<i32>,
    pub rating: Option<i16>,
    pub min_rating: Option<f64>,
    pub max_price: Option<f64>,
    pub available_from: Option<NaiveDate>,
    pub available_until: Option<NaiveDate>,
    pub address: Option<String>,
    pub distance_from: Option<String>,
}

/// Manual coordinates for addresses the geocoder cannot resolve.
#[derive(Deserialize, Validate)]
pub struct SetCoordinatesRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(length(min = 1, max = 500))]
    pub geo_address: String,
}

impl SearchParams {
    /// Splits the query into the store filter and the optional distance anchor.
    fn into_filter(self, university_code: &str) -> (AccommodationFilter, Option<String>) {
        let filter = AccommodationFilter {
            university_code: university_code.to_string(),
            accommodation_type: self.accommodation_type,
            beds: self.beds,
            min_beds: self.min_beds,
            bedrooms: self.bedrooms,
            min_bedrooms: self.min_bedrooms,
            rating: self.rating,
            min_rating: self.min_rating,
            max_price: self.max_price,
            available_from: self.available_from,
            available_until: self.available_until,
            address: self.address.filter(|a| !a.trim().is_empty()),
        };
        let distance_from = self.distance_from.filter(|d| !d.is_empty());
        (filter, distance_from)
    }
}

#[derive(Serialize)]
pub struct GeocodeResponse {
    pub geocoded: bool,
    pub accommodation: AccommodationResponse,
}

fn accommodation_to_response(a: Accommodation, distance_km: Option<f64>) -> AccommodationResponse {
    AccommodationResponse {
        id: a.id,
        accommodation_type: a.accommodation_type,
        address: a.address,
        building_name: a.building_name,
        room_number: a.room_number,
        flat_number: a.flat_number,
        floor_number: a.floor_number,
        latitude: a.latitude,
        longitude: a.longitude,
        geo_address: a.geo_address,
        available_from: a.available_from,
        available_until: a.available_until,
        beds: a.beds,
        bedrooms: a.bedrooms,
        daily_price: a.daily_price,
        owner_id: a.owner_id,
        specialist_id: a.specialist_id,
        universities: a.universities,
        average_rating: a.average_rating,
        rating_count: a.rating_count,
        created_at: a.created_at,
        updated_at: a.updated_at,
        distance_km,
    }
}

fn hit_to_response(hit: SearchHit) -> AccommodationResponse {
    accommodation_to_response(hit.accommodation, hit.distance_km)
}

#[tracing::instrument(skip(state, token), fields(role = %token))]
pub async fn list_accommodations(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
) -> Result<impl IntoResponse, UsecaseError> {
    let caller = state.roles_usecase.resolve(&token).await?;

    let accommodations = state.accommodations_usecase.list(&caller).await?;
    let response: Vec<AccommodationResponse> = accommodations
        .into_iter()
        .map(|a| accommodation_to_response(a, None))
        .collect();

    Ok((StatusCode::OK, Json(response)))
}

#[tracing::instrument(skip(state, token, payload), fields(role = %token))]
pub async fn create_accommodation(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
    Json(payload): Json<CreateAccommodationRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling create accommodation request");

    validate_payload(&payload)?;
    let caller = state.roles_usecase.resolve(&token).await?;

    let owner = match (payload.owner_id, payload.owner) {
        (Some(id), None) => OwnerRef::Existing(id),
        (None, Some(o)) => OwnerRef::New {
            name: o.name,
            phone: o.phone,
        },
        _ => {
            return Err(UsecaseError::Validation(
                "exactly one of owner_id or owner must be given".to_string(),
            ))
        }
    };

    let draft = AccommodationDraft {
        accommodation_type: payload.accommodation_type,
        address: payload.address,
        building_name: payload.building_name,
        room_number: payload.room_number,
        flat_number: payload.flat_number,
        floor_number: payload.floor_number,
        available_from: payload.available_from,
        available_until: payload.available_until,
        beds: payload.beds,
        bedrooms: payload.bedrooms,
        daily_price: payload.daily_price,
        universities: payload.universities,
    };

    let accommodation = state.accommodations_usecase.create(&caller, draft, owner).await?;

    tracing::debug!(accommodation_id = %accommodation.id, "accommodation created successfully");
    Ok((StatusCode::CREATED, Json(accommodation_to_response(accommodation, None))))
}

#[tracing::instrument(skip(state, token), fields(role = %token))]
pub async fn search_accommodations(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!(?params, "handling search request");

    let caller = state.roles_usecase.resolve(&token).await?;

    let (filter, distance_from) = params.into_filter(caller.university_code());

    let hits = state
        .accommodations_usecase
        .search(&caller, filter, distance_from.as_deref())
        .await?;
    let response: Vec<AccommodationResponse> = hits.into_iter().map(hit_to_response).collect();

    tracing::debug!(count = response.len(), "search completed");
    Ok((StatusCode::OK, Json(response)))
}

#[tracing::instrument(skip(state, token), fields(role = %token))]
pub async fn get_accommodation(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, UsecaseError> {
    let caller = state.roles_usecase.resolve(&token).await?;
    let accommodation = state.accommodations_usecase.get(&caller, id).await?;

    Ok((StatusCode::OK, Json(accommodation_to_response(accommodation, None))))
}

#[tracing::instrument(skip(state, token, payload), fields(role = %token))]
pub async fn update_accommodation(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAccommodationRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!(%id, "handling update accommodation request");

    validate_payload(&payload)?;
    let caller = state.roles_usecase.resolve(&token).await?;

    let patch = AccommodationPatch {
        accommodation_type: payload.accommodation_type,
        address: payload.address,
        building_name: payload.building_name,
        room_number: payload.room_number,
        flat_number: payload.flat_number,
        floor_number: payload.floor_number,
        available_from: payload.available_from,
        available_until: payload.available_until,
        beds: payload.beds,
        bedrooms: payload.bedrooms,
        daily_price: payload.daily_price,
        owner_id: payload.owner_id,
        universities: payload.universities,
    };

    let accommodation = state.accommodations_usecase.update(&caller, id, patch).await?;
    Ok((StatusCode::OK, Json(accommodation_to_response(accommodation, None))))
}

#[tracing::instrument(skip(state, token), fields(role = %token))]
pub async fn delete_accommodation(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, UsecaseError> {
    let caller = state.roles_usecase.resolve(&token).await?;
    state.accommodations_usecase.delete(&caller, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(state, token, payload), fields(role = %token))]
pub async fn geocode_accommodation(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
    Path(id): Path<Uuid>,
    payload: Option<Json<SetCoordinatesRequest>>,
) -> Result<impl IntoResponse, UsecaseError> {
    let caller = state.roles_usecase.resolve(&token).await?;

    let (accommodation, geocoded) = match payload {
        Some(Json(manual)) => {
            validate_payload(&manual)?;
            let geocoded = GeocodedAddress {
                latitude: manual.latitude,
                longitude: manual.longitude,
                geo_address: manual.geo_address,
            };
            let accommodation = state.accommodations_usecase.set_coordinates(&caller, id, geocoded).await?;
            (accommodation, true)
        }
        None => state.accommodations_usecase.regeocode(&caller, id).await?,
    };

    Ok((
        StatusCode::OK,
        Json(GeocodeResponse {
            geocoded,
            accommodation: accommodation_to_response(accommodation, None),
        }),
    ))
}
