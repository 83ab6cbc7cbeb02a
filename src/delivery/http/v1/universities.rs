use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::delivery::http::v1::validate_payload;
use crate::domain::role::RoleToken;
use crate::usecase::error::UsecaseError;
use crate::AppState;

#[derive(Deserialize, Validate)]
pub struct CreateLocationRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

/// Public: no role required.
#[tracing::instrument(skip(state))]
pub async fn list_universities(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, UsecaseError> {
    let universities = state.universities_usecase.list().await?;
    Ok((StatusCode::OK, Json(universities)))
}

#[tracing::instrument(skip(state, token), fields(role = %token))]
pub async fn list_locations(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, UsecaseError> {
    let caller = state.roles_usecase.resolve(&token).await?;
    let locations = state.universities_usecase.list_locations(&caller, &code).await?;

    Ok((StatusCode::OK, Json(locations)))
}

#[tracing::instrument(skip(state, token, payload), fields(role = %token))]
pub async fn create_location(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
    Path(code): Path<String>,
    Json(payload): Json<CreateLocationRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    validate_payload(&payload)?;
    let caller = state.roles_usecase.resolve(&token).await?;

    let location = state
        .universities_usecase
        .create_location(&caller, &code, payload.name, payload.latitude, payload.longitude)
        .await?;
    Ok((StatusCode::CREATED, Json(location)))
}

#[tracing::instrument(skip(state, token), fields(role = %token))]
pub async fn delete_location(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
    Path((code, id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, UsecaseError> {
    let caller = state.roles_usecase.resolve(&token).await?;
    state.universities_usecase.delete_location(&caller, &code, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
