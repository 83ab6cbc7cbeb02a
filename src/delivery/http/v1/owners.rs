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
pub struct CreateOwnerRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 50))]
    #[serde(default)]
    pub phone: String,
}

#[derive(Deserialize, Validate)]
pub struct UpdateOwnerRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
}

#[tracing::instrument(skip(state, token), fields(role = %token))]
pub async fn list_owners(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
) -> Result<impl IntoResponse, UsecaseError> {
    state.roles_usecase.resolve(&token).await?;
    let owners = state.owners_usecase.list().await?;

    Ok((StatusCode::OK, Json(owners)))
}

#[tracing::instrument(skip(state, token, payload), fields(role = %token))]
pub async fn create_owner(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
    Json(payload): Json<CreateOwnerRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    validate_payload(&payload)?;
    let caller = state.roles_usecase.resolve(&token).await?;

    let owner = state.owners_usecase.create(&caller, payload.name, payload.phone).await?;
    Ok((StatusCode::CREATED, Json(owner)))
}

#[tracing::instrument(skip(state, token), fields(role = %token))]
pub async fn get_owner(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, UsecaseError> {
    state.roles_usecase.resolve(&token).await?;
    let owner = state.owners_usecase.get(id).await?;

    Ok((StatusCode::OK, Json(owner)))
}

#[tracing::instrument(skip(state, token, payload), fields(role = %token))]
pub async fn update_owner(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOwnerRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    validate_payload(&payload)?;
    let caller = state.roles_usecase.resolve(&token).await?;

    let owner = state
        .owners_usecase
        .update(&caller, id, payload.name, payload.phone)
        .await?;
    Ok((StatusCode::OK, Json(owner)))
}

#[tracing::instrument(skip(state, token), fields(role = %token))]
pub async fn delete_owner(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, UsecaseError> {
    let caller = state.roles_usecase.resolve(&token).await?;
    state.owners_usecase.delete(&caller, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
