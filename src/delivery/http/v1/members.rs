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

use crate::delivery::http::v1::reservations::{reservation_to_response, ReservationResponse};
use crate::delivery::http::v1::validate_payload;
use crate::domain::role::RoleToken;
use crate::usecase::error::UsecaseError;
use crate::AppState;

#[derive(Deserialize, Validate)]
pub struct CreateMemberRequest {
    #[validate(length(min = 1, max = 100))]
    pub uid: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

#[derive(Deserialize, Validate)]
pub struct UpdateMemberRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

#[tracing::instrument(skip(state, token), fields(role = %token))]
pub async fn list_members(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
) -> Result<impl IntoResponse, UsecaseError> {
    let caller = state.roles_usecase.resolve(&token).await?;
    let members = state.members_usecase.list(&caller).await?;

    Ok((StatusCode::OK, Json(members)))
}

#[tracing::instrument(skip(state, token, payload), fields(role = %token))]
pub async fn create_member(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
    Json(payload): Json<CreateMemberRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    validate_payload(&payload)?;
    let caller = state.roles_usecase.resolve(&token).await?;

    let member = state.members_usecase.create(&caller, payload.uid, payload.name).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

#[tracing::instrument(skip(state, token), fields(role = %token))]
pub async fn get_member(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
    Path(uid): Path<String>,
) -> Result<impl IntoResponse, UsecaseError> {
    let caller = state.roles_usecase.resolve(&token).await?;
    let member = state.members_usecase.get(&caller, &uid).await?;

    Ok((StatusCode::OK, Json(member)))
}

#[tracing::instrument(skip(state, token, payload), fields(role = %token))]
pub async fn update_member(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
    Path(uid): Path<String>,
    Json(payload): Json<UpdateMemberRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    validate_payload(&payload)?;
    let caller = state.roles_usecase.resolve(&token).await?;

    let member = state.members_usecase.update(&caller, &uid, payload.name).await?;
    Ok((StatusCode::OK, Json(member)))
}

#[tracing::instrument(skip(state, token), fields(role = %token))]
pub async fn delete_member(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
    Path(uid): Path<String>,
) -> Result<impl IntoResponse, UsecaseError> {
    let caller = state.roles_usecase.resolve(&token).await?;
    state.members_usecase.delete(&caller, &uid).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(state, token), fields(role = %token))]
pub async fn list_member_reservations(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
    Path(uid): Path<String>,
) -> Result<impl IntoResponse, UsecaseError> {
    let caller = state.roles_usecase.resolve(&token).await?;

    let reservations = state.reservations_usecase.list_for_member(&caller, &uid).await?;
    let response: Vec<ReservationResponse> = reservations.into_iter().map(reservation_to_response).collect();

    Ok((StatusCode::OK, Json(response)))
}

#[tracing::instrument(skip(state, token), fields(role = %token))]
pub async fn list_specialists(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
) -> Result<impl IntoResponse, UsecaseError> {
    let caller = state.roles_usecase.resolve(&token).await?;
    let specialists = state.members_usecase.list_specialists(&caller).await?;

    Ok((StatusCode::OK, Json(specialists)))
}

#[tracing::instrument(skip(state, token), fields(role = %token))]
pub async fn get_specialist(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, UsecaseError> {
    let caller = state.roles_usecase.resolve(&token).await?;
    let specialist = state.members_usecase.get_specialist(&caller, id).await?;

    Ok((StatusCode::OK, Json(specialist)))
}
