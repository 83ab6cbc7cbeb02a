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
pub struct CreateRatingRequest {
    pub reservation_id: Uuid,
    pub score: i16,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

#[tracing::instrument(skip(state, token), fields(role = %token))]
pub async fn list_ratings(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
) -> Result<impl IntoResponse, UsecaseError> {
    let caller = state.roles_usecase.resolve(&token).await?;
    let ratings = state.ratings_usecase.list(&caller).await?;

    Ok((StatusCode::OK, Json(ratings)))
}

#[tracing::instrument(skip(state, token, payload), fields(role = %token, reservation_id = %payload.reservation_id))]
pub async fn create_rating(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
    Json(payload): Json<CreateRatingRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    validate_payload(&payload)?;
    let caller = state.roles_usecase.resolve(&token).await?;

    let rating = state
        .ratings_usecase
        .create(&caller, payload.reservation_id, payload.score, payload.comment)
        .await?;

    tracing::debug!(rating_id = %rating.id, "rating created successfully");
    Ok((StatusCode::CREATED, Json(rating)))
}

#[tracing::instrument(skip(state, token), fields(role = %token))]
pub async fn get_rating(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, UsecaseError> {
    let caller = state.roles_usecase.resolve(&token).await?;
    let rating = state.ratings_usecase.get(&caller, id).await?;

    Ok((StatusCode::OK, Json(rating)))
}

#[tracing::instrument(skip(state, token), fields(role = %token))]
pub async fn delete_rating(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, UsecaseError> {
    let caller = state.roles_usecase.resolve(&token).await?;
    state.ratings_usecase.delete(&caller, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
