use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::delivery::http::v1::validate_payload;
use crate::domain::reservation::{Reservation, ReservationAction, ReservationStatus};
use crate::domain::role::{RoleKind, RoleToken};
use crate::usecase::error::UsecaseError;
use crate::AppState;

#[derive(Serialize)]
pub struct ReservationResponse {
    pub id: Uuid,
    pub accommodation_id: Uuid,
    pub member_uid: String,
    pub university: String,
    pub status: ReservationStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub cancelled_by: Option<RoleKind>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Validate)]
pub struct CreateReservationRequest {
    pub accommodation_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Required when a specialist reserves on behalf of a member.
    #[validate(length(min = 1, max = 100))]
    pub member_uid: Option<String>,
    /// Used when the member is registered on first reservation.
    #[validate(length(min = 1, max = 200))]
    pub member_name: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateReservationRequest {
    pub status: ReservationStatus,
}

/// No state moves back to `pending`, so asking for it is a transition error.
fn requested_action(status: ReservationStatus) -> Result<ReservationAction, UsecaseError> {
    ReservationAction::from_target(status).ok_or_else(|| {
        UsecaseError::InvalidTransition(format!("a reservation cannot be moved to '{status}'"))
    })
}

pub(crate) fn reservation_to_response(r: Reservation) -> ReservationResponse {
    ReservationResponse {
        id: r.id,
        accommodation_id: r.accommodation_id,
        member_uid: r.member_uid,
        university: r.university_code,
        status: r.status,
        start_date: r.start_date,
        end_date: r.end_date,
        cancelled_by: r.cancelled_by,
        created_at: r.created_at,
        updated_at: r.updated_at,
    }
}

#[tracing::instrument(skip(state, token), fields(role = %token))]
pub async fn list_reservations(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
) -> Result<impl IntoResponse, UsecaseError> {
    let caller = state.roles_usecase.resolve(&token).await?;

    let reservations = state.reservations_usecase.list(&caller).await?;
    let response: Vec<ReservationResponse> = reservations.into_iter().map(reservation_to_response).collect();

    Ok((StatusCode::OK, Json(response)))
}

#[tracing::instrument(skip(state, token, payload), fields(role = %token))]
pub async fn create_reservation(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
    Json(payload): Json<CreateReservationRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!(accommodation_id = %payload.accommodation_id, "handling create reservation request");

    validate_payload(&payload)?;
    // An unknown member uid is registered by the usecase once the booking is allowed.
    let caller = state
        .roles_usecase
        .resolve_for_booking(&token, payload.member_name)
        .await?;

    let reservation = state
        .reservations_usecase
        .create(
            &caller,
            payload.accommodation_id,
            payload.start_date,
            payload.end_date,
            payload.member_uid,
        )
        .await?;

    tracing::debug!(reservation_id = %reservation.id, "reservation created successfully");
    Ok((StatusCode::CREATED, Json(reservation_to_response(reservation))))
}

#[tracing::instrument(skip(state, token), fields(role = %token))]
pub async fn get_reservation(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, UsecaseError> {
    let caller = state.roles_usecase.resolve(&token).await?;
    let reservation = state.reservations_usecase.get(&caller, id).await?;

    Ok((StatusCode::OK, Json(reservation_to_response(reservation))))
}

#[tracing::instrument(skip(state, token, payload), fields(role = %token, target = %payload.status))]
pub async fn update_reservation(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateReservationRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    let caller = state.roles_usecase.resolve(&token).await?;
    let action = requested_action(payload.status)?;

    let reservation = state.reservations_usecase.apply(&caller, id, action).await?;
    Ok((StatusCode::OK, Json(reservation_to_response(reservation))))
}

#[tracing::instrument(skip(state, token), fields(role = %token))]
pub async fn cancel_reservation(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, UsecaseError> {
    let caller = state.roles_usecase.resolve(&token).await?;
    state
        .reservations_usecase
        .apply(&caller, id, ReservationAction::Cancel)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
