use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::notification::Notification;
use crate::domain::role::{RoleKind, RoleToken};
use crate::usecase::error::UsecaseError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NotificationListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Serialize)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub recipient_kind: RoleKind,
    pub recipient_id: String,
    pub reservation_id: Uuid,
    pub subject: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct NotificationsListResponse {
    pub notifications: Vec<NotificationResponse>,
    pub unread_count: i64,
}

fn notification_to_response(n: Notification) -> NotificationResponse {
    NotificationResponse {
        id: n.id,
        recipient_kind: n.recipient_kind,
        recipient_id: n.recipient_id,
        reservation_id: n.reservation_id,
        subject: n.subject,
        message: n.message,
        is_read: n.is_read,
        created_at: n.created_at,
    }
}

#[tracing::instrument(skip(state, token), fields(role = %token))]
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
    Query(params): Query<NotificationListParams>,
) -> Result<impl IntoResponse, UsecaseError> {
    let caller = state.roles_usecase.resolve(&token).await?;

    let (notifications, unread_count) = state
        .notifications_usecase
        .list(&caller, params.limit, params.offset)
        .await?;

    Ok((
        StatusCode::OK,
        Json(NotificationsListResponse {
            notifications: notifications.into_iter().map(notification_to_response).collect(),
            unread_count,
        }),
    ))
}

#[tracing::instrument(skip(state, token), fields(role = %token, notification_id = %id))]
pub async fn mark_notification_read(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<RoleToken>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, UsecaseError> {
    let caller = state.roles_usecase.resolve(&token).await?;
    state.notifications_usecase.mark_as_read(&caller, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
