use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::role::RoleKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_kind: RoleKind,
    pub recipient_id: String,
    pub reservation_id: Uuid,
    pub subject: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        recipient_kind: RoleKind,
        recipient_id: String,
        reservation_id: Uuid,
        subject: String,
        message: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient_kind,
            recipient_id,
            reservation_id,
            subject,
            message,
            is_read: false,
            created_at: Utc::now(),
        }
    }
}
