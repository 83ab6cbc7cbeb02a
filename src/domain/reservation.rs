use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::role::RoleKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "reservation_status", rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Completed => "completed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ReservationStatus::Cancelled | ReservationStatus::Completed)
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationAction {
    Confirm,
    Cancel,
    Complete,
}

impl ReservationAction {
    /// Status a PATCH body asks for, mapped to the action that reaches it.
    pub fn from_target(status: ReservationStatus) -> Option<Self> {
        match status {
            ReservationStatus::Confirmed => Some(ReservationAction::Confirm),
            ReservationStatus::Cancelled => Some(ReservationAction::Cancel),
            ReservationStatus::Completed => Some(ReservationAction::Complete),
            ReservationStatus::Pending => None,
        }
    }

    /// Whether this kind of actor appears anywhere in the transition table for the action.
    pub fn permits(&self, actor: RoleKind) -> bool {
        TRANSITIONS
            .iter()
            .any(|(_, action, kind, _)| action == self && *kind == actor)
    }
}

impl fmt::Display for ReservationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReservationAction::Confirm => "confirm",
            ReservationAction::Cancel => "cancel",
            ReservationAction::Complete => "complete",
        };
        f.write_str(s)
    }
}

type Transition = (ReservationStatus, ReservationAction, RoleKind, ReservationStatus);

const TRANSITIONS: &[Transition] = &[
    (ReservationStatus::Pending, ReservationAction::Confirm, RoleKind::Specialist, ReservationStatus::Confirmed),
    (ReservationStatus::Pending, ReservationAction::Cancel, RoleKind::Member, ReservationStatus::Cancelled),
    (ReservationStatus::Pending, ReservationAction::Cancel, RoleKind::Specialist, ReservationStatus::Cancelled),
    (ReservationStatus::Confirmed, ReservationAction::Cancel, RoleKind::Specialist, ReservationStatus::Cancelled),
    (ReservationStatus::Confirmed, ReservationAction::Complete, RoleKind::Specialist, ReservationStatus::Completed),
];

/// Looks up the transition table; anything absent is rejected.
pub fn next_status(
    current: ReservationStatus,
    action: ReservationAction,
    actor: RoleKind,
) -> Option<ReservationStatus> {
    TRANSITIONS
        .iter()
        .find(|(from, a, kind, _)| *from == current && *a == action && *kind == actor)
        .map(|(_, _, _, to)| *to)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reservation {
    pub id: Uuid,
    pub accommodation_id: Uuid,
    pub member_uid: String,
    pub university_code: String,
    pub status: ReservationStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub cancelled_by: Option<RoleKind>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    pub fn new(
        accommodation_id: Uuid,
        member_uid: String,
        university_code: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            accommodation_id,
            member_uid,
            university_code,
            status: ReservationStatus::Pending,
            start_date,
            end_date,
            cancelled_by: None,
            created_at: now,
            updated_at: now,
        }
    }
}
