use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_SCORE: i16 = 0;
pub const MAX_SCORE: i16 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Rating {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub score: i16,
    pub comment: Option<String>,
    pub date_rated: DateTime<Utc>,
}

impl Rating {
    pub fn new(reservation_id: Uuid, score: i16, comment: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            reservation_id,
            score,
            comment,
            date_rated: Utc::now(),
        }
    }
}

/// A rating joined with the reservation fields needed for visibility checks.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct RatingView {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub score: i16,
    pub comment: Option<String>,
    pub date_rated: DateTime<Utc>,
    pub member_uid: String,
    pub university_code: String,
    pub accommodation_id: Uuid,
}

pub fn score_in_range(score: i16) -> bool {
    (MIN_SCORE..=MAX_SCORE).contains(&score)
}
