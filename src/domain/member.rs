use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Member {
    pub uid: String,
    pub name: String,
    pub university_code: String,
    pub created_at: DateTime<Utc>,
}

impl Member {
    pub fn new(uid: String, name: String, university_code: String) -> Self {
        Self {
            uid,
            name,
            university_code,
            created_at: Utc::now(),
        }
    }
}
