use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Specialist {
    pub id: Uuid,
    pub name: String,
    pub university_code: String,
    pub created_at: DateTime<Utc>,
}

impl Specialist {
    pub fn new(name: String, university_code: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            university_code,
            created_at: Utc::now(),
        }
    }
}
