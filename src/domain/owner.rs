use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PropertyOwner {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PropertyOwner {
    pub fn new(name: String, phone: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            phone,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn update(&mut self, name: Option<String>, phone: Option<String>) {
        if let Some(n) = name {
            self.name = n;
        }
        if let Some(p) = phone {
            self.phone = p;
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_update_keeps_unset_fields() {
        let mut owner = PropertyOwner::new("Mr Chan".to_string(), "2859 1111".to_string());
        let created_at = owner.created_at;

        owner.update(None, Some("2859 2222".to_string()));

        assert_eq!(owner.name, "Mr Chan");
        assert_eq!(owner.phone, "2859 2222");
        assert!(owner.updated_at >= created_at);
    }
}
