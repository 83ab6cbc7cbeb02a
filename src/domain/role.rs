use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::university::normalize_code;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "role_kind", rename_all = "lowercase")]
pub enum RoleKind {
    Member,
    Specialist,
}

impl RoleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleKind::Member => "member",
            RoleKind::Specialist => "specialist",
        }
    }
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum RoleParseError {
    #[error("role must look like <university>:<member|specialist>:<id>")]
    Shape,
    #[error("unknown role kind '{0}'")]
    Kind(String),
    #[error("member role requires a uid")]
    MissingUid,
    #[error("specialist id '{0}' is not a valid id")]
    SpecialistId(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoleIdentity {
    Member { uid: String },
    /// `None` for list-level actions where the token names only the university.
    Specialist { id: Option<Uuid> },
}

/// Parsed, not yet resolved, `role` query parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleToken {
    pub university_code: String,
    pub identity: RoleIdentity,
}

impl RoleToken {
    pub fn kind(&self) -> RoleKind {
        match self.identity {
            RoleIdentity::Member { .. } => RoleKind::Member,
            RoleIdentity::Specialist { .. } => RoleKind::Specialist,
        }
    }
}

impl FromStr for RoleToken {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() < 2 || parts.len() > 3 || parts.iter().any(|p| p.trim().is_empty()) {
            return Err(RoleParseError::Shape);
        }

        let university_code = normalize_code(parts[0]);
        let identity = parts.get(2).map(|p| p.trim());

        let identity = match parts[1].trim().to_lowercase().as_str() {
            "member" => {
                let uid = identity.ok_or(RoleParseError::MissingUid)?;
                RoleIdentity::Member { uid: uid.to_string() }
            }
            "specialist" => {
                let id = identity
                    .map(|raw| Uuid::parse_str(raw).map_err(|_| RoleParseError::SpecialistId(raw.to_string())))
                    .transpose()?;
                RoleIdentity::Specialist { id }
            }
            other => return Err(RoleParseError::Kind(other.to_string())),
        };

        Ok(Self {
            university_code,
            identity,
        })
    }
}

impl fmt::Display for RoleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.identity {
            RoleIdentity::Member { uid } => write!(f, "{}:member:{}", self.university_code, uid),
            RoleIdentity::Specialist { id: Some(id) } => write!(f, "{}:specialist:{}", self.university_code, id),
            RoleIdentity::Specialist { id: None } => write!(f, "{}:specialist", self.university_code),
        }
    }
}
