use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use thiserror::Error;

use crate::domain::role::RoleParseError;
use crate::repository::errors::RepositoryError;

#[derive(Debug, Error)]
pub enum UsecaseError {
    #[error("role parameter is required")]
    Unauthorized,

    #[error("malformed role: {0}")]
    MalformedRole(#[from] RoleParseError),

    #[error("unknown university '{0}'")]
    UnknownUniversity(String),

    #[error("{0}")]
    UnknownIdentity(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidTransition(String),

    #[error("{0}")]
    NotCompleted(String),

    #[error("unknown location '{0}'")]
    UnknownLocation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl UsecaseError {
    pub fn kind(&self) -> &'static str {
        match self {
            UsecaseError::Unauthorized => "unauthorized",
            UsecaseError::MalformedRole(_) => "malformed_role",
            UsecaseError::UnknownUniversity(_) => "unknown_university",
            UsecaseError::UnknownIdentity(_) => "unknown_identity",
            UsecaseError::Forbidden(_) => "forbidden",
            UsecaseError::Validation(_) => "validation_error",
            UsecaseError::InvalidTransition(_) => "invalid_transition",
            UsecaseError::NotCompleted(_) => "not_completed",
            UsecaseError::UnknownLocation(_) => "unknown_location",
            UsecaseError::NotFound(_) => "not_found",
            UsecaseError::Conflict(_) => "conflict",
            UsecaseError::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            UsecaseError::Unauthorized
            | UsecaseError::MalformedRole(_)
            | UsecaseError::UnknownUniversity(_)
            | UsecaseError::UnknownIdentity(_) => StatusCode::UNAUTHORIZED,
            UsecaseError::Forbidden(_) => StatusCode::FORBIDDEN,
            UsecaseError::Validation(_) | UsecaseError::NotCompleted(_) => StatusCode::BAD_REQUEST,
            UsecaseError::InvalidTransition(_) | UsecaseError::Conflict(_) => StatusCode::CONFLICT,
            UsecaseError::UnknownLocation(_) | UsecaseError::NotFound(_) => StatusCode::NOT_FOUND,
            UsecaseError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepositoryError> for UsecaseError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => UsecaseError::NotFound("Resource".to_string()),
            RepositoryError::Conflict(msg) => UsecaseError::Conflict(msg),
            RepositoryError::DatabaseError(msg) => UsecaseError::Internal(msg),
        }
    }
}

impl From<anyhow::Error> for UsecaseError {
    fn from(e: anyhow::Error) -> Self {
        UsecaseError::Internal(e.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for UsecaseError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();

        match &self {
            UsecaseError::Internal(_) => {
                tracing::error!(error = %self, "internal error");
            }
            UsecaseError::NotFound(_) | UsecaseError::UnknownLocation(_) => {
                tracing::warn!(error = %self, "resource not found");
            }
            UsecaseError::Forbidden(_)
            | UsecaseError::Unauthorized
            | UsecaseError::MalformedRole(_)
            | UsecaseError::UnknownUniversity(_)
            | UsecaseError::UnknownIdentity(_) => {
                tracing::warn!(error = %self, kind = self.kind(), "access denied");
            }
            _ => {
                tracing::debug!(error = %self, kind = self.kind());
            }
        }

        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(UsecaseError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            UsecaseError::MalformedRole(RoleParseError::Shape).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(UsecaseError::Forbidden("no".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(UsecaseError::Validation("bad".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(UsecaseError::NotCompleted("no".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(UsecaseError::InvalidTransition("no".into()).status(), StatusCode::CONFLICT);
        assert_eq!(UsecaseError::UnknownLocation("x".into()).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_repository_error_conversion() {
        let e: UsecaseError = RepositoryError::Conflict("duplicate key".into()).into();
        assert_eq!(e.kind(), "conflict");

        let e: UsecaseError = RepositoryError::DatabaseError("boom".into()).into();
        assert_eq!(e.kind(), "internal");
    }
}
