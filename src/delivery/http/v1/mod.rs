use validator::Validate;

use crate::usecase::error::UsecaseError;

pub mod accommodations;
pub mod members;
pub mod middleware;
pub mod notifications;
pub mod owners;
pub mod ratings;
pub mod reservations;
pub mod universities;

pub(crate) fn validate_payload<T: Validate>(payload: &T) -> Result<(), UsecaseError> {
    payload.validate().map_err(|validation_errors| {
        tracing::warn!(?validation_errors, "validation failed");
        UsecaseError::Validation(validation_errors.to_string())
    })
}
