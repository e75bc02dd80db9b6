use serde::Serialize;
use thiserror::Error;

use models::errors::ModelError;

/// Field-level failure detail: which input was wrong, why, and the status the
/// caller should see for that field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub status: u16,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>, status: u16) -> Self {
        Self { field: field.into(), message: message.into(), status }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error on {}: {}", .0.field, .0.message)]
    Validation(FieldError),
    #[error("not found: {}", .0.message)]
    NotFound(FieldError),
    #[error("conflict on {}: {}", .0.field, .0.message)]
    Conflict(FieldError),
    #[error("database error: {0}")]
    Db(String),
}

impl ServiceError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(FieldError::new(field, message, 400))
    }

    /// Invalid input because it points at something that does not exist
    /// (rejected as a validation failure, detail status 404).
    pub fn missing_reference(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(FieldError::new(field, message, 404))
    }

    pub fn not_found(field: &str, entity: &str) -> Self {
        Self::NotFound(FieldError::new(field, format!("{} not found", entity), 404))
    }

    pub fn conflict(field: &str, message: impl Into<String>) -> Self {
        Self::Conflict(FieldError::new(field, message, 409))
    }

    pub fn field_error(&self) -> Option<&FieldError> {
        match self {
            Self::Validation(f) | Self::NotFound(f) | Self::Conflict(f) => Some(f),
            Self::Db(_) => None,
        }
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation { field, message } => Self::validation(field, message),
            ModelError::Db(msg) => Self::Db(msg),
        }
    }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self { Self::Db(e.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_validation_keeps_field() {
        let e: ServiceError = ModelError::validation("price", "must be greater than zero").into();
        let f = e.field_error().unwrap();
        assert_eq!(f.field, "price");
        assert_eq!(f.status, 400);
    }

    #[test]
    fn missing_reference_is_validation_with_404_detail() {
        let e = ServiceError::missing_reference("items", "item 1 not found");
        assert!(matches!(e, ServiceError::Validation(ref f) if f.status == 404));
    }

    #[test]
    fn db_errors_carry_no_field() {
        assert!(ServiceError::Db("boom".into()).field_error().is_none());
    }
}
