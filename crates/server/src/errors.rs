use axum::async_trait;
use axum::extract::{rejection::JsonRejection, FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{debug, error};

use common::types::{ErrorDetail, ErrorEnvelope};
use service::auth::errors::AuthError;
use service::errors::{FieldError, ServiceError};

/// HTTP error rendered as the uniform `{"error", "details"}` envelope.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorEnvelope,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, field: &str, message: impl Into<String>) -> Self {
        let detail = ErrorDetail { field: field.to_string(), message: message.into(), status: status.as_u16() };
        Self { status, body: ErrorEnvelope::single(error, detail) }
    }

    fn from_field(status: StatusCode, error: &str, f: FieldError) -> Self {
        let detail = ErrorDetail { field: f.field, message: f.message, status: f.status };
        Self { status, body: ErrorEnvelope::single(error, detail) }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", "auth_token", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "Forbidden", "role", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", "server", message)
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(f) => {
                debug!(field = %f.field, message = %f.message, "validation rejected");
                Self::from_field(StatusCode::BAD_REQUEST, "Validation failed", f)
            }
            ServiceError::NotFound(f) => Self::from_field(StatusCode::NOT_FOUND, "Not found", f),
            ServiceError::Conflict(f) => Self::from_field(StatusCode::CONFLICT, "Conflict", f),
            ServiceError::Db(msg) => {
                error!(error = %msg, "persistence failure");
                Self::internal("internal database error")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        let code = e.code();
        match e {
            AuthError::Validation { field, message } => Self::new(StatusCode::BAD_REQUEST, "Validation failed", field, message),
            AuthError::Conflict => Self::new(StatusCode::CONFLICT, "Conflict", "username", "user already exists"),
            AuthError::NotFound => Self::new(StatusCode::NOT_FOUND, "Not found", "id", "user not found"),
            AuthError::Unauthorized => Self::unauthorized("invalid credentials"),
            AuthError::TokenExpired => Self::unauthorized("token expired"),
            AuthError::TokenError(_) => Self::unauthorized("invalid token"),
            AuthError::HashError(msg) | AuthError::Repository(msg) => {
                error!(code, error = %msg, "auth failure");
                Self::internal("internal auth error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// `Json` extractor whose rejections use the error envelope (field `body`).
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|r| ApiError::new(StatusCode::BAD_REQUEST, "Validation failed", "body", r.body_text()))?;
        Ok(Self(value))
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database unavailable: {0}")]
    Database(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

impl IntoResponse for StartupError {
    fn into_response(self) -> Response {
        let msg = self.to_string();
        error!(error = %msg, "startup error");
        ApiError::internal(msg).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_keeps_detail_status() {
        let e: ApiError = ServiceError::missing_reference("items", "items not found: x").into();
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
        assert_eq!(e.body.error, "Validation failed");
        assert_eq!(e.body.details[0].field, "items");
        assert_eq!(e.body.details[0].status, 404);
    }

    #[test]
    fn conflict_and_not_found_map_to_http() {
        let c: ApiError = ServiceError::conflict("id", "in use").into();
        assert_eq!(c.status, StatusCode::CONFLICT);
        let n: ApiError = ServiceError::not_found("id", "service").into();
        assert_eq!(n.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn db_errors_are_opaque() {
        let e: ApiError = ServiceError::Db("relation does not exist".into()).into();
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!e.body.details[0].message.contains("relation"));
    }

    #[test]
    fn bad_credentials_are_unauthorized() {
        let e: ApiError = AuthError::Unauthorized.into();
        assert_eq!(e.status, StatusCode::UNAUTHORIZED);
    }
}
