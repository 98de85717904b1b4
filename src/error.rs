use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::IntoResponse,
};
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use crate::{dao::storage::StorageError, dto::envelope::ErrorEnvelope};

/// Message returned to clients whenever the cause must stay server-side.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend failed or returned unreadable data.
    #[error("storage failure")]
    Storage(#[source] StorageError),
    /// A conditional write kept losing against concurrent writers.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict { key } => ServiceError::Conflict(format!(
                "`{key}` is being modified concurrently, please retry"
            )),
            other => ServiceError::Storage(other),
        }
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Unauthorized access attempt.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Path exists but does not accept the request method.
    #[error("method not allowed")]
    MethodNotAllowed,
    /// Request body exceeds the configured limit.
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error. The detail is logged, never sent to clients.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message placed in the envelope's `error` field.
    fn public_message(&self) -> String {
        match self {
            AppError::BadRequest(message)
            | AppError::Unauthorized(message)
            | AppError::NotFound(message)
            | AppError::PayloadTooLarge(message)
            | AppError::Conflict(message)
            | AppError::ServiceUnavailable(message) => message.clone(),
            AppError::MethodNotAllowed => "method not allowed".into(),
            AppError::Internal(_) => INTERNAL_ERROR_MESSAGE.into(),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Storage(source) => AppError::Internal(format!("{source}: {source:?}")),
            ServiceError::Conflict(message) => AppError::Conflict(message),
            ServiceError::Degraded => {
                AppError::ServiceUnavailable("storage unavailable (degraded mode)".into())
            }
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::InvalidInput(first_validation_message(&err))
    }
}

impl AppError {
    /// Map a body-reading failure, keeping 413 for bodies over the limit.
    fn from_body_failure(status: StatusCode, kind: &str, detail: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(format!("{kind} body too large: {detail}"))
        } else {
            AppError::BadRequest(format!("invalid {kind} body: {detail}"))
        }
    }
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        AppError::from_body_failure(rejection.status(), "request", rejection.body_text())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(format!("invalid JSON body: {err}"))
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::from_body_failure(rejection.status(), "multipart", rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::from_body_failure(err.status(), "multipart", err.body_text())
    }
}

/// Pick the message of the first reported field error.
fn first_validation_message(err: &ValidationErrors) -> String {
    err.field_errors()
        .values()
        .flat_map(|errors| errors.iter())
        .find_map(|error| error.message.as_ref().map(|message| message.to_string()))
        .unwrap_or_else(|| format!("validation failed: {err}"))
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        if let AppError::Internal(detail) = &self {
            error!(error = %detail, "request failed with an internal error");
        }

        let status = self.status();
        let payload = Json(ErrorEnvelope::new(self.public_message()));

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use validator::ValidationError;

    use super::*;

    #[test]
    fn storage_conflict_maps_to_conflict() {
        let err: ServiceError = StorageError::conflict("mods").into();
        assert!(matches!(err, ServiceError::Conflict(ref message) if message.contains("mods")));
    }

    #[test]
    fn internal_errors_hide_their_cause() {
        let err = AppError::Internal("couchdb exploded at 10.0.0.3".into());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn validation_errors_expose_field_message() {
        let mut errors = ValidationErrors::new();
        let mut name = ValidationError::new("required");
        name.message = Some("mod name must not be empty".into());
        errors.add("name", name);

        let err: AppError = ServiceError::from(errors).into();
        assert_eq!(err.public_message(), "mod name must not be empty");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn oversized_bodies_keep_their_status() {
        let err = AppError::from_body_failure(
            StatusCode::PAYLOAD_TOO_LARGE,
            "multipart",
            "length limit exceeded".into(),
        );
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let err = AppError::from_body_failure(StatusCode::BAD_REQUEST, "multipart", "eof".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn degraded_maps_to_service_unavailable() {
        let err: AppError = ServiceError::Degraded.into();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
