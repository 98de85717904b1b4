//! Uniform response wrappers shared by every API route.

use serde::Serialize;
use utoipa::ToSchema;

/// Message used when an operation does not provide a more specific one.
pub const DEFAULT_SUCCESS_MESSAGE: &str = "operation succeeded";

/// Successful response: `{success: true, message, data?}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Wrap `data` with the default success message.
    pub fn ok(data: T) -> Self {
        Self::with_message(data, DEFAULT_SUCCESS_MESSAGE)
    }

    /// Wrap `data` with a custom success message.
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Success without a data payload.
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

/// Failed response: `{success: false, error}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}
