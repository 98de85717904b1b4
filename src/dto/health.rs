use serde::Serialize;
use utoipa::ToSchema;

/// Health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Storage backend the service was started with (`memory` or `couch`).
    pub backend: String,
}

impl HealthResponse {
    /// The storage backend is connected and answering.
    pub fn ok(backend: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            backend: backend.into(),
        }
    }

    /// No storage backend is currently usable.
    pub fn degraded(backend: impl Into<String>) -> Self {
        Self {
            status: "degraded".to_string(),
            backend: backend.into(),
        }
    }
}

/// Service banner answered on `/`.
#[derive(Debug, Serialize, ToSchema)]
pub struct BannerResponse {
    pub message: String,
    pub version: String,
}

impl Default for BannerResponse {
    fn default() -> Self {
        Self {
            message: "Mod Hub API service".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}
