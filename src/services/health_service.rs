use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report whether the storage backend is usable, logging connectivity issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let backend = state.backend().name();

    match state.require_stores().await {
        Ok(stores) => {
            if let Err(err) = stores.health_check().await {
                warn!(error = %err, "storage health check failed");
                return HealthResponse::degraded(backend);
            }
        }
        Err(_) => warn!("storage unavailable (degraded mode)"),
    }

    if state.is_degraded() {
        HealthResponse::degraded(backend)
    } else {
        HealthResponse::ok(backend)
    }
}
