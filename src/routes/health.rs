use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::health::{BannerResponse, HealthResponse},
    services::health_service,
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/healthcheck",
    tag = "health",
    responses((status = 200, description = "Storage status", body = HealthResponse))
)]
/// Return the current health status of the backend and check the storage connection.
pub async fn healthcheck(State(state): State<SharedState>) -> Json<HealthResponse> {
    let status = health_service::health_status(&state).await;
    Json(status)
}

#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses((status = 200, description = "Service name and version", body = BannerResponse))
)]
pub async fn banner() -> Json<BannerResponse> {
    Json(BannerResponse::default())
}

/// Configure the health routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/", get(banner))
        .route("/healthcheck", get(healthcheck))
}
