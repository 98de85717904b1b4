use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::QueryRejection},
    routing::{get, post},
};

use crate::{
    dto::{
        envelope::ApiResponse,
        mods::{DownloadResponse, ModsQuery, ModsResponse},
        stats::StatsResponse,
    },
    error::AppError,
    services::{mod_service, stats_service},
    state::SharedState,
};

/// Public read endpoints and the download counter.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/stats", get(get_stats))
        .route("/api/mods", get(list_mods))
        .route("/api/mods/{id}/download", post(record_download))
}

#[utoipa::path(
    get,
    path = "/api/stats",
    tag = "public",
    responses(
        (status = 200, description = "Envelope whose `data` holds site-wide counters", body = StatsResponse),
        (status = 503, description = "Storage unavailable", body = crate::dto::envelope::ErrorEnvelope)
    )
)]
/// Return the number of mods and the download counters.
pub async fn get_stats(
    State(state): State<SharedState>,
) -> Result<Json<ApiResponse<StatsResponse>>, AppError> {
    let stats = stats_service::get_stats(&state).await?;
    Ok(Json(ApiResponse::ok(stats)))
}

#[utoipa::path(
    get,
    path = "/api/mods",
    tag = "public",
    params(ModsQuery),
    responses((status = 200, description = "Envelope whose `data` holds the catalogue", body = ModsResponse))
)]
/// List the catalogue, optionally restricted to featured mods.
pub async fn list_mods(
    State(state): State<SharedState>,
    query: Result<Query<ModsQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<ModsResponse>>, AppError> {
    // Unparseable query strings behave like no filter.
    let featured_only = query.map(|Query(query)| query.featured_only()).unwrap_or(false);
    let mods = mod_service::list_mods(&state, featured_only).await?;
    Ok(Json(ApiResponse::ok(mods)))
}

#[utoipa::path(
    post,
    path = "/api/mods/{id}/download",
    tag = "public",
    params(("id" = String, Path, description = "Mod identifier")),
    responses((
        status = 200,
        description = "Envelope whose `data` holds the download link, `#` for unknown ids",
        body = DownloadResponse
    ))
)]
/// Count a download and return the link to follow.
pub async fn record_download(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DownloadResponse>>, AppError> {
    let download = mod_service::record_download(&state, &id).await?;
    Ok(Json(ApiResponse::ok(download)))
}
