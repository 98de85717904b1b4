use axum::{
    Json, Router,
    body::Bytes,
    extract::{
        DefaultBodyLimit, Multipart, Path, State,
        multipart::MultipartRejection,
        rejection::BytesRejection,
    },
    routing::{delete, get, post, put},
};

use crate::{
    dto::{
        activities::ActivitiesResponse,
        envelope::ApiResponse,
        images::{ImageResponse, ImagesResponse, UploadForm},
        mods::{ModInput, ModResponse, ModsResponse},
        stats::StatsResponse,
    },
    error::AppError,
    services::{
        activity_service,
        image_service::{self, ImageUpload},
        mod_service, stats_service,
    },
    state::SharedState,
};

/// Multipart part carrying the uploaded file.
const IMAGE_FIELD: &str = "image";

/// Admin management endpoints. Access is checked by [`super::require_admin_auth`].
///
/// `max_upload_bytes` replaces the default body limit on the upload route only.
pub fn router(max_upload_bytes: usize) -> Router<SharedState> {
    Router::new()
        .route("/api/admin/stats", get(get_stats))
        .route("/api/admin/mods", get(list_mods).post(create_mod))
        .route("/api/admin/mods/{id}", put(update_mod).delete(delete_mod))
        .route(
            "/api/admin/upload",
            post(upload_image).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/api/admin/images", get(list_images))
        .route("/api/admin/images/{id}", delete(delete_image))
        .route("/api/admin/activities", get(list_activities))
}

#[utoipa::path(
    get,
    path = "/api/admin/stats",
    tag = "admin",
    params(("X-Admin-Auth" = String, Header, description = "Admin credential")),
    responses(
        (status = 200, description = "Envelope whose `data` holds site-wide counters", body = StatsResponse),
        (status = 401, description = "Missing or wrong admin credential", body = crate::dto::envelope::ErrorEnvelope)
    )
)]
pub async fn get_stats(
    State(state): State<SharedState>,
) -> Result<Json<ApiResponse<StatsResponse>>, AppError> {
    let stats = stats_service::get_stats(&state).await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// List every mod, featured or not.
#[utoipa::path(
    get,
    path = "/api/admin/mods",
    tag = "admin",
    params(("X-Admin-Auth" = String, Header, description = "Admin credential")),
    responses((status = 200, description = "Envelope whose `data` holds the catalogue", body = ModsResponse))
)]
pub async fn list_mods(
    State(state): State<SharedState>,
) -> Result<Json<ApiResponse<ModsResponse>>, AppError> {
    let mods = mod_service::list_mods(&state, false).await?;
    Ok(Json(ApiResponse::ok(mods)))
}

/// Decode a mod body as JSON whatever `Content-Type` the client sent.
fn parse_mod_input(body: Bytes) -> Result<ModInput, AppError> {
    Ok(serde_json::from_slice(&body)?)
}

/// Validate and add a mod to the catalogue.
#[utoipa::path(
    post,
    path = "/api/admin/mods",
    tag = "admin",
    params(("X-Admin-Auth" = String, Header, description = "Admin credential")),
    request_body = ModInput,
    responses(
        (status = 200, description = "Envelope whose `data` holds the created mod", body = ModResponse),
        (status = 400, description = "Invalid or blank field", body = crate::dto::envelope::ErrorEnvelope)
    )
)]
pub async fn create_mod(
    State(state): State<SharedState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ApiResponse<ModResponse>>, AppError> {
    let input = parse_mod_input(body?)?;
    let item = mod_service::create_mod(&state, input).await?;
    Ok(Json(ApiResponse::with_message(
        ModResponse { item },
        "mod created",
    )))
}

/// Replace the editable fields of a mod.
#[utoipa::path(
    put,
    path = "/api/admin/mods/{id}",
    tag = "admin",
    params(
        ("X-Admin-Auth" = String, Header, description = "Admin credential"),
        ("id" = String, Path, description = "Mod identifier")
    ),
    request_body = ModInput,
    responses(
        (status = 200, description = "Envelope whose `data` holds the updated mod", body = ModResponse),
        (status = 400, description = "Invalid or blank field", body = crate::dto::envelope::ErrorEnvelope),
        (status = 404, description = "Unknown mod", body = crate::dto::envelope::ErrorEnvelope),
        (status = 409, description = "Concurrent writers kept winning", body = crate::dto::envelope::ErrorEnvelope)
    )
)]
pub async fn update_mod(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ApiResponse<ModResponse>>, AppError> {
    let input = parse_mod_input(body?)?;
    let item = mod_service::update_mod(&state, &id, input).await?;
    Ok(Json(ApiResponse::with_message(
        ModResponse { item },
        "mod updated",
    )))
}

#[utoipa::path(
    delete,
    path = "/api/admin/mods/{id}",
    tag = "admin",
    params(
        ("X-Admin-Auth" = String, Header, description = "Admin credential"),
        ("id" = String, Path, description = "Mod identifier")
    ),
    responses(
        (status = 200, description = "Mod removed"),
        (status = 404, description = "Unknown mod", body = crate::dto::envelope::ErrorEnvelope)
    )
)]
pub async fn delete_mod(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    mod_service::delete_mod(&state, &id).await?;
    Ok(Json(ApiResponse::empty("mod deleted")))
}

/// Register an uploaded image. Only the file name is kept.
#[utoipa::path(
    post,
    path = "/api/admin/upload",
    tag = "admin",
    params(("X-Admin-Auth" = String, Header, description = "Admin credential")),
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Envelope whose `data` holds the image record", body = ImageResponse),
        (status = 400, description = "No `image` part in the form", body = crate::dto::envelope::ErrorEnvelope),
        (status = 413, description = "Form larger than the configured upload limit", body = crate::dto::envelope::ErrorEnvelope)
    )
)]
pub async fn upload_image(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse<ImageResponse>>, AppError> {
    let mut multipart = multipart?;

    let mut upload = None;
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() == Some(IMAGE_FIELD) {
            upload = Some(ImageUpload {
                file_name: field.file_name().map(str::to_owned),
            });
            // The content is discarded but still counts against the body limit.
            while field.chunk().await?.is_some() {}
            break;
        }
    }

    let image = image_service::upload_image(&state, upload).await?;
    Ok(Json(ApiResponse::with_message(
        ImageResponse { image },
        "image uploaded",
    )))
}

#[utoipa::path(
    get,
    path = "/api/admin/images",
    tag = "admin",
    params(("X-Admin-Auth" = String, Header, description = "Admin credential")),
    responses((status = 200, description = "Envelope whose `data` holds image records", body = ImagesResponse))
)]
pub async fn list_images(
    State(state): State<SharedState>,
) -> Result<Json<ApiResponse<ImagesResponse>>, AppError> {
    let images = image_service::list_images(&state).await?;
    Ok(Json(ApiResponse::ok(images)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/images/{id}",
    tag = "admin",
    params(
        ("X-Admin-Auth" = String, Header, description = "Admin credential"),
        ("id" = String, Path, description = "Image identifier")
    ),
    responses(
        (status = 200, description = "Image removed"),
        (status = 404, description = "Unknown image", body = crate::dto::envelope::ErrorEnvelope)
    )
)]
pub async fn delete_image(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    image_service::delete_image(&state, &id).await?;
    Ok(Json(ApiResponse::empty("image deleted")))
}

/// Most recent activities, newest first.
#[utoipa::path(
    get,
    path = "/api/admin/activities",
    tag = "admin",
    params(("X-Admin-Auth" = String, Header, description = "Admin credential")),
    responses((status = 200, description = "Envelope whose `data` holds recent activities", body = ActivitiesResponse))
)]
pub async fn list_activities(
    State(state): State<SharedState>,
) -> Result<Json<ApiResponse<ActivitiesResponse>>, AppError> {
    let activities = activity_service::list_recent(&state).await?;
    Ok(Json(ApiResponse::ok(activities)))
}
