use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Mod Hub Back.
#[openapi(
    paths(
        crate::routes::health::banner,
        crate::routes::health::healthcheck,
        crate::routes::public::get_stats,
        crate::routes::public::list_mods,
        crate::routes::public::record_download,
        crate::routes::admin::get_stats,
        crate::routes::admin::list_mods,
        crate::routes::admin::create_mod,
        crate::routes::admin::update_mod,
        crate::routes::admin::delete_mod,
        crate::routes::admin::upload_image,
        crate::routes::admin::list_images,
        crate::routes::admin::delete_image,
        crate::routes::admin::list_activities,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::BannerResponse,
            crate::dto::envelope::ErrorEnvelope,
            crate::dto::stats::StatsResponse,
            crate::dto::mods::ModInput,
            crate::dto::mods::ModSummary,
            crate::dto::mods::ModsResponse,
            crate::dto::mods::ModResponse,
            crate::dto::mods::DownloadResponse,
            crate::dto::images::ImageSummary,
            crate::dto::images::ImagesResponse,
            crate::dto::images::ImageResponse,
            crate::dto::images::UploadForm,
            crate::dto::activities::ActivitySummary,
            crate::dto::activities::ActivitiesResponse,
        )
    ),
    tags(
        (name = "health", description = "Service banner and health check"),
        (name = "public", description = "Catalogue, statistics and download counter"),
        (name = "admin", description = "Catalogue, image and activity management (requires `X-Admin-Auth`)"),
    )
)]
pub struct ApiDoc;
