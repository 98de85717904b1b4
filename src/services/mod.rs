use uuid::Uuid;

/// Activity log recording and listing.
pub mod activity_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Image metadata operations.
pub mod image_service;
/// Mod catalogue operations.
pub mod mod_service;
/// Download statistics.
pub mod stats_service;
/// Storage connection supervisor with reconnect backoff.
pub mod storage_supervisor;

/// Fresh opaque identifier for a stored record.
pub(crate) fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}
