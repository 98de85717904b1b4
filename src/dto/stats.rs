use serde::Serialize;
use utoipa::ToSchema;

/// `data` payload of the stats routes.
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_mods: usize,
    pub total_downloads: u64,
    pub today_downloads: u64,
}
