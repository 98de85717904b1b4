use serde::{Deserialize, Serialize};

/// Key of the mod list inside the mods namespace.
pub const MODS_KEY: &str = "mods";
/// Key of the download statistics record inside the mods namespace.
pub const STATS_KEY: &str = "stats";
/// Key of the activity log inside the mods namespace.
pub const ACTIVITIES_KEY: &str = "activities";
/// Key of the image list inside the images namespace.
pub const IMAGES_KEY: &str = "images";

/// Published mod as persisted in the `mods` list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModEntity {
    /// Opaque unique identifier.
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    /// Where the mod archive can be fetched from.
    pub download_url: String,
    /// Cover image URL, empty when none was provided.
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub featured: bool,
    /// Number of recorded downloads for this mod.
    #[serde(default)]
    pub downloads: u64,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// RFC 3339 timestamp of the last edit.
    pub updated_at: String,
}

/// Download counters shared by the whole site.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatsEntity {
    #[serde(default)]
    pub total_downloads: u64,
    #[serde(default)]
    pub today_downloads: u64,
    /// Calendar day (`YYYY-MM-DD`) the daily counter was last reset.
    #[serde(default)]
    pub last_reset: String,
}

impl StatsEntity {
    /// Reset the daily counter when `today` differs from the stored reset day.
    ///
    /// Returns `true` when the record changed and must be persisted.
    pub fn roll_over(&mut self, today: &str) -> bool {
        if self.last_reset == today {
            return false;
        }
        self.today_downloads = 0;
        self.last_reset = today.to_owned();
        true
    }
}

/// Metadata of an uploaded image. The binary itself is not stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImageEntity {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub size: u64,
    pub uploaded_at: String,
}

/// Kind of mutation recorded in the activity log.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Create,
    Update,
    Delete,
    Download,
    Upload,
}

/// One entry of the activity log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityEntity {
    pub id: String,
    pub action: ActivityAction,
    pub details: String,
    /// RFC 3339 timestamp.
    pub timestamp: String,
}
