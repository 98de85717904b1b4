//! DTO definitions for the mod catalogue routes.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationErrors};

use crate::{dao::models::ModEntity, dto::validation::validate_required};

/// Editable fields of a mod, accepted by the create and update routes.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub download_url: String,
    /// Optional cover image URL.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
}

impl Validate for ModInput {
    /// Reports only the first violation, checked in field order.
    fn validate(&self) -> Result<(), ValidationErrors> {
        let checks = [
            ("name", &self.name, "mod name must not be empty"),
            ("description", &self.description, "mod description must not be empty"),
            ("version", &self.version, "mod version must not be empty"),
            ("downloadUrl", &self.download_url, "download URL must not be empty"),
        ];

        for (field, value, message) in checks {
            if let Err(e) = validate_required(value, message) {
                let mut errors = ValidationErrors::new();
                errors.add(field, e);
                return Err(errors);
            }
        }

        Ok(())
    }
}

/// Query string accepted by the public listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ModsQuery {
    /// Only the literal `true` enables the featured filter.
    pub featured: Option<String>,
}

impl ModsQuery {
    pub fn featured_only(&self) -> bool {
        self.featured.as_deref() == Some("true")
    }
}

/// Mod as exposed by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    pub download_url: String,
    pub image: String,
    pub featured: bool,
    pub downloads: u64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ModEntity> for ModSummary {
    fn from(entity: ModEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            version: entity.version,
            download_url: entity.download_url,
            image: entity.image,
            featured: entity.featured,
            downloads: entity.downloads,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// `data` payload of the listing routes.
#[derive(Debug, Serialize, ToSchema)]
pub struct ModsResponse {
    pub mods: Vec<ModSummary>,
}

/// `data` payload of the create and update routes.
#[derive(Debug, Serialize, ToSchema)]
pub struct ModResponse {
    #[serde(rename = "mod")]
    pub item: ModSummary,
}

/// `data` payload of the download route.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    /// Download link of the mod, `#` when the id is unknown.
    pub download_url: String,
}
