use serde::Serialize;
use utoipa::ToSchema;

use crate::dao::models::ImageEntity;

/// Image metadata as exposed by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageSummary {
    pub id: String,
    pub name: String,
    /// Placeholder URL; the binary is not stored by this service.
    pub url: String,
    pub size: u64,
    pub uploaded_at: String,
}

impl From<ImageEntity> for ImageSummary {
    fn from(entity: ImageEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            url: entity.url,
            size: entity.size,
            uploaded_at: entity.uploaded_at,
        }
    }
}

/// `data` payload of the image listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct ImagesResponse {
    pub images: Vec<ImageSummary>,
}

/// `data` payload of the upload route.
#[derive(Debug, Serialize, ToSchema)]
pub struct ImageResponse {
    pub image: ImageSummary,
}

/// Documentation-only description of the multipart upload form.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// File part; only its file name is kept.
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}
