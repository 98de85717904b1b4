//! Image metadata management. Binaries are not stored: uploads only create a
//! record with a placeholder URL.

use tracing::info;

use crate::{
    dao::{
        accessor::Mutation,
        models::{ActivityAction, IMAGES_KEY, ImageEntity},
    },
    dto::{
        images::{ImageSummary, ImagesResponse},
        timestamp_now,
    },
    error::ServiceError,
    services::{activity_service, new_id},
    state::SharedState,
};

/// File part extracted from an upload form.
#[derive(Debug, Default, Clone)]
pub struct ImageUpload {
    /// Client-supplied file name, if any.
    pub file_name: Option<String>,
}

/// Register an uploaded image. `upload` is `None` when the form had no `image` part.
pub async fn upload_image(
    state: &SharedState,
    upload: Option<ImageUpload>,
) -> Result<ImageSummary, ServiceError> {
    let upload = upload.ok_or_else(|| ServiceError::InvalidInput("no file uploaded".into()))?;
    let stores = state.require_stores().await?;

    let id = new_id();
    let name = upload
        .file_name
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| format!("image-{id}"));
    let entity = ImageEntity {
        url: state.config().image_url(&id),
        id,
        name,
        size: 0,
        uploaded_at: timestamp_now(),
    };

    stores
        .images
        .update(
            IMAGES_KEY,
            |images: &mut Vec<ImageEntity>| -> Result<_, ServiceError> {
                images.push(entity.clone());
                Ok(Mutation::Write(()))
            },
        )
        .await?;
    info!(image_id = %entity.id, name = %entity.name, "image registered");

    activity_service::record(
        &stores,
        state.config().activity_retention,
        ActivityAction::Upload,
        format!("uploaded image: {}", entity.name),
    )
    .await;

    Ok(entity.into())
}

/// Return every registered image in upload order.
pub async fn list_images(state: &SharedState) -> Result<ImagesResponse, ServiceError> {
    let stores = state.require_stores().await?;
    let images: Vec<ImageEntity> = stores.images.load_or_default(IMAGES_KEY).await?;

    Ok(ImagesResponse {
        images: images.into_iter().map(ImageSummary::from).collect(),
    })
}

/// Remove an image record.
pub async fn delete_image(state: &SharedState, id: &str) -> Result<(), ServiceError> {
    let stores = state.require_stores().await?;

    let removed = stores
        .images
        .update(
            IMAGES_KEY,
            |images: &mut Vec<ImageEntity>| -> Result<_, ServiceError> {
                let index = images
                    .iter()
                    .position(|image| image.id == id)
                    .ok_or_else(|| ServiceError::NotFound("image not found".into()))?;
                Ok(Mutation::Write(images.remove(index)))
            },
        )
        .await?;
    info!(image_id = %id, "image deleted");

    activity_service::record(
        &stores,
        state.config().activity_retention,
        ActivityAction::Delete,
        format!("deleted image: {}", removed.name),
    )
    .await;

    Ok(())
}
