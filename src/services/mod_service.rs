//! Read-modify-write operations on the mod catalogue.

use tracing::{info, warn};
use validator::Validate;

use crate::{
    dao::{
        accessor::Mutation,
        models::{ActivityAction, MODS_KEY, ModEntity},
    },
    dto::{
        mods::{DownloadResponse, ModInput, ModSummary, ModsResponse},
        timestamp_now,
    },
    error::ServiceError,
    services::{activity_service, new_id, stats_service},
    state::SharedState,
};

/// Download link returned when the requested mod does not exist.
pub const UNKNOWN_MOD_DOWNLOAD_URL: &str = "#";

fn mod_not_found() -> ServiceError {
    ServiceError::NotFound("mod not found".into())
}

/// Return the catalogue in insertion order, optionally only featured mods.
pub async fn list_mods(
    state: &SharedState,
    featured_only: bool,
) -> Result<ModsResponse, ServiceError> {
    let stores = state.require_stores().await?;
    let mods: Vec<ModEntity> = stores.mods.load_or_default(MODS_KEY).await?;

    Ok(ModsResponse {
        mods: mods
            .into_iter()
            .filter(|entry| !featured_only || entry.featured)
            .map(ModSummary::from)
            .collect(),
    })
}

/// Validate and append a new mod to the catalogue.
pub async fn create_mod(state: &SharedState, input: ModInput) -> Result<ModSummary, ServiceError> {
    input.validate()?;
    let stores = state.require_stores().await?;

    let now = timestamp_now();
    let entity = ModEntity {
        id: new_id(),
        name: input.name,
        description: input.description,
        version: input.version,
        download_url: input.download_url,
        image: input.image.unwrap_or_default(),
        featured: input.featured.unwrap_or(false),
        downloads: 0,
        created_at: now.clone(),
        updated_at: now,
    };

    stores
        .mods
        .update(
            MODS_KEY,
            |mods: &mut Vec<ModEntity>| -> Result<_, ServiceError> {
                mods.push(entity.clone());
                Ok(Mutation::Write(()))
            },
        )
        .await?;
    info!(mod_id = %entity.id, name = %entity.name, "mod created");

    activity_service::record(
        &stores,
        state.config().activity_retention,
        ActivityAction::Create,
        format!("created mod: {}", entity.name),
    )
    .await;

    Ok(entity.into())
}

/// Replace the editable fields of an existing mod.
///
/// Identifier, download counter and creation time are preserved.
pub async fn update_mod(
    state: &SharedState,
    id: &str,
    input: ModInput,
) -> Result<ModSummary, ServiceError> {
    let stores = state.require_stores().await?;
    let now = timestamp_now();

    let updated = stores
        .mods
        .update(
            MODS_KEY,
            |mods: &mut Vec<ModEntity>| -> Result<_, ServiceError> {
                let entry = mods
                    .iter_mut()
                    .find(|entry| entry.id == id)
                    .ok_or_else(mod_not_found)?;
                input.validate()?;

                entry.name = input.name.clone();
                entry.description = input.description.clone();
                entry.version = input.version.clone();
                entry.download_url = input.download_url.clone();
                entry.image = input.image.clone().unwrap_or_default();
                entry.featured = input.featured.unwrap_or(false);
                entry.updated_at = now.clone();
                Ok(Mutation::Write(entry.clone()))
            },
        )
        .await?;
    info!(mod_id = %id, "mod updated");

    activity_service::record(
        &stores,
        state.config().activity_retention,
        ActivityAction::Update,
        format!("updated mod: {}", updated.name),
    )
    .await;

    Ok(updated.into())
}

/// Remove a mod from the catalogue.
pub async fn delete_mod(state: &SharedState, id: &str) -> Result<(), ServiceError> {
    let stores = state.require_stores().await?;

    let removed = stores
        .mods
        .update(
            MODS_KEY,
            |mods: &mut Vec<ModEntity>| -> Result<_, ServiceError> {
                let index = mods
                    .iter()
                    .position(|entry| entry.id == id)
                    .ok_or_else(mod_not_found)?;
                Ok(Mutation::Write(mods.remove(index)))
            },
        )
        .await?;
    info!(mod_id = %id, "mod deleted");

    activity_service::record(
        &stores,
        state.config().activity_retention,
        ActivityAction::Delete,
        format!("deleted mod: {}", removed.name),
    )
    .await;

    Ok(())
}

/// Count a download of `id` and return where to fetch it.
///
/// An unknown id still counts towards the site-wide statistics and answers
/// with [`UNKNOWN_MOD_DOWNLOAD_URL`] instead of failing.
pub async fn record_download(
    state: &SharedState,
    id: &str,
) -> Result<DownloadResponse, ServiceError> {
    let stores = state.require_stores().await?;

    let download_url = stores
        .mods
        .update(
            MODS_KEY,
            |mods: &mut Vec<ModEntity>| -> Result<_, ServiceError> {
                match mods.iter_mut().find(|entry| entry.id == id) {
                    Some(entry) => {
                        entry.downloads += 1;
                        Ok(Mutation::Write(Some(entry.download_url.clone())))
                    }
                    None => Ok(Mutation::Skip(None)),
                }
            },
        )
        .await?;

    if download_url.is_none() {
        warn!(mod_id = %id, "download recorded for unknown mod");
    }

    stats_service::count_download(&stores).await?;

    activity_service::record(
        &stores,
        state.config().activity_retention,
        ActivityAction::Download,
        format!("downloaded mod: {id}"),
    )
    .await;

    Ok(DownloadResponse {
        download_url: download_url.unwrap_or_else(|| UNKNOWN_MOD_DOWNLOAD_URL.into()),
    })
}
