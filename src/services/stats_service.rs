//! Download counters with lazy daily reset.

use crate::{
    dao::{
        accessor::Mutation,
        models::{MODS_KEY, ModEntity, STATS_KEY, StatsEntity},
        stores::Stores,
    },
    dto::{stats::StatsResponse, today},
    error::ServiceError,
    state::SharedState,
};

/// Return site-wide counters, resetting the daily counter when the day changed.
pub async fn get_stats(state: &SharedState) -> Result<StatsResponse, ServiceError> {
    let stores = state.require_stores().await?;
    let mods: Vec<ModEntity> = stores.mods.load_or_default(MODS_KEY).await?;

    let today = today();
    let stats = stores
        .mods
        .update(
            STATS_KEY,
            |stats: &mut StatsEntity| -> Result<_, ServiceError> {
                if stats.roll_over(&today) {
                    Ok(Mutation::Write(stats.clone()))
                } else {
                    Ok(Mutation::Skip(stats.clone()))
                }
            },
        )
        .await?;

    Ok(StatsResponse {
        total_mods: mods.len(),
        total_downloads: stats.total_downloads,
        today_downloads: stats.today_downloads,
    })
}

/// Count one download in both counters, rolling the day over first if needed.
pub(crate) async fn count_download(stores: &Stores) -> Result<StatsEntity, ServiceError> {
    let today = today();
    stores
        .mods
        .update(
            STATS_KEY,
            |stats: &mut StatsEntity| -> Result<_, ServiceError> {
                stats.roll_over(&today);
                stats.total_downloads += 1;
                stats.today_downloads += 1;
                Ok(Mutation::Write(stats.clone()))
            },
        )
        .await
}
