//! Capped, best-effort audit trail of mutating operations.

use tracing::{debug, warn};

use crate::{
    dao::{
        accessor::Mutation,
        models::{ACTIVITIES_KEY, ActivityAction, ActivityEntity},
        stores::Stores,
    },
    dto::{
        activities::{ActivitiesResponse, ActivitySummary},
        timestamp_now,
    },
    error::ServiceError,
    services::new_id,
    state::SharedState,
};

/// Prepend an entry to the activity log, keeping at most `retention` entries.
///
/// Failures are logged and swallowed: the caller's operation already succeeded.
pub async fn record(stores: &Stores, retention: usize, action: ActivityAction, details: String) {
    let entry = ActivityEntity {
        id: new_id(),
        action,
        details,
        timestamp: timestamp_now(),
    };

    let result = stores
        .mods
        .update(
            ACTIVITIES_KEY,
            |activities: &mut Vec<ActivityEntity>| -> Result<_, ServiceError> {
                activities.insert(0, entry.clone());
                activities.truncate(retention);
                Ok(Mutation::Write(()))
            },
        )
        .await;

    match result {
        Ok(()) => debug!(?action, "activity recorded"),
        Err(err) => warn!(?action, error = %err, "failed to record activity"),
    }
}

/// Return the most recent activities, newest first.
pub async fn list_recent(state: &SharedState) -> Result<ActivitiesResponse, ServiceError> {
    let stores = state.require_stores().await?;
    let activities: Vec<ActivityEntity> = stores.mods.load_or_default(ACTIVITIES_KEY).await?;

    Ok(ActivitiesResponse {
        activities: activities
            .into_iter()
            .take(state.config().recent_activity_limit)
            .map(ActivitySummary::from)
            .collect(),
    })
}
