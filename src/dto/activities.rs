use serde::Serialize;
use utoipa::ToSchema;

use crate::dao::models::{ActivityAction, ActivityEntity};

/// Activity log entry as exposed by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ActivitySummary {
    pub id: String,
    /// One of `create`, `update`, `delete`, `download`, `upload`.
    #[schema(value_type = String)]
    pub action: ActivityAction,
    pub details: String,
    pub timestamp: String,
}

impl From<ActivityEntity> for ActivitySummary {
    fn from(entity: ActivityEntity) -> Self {
        Self {
            id: entity.id,
            action: entity.action,
            details: entity.details,
            timestamp: entity.timestamp,
        }
    }
}

/// `data` payload of the activity listing, newest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActivitiesResponse {
    pub activities: Vec<ActivitySummary>,
}
