use serde::{Deserialize, Serialize};

use crate::dao::kv_store::{Revision, StoredValue};

/// One key of the namespace, stored as a CouchDB document whose `_id` is the key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchValueDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    /// JSON-encoded value, kept as an opaque string.
    pub value: String,
}

impl CouchValueDocument {
    pub fn new(key: &str, value: String, expected: Option<Revision>) -> Self {
        Self {
            id: key.to_owned(),
            rev: expected.map(|revision| revision.as_str().to_owned()),
            value,
        }
    }

    /// Convert a fetched document into a stored value.
    ///
    /// Documents returned by CouchDB always carry `_rev`; an empty revision
    /// makes the next conditional write fail with a conflict instead of
    /// overwriting blindly.
    pub fn into_stored_value(self) -> StoredValue {
        StoredValue {
            raw: self.value,
            revision: Revision::new(self.rev.unwrap_or_default()),
        }
    }
}
