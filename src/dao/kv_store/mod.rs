#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod memory;

use std::fmt;

use futures::future::BoxFuture;

use crate::dao::storage::StorageResult;

/// Opaque token identifying the stored version of a key.
///
/// Writers hand back the revision they read so the backend can reject the
/// write when another writer got there first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision(String);

impl Revision {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw string value stored under a key, together with its revision.
#[derive(Debug, Clone)]
pub struct StoredValue {
    pub raw: String,
    pub revision: Revision,
}

/// Abstraction over a string key-value namespace.
pub trait KvStore: Send + Sync {
    /// Fetch the raw value stored under `key`, `None` when the key is absent.
    fn get(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<StoredValue>>>;
    /// Store `raw` under `key`.
    ///
    /// `expected` must be the revision previously read, or `None` when the key
    /// was absent. A mismatch fails with [`StorageError::Conflict`].
    ///
    /// [`StorageError::Conflict`]: crate::dao::storage::StorageError::Conflict
    fn put(
        &self,
        key: &str,
        raw: String,
        expected: Option<Revision>,
    ) -> BoxFuture<'static, StorageResult<()>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
