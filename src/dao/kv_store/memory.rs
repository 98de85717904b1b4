//! Process-local [`KvStore`] used for local runs and tests.

use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};
use futures::future::BoxFuture;

use crate::dao::{
    kv_store::{KvStore, Revision, StoredValue},
    storage::{StorageError, StorageResult},
};

#[derive(Debug, Clone)]
struct MemoryEntry {
    version: u64,
    raw: String,
}

/// In-memory key-value namespace with per-key version counters.
#[derive(Clone, Default)]
pub struct MemoryKvStore {
    entries: Arc<DashMap<String, MemoryEntry>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self, key: &str, raw: String, expected: Option<Revision>) -> StorageResult<()> {
        match self.entries.entry(key.to_owned()) {
            Entry::Occupied(mut occupied) => {
                let current = occupied.get().version;
                match expected {
                    Some(revision) if revision.as_str() == current.to_string() => {
                        occupied.insert(MemoryEntry {
                            version: current + 1,
                            raw,
                        });
                        Ok(())
                    }
                    _ => Err(StorageError::conflict(key)),
                }
            }
            Entry::Vacant(vacant) => match expected {
                None => {
                    vacant.insert(MemoryEntry { version: 1, raw });
                    Ok(())
                }
                Some(_) => Err(StorageError::conflict(key)),
            },
        }
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<StoredValue>>> {
        let found = self.entries.get(key).map(|entry| StoredValue {
            raw: entry.raw.clone(),
            revision: Revision::new(entry.version.to_string()),
        });
        Box::pin(async move { Ok(found) })
    }

    fn put(
        &self,
        key: &str,
        raw: String,
        expected: Option<Revision>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let result = self.write(key, raw, expected);
        Box::pin(async move { result })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
