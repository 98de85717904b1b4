//! Typed JSON access on top of a [`KvStore`] namespace.
//!
//! Every mutation goes through [`KvAccessor::update`], which reads the current
//! value with its revision, applies the mutation in memory and writes the
//! result back only if nobody else wrote the key in between.

use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, error};

use crate::dao::{
    kv_store::{KvStore, Revision},
    storage::{StorageError, StorageResult},
};

/// Number of read-modify-write cycles attempted before a conflict is surfaced.
pub const MAX_WRITE_ATTEMPTS: u32 = 5;

/// Decoded value together with the revision it was read at.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub value: T,
    pub revision: Revision,
}

/// Outcome of a mutation applied inside [`KvAccessor::update`].
#[derive(Debug)]
pub enum Mutation<R> {
    /// The value changed and must be written back.
    Write(R),
    /// Nothing changed; the write is skipped.
    Skip(R),
}

/// Handle on one key-value namespace that (de)serializes JSON records.
#[derive(Clone)]
pub struct KvAccessor {
    store: Arc<dyn KvStore>,
}

impl KvAccessor {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Underlying store handle, used for health checks.
    pub fn store(&self) -> &Arc<dyn KvStore> {
        &self.store
    }

    /// Read and decode the value stored under `key`.
    pub async fn load<T>(&self, key: &str) -> StorageResult<Option<Versioned<T>>>
    where
        T: DeserializeOwned,
    {
        let Some(stored) = self.store.get(key).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<T>(&stored.raw) {
            Ok(value) => Ok(Some(Versioned {
                value,
                revision: stored.revision,
            })),
            Err(source) => {
                error!(key, error = %source, "stored value is not valid JSON for its record type");
                Err(StorageError::Corrupted {
                    key: key.to_owned(),
                    source,
                })
            }
        }
    }

    /// Read the value under `key`, falling back to `T::default()` when absent.
    pub async fn load_or_default<T>(&self, key: &str) -> StorageResult<T>
    where
        T: DeserializeOwned + Default,
    {
        Ok(self
            .load::<T>(key)
            .await?
            .map(|versioned| versioned.value)
            .unwrap_or_default())
    }

    /// Encode `value` and store it, conditional on `expected` being current.
    pub async fn save<T>(
        &self,
        key: &str,
        value: &T,
        expected: Option<Revision>,
    ) -> StorageResult<()>
    where
        T: Serialize + ?Sized,
    {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.to_owned(),
            source,
        })?;
        self.store.put(key, raw, expected).await
    }

    /// Run a conditional read-modify-write cycle on `key`.
    ///
    /// `apply` receives the current value (or `T::default()` when the key is
    /// absent). Returning an error aborts without writing. When the write loses
    /// a race the cycle is replayed against the fresh value, up to
    /// [`MAX_WRITE_ATTEMPTS`] times.
    pub async fn update<T, R, E, F>(&self, key: &str, mut apply: F) -> Result<R, E>
    where
        T: Serialize + DeserializeOwned + Default,
        E: From<StorageError>,
        F: FnMut(&mut T) -> Result<Mutation<R>, E>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let (mut value, revision) = match self.load::<T>(key).await? {
                Some(Versioned { value, revision }) => (value, Some(revision)),
                None => (T::default(), None),
            };

            let result = match apply(&mut value)? {
                Mutation::Skip(result) => return Ok(result),
                Mutation::Write(result) => result,
            };

            match self.save(key, &value, revision).await {
                Ok(()) => return Ok(result),
                Err(StorageError::Conflict { .. }) if attempt < MAX_WRITE_ATTEMPTS => {
                    debug!(key, attempt, "conditional write lost a race; retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use futures::future::BoxFuture;

    use super::*;
    use crate::dao::kv_store::{StoredValue, memory::MemoryKvStore};

    fn accessor() -> (MemoryKvStore, KvAccessor) {
        let store = MemoryKvStore::new();
        (store.clone(), KvAccessor::new(Arc::new(store)))
    }

    #[tokio::test]
    async fn corrupted_value_is_reported_not_masked() {
        let (store, accessor) = accessor();
        store.put("mods", "not json".into(), None).await.unwrap();

        let err = accessor.load::<Vec<u32>>("mods").await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupted { ref key, .. } if key == "mods"));
    }

    #[tokio::test]
    async fn update_starts_from_default_when_absent() {
        let (_, accessor) = accessor();

        let len: usize = accessor
            .update::<Vec<u32>, _, StorageError, _>("numbers", |numbers| {
                numbers.push(7);
                Ok(Mutation::Write(numbers.len()))
            })
            .await
            .unwrap();

        assert_eq!(len, 1);
        assert_eq!(
            accessor.load_or_default::<Vec<u32>>("numbers").await.unwrap(),
            vec![7]
        );
    }

    #[tokio::test]
    async fn skipped_mutation_does_not_write() {
        let (store, accessor) = accessor();

        accessor
            .update::<Vec<u32>, _, StorageError, _>("numbers", |_| Ok(Mutation::Skip(())))
            .await
            .unwrap();

        assert!(store.get("numbers").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn aborted_mutation_propagates_error() {
        let (store, accessor) = accessor();

        let err = accessor
            .update::<Vec<u32>, (), _, _>("numbers", |_| Err(StorageError::conflict("numbers")))
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Conflict { .. }));
        assert!(store.get("numbers").await.unwrap().is_none());
    }

    /// Store that lets a competing writer slip in before the first few writes.
    struct RacyStore {
        inner: MemoryKvStore,
        interleaved_writes: AtomicU32,
    }

    impl KvStore for RacyStore {
        fn get(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<StoredValue>>> {
            self.inner.get(key)
        }

        fn put(
            &self,
            key: &str,
            raw: String,
            expected: Option<Revision>,
        ) -> BoxFuture<'static, StorageResult<()>> {
            if self.interleaved_writes.load(Ordering::SeqCst) > 0 {
                self.interleaved_writes.fetch_sub(1, Ordering::SeqCst);
                // A competing writer appends 100 right before our write lands.
                let current = futures::executor::block_on(self.inner.get(key)).unwrap();
                let mut numbers: Vec<u32> = current
                    .as_ref()
                    .map(|stored| serde_json::from_str(&stored.raw).unwrap())
                    .unwrap_or_default();
                numbers.push(100);
                let competing = serde_json::to_string(&numbers).unwrap();
                futures::executor::block_on(self.inner.put(
                    key,
                    competing,
                    current.map(|stored| stored.revision),
                ))
                .unwrap();
            }
            self.inner.put(key, raw, expected)
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.health_check()
        }

        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.try_reconnect()
        }
    }

    #[tokio::test]
    async fn lost_race_is_replayed_on_fresh_value() {
        let racy = RacyStore {
            inner: MemoryKvStore::new(),
            interleaved_writes: AtomicU32::new(1),
        };
        let accessor = KvAccessor::new(Arc::new(racy));

        let mut calls = 0;
        accessor
            .update::<Vec<u32>, _, StorageError, _>("numbers", |numbers| {
                calls += 1;
                numbers.push(1);
                Ok(Mutation::Write(()))
            })
            .await
            .unwrap();

        assert_eq!(calls, 2);
        assert_eq!(
            accessor.load_or_default::<Vec<u32>>("numbers").await.unwrap(),
            vec![100, 1]
        );
    }

    #[tokio::test]
    async fn persistent_conflict_surfaces_after_max_attempts() {
        let racy = RacyStore {
            inner: MemoryKvStore::new(),
            interleaved_writes: AtomicU32::new(u32::MAX),
        };
        let accessor = KvAccessor::new(Arc::new(racy));

        let mut calls = 0;
        let err = accessor
            .update::<Vec<u32>, _, StorageError, _>("numbers", |numbers| {
                calls += 1;
                numbers.push(1);
                Ok(Mutation::Write(()))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Conflict { .. }));
        assert_eq!(calls, MAX_WRITE_ATTEMPTS);
    }
}
