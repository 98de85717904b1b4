use std::sync::Arc;

use futures::future::try_join;

use crate::dao::{
    accessor::KvAccessor,
    kv_store::{KvStore, memory::MemoryKvStore},
    storage::StorageResult,
};

/// The two key-value namespaces used by the service.
#[derive(Clone)]
pub struct Stores {
    /// Holds `mods`, `stats` and `activities`.
    pub mods: KvAccessor,
    /// Holds `images`.
    pub images: KvAccessor,
}

impl Stores {
    pub fn new(mods: Arc<dyn KvStore>, images: Arc<dyn KvStore>) -> Self {
        Self {
            mods: KvAccessor::new(mods),
            images: KvAccessor::new(images),
        }
    }

    /// Fresh, empty in-memory namespaces.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryKvStore::new()),
            Arc::new(MemoryKvStore::new()),
        )
    }

    pub async fn health_check(&self) -> StorageResult<()> {
        try_join(
            self.mods.store().health_check(),
            self.images.store().health_check(),
        )
        .await
        .map(|_| ())
    }

    pub async fn try_reconnect(&self) -> StorageResult<()> {
        try_join(
            self.mods.store().try_reconnect(),
            self.images.store().try_reconnect(),
        )
        .await
        .map(|_| ())
    }
}
