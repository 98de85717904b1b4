use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    config::{AppConfig, StorageBackend},
    dao::stores::Stores,
    error::ServiceError,
};

pub type SharedState = Arc<AppState>;

/// Central application state holding configuration and storage handles.
///
/// Domain data lives entirely in the key-value stores; the process only
/// keeps the handles needed to reach them.
pub struct AppState {
    config: AppConfig,
    backend: StorageBackend,
    stores: RwLock<Option<Stores>>,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until stores are installed.
    pub fn new(config: AppConfig, backend: StorageBackend) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            backend,
            stores: RwLock::new(None),
            degraded: degraded_tx,
        })
    }

    /// State with in-memory stores already installed.
    pub async fn in_memory(config: AppConfig) -> SharedState {
        let state = Self::new(config, StorageBackend::Memory);
        state.install_stores(Stores::in_memory()).await;
        state
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn backend(&self) -> StorageBackend {
        self.backend
    }

    /// Obtain the installed stores, if any.
    async fn stores(&self) -> Option<Stores> {
        let guard = self.stores.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the installed stores or fail with [`ServiceError::Degraded`].
    pub async fn require_stores(&self) -> Result<Stores, ServiceError> {
        if *self.degraded.borrow() {
            return Err(ServiceError::Degraded);
        }
        self.stores().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new set of stores and leave degraded mode.
    pub async fn install_stores(&self, stores: Stores) {
        {
            let mut guard = self.stores.write().await;
            *guard = Some(stores);
        }
        self.update_degraded(false);
    }

    /// Remove the current stores and enter degraded mode.
    pub async fn clear_stores(&self) {
        {
            let mut guard = self.stores.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }
}
