//! Mod Hub Back binary entrypoint wiring configuration, storage supervision and the REST router.

use std::{env, net::SocketAddr};

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mod_hub_back::{
    config::{AppConfig, StorageBackend},
    dao::{storage::StorageError, stores::Stores},
    routes,
    services::storage_supervisor,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let backend = StorageBackend::from_env();
    info!(backend = backend.name(), "selected storage backend");

    let app_state = AppState::new(config, backend);

    tokio::spawn(storage_supervisor::run(app_state.clone(), move || {
        connect_stores(backend)
    }));
    // Build the HTTP router once the shared state is ready.
    let app = routes::app(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Open both key-value namespaces on the selected backend.
async fn connect_stores(backend: StorageBackend) -> Result<Stores, StorageError> {
    match backend {
        StorageBackend::Memory => Ok(Stores::in_memory()),
        #[cfg(feature = "couch-store")]
        StorageBackend::Couch => {
            use std::sync::Arc;

            use mod_hub_back::dao::kv_store::couchdb::{CouchConfig, CouchKvStore};

            let mods = CouchKvStore::connect(CouchConfig::from_env("COUCH_MODS_DB")?).await?;
            let images = CouchKvStore::connect(CouchConfig::from_env("COUCH_IMAGES_DB")?).await?;
            Ok(Stores::new(Arc::new(mods), Arc::new(images)))
        }
    }
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
