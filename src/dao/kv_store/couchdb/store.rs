use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, RequestBuilder, StatusCode};

use crate::dao::{
    kv_store::{KvStore, Revision, StoredValue},
    storage::StorageResult,
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::CouchValueDocument,
};

/// [`KvStore`] backed by one CouchDB database, one document per key.
#[derive(Clone)]
pub struct CouchKvStore {
    client: Client,
    database: Arc<str>,
    database_url: Arc<str>,
    credentials: Option<Arc<(String, String)>>,
}

impl CouchKvStore {
    /// Build the client and make sure the database exists.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::Client { source })?;

        let database_url = format!(
            "{}/{}",
            config.base_url.trim_end_matches('/'),
            config.database
        );
        let store = Self {
            client,
            database: config.database.into(),
            database_url: database_url.into(),
            credentials: config.credentials.map(Arc::new),
        };

        store.ensure_database().await?;
        Ok(store)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.credentials.as_deref() {
            Some((username, password)) => builder.basic_auth(username, Some(password)),
            None => builder,
        }
    }

    fn document_url(&self, key: &str) -> String {
        format!("{}/{}", self.database_url, key)
    }

    /// Status of a plain GET on the database endpoint.
    async fn database_status(&self) -> CouchResult<StatusCode> {
        self.authorized(self.client.get(self.database_url.as_ref()))
            .send()
            .await
            .map(|response| response.status())
            .map_err(|source| CouchDaoError::Unreachable {
                database: self.database.to_string(),
                source,
            })
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let status = match self.database_status().await? {
            StatusCode::NOT_FOUND => self
                .authorized(self.client.put(self.database_url.as_ref()))
                .send()
                .await
                .map_err(|source| CouchDaoError::Unreachable {
                    database: self.database.to_string(),
                    source,
                })?
                .status(),
            status => status,
        };

        if status.is_success() {
            Ok(())
        } else {
            Err(CouchDaoError::DatabaseStatus {
                database: self.database.to_string(),
                status,
            })
        }
    }

    async fn get_document(&self, key: &str) -> CouchResult<Option<CouchValueDocument>> {
        let response = self
            .authorized(self.client.get(self.document_url(key)))
            .send()
            .await
            .map_err(|source| CouchDaoError::KeyRequest {
                key: key.to_owned(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json::<CouchValueDocument>()
                .await
                .map(Some)
                .map_err(|source| CouchDaoError::Decode {
                    key: key.to_owned(),
                    source,
                }),
            status => Err(CouchDaoError::KeyStatus {
                key: key.to_owned(),
                status,
            }),
        }
    }

    async fn put_document(&self, document: &CouchValueDocument) -> CouchResult<()> {
        let key = document.id.as_str();
        let response = self
            .authorized(self.client.put(self.document_url(key)))
            .json(document)
            .send()
            .await
            .map_err(|source| CouchDaoError::KeyRequest {
                key: key.to_owned(),
                source,
            })?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(CouchDaoError::Conflict {
                key: key.to_owned(),
            }),
            status => Err(CouchDaoError::KeyStatus {
                key: key.to_owned(),
                status,
            }),
        }
    }
}

impl KvStore for CouchKvStore {
    fn get(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<StoredValue>>> {
        let store = self.clone();
        let key = key.to_owned();
        Box::pin(async move {
            let document = store.get_document(&key).await?;
            Ok(document.map(CouchValueDocument::into_stored_value))
        })
    }

    fn put(
        &self,
        key: &str,
        raw: String,
        expected: Option<Revision>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        let document = CouchValueDocument::new(key, raw, expected);
        Box::pin(async move { Ok(store.put_document(&document).await?) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let status = store.database_status().await?;
            if status.is_success() {
                Ok(())
            } else {
                Err(CouchDaoError::DatabaseStatus {
                    database: store.database.to_string(),
                    status,
                }
                .into())
            }
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.ensure_database().await?) })
    }
}
