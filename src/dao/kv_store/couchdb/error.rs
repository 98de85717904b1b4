//! Failures of the CouchDB key-value backend.

use reqwest::StatusCode;
use thiserror::Error;

/// Result alias for CouchDB operations.
pub type CouchResult<T> = Result<T, CouchDaoError>;

/// Failures that can occur while reading or writing keys in CouchDB.
#[derive(Debug, Error)]
pub enum CouchDaoError {
    #[error("environment variable `{var}` must be set to reach CouchDB")]
    MissingEnvVar { var: &'static str },
    #[error("could not build the CouchDB HTTP client")]
    Client {
        #[source]
        source: reqwest::Error,
    },
    /// The database endpoint could not be reached at all.
    #[error("CouchDB database `{database}` is unreachable")]
    Unreachable {
        database: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("CouchDB database `{database}` answered {status}")]
    DatabaseStatus {
        database: String,
        status: StatusCode,
    },
    #[error("request for key `{key}` did not reach CouchDB")]
    KeyRequest {
        key: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("CouchDB answered {status} for key `{key}`")]
    KeyStatus { key: String, status: StatusCode },
    /// The document revision moved between read and write.
    #[error("revision of key `{key}` changed before the write")]
    Conflict { key: String },
    #[error("CouchDB document for key `{key}` could not be decoded")]
    Decode {
        key: String,
        #[source]
        source: reqwest::Error,
    },
}
