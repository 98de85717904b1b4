/// Typed JSON read-modify-write access to a key-value namespace.
pub mod accessor;
/// Key-value store abstraction and its backends.
pub mod kv_store;
/// Persisted record definitions.
pub mod models;
/// Storage error types shared by every backend.
pub mod storage;
/// Bundle of the namespaces used by the service.
pub mod stores;
