//! Key-value store access
//!
//! `ColorStore` is the seam between the HTTP handlers and the backing store.
//! Production runs against Redis; tests and local runs can use the in-memory
//! implementation.

use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod redis;

pub use self::memory::MemoryStore;
pub use self::redis::{RedisStore, StoreConfig};

/// Default Redis port
pub const REDIS_DEFAULT_PORT: u16 = 6379;
/// Default Redis logical database
pub const REDIS_DEFAULT_DB: i64 = 0;

/// Errors returned by store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached
    #[error("Connection error: {0}")]
    Connection(#[source] ::redis::RedisError),

    /// The store answered with an error
    #[error("Command failed: {0}")]
    Command(#[source] ::redis::RedisError),

    /// The store refused service (in-memory store switched off)
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// `close()` was already called
    #[error("Store connection is closed")]
    Closed,
}

impl From<::redis::RedisError> for StoreError {
    fn from(err: ::redis::RedisError) -> Self {
        if err.is_io_error()
            || err.is_connection_refusal()
            || err.is_connection_dropped()
            || err.is_timeout()
        {
            StoreError::Connection(err)
        } else {
            StoreError::Command(err)
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Operations the color service needs from a key-value store
#[async_trait]
pub trait ColorStore: Send + Sync {
    /// Round-trip to the store
    async fn ping(&self) -> StoreResult<()>;

    /// Whether the database holds any key at all
    async fn keys_exist(&self) -> StoreResult<bool>;

    /// Store `value` under `key`, overwriting any previous value
    async fn set_key(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Every stored value. Keys that disappear between listing and reading
    /// are skipped.
    async fn values(&self) -> StoreResult<Vec<String>>;

    /// Delete every key in the database
    async fn flush(&self) -> StoreResult<()>;

    /// Release the connection. Later operations fail with `StoreError::Closed`.
    async fn close(&self);
}
