//! Redis-backed store
//!
//! Wraps a `redis::aio::ConnectionManager`. Reconnection with exponential
//! backoff is handled by the manager; nothing here retries on its own.

use ::redis::aio::ConnectionManager;
use ::redis::{AsyncCommands, Client};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{ColorStore, StoreError, StoreResult, REDIS_DEFAULT_DB, REDIS_DEFAULT_PORT};

/// Base of the reconnect backoff (delay grows as `factor * base^attempt`)
const BACKOFF_EXPONENT_BASE: u64 = 2;
/// Backoff multiplier in milliseconds
const BACKOFF_FACTOR_MS: u64 = 8;
/// Reconnect attempts before an operation gives up
const BACKOFF_RETRIES: usize = 5;
/// Keys requested per SCAN page
const SCAN_COUNT: usize = 100;

/// Where to find Redis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub db: i64,
}

impl StoreConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: REDIS_DEFAULT_PORT,
            db: REDIS_DEFAULT_DB,
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn db(mut self, db: i64) -> Self {
        self.db = db;
        self
    }

    /// Connection URL understood by `redis::Client::open`
    pub fn url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.db)
    }
}

/// Color store backed by a single managed Redis connection
pub struct RedisStore {
    conn: RwLock<Option<ConnectionManager>>,
}

impl RedisStore {
    /// Open a managed connection. Fails if Redis cannot be reached.
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        let client = Client::open(config.url())?;
        let manager = ConnectionManager::new_with_backoff(
            client,
            BACKOFF_EXPONENT_BASE,
            BACKOFF_FACTOR_MS,
            BACKOFF_RETRIES,
        )
        .await?;

        info!(
            host = %config.host,
            port = config.port,
            db = config.db,
            "Connected to Redis"
        );

        Ok(Self {
            conn: RwLock::new(Some(manager)),
        })
    }

    /// Clone of the managed connection; cheap, shares the underlying socket.
    async fn conn(&self) -> StoreResult<ConnectionManager> {
        self.conn.read().await.clone().ok_or(StoreError::Closed)
    }
}

#[async_trait]
impl ColorStore for RedisStore {
    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        let _: String = ::redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn keys_exist(&self) -> StoreResult<bool> {
        let mut conn = self.conn().await?;
        let size: u64 = ::redis::cmd("DBSIZE").query_async(&mut conn).await?;
        Ok(size > 0)
    }

    async fn set_key(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }

    async fn values(&self) -> StoreResult<Vec<String>> {
        let mut conn = self.conn().await?;

        // An error on any SCAN page fails the whole read; never a partial list.
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, page): (u64, Vec<String>) = ::redis::cmd("SCAN")
                .arg(cursor)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await?;
            keys.extend(page);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        debug!(count = keys.len(), "Scanned keys");

        if keys.is_empty() {
            return Ok(Vec::new());
        }

        // Keys deleted after the scan, or holding a non-string value, read as nil.
        let values: Vec<Option<String>> = ::redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut conn)
            .await?;
        Ok(values.into_iter().flatten().collect())
    }

    async fn flush(&self) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        let _: () = ::redis::cmd("FLUSHDB")
            .arg("ASYNC")
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn close(&self) {
        if self.conn.write().await.take().is_some() {
            info!("Closed the Redis connection");
        }
    }
}
