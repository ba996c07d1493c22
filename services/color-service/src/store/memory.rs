//! In-memory store for tests and local runs without Redis

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::{ColorStore, StoreError, StoreResult};

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
    unavailable: AtomicBool,
    closed: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail as if the store were unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StoreError::Closed);
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ColorStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.check()
    }

    async fn keys_exist(&self) -> StoreResult<bool> {
        self.check()?;
        Ok(!self.entries.read().await.is_empty())
    }

    async fn set_key(&self, key: &str, value: &str) -> StoreResult<()> {
        self.check()?;
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn values(&self) -> StoreResult<Vec<String>> {
        self.check()?;
        Ok(self.entries.read().await.values().cloned().collect())
    }

    async fn flush(&self) -> StoreResult<()> {
        self.check()?;
        self.entries.write().await.clear();
        Ok(())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
