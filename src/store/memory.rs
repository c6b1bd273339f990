//! In-memory key-value store.
//!
//! Backs the same contract as the Redis client for tests and
//! single-process deployments. Expiry is lazy: stale entries are dropped
//! when next touched.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::KeyedStore;
use crate::error::StoreError;

struct Entry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Process-local [`KeyedStore`] implementation.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries, for test assertions.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        entries.retain(|_, entry| !entry.is_expired(now));
        entries.len()
    }

    /// Whether the store holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyedStore for MemoryStore {
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                Ok(false)
            }
            Some(_) => Ok(true),
            None => Ok(false),
        }
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<(), StoreError> {
        let entry = Entry {
            value: value.to_vec(),
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };
        self.entries.lock().insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().remove(key);
        Ok(())
    }

    async fn lock_take(
        &self,
        lock_key: &str,
        token: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get(lock_key) {
            if !entry.is_expired(now) {
                return Ok(false);
            }
        }
        entries.insert(
            lock_key.to_string(),
            Entry {
                value: token.as_bytes().to_vec(),
                expires_at: Some(now + ttl),
            },
        );
        Ok(true)
    }

    async fn lock_release(&self, lock_key: &str, token: &str) -> Result<(), StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get(lock_key) {
            if !entry.is_expired(now) && entry.value == token.as_bytes() {
                entries.remove(lock_key);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = MemoryStore::new();

        store.set("k", b"v", None).await.unwrap();
        assert!(store.exists("k").await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), Some(b"v".to_vec()));

        store.delete("k").await.unwrap();
        assert!(!store.exists("k").await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let store = MemoryStore::new();

        store
            .set("k", b"v", Some(Duration::from_millis(10)))
            .await
            .unwrap();
        assert!(store.exists("k").await.unwrap());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!store.exists("k").await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_lock_is_exclusive() {
        let store = MemoryStore::new();
        let ttl = Duration::from_secs(30);

        assert!(store.lock_take("lock:k", "lock", ttl).await.unwrap());
        assert!(!store.lock_take("lock:k", "lock", ttl).await.unwrap());

        store.lock_release("lock:k", "lock").await.unwrap();
        assert!(store.lock_take("lock:k", "lock", ttl).await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_lock_can_be_retaken() {
        let store = MemoryStore::new();

        assert!(store
            .lock_take("lock:k", "a", Duration::from_millis(10))
            .await
            .unwrap());
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(store
            .lock_take("lock:k", "b", Duration::from_secs(30))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_release_checks_token() {
        let store = MemoryStore::new();
        let ttl = Duration::from_secs(30);

        assert!(store.lock_take("lock:k", "a", ttl).await.unwrap());
        store.lock_release("lock:k", "b").await.unwrap();
        // Still held by "a".
        assert!(!store.lock_take("lock:k", "b", ttl).await.unwrap());
    }

    #[tokio::test]
    async fn test_release_after_expiry_is_safe() {
        let store = MemoryStore::new();
        store.lock_release("lock:never", "lock").await.unwrap();
    }
}
