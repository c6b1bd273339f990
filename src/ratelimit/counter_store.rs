//! Rate limit counter persistence.
//!
//! Unlike the policy store, operations here propagate store errors: the
//! processing strategy needs to distinguish a store failure from "no
//! counter yet" so that enforcement can fail closed.

use std::sync::Arc;
use std::time::Duration;

use crate::error::StoreError;
use crate::store::KeyedStore;

use super::counter::RateLimitCounter;

const COUNTER_KEY_PREFIX: &str = "counter";

/// Store for current-window request counters.
pub struct CounterStore {
    store: Arc<dyn KeyedStore>,
}

impl CounterStore {
    /// Create a counter store over the shared key-value store.
    pub fn new(store: Arc<dyn KeyedStore>) -> Self {
        Self { store }
    }

    fn key_for(id: &str) -> String {
        format!("{}:{}", COUNTER_KEY_PREFIX, id)
    }

    /// Check whether a counter exists for a composite key.
    pub async fn exists(&self, id: &str) -> Result<bool, StoreError> {
        self.store.exists(&Self::key_for(id)).await
    }

    /// Fetch the counter for a composite key, if any.
    ///
    /// A corrupt stored value surfaces as a serialization error; the
    /// strategy decides how to recover.
    pub async fn get(&self, id: &str) -> Result<Option<RateLimitCounter>, StoreError> {
        match self.store.get(&Self::key_for(id)).await? {
            Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
            None => Ok(None),
        }
    }

    /// Persist a counter with expiry tied to the rule's window.
    pub async fn set(
        &self,
        id: &str,
        counter: &RateLimitCounter,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        let value = serde_json::to_vec(counter)?;
        self.store.set(&Self::key_for(id), &value, ttl).await
    }

    /// Remove the counter for a composite key.
    pub async fn remove(&self, id: &str) -> Result<(), StoreError> {
        self.store.delete(&Self::key_for(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::Utc;

    #[tokio::test]
    async fn test_set_get_round_trip() {
        let counters = CounterStore::new(Arc::new(MemoryStore::new()));
        let counter = RateLimitCounter::fresh(Utc::now());

        counters.set("k1", &counter, None).await.unwrap();
        assert!(counters.exists("k1").await.unwrap());
        assert_eq!(counters.get("k1").await.unwrap(), Some(counter));
    }

    #[tokio::test]
    async fn test_absent_counter_is_none() {
        let counters = CounterStore::new(Arc::new(MemoryStore::new()));
        assert_eq!(counters.get("missing").await.unwrap(), None);
        assert!(!counters.exists("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_counter_expires_with_ttl() {
        let counters = CounterStore::new(Arc::new(MemoryStore::new()));
        let counter = RateLimitCounter::fresh(Utc::now());

        counters
            .set("k1", &counter, Some(Duration::from_millis(10)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(counters.get("k1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_deletes_counter() {
        let counters = CounterStore::new(Arc::new(MemoryStore::new()));
        let counter = RateLimitCounter::fresh(Utc::now());

        counters.set("k1", &counter, None).await.unwrap();
        counters.remove("k1").await.unwrap();
        assert_eq!(counters.get("k1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_counter_surfaces_as_error() {
        let store = Arc::new(MemoryStore::new());
        store.set("counter:k1", b"not json", None).await.unwrap();

        let counters = CounterStore::new(store);
        let err = counters.get("k1").await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
