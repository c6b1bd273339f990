//! Shared key-value store client.
//!
//! The backing store is the sole system of record for policies, counters
//! and locks; it is shared by every process instance behind the load
//! balancer, so no in-process cache duplicates it. The [`KeyedStore`]
//! trait abstracts over the Redis-backed implementation and an in-memory
//! one for tests and single-process deployments.

mod memory;
mod redis;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;

/// Atomic operations against the shared key-value store.
///
/// Every call is a network round trip on the Redis implementation.
/// `lock_take` must be atomic (acquire-if-absent with TTL) and
/// `lock_release` must be safe to call after the lock already expired.
#[async_trait]
pub trait KeyedStore: Send + Sync {
    /// Check whether a key exists.
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Fetch the value stored at a key, if any.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Store a value, with an optional time-to-live.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<(), StoreError>;

    /// Delete a key. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Try to acquire the lock at `lock_key`, expiring after `ttl`.
    ///
    /// Returns `true` only if this call created the lock entry.
    async fn lock_take(&self, lock_key: &str, token: &str, ttl: Duration)
        -> Result<bool, StoreError>;

    /// Release the lock at `lock_key` if it still holds `token`.
    async fn lock_release(&self, lock_key: &str, token: &str) -> Result<(), StoreError>;
}
