//! Request processing strategy.
//!
//! Performs the atomic check-and-increment for one request under a
//! per-key distributed lock and returns the authoritative counter. The
//! caller compares the returned count against the rule's limit to allow
//! or deny the request; this module never makes that decision itself.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, trace, warn};

use crate::error::{RateLimitError, Result, StoreError};
use crate::store::KeyedStore;

use super::counter::RateLimitCounter;
use super::counter_store::CounterStore;
use super::key_builder::CounterKeyBuilder;
use super::rules::{ClientRequestIdentity, RateLimitRule};

/// Safety net against a crashed holder: the lock self-expires even if it
/// is never released.
const LOCK_TTL: Duration = Duration::from_secs(30);
const LOCK_TOKEN: &str = "lock";
const LOCK_KEY_PREFIX: &str = "lock";

/// Serializes counter updates per composite key through the shared store.
///
/// Requests that cannot take the lock are denied rather than queued, so
/// contention never adds latency: an inability to safely coordinate a
/// counter update must not silently under-count.
pub struct ProcessingStrategy {
    store: Arc<dyn KeyedStore>,
    counters: CounterStore,
}

impl ProcessingStrategy {
    /// Create a processing strategy over the shared key-value store.
    pub fn new(store: Arc<dyn KeyedStore>) -> Self {
        let counters = CounterStore::new(store.clone());
        Self { store, counters }
    }

    /// Process one request matched to a rule, returning the authoritative
    /// counter for the current window.
    ///
    /// Updates for the same composite key are serialized by a distributed
    /// lock. If the lock cannot be acquired, a synthetic counter of
    /// `rule.limit + 1` is returned so the caller denies the request.
    pub async fn process_request(
        &self,
        identity: &ClientRequestIdentity,
        rule: &RateLimitRule,
        key_builder: &dyn CounterKeyBuilder,
    ) -> Result<RateLimitCounter> {
        let key = key_builder.build(identity, rule);
        if key.is_empty() {
            return Err(RateLimitError::InvalidArgument(
                "counter key builder produced an empty key".to_string(),
            ));
        }
        let lock_key = format!("{}:{}", LOCK_KEY_PREFIX, key);

        trace!(key = %key, client_id = %identity.client_id, "Processing rate limit request");

        let locked = match self.store.lock_take(&lock_key, LOCK_TOKEN, LOCK_TTL).await {
            Ok(locked) => locked,
            Err(err) => {
                warn!(key = %key, error = %err, "Lock acquisition failed");
                false
            }
        };

        if !locked {
            debug!(key = %key, "Counter lock unavailable, denying by default");
            return Ok(RateLimitCounter {
                timestamp: Utc::now(),
                count: rule.limit + 1,
            });
        }

        let result = self.update_counter(&key, rule).await;

        // Release unconditionally, whether or not the update succeeded.
        if let Err(err) = self.store.lock_release(&lock_key, LOCK_TOKEN).await {
            warn!(key = %key, error = %err, "Lock release failed, relying on TTL expiry");
        }

        result
    }

    /// Read-or-initialize, apply fixed-window reset, increment, persist.
    ///
    /// Must only run while holding the lock for `key`.
    async fn update_counter(&self, key: &str, rule: &RateLimitRule) -> Result<RateLimitCounter> {
        let now = Utc::now();

        let counter = match self.counters.get(key).await {
            Ok(Some(mut existing)) => {
                let window_elapsed = rule.period.is_some_and(|period| {
                    now.signed_duration_since(existing.timestamp)
                        > chrono::Duration::seconds(period.as_secs() as i64)
                });

                if window_elapsed {
                    trace!(key = %key, "Window elapsed, resetting counter");
                    RateLimitCounter::fresh(now)
                } else {
                    existing.count += 1;
                    existing
                }
            }
            Ok(None) => RateLimitCounter::fresh(now),
            Err(StoreError::Serialization(err)) => {
                warn!(key = %key, error = %err, "Stored counter is corrupt, starting a fresh window");
                RateLimitCounter::fresh(now)
            }
            Err(err) => return Err(err.into()),
        };

        self.counters
            .set(key, &counter, rule.period.map(|p| p.as_duration()))
            .await?;

        Ok(counter)
    }
}
