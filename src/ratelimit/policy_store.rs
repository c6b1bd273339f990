//! Client rate limit policy persistence.
//!
//! Every operation here fails open: rate limiting is a best-effort
//! protective layer, and a store outage must never cascade into an
//! application outage. Read failures resolve to "no policy", write
//! failures are logged and dropped.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::RateLimitSettings;
use crate::store::KeyedStore;

use super::rules::ClientRateLimitPolicy;

const POLICY_KEY_PREFIX: &str = "client_rate_limit";

/// Store for per-client rate limiting policies.
pub struct PolicyStore {
    store: Arc<dyn KeyedStore>,
    settings: RateLimitSettings,
}

impl PolicyStore {
    /// Create a policy store over the shared key-value store.
    pub fn new(store: Arc<dyn KeyedStore>, settings: RateLimitSettings) -> Self {
        Self { store, settings }
    }

    fn key_for(id: &str) -> String {
        format!("{}:{}", POLICY_KEY_PREFIX, id)
    }

    /// Check whether a policy exists for a client id.
    ///
    /// Resolves to `false` on store failure.
    pub async fn exists(&self, id: &str) -> bool {
        match self.store.exists(&Self::key_for(id)).await {
            Ok(exists) => exists,
            Err(err) => {
                warn!(id = %id, error = %err, "Policy existence check failed, treating as absent");
                false
            }
        }
    }

    /// Fetch the policy for a client id.
    ///
    /// Resolves to `None` on store failure or a corrupt stored value.
    pub async fn get(&self, id: &str) -> Option<ClientRateLimitPolicy> {
        let value = match self.store.get(&Self::key_for(id)).await {
            Ok(value) => value?,
            Err(err) => {
                warn!(id = %id, error = %err, "Policy read failed, treating as absent");
                return None;
            }
        };

        match serde_json::from_slice(&value) {
            Ok(policy) => Some(policy),
            Err(err) => {
                warn!(id = %id, error = %err, "Stored policy is corrupt, treating as absent");
                None
            }
        }
    }

    /// Persist a policy for a client id, overwriting any existing one.
    ///
    /// Best-effort: store failures are logged and dropped.
    pub async fn set(&self, id: &str, policy: &ClientRateLimitPolicy, ttl: Option<Duration>) {
        let value = match serde_json::to_vec(policy) {
            Ok(value) => value,
            Err(err) => {
                warn!(id = %id, error = %err, "Failed to serialize policy");
                return;
            }
        };

        if let Err(err) = self.store.set(&Self::key_for(id), &value, ttl).await {
            warn!(id = %id, error = %err, "Policy write failed");
        }
    }

    /// Remove the policy for a client id. Best-effort.
    pub async fn remove(&self, id: &str) {
        if let Err(err) = self.store.delete(&Self::key_for(id)).await {
            warn!(id = %id, error = %err, "Policy delete failed");
        }
    }

    /// Seed default policies from the configured general rules.
    ///
    /// Each rule becomes a single-rule policy keyed `client_<endpoint>`.
    /// Idempotent: existing entries with the same key are overwritten.
    pub async fn seed(&self) {
        for rule in &self.settings.general_rules {
            let policy = ClientRateLimitPolicy {
                rules: vec![rule.clone()],
            };
            let id = format!("client_{}", rule.endpoint);
            debug!(id = %id, limit = rule.limit, "Seeding default policy");
            self.set(&id, &policy, None).await;
        }
    }
}
