//! Counter key construction.
//!
//! The surrounding middleware supplies the key builder; it must map a
//! (client identity, rule) pair to the same storage key on every process
//! instance, since counters and locks are shared through the store.

use std::fmt;

use super::rules::{ClientRequestIdentity, RateLimitRule};

/// Builds the composite storage key scoping one counter.
pub trait CounterKeyBuilder: Send + Sync {
    /// Produce the counter key for this identity and rule.
    fn build(&self, identity: &ClientRequestIdentity, rule: &RateLimitRule) -> String;
}

/// Default key builder scoping counters by client id, rule period and
/// endpoint: `<prefix>_<client_id>_<period>_<endpoint>`.
#[derive(Debug, Clone)]
pub struct ClientCounterKeyBuilder {
    prefix: String,
}

impl ClientCounterKeyBuilder {
    /// Create a builder with a custom key prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for ClientCounterKeyBuilder {
    fn default() -> Self {
        Self::new("rl")
    }
}

impl CounterKeyBuilder for ClientCounterKeyBuilder {
    fn build(&self, identity: &ClientRequestIdentity, rule: &RateLimitRule) -> String {
        struct OptPeriod<'a>(&'a RateLimitRule);

        impl fmt::Display for OptPeriod<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.0.period {
                    Some(period) => write!(f, "{}", period),
                    None => write!(f, "none"),
                }
            }
        }

        format!(
            "{}_{}_{}_{}",
            self.prefix,
            identity.client_id,
            OptPeriod(rule),
            rule.endpoint
        )
    }
}
