//! Static rate limiting configuration.
//!
//! The general rule list is supplied at process startup and consumed by
//! the policy store's seeding pass; it plays no part in per-request
//! processing.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{RateLimitError, Result};
use crate::ratelimit::RateLimitRule;

/// Static settings for the rate limiting subsystem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Globally configured rules, seeded into per-endpoint default
    /// policies at startup
    #[serde(default)]
    pub general_rules: Vec<RateLimitRule>,
}

impl RateLimitSettings {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading rate limit settings");

        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load settings from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| {
            RateLimitError::Config(format!("Failed to parse rate limit settings: {}", e))
        })
    }
}
