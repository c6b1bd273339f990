//! Rate limit counter for one fixed window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The request count for one composite key within the current window.
///
/// `timestamp` marks the window start and only changes on rollover; the
/// count is at least 1 once a counter exists. The counter is replaced,
/// not merged, when the window rolls over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitCounter {
    /// Instant the current window started
    pub timestamp: DateTime<Utc>,
    /// Requests observed since the window started
    pub count: u64,
}

impl RateLimitCounter {
    /// A fresh counter starting a new window at `now`.
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            timestamp: now,
            count: 1,
        }
    }
}
