//! Rate limit rules and client policies.
//!
//! A rule is a (endpoint pattern, limit, period) triple. Rules are grouped
//! into per-client policies, which are persisted in the shared store and
//! seeded from static configuration at startup.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A fixed-window duration, written as `"30s"`, `"5m"`, `"2h"` or `"1d"`.
///
/// Whole seconds only; sub-second windows are not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period(Duration);

impl Period {
    /// Create a period from a number of seconds.
    pub fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    /// The window duration.
    pub fn as_duration(&self) -> Duration {
        self.0
    }

    /// The window duration in whole seconds.
    pub fn as_secs(&self) -> u64 {
        self.0.as_secs()
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (idx, unit) = s
            .char_indices()
            .last()
            .ok_or_else(|| "invalid period: empty string".to_string())?;
        let count: u64 = s[..idx]
            .parse()
            .map_err(|_| format!("invalid period '{}': expected e.g. '30s', '5m', '1h', '1d'", s))?;
        let secs = match unit {
            's' => count,
            'm' => count * 60,
            'h' => count * 3600,
            'd' => count * 86400,
            _ => return Err(format!("invalid period unit in '{}': expected s, m, h or d", s)),
        };
        if secs == 0 {
            return Err(format!("invalid period '{}': must be greater than zero", s));
        }
        Ok(Period::from_secs(secs))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.as_secs();
        if secs % 86400 == 0 {
            write!(f, "{}d", secs / 86400)
        } else if secs % 3600 == 0 {
            write!(f, "{}h", secs / 3600)
        } else if secs % 60 == 0 {
            write!(f, "{}m", secs / 60)
        } else {
            write!(f, "{}s", secs)
        }
    }
}

impl TryFrom<String> for Period {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}

/// One enforceable rate limit threshold.
///
/// Immutable once read from configuration. A rule without a period never
/// resets: its counter grows until explicitly removed and is stored
/// without a TTL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitRule {
    /// Endpoint/resource pattern this rule applies to
    pub endpoint: String,
    /// Maximum requests allowed within one window
    pub limit: u64,
    /// Window duration; `None` disables window reset and expiry
    #[serde(default)]
    pub period: Option<Period>,
}

/// The rule set associated with one client identity.
///
/// Policies are overwritten wholesale on update, never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientRateLimitPolicy {
    /// Rules applying to this client
    #[serde(default)]
    pub rules: Vec<RateLimitRule>,
}

/// The classification of an inbound request, supplied by the surrounding
/// middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRequestIdentity {
    /// Caller-scoped key, e.g. an API key id or a client IP
    pub client_id: String,
    /// Request path
    pub path: String,
    /// HTTP verb, lowercased by convention
    pub http_verb: String,
}

impl ClientRequestIdentity {
    /// Create a new request identity.
    pub fn new(
        client_id: impl Into<String>,
        path: impl Into<String>,
        http_verb: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            path: path.into(),
            http_verb: http_verb.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_parsing() {
        assert_eq!("30s".parse::<Period>().unwrap(), Period::from_secs(30));
        assert_eq!("5m".parse::<Period>().unwrap(), Period::from_secs(300));
        assert_eq!("2h".parse::<Period>().unwrap(), Period::from_secs(7200));
        assert_eq!("1d".parse::<Period>().unwrap(), Period::from_secs(86400));
    }

    #[test]
    fn test_period_rejects_garbage() {
        assert!("".parse::<Period>().is_err());
        assert!("10".parse::<Period>().is_err());
        assert!("tens".parse::<Period>().is_err());
        assert!("0s".parse::<Period>().is_err());
        assert!("-5m".parse::<Period>().is_err());
    }

    #[test]
    fn test_period_display_round_trip() {
        for input in ["45s", "90s", "15m", "12h", "7d"] {
            let period: Period = input.parse().unwrap();
            assert_eq!(period.to_string(), input);
            assert_eq!(period.to_string().parse::<Period>().unwrap(), period);
        }
    }

    #[test]
    fn test_rule_yaml_round_trip() {
        let yaml = r#"
endpoint: "api/*"
limit: 100
period: 1m
"#;
        let rule: RateLimitRule = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rule.endpoint, "api/*");
        assert_eq!(rule.limit, 100);
        assert_eq!(rule.period, Some(Period::from_secs(60)));

        let json = serde_json::to_string(&rule).unwrap();
        let back: RateLimitRule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rule);
    }

    #[test]
    fn test_rule_without_period() {
        let yaml = r#"
endpoint: "*"
limit: 1000
"#;
        let rule: RateLimitRule = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rule.period, None);
    }
}
