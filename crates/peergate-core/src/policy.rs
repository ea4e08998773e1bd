//! Cache policy configuration
//!
//! Policies use a compact comma separated `key=value` syntax,
//! e.g. `"maximumSize=100, expireAfterAccess=10m"`.
//!
//! | Key                 | Value                      |
//! |---------------------|----------------------------|
//! | `maximumSize`       | entry count, LRU eviction  |
//! | `expireAfterAccess` | duration since last read   |
//! | `expireAfterWrite`  | duration since computed    |
//! | `initialCapacity`   | pre-sized entry count      |
//! | `concurrencyLevel`  | accepted, has no effect    |
//! | `recordStats`       | flag, no value             |
//!
//! Durations are an integer followed by `d`, `h`, `m`, `s` or `ms`.

use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::GateError;

/// Longest expiry the cache can schedule
pub(crate) const MAX_EXPIRY: Duration = Duration::from_secs(1000 * 365 * 24 * 60 * 60);

/// Recognized options that have no meaning for the decision cache
const UNSUPPORTED: &[&str] = &[
    "maximumWeight",
    "weakKeys",
    "weakValues",
    "softValues",
    "refreshAfterWrite",
    "refreshInterval",
];

/// Declarative policy for the decision cache
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct CachePolicy {
    /// Evict least-recently-used entries beyond this many
    pub maximum_size: Option<u64>,
    /// Expire entries not read within this duration
    pub expire_after_access: Option<Duration>,
    /// Expire entries this long after they were computed
    pub expire_after_write: Option<Duration>,
    /// Initial capacity hint
    pub initial_capacity: Option<usize>,
    /// Whether hit/miss statistics are reported
    pub record_stats: bool,
}

impl CachePolicy {
    /// An unbounded policy with no expiry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of entries
    #[must_use]
    pub fn with_maximum_size(mut self, size: u64) -> Self {
        self.maximum_size = Some(size);
        self
    }

    /// Set the idle expiry
    #[must_use]
    pub fn with_expire_after_access(mut self, ttl: Duration) -> Self {
        self.expire_after_access = Some(ttl);
        self
    }

    /// Set the write expiry
    #[must_use]
    pub fn with_expire_after_write(mut self, ttl: Duration) -> Self {
        self.expire_after_write = Some(ttl);
        self
    }

    /// Enable statistics reporting
    #[must_use]
    pub fn with_record_stats(mut self) -> Self {
        self.record_stats = true;
        self
    }
}

impl FromStr for CachePolicy {
    type Err = GateError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let mut policy = Self::default();
        if spec.trim().is_empty() {
            return Ok(policy);
        }

        let mut seen: Vec<&str> = Vec::new();

        for pair in spec.split(',') {
            let mut parts = pair.splitn(2, '=');
            let key = parts.next().unwrap_or_default().trim();
            let value = parts.next().map(str::trim);

            if key.is_empty() {
                return Err(invalid(spec, "blank key-value pair"));
            }
            if seen.contains(&key) {
                return Err(invalid(spec, &format!("{key} was already set")));
            }
            seen.push(key);

            match key {
                "maximumSize" => policy.maximum_size = Some(parse_count(spec, key, value)?),
                "initialCapacity" => {
                    let capacity = parse_count(spec, key, value)?;
                    policy.initial_capacity = Some(
                        usize::try_from(capacity)
                            .map_err(|_| invalid(spec, "initialCapacity is too large"))?,
                    );
                }
                "concurrencyLevel" => {
                    parse_count(spec, key, value)?;
                }
                "expireAfterAccess" => {
                    policy.expire_after_access = Some(parse_duration(spec, key, value)?)
                }
                "expireAfterWrite" => {
                    policy.expire_after_write = Some(parse_duration(spec, key, value)?)
                }
                "recordStats" => {
                    if value.is_some() {
                        return Err(invalid(spec, "recordStats does not take a value"));
                    }
                    policy.record_stats = true;
                }
                other if UNSUPPORTED.contains(&other) => {
                    return Err(invalid(spec, &format!("{other} is not supported")));
                }
                other => return Err(invalid(spec, &format!("unknown key {other}"))),
            }
        }

        Ok(policy)
    }
}

impl TryFrom<String> for CachePolicy {
    type Error = GateError;

    fn try_from(spec: String) -> Result<Self, Self::Error> {
        spec.parse()
    }
}

impl std::fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if let Some(size) = self.maximum_size {
            parts.push(format!("maximumSize={size}"));
        }
        if let Some(capacity) = self.initial_capacity {
            parts.push(format!("initialCapacity={capacity}"));
        }
        if let Some(ttl) = self.expire_after_access {
            parts.push(format!("expireAfterAccess={}", format_duration(ttl)));
        }
        if let Some(ttl) = self.expire_after_write {
            parts.push(format!("expireAfterWrite={}", format_duration(ttl)));
        }
        if self.record_stats {
            parts.push("recordStats".to_string());
        }
        f.write_str(&parts.join(","))
    }
}

fn invalid(spec: &str, reason: &str) -> GateError {
    GateError::configuration(format!("invalid cache policy '{spec}': {reason}"))
}

fn require_value<'a>(spec: &str, key: &str, value: Option<&'a str>) -> Result<&'a str, GateError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(invalid(spec, &format!("value of key {key} omitted"))),
    }
}

fn parse_count(spec: &str, key: &str, value: Option<&str>) -> Result<u64, GateError> {
    let value = require_value(spec, key, value)?;
    value
        .parse()
        .map_err(|_| invalid(spec, &format!("{key} must be a non-negative integer, got {value}")))
}

fn parse_duration(spec: &str, key: &str, value: Option<&str>) -> Result<Duration, GateError> {
    let value = require_value(spec, key, value)?;
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| invalid(spec, &format!("{key} needs a time unit, got {value}")))?;
    let (amount, unit) = value.split_at(split);

    let amount: u64 = amount
        .parse()
        .map_err(|_| invalid(spec, &format!("{key} has an invalid amount: {value}")))?;

    let ttl = match unit {
        "ms" => Some(Duration::from_millis(amount)),
        "s" => Some(Duration::from_secs(amount)),
        "m" => amount.checked_mul(60).map(Duration::from_secs),
        "h" => amount.checked_mul(60 * 60).map(Duration::from_secs),
        "d" => amount.checked_mul(24 * 60 * 60).map(Duration::from_secs),
        _ => return Err(invalid(spec, &format!("{key} has an unknown time unit: {unit}"))),
    };

    match ttl {
        Some(ttl) if ttl <= MAX_EXPIRY => Ok(ttl),
        _ => Err(invalid(spec, &format!("{key} exceeds maximum of 1000 years: {value}"))),
    }
}

fn format_duration(ttl: Duration) -> String {
    let millis = ttl.as_millis();
    if millis % 1000 != 0 {
        return format!("{millis}ms");
    }
    let secs = ttl.as_secs();
    match secs {
        s if s % 86_400 == 0 && s > 0 => format!("{}d", s / 86_400),
        s if s % 3_600 == 0 && s > 0 => format!("{}h", s / 3_600),
        s if s % 60 == 0 && s > 0 => format!("{}m", s / 60),
        s => format!("{s}s"),
    }
}
