//! Decision engine configuration
//!
//! Every option can come from a config file (serde) and be overridden by the
//! `ZONE_ACCESS_*` environment variables.

use crate::errors::{Result, ZoneGateError};
use crate::types::AccessLevel;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Seconds a (zone, user) decision stays cached; 0 disables the cache
pub const ENV_CACHE_TIME: &str = "ZONE_ACCESS_CACHE_TIME";
/// Re-log decisions served from the cache
pub const ENV_LOG_CACHED: &str = "ZONE_ACCESS_LOG_CACHED";
/// Seconds during which repeated grant entries are suppressed
pub const ENV_ALLOWED_LOG_THRESHOLD: &str = "ZONE_ACCESS_ALLOWED_LOG_THRESHOLD";
/// Access used when a zone is unknown or the fold stays at DEFAULT
pub const ENV_DEFAULT_RESPONSE: &str = "ZONE_ACCESS_DEFAULT_RESPONSE";

/// Longest accepted TTL for either cache key space, one year in seconds
pub const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Knobs of the zone access decision engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneAccessConfig {
    /// Decision cache TTL in seconds (0 = disabled)
    pub cache_time_secs: u64,
    /// Write an audit entry for decisions served from the cache
    pub log_cached: bool,
    /// Debounce window in seconds for repeated grant entries (0 = disabled)
    pub allowed_log_threshold_secs: u64,
    /// Fallback access for unknown zones and DEFAULT fold results
    pub default_response: AccessLevel,
}

impl Default for ZoneAccessConfig {
    fn default() -> Self {
        Self {
            cache_time_secs: 0,
            log_cached: false,
            allowed_log_threshold_secs: 0,
            default_response: AccessLevel::Denied,
        }
    }
}

impl ZoneAccessConfig {
    /// Decision cache TTL, `None` when caching is disabled
    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_time_secs > 0).then(|| Duration::from_secs(self.cache_time_secs))
    }

    /// Grant log debounce window, `None` when disabled
    pub fn allowed_log_ttl(&self) -> Option<Duration> {
        (self.allowed_log_threshold_secs > 0)
            .then(|| Duration::from_secs(self.allowed_log_threshold_secs))
    }

    /// Reject configurations the engine cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.default_response == AccessLevel::Default {
            return Err(ZoneGateError::invalid(format!(
                "{ENV_DEFAULT_RESPONSE} must be 'allowed' or 'denied'"
            )));
        }
        for (key, secs) in [
            (ENV_CACHE_TIME, self.cache_time_secs),
            (ENV_ALLOWED_LOG_THRESHOLD, self.allowed_log_threshold_secs),
        ] {
            if secs > MAX_TTL_SECS {
                return Err(ZoneGateError::invalid(format!(
                    "{key} must not exceed {MAX_TTL_SECS} seconds"
                )));
            }
        }
        Ok(())
    }

    /// Apply overrides from the process environment
    pub fn merge_with_env(&mut self) -> Result<()> {
        self.merge_with_vars(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn merge_with_vars<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_CACHE_TIME) {
            self.cache_time_secs = parse_seconds(ENV_CACHE_TIME, &value)?;
        }
        if let Some(value) = lookup(ENV_LOG_CACHED) {
            self.log_cached = parse_flag(ENV_LOG_CACHED, &value)?;
        }
        if let Some(value) = lookup(ENV_ALLOWED_LOG_THRESHOLD) {
            self.allowed_log_threshold_secs = parse_seconds(ENV_ALLOWED_LOG_THRESHOLD, &value)?;
        }
        if let Some(value) = lookup(ENV_DEFAULT_RESPONSE) {
            self.default_response = value.parse().map_err(|_| {
                ZoneGateError::invalid(format!("Invalid access level in {ENV_DEFAULT_RESPONSE}"))
            })?;
        }
        Ok(())
    }
}

fn parse_seconds(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| ZoneGateError::invalid(format!("Invalid number of seconds in {key}")))
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ZoneGateError::invalid(format!("Invalid boolean in {key}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_disable_caching() {
        let config = ZoneAccessConfig::default();
        assert_eq!(config.cache_ttl(), None);
        assert_eq!(config.allowed_log_ttl(), None);
        assert_eq!(config.default_response, AccessLevel::Denied);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn env_overrides_every_option() {
        let mut config = ZoneAccessConfig::default();
        config
            .merge_with_vars(vars(&[
                (ENV_CACHE_TIME, "30"),
                (ENV_LOG_CACHED, "yes"),
                (ENV_ALLOWED_LOG_THRESHOLD, "300"),
                (ENV_DEFAULT_RESPONSE, "allowed"),
            ]))
            .unwrap();
        assert_eq!(config.cache_ttl(), Some(Duration::from_secs(30)));
        assert!(config.log_cached);
        assert_eq!(config.allowed_log_ttl(), Some(Duration::from_secs(300)));
        assert_eq!(config.default_response, AccessLevel::Allowed);
    }

    #[test]
    fn numeric_default_response_is_accepted() {
        let mut config = ZoneAccessConfig::default();
        config
            .merge_with_vars(vars(&[(ENV_DEFAULT_RESPONSE, "1")]))
            .unwrap();
        assert_eq!(config.default_response, AccessLevel::Allowed);
    }

    #[test]
    fn malformed_values_are_rejected() {
        let mut config = ZoneAccessConfig::default();
        assert!(config
            .merge_with_vars(vars(&[(ENV_CACHE_TIME, "soon")]))
            .is_err());
        assert!(config
            .merge_with_vars(vars(&[(ENV_LOG_CACHED, "perhaps")]))
            .is_err());
        assert!(config
            .merge_with_vars(vars(&[(ENV_DEFAULT_RESPONSE, "sometimes")]))
            .is_err());
    }

    #[test]
    fn default_response_must_resolve() {
        let config = ZoneAccessConfig {
            default_response: AccessLevel::Default,
            ..ZoneAccessConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn ttls_are_bounded() {
        let at_limit = ZoneAccessConfig {
            cache_time_secs: MAX_TTL_SECS,
            allowed_log_threshold_secs: MAX_TTL_SECS,
            ..ZoneAccessConfig::default()
        };
        assert!(at_limit.validate().is_ok());

        let config = ZoneAccessConfig {
            cache_time_secs: 10_000_000_000_000,
            ..ZoneAccessConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ZoneAccessConfig {
            allowed_log_threshold_secs: MAX_TTL_SECS + 1,
            ..ZoneAccessConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn deserializes_partial_toml() {
        let config: ZoneAccessConfig = toml::from_str("cache_time_secs = 60").unwrap();
        assert_eq!(config.cache_time_secs, 60);
        assert_eq!(config.default_response, AccessLevel::Denied);
    }
}
