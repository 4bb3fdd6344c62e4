//! Service configuration
//!
//! Resolved in three layers: the TOML file, then `ZONEGATE_*` and
//! `ZONE_ACCESS_*` environment variables, then command line flags.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use zonegate_core::{Result, ZoneAccessConfig, ZoneGateError};

/// Listen address override
pub const ENV_BIND: &str = "ZONEGATE_BIND";
/// Login endpoint override
pub const ENV_LOGIN_URL: &str = "ZONEGATE_LOGIN_URL";
/// Directory seed file override
pub const ENV_DIRECTORY: &str = "ZONEGATE_DIRECTORY";
/// Audit log file override
pub const ENV_AUDIT_LOG: &str = "ZONEGATE_AUDIT_LOG";

const DEFAULT_BIND: &str = "127.0.0.1:8089";
const DEFAULT_LOGIN_URL: &str = "/accounts/login/";
const DEFAULT_SESSION_COOKIE: &str = "zonegate_session";
const DEFAULT_PURGE_INTERVAL_SECS: u64 = 60;

/// Everything the `zonegate` service needs to start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind_address: String,
    /// Where anonymous subjects are sent to authenticate
    pub login_url: String,
    /// TOML directory seed; an empty directory is used when unset
    pub directory_path: Option<PathBuf>,
    /// JSON lines audit log; records are kept in memory when unset
    pub audit_log_path: Option<PathBuf>,
    /// Name of the cookie carrying the session token
    pub session_cookie: String,
    /// Seconds between sweeps of expired cache slots
    pub cache_purge_interval_secs: u64,
    /// Decision engine options
    pub zone_access: ZoneAccessConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND.to_string(),
            login_url: DEFAULT_LOGIN_URL.to_string(),
            directory_path: None,
            audit_log_path: None,
            session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
            cache_purge_interval_secs: DEFAULT_PURGE_INTERVAL_SECS,
            zone_access: ZoneAccessConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ZoneGateError::invalid(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Merge with environment variables
    pub fn merge_with_env(&mut self) -> Result<()> {
        self.merge_with_vars(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn merge_with_vars<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup(ENV_BIND) {
            self.bind_address = bind;
        }
        if let Some(url) = lookup(ENV_LOGIN_URL) {
            self.login_url = url;
        }
        if let Some(path) = lookup(ENV_DIRECTORY) {
            self.directory_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup(ENV_AUDIT_LOG) {
            self.audit_log_path = Some(PathBuf::from(path));
        }
        self.zone_access.merge_with_vars(lookup)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;
        if self.login_url.trim().is_empty() {
            return Err(ZoneGateError::invalid("login_url must not be empty"));
        }
        if self.session_cookie.is_empty()
            || !self
                .session_cookie
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            return Err(ZoneGateError::invalid(format!(
                "Invalid session cookie name '{}'",
                self.session_cookie
            )));
        }
        if self.cache_purge_interval_secs == 0 {
            return Err(ZoneGateError::invalid(
                "cache_purge_interval_secs must be positive",
            ));
        }
        self.zone_access.validate()
    }

    /// Parsed listen address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_address.parse().map_err(|e| {
            ZoneGateError::invalid(format!(
                "Invalid bind address '{}': {e}",
                self.bind_address
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zonegate_core::AccessLevel;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        }
    }

    #[test]
    fn defaults_validate() {
        ServerConfig::default().validate().unwrap();
    }

    #[test]
    fn file_values_are_read_with_nested_engine_options() {
        let config = ServerConfig::from_toml_str(
            r#"
bind_address = "0.0.0.0:9000"
login_url = "https://sso.example.org/login"
directory_path = "/etc/zonegate/directory.toml"

[zone_access]
cache_time_secs = 30
default_response = "allowed"
"#,
        )
        .unwrap();

        assert_eq!(config.bind_address, "0.0.0.0:9000");
        assert_eq!(config.session_cookie, DEFAULT_SESSION_COOKIE);
        assert_eq!(config.zone_access.cache_time_secs, 30);
        assert_eq!(config.zone_access.default_response, AccessLevel::Allowed);
        assert!(config.audit_log_path.is_none());
    }

    #[test]
    fn sample_config_is_valid() {
        let config = ServerConfig::from_toml_str(include_str!("../../../demos/zonegate.toml"))
            .unwrap();
        config.validate().unwrap();
        assert_eq!(config.zone_access.allowed_log_threshold_secs, 300);
    }

    #[test]
    fn environment_overrides_file() {
        let mut config = ServerConfig::default();
        config
            .merge_with_vars(vars(&[
                (ENV_BIND, "127.0.0.1:1234"),
                (ENV_AUDIT_LOG, "/var/log/zonegate.jsonl"),
                ("ZONE_ACCESS_CACHE_TIME", "15"),
            ]))
            .unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:1234");
        assert_eq!(
            config.audit_log_path,
            Some(PathBuf::from("/var/log/zonegate.jsonl"))
        );
        assert_eq!(config.zone_access.cache_time_secs, 15);
    }

    #[test]
    fn bad_values_fail_validation() {
        let config = ServerConfig {
            bind_address: "not an address".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ServerConfig {
            session_cookie: "bad cookie;".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.zone_access.default_response = AccessLevel::Default;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config
            .merge_with_vars(vars(&[("ZONE_ACCESS_CACHE_TIME", "10000000000000")]))
            .unwrap();
        assert!(config.validate().is_err());
    }
}
