//! Unified error system for Zonegate
//!
//! A single error type shared by every crate in the workspace. Collaborator
//! failures (rule store, cache, audit store) each get their own variant so the
//! boundary layer can tell them apart when choosing a fail-closed response.

use serde::{Deserialize, Serialize};

/// Unified error type for all Zonegate operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ZoneGateError {
    /// Invalid input or configuration
    #[error("Invalid: {message}")]
    Invalid {
        /// Error message describing the invalid input
        message: String,
    },

    /// Resource not found
    #[error("Not found: {message}")]
    NotFound {
        /// Error message describing what was not found
        message: String,
    },

    /// Rule store or directory operation failed
    #[error("Storage error: {message}")]
    Storage {
        /// Error message describing the storage failure
        message: String,
    },

    /// Shared decision cache operation failed
    #[error("Cache error: {message}")]
    Cache {
        /// Error message describing the cache failure
        message: String,
    },

    /// Audit log write or read failed
    #[error("Audit error: {message}")]
    Audit {
        /// Error message describing the audit failure
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message describing the serialization failure
        message: String,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal error
        message: String,
    },
}

impl ZoneGateError {
    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a cache error
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Create an audit error
    pub fn audit(message: impl Into<String>) -> Self {
        Self::Audit {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error came from one of the decision collaborators
    /// (rule store or cache) rather than from bad input.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::Cache { .. })
    }
}

/// Standard Result type for Zonegate operations
pub type Result<T> = std::result::Result<T, ZoneGateError>;

impl From<std::io::Error> for ZoneGateError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::not_found(err.to_string()),
            _ => Self::internal(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ZoneGateError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<toml::de::Error> for ZoneGateError {
    fn from(err: toml::de::Error) -> Self {
        Self::invalid(format!("Invalid TOML: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = ZoneGateError::invalid("test message");
        assert!(matches!(err, ZoneGateError::Invalid { .. }));
        assert_eq!(err.to_string(), "Invalid: test message");
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = ZoneGateError::from(io_err);
        assert!(matches!(err, ZoneGateError::NotFound { .. }));
    }

    #[test]
    fn test_unavailable_classification() {
        assert!(ZoneGateError::storage("down").is_unavailable());
        assert!(ZoneGateError::cache("down").is_unavailable());
        assert!(!ZoneGateError::audit("down").is_unavailable());
        assert!(!ZoneGateError::invalid("bad").is_unavailable());
    }
}
