//! Error types for the Fieldtrack application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Fieldtrack application.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum FieldtrackError {
    /// The caller lacks the grants required to track location
    #[error("Permission denied: missing {missing}")]
    PermissionDenied { missing: String },

    /// No enabled location provider was found
    #[error("No location provider available")]
    NoProviderAvailable,

    /// A provider rejected an update registration (catch-all for
    /// platform-level registration failures)
    #[error("Registration failed on provider '{provider}': {message}")]
    Registration { provider: String, message: String },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FieldtrackError {
    /// Creates a PermissionDenied error
    pub fn permission_denied(missing: impl Into<String>) -> Self {
        Self::PermissionDenied {
            missing: missing.into(),
        }
    }

    /// Creates a Registration error
    pub fn registration(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Registration {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a PermissionDenied error
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }

    /// Check if this is a Config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this error ends the hosting process.
    ///
    /// `PermissionDenied`, `NoProviderAvailable` and `Registration` are
    /// terminal at the process level: none are retried and none are
    /// surfaced to a caller for recovery.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied { .. } | Self::NoProviderAvailable | Self::Registration { .. }
        )
    }
}

impl From<std::io::Error> for FieldtrackError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for FieldtrackError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for FieldtrackError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for FieldtrackError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from String (for error messages)
impl From<String> for FieldtrackError {
    fn from(err: String) -> Self {
        Self::Internal(err)
    }
}

/// A type alias for `Result<T, FieldtrackError>`.
pub type Result<T> = std::result::Result<T, FieldtrackError>;
