// ============================================
// File: crates/fieldgate-server/src/error.rs
// ============================================
//! # Gateway Error Types
//!
//! ## Last Modified
//! v0.1.0 - Initial error definitions

use thiserror::Error;

use fieldgate_core::error::CoreError;
use fieldgate_transport::error::TransportError;

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Gateway error types.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Failed to load configuration from '{path}': {reason}")]
    ConfigLoad {
        path: String,
        reason: String,
    },

    #[error("Invalid configuration: {field} - {reason}")]
    ConfigInvalid {
        field: String,
        reason: String,
    },

    #[error("Gateway failed to start: {reason}")]
    StartupFailed {
        reason: String,
    },

    #[error("Gateway is shutting down")]
    ShuttingDown,

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    pub fn config_load(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn config_invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn startup_failed(reason: impl Into<String>) -> Self {
        Self::StartupFailed {
            reason: reason.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigLoad { .. } | Self::ConfigInvalid { .. }
        )
    }

    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigLoad { .. }
                | Self::ConfigInvalid { .. }
                | Self::StartupFailed { .. }
        )
    }
}
