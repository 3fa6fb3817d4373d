// ============================================
// File: crates/fieldgate-core/src/error.rs
// ============================================
//! # Core Error Types
//!
//! ## Creation Reason
//! Defines error types for protocol decoding and encoding. The
//! dispatcher needs to tell an undecodable datagram apart from a
//! well-formed envelope with an unrecognized discriminant, so the
//! two are distinct variants here.
//!
//! ## Error Categories
//! 1. **Malformed**: bytes that are not a well-formed envelope
//! 2. **UnknownMessageType**: valid envelope, unrecognized `type`
//! 3. **Encode**: serialization failure for an outbound envelope
//!
//! ## Last Modified
//! v0.1.0 - Initial error definitions

use thiserror::Error;

// ============================================
// Result Type Alias
// ============================================

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

// ============================================
// CoreError
// ============================================

/// Core protocol error types.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Inbound bytes are not a well-formed envelope.
    #[error("Malformed envelope: {reason}")]
    MalformedEnvelope {
        /// Why decoding failed
        reason: String,
    },

    /// Envelope decoded but its `type` discriminant is not recognized.
    #[error("Unknown message type: '{found}'")]
    UnknownMessageType {
        /// The unrecognized discriminant value
        found: String,
    },

    /// Outbound envelope could not be serialized.
    #[error("Failed to encode envelope: {reason}")]
    Encode {
        /// Why encoding failed
        reason: String,
    },
}

impl CoreError {
    /// Creates a `MalformedEnvelope` error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedEnvelope {
            reason: reason.into(),
        }
    }

    /// Creates an `UnknownMessageType` error.
    pub fn unknown_type(found: impl Into<String>) -> Self {
        Self::UnknownMessageType {
            found: found.into(),
        }
    }

    /// Creates an `Encode` error.
    pub fn encode(reason: impl Into<String>) -> Self {
        Self::Encode {
            reason: reason.into(),
        }
    }

    /// Checks whether this error means the datagram should be dropped
    /// without a reply.
    #[must_use]
    pub const fn is_drop_without_reply(&self) -> bool {
        matches!(
            self,
            Self::MalformedEnvelope { .. } | Self::UnknownMessageType { .. }
        )
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::unknown_type("telemetry_v2");
        assert!(err.to_string().contains("telemetry_v2"));
    }

    #[test]
    fn test_drop_classification() {
        assert!(CoreError::malformed("not json").is_drop_without_reply());
        assert!(CoreError::unknown_type("x").is_drop_without_reply());
        assert!(!CoreError::encode("oops").is_drop_without_reply());
    }
}
