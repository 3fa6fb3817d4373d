// ============================================
// File: crates/fieldgate-transport/src/error.rs
// ============================================
//! # Transport Error Types
//!
//! ## Creation Reason
//! Defines error types for datagram transport operations. Outbound
//! send failures are best-effort and swallowed by callers; only the
//! startup bind failure escalates to a fatal condition.
//!
//! ## Error Categories
//! 1. **Bind**: endpoint acquisition at startup (fatal upstream)
//! 2. **Send/Receive**: steady-state I/O failures (swallowed)
//! 3. **Lifecycle**: operations on a shut-down transport
//!
//! ## Last Modified
//! v0.1.0 - Initial error definitions

use std::net::SocketAddr;

use thiserror::Error;

// ============================================
// Result Type Alias
// ============================================

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

// ============================================
// TransportError
// ============================================

/// Transport layer error types.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to bind to address.
    #[error("Failed to bind to {addr}: {reason}")]
    BindFailed {
        /// Address we tried to bind to
        addr: SocketAddr,
        /// Why binding failed
        reason: String,
    },

    /// Address already in use.
    #[error("Address {addr} already in use")]
    AddressInUse {
        /// The contested address
        addr: SocketAddr,
    },

    /// The given address string could not be parsed.
    #[error("Invalid address: '{addr}'")]
    InvalidAddress {
        /// The unparseable address string
        addr: String,
    },

    /// Send operation failed.
    #[error("Failed to send to {dest}: {reason}")]
    SendFailed {
        /// Destination address
        dest: SocketAddr,
        /// Why send failed
        reason: String,
    },

    /// Receive operation failed.
    #[error("Failed to receive: {reason}")]
    ReceiveFailed {
        /// Why receive failed
        reason: String,
    },

    /// Transport is shutting down.
    #[error("Transport is shutting down")]
    ShuttingDown,

    /// Underlying I/O error with context.
    #[error("I/O error while {context}: {source}")]
    Io {
        /// What we were doing
        context: String,
        /// The underlying error
        source: std::io::Error,
    },
}

impl TransportError {
    /// Creates an `Io` error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Creates a `BindFailed` error.
    pub fn bind_failed(addr: SocketAddr, reason: impl Into<String>) -> Self {
        Self::BindFailed {
            addr,
            reason: reason.into(),
        }
    }

    /// Checks whether the failure is a steady-state I/O error that
    /// callers should swallow rather than escalate.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::SendFailed { .. } | Self::ReceiveFailed { .. }
        )
    }
}

// ============================================
// Tests
// ============================================
