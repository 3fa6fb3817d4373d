// ============================================
// File: crates/fieldgate-server/src/services/emitter.rs
// ============================================
//! # Response Emitter
//!
//! ## Creation Reason
//! Single place where outbound envelopes are serialized and sent, so
//! the dispatcher and the liveness monitor share one send policy.
//!
//! ## Main Functionality
//! - Compact-JSON serialization of outbound envelopes
//! - Best-effort unicast: transport errors are logged and swallowed
//!
//! ## ⚠️ Important Note for Next Developer
//! - UDP replies are fire-and-forget; a failed send must never take
//!   the receive loop or the monitor down
//!
//! ## Last Modified
//! v0.1.0 - Initial emitter implementation

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{debug, trace};

use fieldgate_core::protocol::codec::encode_envelope;
use fieldgate_core::protocol::Envelope;
use fieldgate_transport::Transport;

// ============================================
// ResponseEmitter
// ============================================

/// Serializes and sends gateway replies and probes.
pub struct ResponseEmitter {
    transport: Arc<dyn Transport>,
}

impl ResponseEmitter {
    /// Creates a new emitter over the given transport.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Sends an envelope to a sensor endpoint.
    ///
    /// Encoding failures and transport errors are logged at debug
    /// level and otherwise ignored.
    pub async fn send(&self, addr: SocketAddr, envelope: &Envelope) {
        let bytes = match encode_envelope(envelope) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(dest = %addr, error = %e, "Failed to encode outbound envelope");
                return;
            }
        };

        match self.transport.send(&bytes, &addr).await {
            Ok(len) => {
                trace!(
                    dest = %addr,
                    message_type = envelope.message_type(),
                    bytes = len,
                    "Envelope sent"
                );
            }
            Err(e) => {
                debug!(
                    dest = %addr,
                    message_type = envelope.message_type(),
                    error = %e,
                    "Failed to send envelope"
                );
            }
        }
    }
}

impl std::fmt::Debug for ResponseEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseEmitter").finish_non_exhaustive()
    }
}

// ============================================
// Tests
// ============================================
