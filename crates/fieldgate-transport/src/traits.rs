// ============================================
// File: crates/fieldgate-transport/src/traits.rs
// ============================================
//! # Transport Traits
//!
//! ## Creation Reason
//! Defines the datagram transport interface so the dispatcher, the
//! liveness monitor, and their tests can run against either a real
//! UDP socket or an in-memory mock.
//!
//! ## Main Functionality
//! - `Transport`: UDP-like datagram transport interface
//! - `PacketSource`: Metadata about received datagrams
//!
//! ## Design Philosophy
//! - Async-first design with `async_trait`
//! - Implementations must be Send + Sync for use across tasks
//! - Buffer management is the caller's responsibility
//!
//! ## Last Modified
//! v0.1.0 - Initial trait definitions

use std::net::SocketAddr;
use std::time::Instant;

use async_trait::async_trait;

use crate::error::Result;

// ============================================
// PacketSource
// ============================================

/// Metadata about the source of a received datagram.
///
/// # Purpose
/// Carries the sender endpoint so replies and registry updates know
/// where the sensor last transmitted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PacketSource {
    /// Source address (IP and port).
    pub addr: SocketAddr,
    /// When the datagram was received.
    pub timestamp: Instant,
}

impl PacketSource {
    /// Creates a new `PacketSource` stamped with the current time.
    #[must_use]
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            timestamp: Instant::now(),
        }
    }

    /// Creates a `PacketSource` with a specific timestamp.
    #[must_use]
    pub const fn with_timestamp(addr: SocketAddr, timestamp: Instant) -> Self {
        Self { addr, timestamp }
    }
}

// ============================================
// Transport Trait
// ============================================

/// Abstract interface for datagram-based transport.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to allow sharing between
/// the receive loop and the liveness monitor.
///
/// # Example
/// ```ignore
/// async fn pump<T: Transport>(transport: &T) -> Result<()> {
///     let mut buf = [0u8; 65535];
///     loop {
///         let (len, source) = transport.recv(&mut buf).await?;
///         let reply = process(&buf[..len]);
///         transport.send(&reply, &source.addr).await?;
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Receives a datagram into `buf`.
    ///
    /// # Returns
    /// The number of bytes received and the source metadata.
    async fn recv(&self, buf: &mut [u8]) -> Result<(usize, PacketSource)>;

    /// Sends a datagram to `dest`.
    ///
    /// # Returns
    /// The number of bytes sent.
    async fn send(&self, buf: &[u8], dest: &SocketAddr) -> Result<usize>;

    /// Returns the local address the transport is bound to.
    fn local_addr(&self) -> Result<SocketAddr>;

    /// Shuts the transport down; subsequent operations fail with
    /// [`crate::error::TransportError::ShuttingDown`].
    async fn shutdown(&self) -> Result<()>;

    /// Checks whether the transport is still active.
    fn is_active(&self) -> bool;
}
