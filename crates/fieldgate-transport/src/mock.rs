// ============================================
// File: crates/fieldgate-transport/src/mock.rs
// ============================================
//! # Mock Transport Implementation
//!
//! ## Creation Reason
//! Provides an in-memory transport for testing the dispatcher, the
//! response emitter, and the liveness monitor without opening real
//! sockets.
//!
//! ## Main Functionality
//! - In-memory datagram queues
//! - Datagram injection for the receive path
//! - Capture of sent datagrams for verification
//! - Optional forced send failures
//!
//! ## Usage in Tests
//! ```ignore
//! let transport = MockTransport::new();
//! transport.inject(b"{...}".to_vec(), sensor_addr);
//!
//! let mut buf = [0u8; 65535];
//! let (len, source) = transport.recv(&mut buf).await.unwrap();
//! assert_eq!(source.addr, sensor_addr);
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - This is for testing only - do not use in production
//! - Queues are bounded to catch runaway test loops
//!
//! ## Last Modified
//! v0.1.0 - Initial mock implementation

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::error::{Result, TransportError};
use crate::traits::{PacketSource, Transport};

// ============================================
// Constants
// ============================================

/// Maximum number of datagrams to queue.
const MAX_QUEUE_SIZE: usize = 1000;

// ============================================
// MockTransport
// ============================================

/// Mock datagram transport for testing.
pub struct MockTransport {
    /// Local address reported by `local_addr()`
    local_addr: SocketAddr,
    /// Datagrams waiting to be received (injected by tests)
    recv_queue: Mutex<VecDeque<(Vec<u8>, SocketAddr)>>,
    /// Datagrams that have been sent (captured for verification)
    sent: Mutex<Vec<(Vec<u8>, SocketAddr)>>,
    /// When set, every `send()` fails with `SendFailed`
    fail_sends: AtomicBool,
    /// Shutdown flag
    shutdown: AtomicBool,
    /// Notify when new datagrams are available
    recv_notify: Notify,
}

impl MockTransport {
    /// Creates a new mock transport.
    #[must_use]
    pub fn new() -> Self {
        Self {
            local_addr: "127.0.0.1:5005".parse().expect("static address"),
            recv_queue: Mutex::new(VecDeque::with_capacity(16)),
            sent: Mutex::new(Vec::new()),
            fail_sends: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
            recv_notify: Notify::new(),
        }
    }

    /// Injects a datagram to be returned by a future `recv()` call.
    ///
    /// # Panics
    /// Panics if the queue is full (> `MAX_QUEUE_SIZE` datagrams).
    pub fn inject(&self, bytes: Vec<u8>, from: SocketAddr) {
        let mut queue = self.recv_queue.lock();
        assert!(queue.len() < MAX_QUEUE_SIZE, "Mock recv queue overflow");
        queue.push_back((bytes, from));
        drop(queue);
        self.recv_notify.notify_one();
    }

    /// Drains and returns all captured sent datagrams.
    #[must_use]
    pub fn take_sent(&self) -> Vec<(Vec<u8>, SocketAddr)> {
        std::mem::take(&mut *self.sent.lock())
    }

    /// Returns the number of captured sent datagrams without draining.
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    /// Makes every subsequent `send()` fail.
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn recv(&self, buf: &mut [u8]) -> Result<(usize, PacketSource)> {
        loop {
            if self.shutdown.load(Ordering::SeqCst) {
                return Err(TransportError::ShuttingDown);
            }

            if let Some((bytes, from)) = self.recv_queue.lock().pop_front() {
                let len = bytes.len().min(buf.len());
                buf[..len].copy_from_slice(&bytes[..len]);
                return Ok((len, PacketSource::new(from)));
            }

            self.recv_notify.notified().await;
        }
    }

    async fn send(&self, buf: &[u8], dest: &SocketAddr) -> Result<usize> {
        if self.shutdown.load(Ordering::SeqCst) {
            return Err(TransportError::ShuttingDown);
        }

        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(TransportError::SendFailed {
                dest: *dest,
                reason: "mock send failure".into(),
            });
        }

        self.sent.lock().push((buf.to_vec(), *dest));
        Ok(buf.len())
    }

    fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.local_addr)
    }

    async fn shutdown(&self) -> Result<()> {
        self.shutdown.store(true, Ordering::SeqCst);
        self.recv_notify.notify_waiters();
        Ok(())
    }

    fn is_active(&self) -> bool {
        !self.shutdown.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("queued", &self.recv_queue.lock().len())
            .field("sent", &self.sent_count())
            .finish()
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(port: u16) -> SocketAddr {
        format!("127.0.0.1:{port}").parse().unwrap()
    }

    #[tokio::test]
    async fn test_inject_and_recv() {
        let transport = MockTransport::new();
        transport.inject(b"hello".to_vec(), addr(9000));

        let mut buf = [0u8; 64];
        let (len, source) = transport.recv(&mut buf).await.unwrap();

        assert_eq!(&buf[..len], b"hello");
        assert_eq!(source.addr, addr(9000));
    }

    #[tokio::test]
    async fn test_send_capture() {
        let transport = MockTransport::new();
        transport.send(b"probe", &addr(9001)).await.unwrap();

        let sent = transport.take_sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, b"probe");
        assert_eq!(sent[0].1, addr(9001));

        // Draining empties the capture
        assert_eq!(transport.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_forced_send_failure() {
        let transport = MockTransport::new();
        transport.fail_sends(true);

        let result = transport.send(b"probe", &addr(9001)).await;
        assert!(matches!(result, Err(TransportError::SendFailed { .. })));
        assert_eq!(transport.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_unblocks_recv() {
        let transport = std::sync::Arc::new(MockTransport::new());

        let recv_task = {
            let transport = std::sync::Arc::clone(&transport);
            tokio::spawn(async move {
                let mut buf = [0u8; 64];
                transport.recv(&mut buf).await
            })
        };

        transport.shutdown().await.unwrap();
        let result = recv_task.await.unwrap();
        assert!(matches!(result, Err(TransportError::ShuttingDown)));
    }
}
