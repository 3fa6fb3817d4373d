// ============================================
// File: crates/fieldgate-transport/src/lib.rs
// ============================================
//! # FieldGate Transport Layer
//!
//! ## Creation Reason
//! Separates the datagram I/O concern from the gateway logic so the
//! dispatcher and liveness monitor can be tested without sockets.
//!
//! ## Main Functionality
//! - `Transport`: Abstract datagram transport interface
//! - `UdpTransport`: Production UDP implementation
//! - `MockTransport`: In-memory implementation for tests
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────┐
//! │   fieldgate-server      │
//! │  (dispatcher, monitor)  │
//! └───────────┬─────────────┘
//!             │ Transport trait
//! ┌───────────▼─────────────┐
//! │  UdpTransport │ Mock    │
//! └─────────────────────────┘
//! ```
//!
//! ## Last Modified
//! v0.1.0 - Initial transport layer

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod mock;
pub mod traits;
pub mod udp;

// Re-export commonly used types
pub use error::{Result, TransportError};
pub use mock::MockTransport;
pub use traits::{PacketSource, Transport};
pub use udp::UdpTransport;
