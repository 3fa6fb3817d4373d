// ============================================
// File: crates/fieldgate-server/src/handlers/mod.rs
// ============================================
//! # Datagram Handlers
//!
//! ## Creation Reason
//! Provides the inbound datagram processing logic sitting between
//! the transport layer and the services.
//!
//! ## Main Functionality
//!
//! ### Submodules
//! - [`dispatcher`]: Decode, route, reply
//!
//! ## Data Flow
//! ```text
//! Sensor → UDP:
//!   1. Receive datagram
//!   2. Decode envelope (malformed / unknown → drop + log)
//!   3. Route: register / data / activity_ack
//!   4. Reply via ResponseEmitter (or stay silent)
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - The dispatcher never returns an error; protocol violations are
//!   answered or dropped, they must not stop the receive loop
//!
//! ## Last Modified
//! v0.1.0 - Initial handlers structure

pub mod dispatcher;

pub use dispatcher::Dispatcher;
