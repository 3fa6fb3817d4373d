// ============================================
// File: crates/fieldgate-core/src/lib.rs
// ============================================
//! # FieldGate Core - Protocol and Integrity Library
//!
//! ## Creation Reason
//! Implements the transport-independent pieces of the gateway: the
//! JSON envelope protocol, canonical-form integrity checking, and
//! session token generation.
//!
//! ## Main Functionality
//! - [`protocol`]: Envelope definitions and JSON codec
//! - [`integrity`]: Canonical form + CRC-32 verification
//! - [`token`]: Token generation strategies
//! - [`error`]: Core error types
//!
//! ## Design Philosophy
//! Everything here is pure or near-pure: no sockets, no registry
//! state, no clocks beyond timestamp stamping. The server crate
//! composes these pieces with transport and state.
//!
//! ## Last Modified
//! v0.1.0 - Initial core library

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod integrity;
pub mod protocol;
pub mod token;

// Re-export primary types
pub use error::{CoreError, Result};
pub use protocol::{decode_envelope, encode_envelope, Envelope};
pub use token::TokenGenerator;
