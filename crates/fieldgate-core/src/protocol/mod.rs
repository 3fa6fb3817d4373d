// ============================================
// File: crates/fieldgate-core/src/protocol/mod.rs
// ============================================
//! # Protocol Module
//!
//! ## Main Functionality
//! - [`messages`]: Envelope definitions for every wire message
//! - [`codec`]: JSON encode/decode with classified failure modes
//!
//! ## Last Modified
//! v0.1.0 - Initial protocol module

pub mod codec;
pub mod messages;

pub use codec::{decode_envelope, encode_envelope};
pub use messages::{Envelope, REASON_TYPE_BUSY};
