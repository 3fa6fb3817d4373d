// ============================================
// File: crates/fieldgate-common/src/lib.rs
// ============================================
//! # FieldGate Common - Shared Utilities Library
//!
//! ## Creation Reason
//! Provides foundational types shared across all FieldGate crates,
//! ensuring consistency and reducing code duplication.
//!
//! ## Main Functionality
//! - [`types`]: Core identifiers (`SensorId`, `Category`, `Token`)
//! - [`time`]: Wall-clock timestamp type for protocol envelopes
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              fieldgate-server                       │
//! │                    │                                │
//! │         ┌──────────┴──────────┐                     │
//! │         ▼                     ▼                     │
//! │   fieldgate-core       fieldgate-transport          │
//! │         │                     │                     │
//! │         └──────────┬──────────┘                     │
//! │                    ▼                                │
//! │             fieldgate-common  ◄── You are here      │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dependencies
//! - No internal crate dependencies (leaf node)
//! - Minimal external dependencies for maximum compatibility
//!
//! ## ⚠️ Important Note for Next Developer
//! - This crate is the foundation - changes affect everything
//! - Keep dependencies minimal
//! - All public types should implement standard traits (Debug, Clone, etc.)
//!
//! ## Last Modified
//! v0.1.0 - Initial implementation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod time;
pub mod types;

// Re-export commonly used items at crate root
pub use time::Timestamp;
pub use types::{Category, SensorId, Token};
