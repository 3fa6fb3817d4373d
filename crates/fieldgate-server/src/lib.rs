// ============================================
// File: crates/fieldgate-server/src/lib.rs
// ============================================
//! # FieldGate Server Library
//!
//! ## Creation Reason
//! Provides the gateway implementation for the FieldGate telemetry
//! network, orchestrating registration, data ingestion, and liveness
//! monitoring over one UDP endpoint.
//!
//! ## Main Functionality
//!
//! ### Modules
//! - [`config`]: Gateway configuration management
//! - [`server`]: Main server orchestration
//! - [`services`]: Business logic services
//!   - [`services::registry`]: Sensor records and probe state
//!   - [`services::registration`]: Token issuance and exclusivity
//!   - [`services::monitor`]: Heartbeat probing
//!   - [`services::emitter`]: Outbound envelope sends
//! - [`handlers`]: Inbound datagram dispatch
//! - [`error`]: Gateway-specific error types
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      FieldGate Server                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │  ┌─────────────┐     ┌─────────────┐     ┌──────────────┐  │
//! │  │   Config    │────►│   Server    │────►│  Dispatcher  │  │
//! │  │   Manager   │     │Orchestrator │     │              │  │
//! │  └─────────────┘     └──────┬──────┘     └──────┬───────┘  │
//! │                             │                   │          │
//! │         ┌───────────────────┼─────────────────┬─┘          │
//! │         ▼                   ▼                 ▼            │
//! │  ┌─────────────┐     ┌─────────────┐   ┌─────────────┐    │
//! │  │   Sensor    │     │  Liveness   │   │ Registration│    │
//! │  │  Registry   │     │  Monitor    │   │  Service    │    │
//! │  └─────────────┘     └─────────────┘   └─────────────┘    │
//! │                                                            │
//! ├────────────────────────────────────────────────────────────┤
//! │                     Transport Layer                        │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │              UDP Transport (sensor datagrams)        │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Data Flow
//! ```text
//! Sensor → UDP → Decode → Route → Reply
//! Gateway → activity_check → Sensor (after 15s of silence)
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Configuration changes require restart (no hot-reload)
//! - Graceful shutdown waits for the receive and monitor tasks
//! - Sensor records are never evicted
//!
//! ## Last Modified
//! v0.1.0 - Initial server library

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod server;
pub mod services;

// Re-export primary types
pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use server::Server;
