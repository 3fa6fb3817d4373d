// ============================================
// File: crates/fieldgate-server/src/services/mod.rs
// ============================================
//! # Gateway Services
//!
//! ## Creation Reason
//! Provides business logic services for the FieldGate gateway,
//! separated from transport and protocol concerns.
//!
//! ## Main Functionality
//!
//! ### Submodules
//! - [`registry`]: Sensor records, category exclusivity, probe state
//! - [`registration`]: Token issuance and registration decisions
//! - [`monitor`]: Heartbeat probing and liveness notifications
//! - [`emitter`]: Outbound envelope serialization and best-effort send
//!
//! ## Service Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Service Layer                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │  ┌──────────────────────┐   ┌────────────────────────────┐ │
//! │  │ RegistrationService  │   │      SensorRegistry        │ │
//! │  │                      │──►│  - Records + categories    │ │
//! │  │  - Issue tokens      │   │  - Probe state machine     │ │
//! │  │  - Exclusivity rule  │   │  - Resend debounce         │ │
//! │  └──────────────────────┘   └──────────────┬─────────────┘ │
//! │                                            │               │
//! │  ┌──────────────────────┐   ┌──────────────▼─────────────┐ │
//! │  │   ResponseEmitter    │◄──│      LivenessMonitor       │ │
//! │  │                      │   │  - 200ms scan cycle        │ │
//! │  │  - Compact JSON      │   │  - activity_check probes   │ │
//! │  │  - Swallow failures  │   │  - (dis)connect notices    │ │
//! │  └──────────────────────┘   └────────────────────────────┘ │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Services are designed to be testable in isolation
//! - Thread-safe by design (Send + Sync)
//! - The registry lock is never held across an await point
//!
//! ## Last Modified
//! v0.1.0 - Initial services structure

pub mod emitter;
pub mod monitor;
pub mod registration;
pub mod registry;

// Re-export primary types
pub use emitter::ResponseEmitter;
pub use monitor::LivenessMonitor;
pub use registration::{RegistrationOutcome, RegistrationService};
pub use registry::{ProbeState, ProbeTiming, SensorRecord, SensorRegistry};
