// ============================================
// File: crates/fieldgate-server/src/services/monitor.rs
// ============================================
//! # Liveness Monitor
//!
//! ## Creation Reason
//! Periodically scans the sensor registry, sends `activity_check`
//! probes to quiet sensors, and announces disconnections and
//! reconnections.
//!
//! ## Main Functionality
//! - `tick(now)`: One scan cycle - registry transitions, then probe
//!   sends and notifications
//! - `note_reconnected()`: Announces a cleared probe episode
//!
//! ## Notification Discipline
//! - "disconnected" is logged at WARN once per missed probe deadline
//! - "reconnected" is logged at INFO once per cleared episode; the
//!   dispatcher calls [`LivenessMonitor::note_reconnected`] when a
//!   data message or activity acknowledgment clears a probe
//!
//! ## ⚠️ Important Note for Next Developer
//! - `tick()` takes `now` as a parameter so tests drive time
//!   directly; the server task feeds it `Instant::now()`
//! - All registry transitions happen inside `SensorRegistry::tick`;
//!   this type only performs the I/O those transitions decided
//!
//! ## Last Modified
//! v0.1.0 - Initial monitor implementation

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use fieldgate_common::types::SensorId;
use fieldgate_core::protocol::Envelope;

use crate::services::emitter::ResponseEmitter;
use crate::services::registry::SensorRegistry;

// ============================================
// LivenessMonitor
// ============================================

/// Drives the heartbeat state machine for all registered sensors.
pub struct LivenessMonitor {
    registry: Arc<SensorRegistry>,
    emitter: Arc<ResponseEmitter>,
}

impl LivenessMonitor {
    /// Creates a new monitor.
    #[must_use]
    pub fn new(registry: Arc<SensorRegistry>, emitter: Arc<ResponseEmitter>) -> Self {
        Self { registry, emitter }
    }

    /// Runs one scan cycle at `now`.
    ///
    /// Registry transitions are computed first, under the registry
    /// lock; probes and log lines follow with the lock released.
    pub async fn tick(&self, now: Instant) {
        let outcome = self.registry.tick(now);

        for missed in &outcome.missed {
            if missed.exhausted {
                warn!(
                    sensor_id = %missed.sensor_id,
                    attempts = missed.attempts,
                    "Sensor disconnected; probe budget spent, giving up"
                );
            } else {
                warn!(
                    sensor_id = %missed.sensor_id,
                    attempts = missed.attempts,
                    "Sensor disconnected; probe unanswered"
                );
            }
        }

        for probe in outcome.probes {
            let envelope = Envelope::activity_check(
                probe.sensor_id.clone(),
                probe.category,
                probe.token,
                probe.attempt,
            );
            self.emitter.send(probe.addr, &envelope).await;
        }
    }

    /// Announces that a probe episode ended because the sensor spoke.
    ///
    /// Called by the dispatcher after [`SensorRegistry::clear_probe`]
    /// returned a non-`Active` previous state.
    pub fn note_reconnected(sensor_id: &SensorId) {
        info!(sensor_id = %sensor_id, "Sensor reconnected");
    }
}

impl std::fmt::Debug for LivenessMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LivenessMonitor")
            .field("sensors", &self.registry.count())
            .finish_non_exhaustive()
    }
}

// ============================================
// Tests
// ============================================
