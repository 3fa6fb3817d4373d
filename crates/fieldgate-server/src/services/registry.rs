// ============================================
// File: crates/fieldgate-server/src/services/registry.rs
// ============================================
//! # Sensor Registry Service
//!
//! ## Creation Reason
//! Tracks every sensor the gateway has ever accepted, enforces the
//! one-identity-per-category rule, and drives the per-sensor liveness
//! probe state machine.
//!
//! ## Main Functionality
//! - `SensorRecord`: Per-sensor state (category, token, endpoint,
//!   last activity, probe state)
//! - `ProbeState`: Liveness probe state machine
//! - `SensorRegistry`: Thread-safe registry with atomic operations
//! - `tick()`: One monitor scan cycle, returning probes to send
//!
//! ## Probe Lifecycle
//! ```text
//! ┌────────┐ silence >= 15s   ┌─────────┐ deadline missed  ┌─────────┐
//! │ Active │ ───────────────► │ Probing │ ───────────────► │ Backoff │
//! └────────┘   (send probe)   └─────────┘  (disconnected)  └────┬────┘
//!     ▲                            ▲                            │
//!     │                            │  retry delay elapsed       │
//!     │                            └────────────────────────────┤
//!     │                               (send probe, attempt+1)   │
//!     │  data / activity_ack                                    │ attempts
//!     │  (reconnected)         ┌───────────┐                    │ == 10
//!     └─────────────────────── │ Exhausted │ ◄──────────────────┘
//!                              └───────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - One mutex guards records, the category map, and the resend
//!   debounce stamps; every public operation is a single critical
//!   section
//! - Never perform network I/O while the lock is held - `tick()`
//!   returns the probes to send, it does not send them
//! - Records are never evicted; an exhausted sensor keeps its
//!   category slot until restart
//!
//! ## Last Modified
//! v0.1.0 - Initial registry implementation

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::debug;

use fieldgate_common::types::{Category, SensorId, Token};

// ============================================
// ProbeState
// ============================================

/// Liveness probe state for a single sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    /// Sensor is considered alive; no probe outstanding.
    Active,
    /// A probe was sent and its answer is still pending.
    Probing {
        /// Probe attempts made so far (>= 1).
        attempts: u32,
        /// When the outstanding probe expires.
        deadline: Instant,
    },
    /// The last probe went unanswered; waiting before the next one.
    Backoff {
        /// Probe attempts made so far (>= 1).
        attempts: u32,
        /// When the next probe may be sent.
        next_at: Instant,
    },
    /// The attempt budget is spent; the sensor is left alone until it
    /// sends something.
    Exhausted,
}

impl ProbeState {
    /// Checks whether this state is part of an unresolved probe
    /// episode (anything but `Active`).
    #[must_use]
    pub const fn in_episode(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

// ============================================
// ProbeTiming
// ============================================

/// Timing constants for the probe state machine.
#[derive(Debug, Clone, Copy)]
pub struct ProbeTiming {
    /// Silence duration before the first probe.
    pub silence_threshold: Duration,
    /// How long a sensor has to answer a probe.
    pub probe_timeout: Duration,
    /// Delay between a missed probe and the next attempt.
    pub retry_delay: Duration,
    /// Maximum probe attempts per episode.
    pub max_attempts: u32,
    /// Minimum spacing between resend requests per sensor.
    pub resend_debounce: Duration,
}

impl Default for ProbeTiming {
    fn default() -> Self {
        Self {
            silence_threshold: Duration::from_secs(15),
            probe_timeout: Duration::from_secs(1),
            retry_delay: Duration::from_secs(5),
            max_attempts: 10,
            resend_debounce: Duration::from_secs(1),
        }
    }
}

// ============================================
// SensorRecord
// ============================================

/// Per-sensor registry state.
#[derive(Debug, Clone)]
pub struct SensorRecord {
    /// Sensor category (exclusivity key).
    pub category: Category,
    /// Current session token.
    pub token: Token,
    /// Endpoint the sensor last transmitted from.
    pub last_addr: SocketAddr,
    /// Monotonic instant of the last accepted message.
    pub last_seen: Instant,
    /// Probe state machine position.
    pub probe: ProbeState,
}

// ============================================
// Registration Outcome
// ============================================

/// Result of a registration attempt against the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The identity now holds its category.
    Accepted,
    /// Another identity holds the category; nothing was changed.
    CategoryBusy {
        /// The identity currently holding the category.
        active_id: SensorId,
    },
}

// ============================================
// Tick Output
// ============================================

/// A probe the monitor must send after the tick releases the lock.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub sensor_id: SensorId,
    pub category: Category,
    pub token: Token,
    pub addr: SocketAddr,
    /// Attempt number carried in the probe (starts at 1).
    pub attempt: u32,
}

/// A sensor whose probe deadline passed during the tick.
#[derive(Debug, Clone)]
pub struct MissedProbe {
    pub sensor_id: SensorId,
    /// Attempts made so far, including the missed one.
    pub attempts: u32,
    /// True when the attempt budget is now spent.
    pub exhausted: bool,
}

/// Everything one tick decided; I/O and logging happen afterwards.
#[derive(Debug, Default)]
pub struct TickOutcome {
    pub probes: Vec<ProbeRequest>,
    pub missed: Vec<MissedProbe>,
}

impl TickOutcome {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.probes.is_empty() && self.missed.is_empty()
    }
}

// ============================================
// SensorRegistry
// ============================================

/// Interior state, guarded by a single mutex.
#[derive(Debug, Default)]
struct RegistryInner {
    records: HashMap<SensorId, SensorRecord>,
    active_by_category: HashMap<Category, SensorId>,
    resend_stamps: HashMap<SensorId, Instant>,
}

/// Thread-safe sensor registry shared by the dispatcher and the
/// liveness monitor.
pub struct SensorRegistry {
    inner: Mutex<RegistryInner>,
    timing: ProbeTiming,
}

impl SensorRegistry {
    /// Creates an empty registry with the given probe timing.
    #[must_use]
    pub fn new(timing: ProbeTiming) -> Self {
        Self {
            inner: Mutex::new(RegistryInner::default()),
            timing,
        }
    }

    /// Registers or re-registers a sensor, enforcing category
    /// exclusivity.
    ///
    /// On acceptance the record is created or refreshed with the new
    /// token and endpoint, `last_seen` is set to `now`, and the
    /// category slot is claimed. An existing probe state is left
    /// untouched; only valid data or an activity acknowledgment
    /// clears it. On denial nothing changes.
    pub fn upsert_on_register(
        &self,
        id: &SensorId,
        category: &Category,
        addr: SocketAddr,
        token: Token,
        now: Instant,
    ) -> RegisterOutcome {
        let mut inner = self.inner.lock();

        if let Some(active_id) = inner.active_by_category.get(category) {
            if active_id != id {
                return RegisterOutcome::CategoryBusy {
                    active_id: active_id.clone(),
                };
            }
        }

        // Same identity switching category releases its old slot
        let old_category = inner
            .records
            .get(id)
            .filter(|r| r.category != *category)
            .map(|r| r.category.clone());
        if let Some(old) = old_category {
            inner.active_by_category.remove(&old);
        }

        let probe = inner
            .records
            .get(id)
            .map_or(ProbeState::Active, |r| r.probe);

        inner.records.insert(
            id.clone(),
            SensorRecord {
                category: category.clone(),
                token,
                last_addr: addr,
                last_seen: now,
                probe,
            },
        );
        inner.active_by_category.insert(category.clone(), id.clone());

        RegisterOutcome::Accepted
    }

    /// Returns a snapshot of a sensor's record.
    #[must_use]
    pub fn lookup(&self, id: &SensorId) -> Option<SensorRecord> {
        self.inner.lock().records.get(id).cloned()
    }

    /// Refreshes a sensor's activity instant and endpoint.
    pub fn touch(&self, id: &SensorId, addr: SocketAddr, now: Instant) {
        let mut inner = self.inner.lock();
        if let Some(record) = inner.records.get_mut(id) {
            record.last_seen = now;
            record.last_addr = addr;
        }
    }

    /// Returns a sensor's current probe state.
    #[must_use]
    pub fn get_probe(&self, id: &SensorId) -> Option<ProbeState> {
        self.inner.lock().records.get(id).map(|r| r.probe)
    }

    /// Overwrites a sensor's probe state.
    pub fn set_probe(&self, id: &SensorId, state: ProbeState) {
        let mut inner = self.inner.lock();
        if let Some(record) = inner.records.get_mut(id) {
            record.probe = state;
        }
    }

    /// Resets a sensor's probe state to `Active` and returns the
    /// previous state, in one critical section.
    ///
    /// The caller decides whether the previous state counts as a
    /// reconnection (any state but `Active` does).
    pub fn clear_probe(&self, id: &SensorId) -> Option<ProbeState> {
        let mut inner = self.inner.lock();
        inner.records.get_mut(id).map(|record| {
            let previous = record.probe;
            record.probe = ProbeState::Active;
            previous
        })
    }

    /// Records sensor activity: refreshes `last_seen` and the
    /// endpoint, resets the probe state to `Active`, and returns the
    /// previous state, all in one critical section.
    ///
    /// This is the ack path's entry point. A monitor tick cannot
    /// observe the refreshed `last_seen` together with a stale probe
    /// episode, so an answered probe never reads as a missed one.
    pub fn record_activity(
        &self,
        id: &SensorId,
        addr: SocketAddr,
        now: Instant,
    ) -> Option<ProbeState> {
        let mut inner = self.inner.lock();
        inner.records.get_mut(id).map(|record| {
            record.last_seen = now;
            record.last_addr = addr;
            let previous = record.probe;
            record.probe = ProbeState::Active;
            previous
        })
    }

    /// Checks the resend debounce for a sensor, claiming the slot if
    /// it is free.
    ///
    /// Returns `true` at most once per debounce window per sensor;
    /// the stamp is updated in the same critical section.
    pub fn should_request_resend(&self, id: &SensorId, now: Instant) -> bool {
        let mut inner = self.inner.lock();
        let allowed = inner
            .resend_stamps
            .get(id)
            .map_or(true, |last| now.duration_since(*last) >= self.timing.resend_debounce);

        if allowed {
            inner.resend_stamps.insert(id.clone(), now);
        }
        allowed
    }

    /// Returns every known sensor identity.
    #[must_use]
    pub fn known_ids(&self) -> Vec<SensorId> {
        self.inner.lock().records.keys().cloned().collect()
    }

    /// Returns the number of registered sensors.
    #[must_use]
    pub fn count(&self) -> usize {
        self.inner.lock().records.len()
    }

    /// Runs one monitor scan cycle at `now`.
    ///
    /// Advances every sensor's probe state machine and returns the
    /// probes to send and the deadlines that were missed. All state
    /// transitions happen under the lock; the caller performs the
    /// sends and notifications afterwards.
    pub fn tick(&self, now: Instant) -> TickOutcome {
        let mut inner = self.inner.lock();
        let mut outcome = TickOutcome::default();

        for (id, record) in &mut inner.records {
            match record.probe {
                ProbeState::Active => {
                    let silent = now.duration_since(record.last_seen);
                    if silent >= self.timing.silence_threshold {
                        record.probe = ProbeState::Probing {
                            attempts: 1,
                            deadline: now + self.timing.probe_timeout,
                        };
                        outcome.probes.push(ProbeRequest {
                            sensor_id: id.clone(),
                            category: record.category.clone(),
                            token: record.token.clone(),
                            addr: record.last_addr,
                            attempt: 1,
                        });
                    }
                }
                ProbeState::Probing { attempts, deadline } => {
                    if now >= deadline {
                        let exhausted = attempts >= self.timing.max_attempts;
                        record.probe = if exhausted {
                            ProbeState::Exhausted
                        } else {
                            ProbeState::Backoff {
                                attempts,
                                next_at: now + self.timing.retry_delay,
                            }
                        };
                        outcome.missed.push(MissedProbe {
                            sensor_id: id.clone(),
                            attempts,
                            exhausted,
                        });
                    }
                }
                ProbeState::Backoff { attempts, next_at } => {
                    if now >= next_at {
                        let attempt = attempts + 1;
                        record.probe = ProbeState::Probing {
                            attempts: attempt,
                            deadline: now + self.timing.probe_timeout,
                        };
                        outcome.probes.push(ProbeRequest {
                            sensor_id: id.clone(),
                            category: record.category.clone(),
                            token: record.token.clone(),
                            addr: record.last_addr,
                            attempt,
                        });
                    }
                }
                ProbeState::Exhausted => {
                    // Left alone until the sensor sends something
                }
            }
        }

        outcome
    }

    /// Logs a one-line registry summary at debug level.
    pub fn log_summary(&self) {
        let ids = self.known_ids();
        let inner = self.inner.lock();
        debug!(
            sensors = ids.len(),
            categories = inner.active_by_category.len(),
            ids = ?ids,
            "Registry summary"
        );
    }
}

impl std::fmt::Debug for SensorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("SensorRegistry")
            .field("sensors", &inner.records.len())
            .field("categories", &inner.active_by_category.len())
            .field("timing", &self.timing)
            .finish()
    }
}

// ============================================
// Tests
// ============================================
