// ============================================
// File: crates/fieldgate-common/src/time.rs
// ============================================
//! # Time Utilities
//!
//! ## Creation Reason
//! Provides the wall-clock timestamp type carried in protocol envelopes.
//! Monotonic timing (probe deadlines, silence detection) uses
//! `std::time::Instant` directly and never goes through this module.
//!
//! ## Main Functionality
//! - `Timestamp`: Unix timestamp in seconds, serialized as a bare integer
//! - `unix_timestamp()`: convenience accessor for the current time
//!
//! ## ⚠️ Important Note for Next Developer
//! - Envelope timestamps are informational; liveness decisions are made
//!   from monotonic instants, never from sensor-supplied timestamps
//!
//! ## Last Modified
//! v0.1.0 - Initial time utilities

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// ============================================
// Timestamp
// ============================================

/// Unix timestamp in seconds.
///
/// # Purpose
/// Carried in every protocol envelope as the `timestamp` field.
///
/// # Example
/// ```
/// use fieldgate_common::time::Timestamp;
///
/// let now = Timestamp::now();
/// assert!(now.as_secs() > 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a new timestamp from Unix seconds.
    #[must_use]
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs)
    }

    /// Creates a timestamp for the current time.
    #[must_use]
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("System time before Unix epoch")
            .as_secs() as i64;
        Self(secs)
    }

    /// Returns the Unix timestamp in seconds.
    #[must_use]
    pub const fn as_secs(&self) -> i64 {
        self.0
    }
}

impl From<i64> for Timestamp {
    fn from(secs: i64) -> Self {
        Self(secs)
    }
}

impl From<Timestamp> for i64 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================
// Utility Functions
// ============================================

/// Returns the current Unix timestamp in seconds.
#[must_use]
pub fn unix_timestamp() -> i64 {
    Timestamp::now().as_secs()
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_now() {
        let ts = Timestamp::now();
        // Sanity: after 2020, before 2100
        assert!(ts.as_secs() > 1_577_836_800);
        assert!(ts.as_secs() < 4_102_444_800);
    }

    #[test]
    fn test_timestamp_serde_transparent() {
        let ts = Timestamp::from_secs(1_700_000_000);
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "1700000000");

        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn test_timestamp_ordering() {
        let a = Timestamp::from_secs(100);
        let b = Timestamp::from_secs(200);
        assert!(a < b);
    }
}
