// ============================================
// File: crates/fieldgate-core/src/protocol/messages.rs
// ============================================
//! # Protocol Message Definitions
//!
//! ## Creation Reason
//! Defines the structure of all envelopes exchanged between the
//! FieldGate gateway and field sensors.
//!
//! ## Main Functionality
//! - `Envelope`: Tagged enum covering every wire message
//! - Constructor helpers that stamp the current timestamp
//!
//! ## Wire Format (JSON, flat)
//! Every envelope is a flat JSON object with a mandatory `type`
//! discriminant and a `timestamp` in Unix seconds.
//!
//! | `type` | direction |
//! |--------|-----------|
//! | `register` | sensor → gateway |
//! | `register_ack` / `register_denied` | gateway → sensor |
//! | `data` | sensor → gateway |
//! | `data_ack` / `invalid_token` / `request_resend` | gateway → sensor |
//! | `activity_check` | gateway → sensor |
//! | `activity_ack` | sensor → gateway |
//!
//! ## ⚠️ Important Note for Next Developer
//! - `crc32` is deliberately a raw JSON value, not a `u32`: a data
//!   message with a non-integer checksum must still decode so the
//!   gateway can answer it with `request_resend`
//! - Unknown extra fields in inbound envelopes are ignored
//!
//! ## Last Modified
//! v0.1.0 - Initial message definitions

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use fieldgate_common::time::Timestamp;
use fieldgate_common::types::{Category, SensorId, Token};

// ============================================
// Constants
// ============================================

/// Fixed denial reason carried in `register_denied` envelopes.
pub const REASON_TYPE_BUSY: &str = "type_busy";

// ============================================
// Envelope
// ============================================

/// A protocol envelope, discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Envelope {
    /// Registration request from a sensor.
    Register {
        /// Sensor identity; absent or empty identities are rejected
        /// locally with no reply.
        #[serde(default)]
        sensor_id: Option<SensorId>,
        /// Sensor category (device class).
        sensor_type: Category,
        /// Unix seconds, sensor clock.
        timestamp: Timestamp,
    },

    /// Positive registration reply carrying the issued token.
    RegisterAck {
        /// Registered sensor identity.
        sensor_id: SensorId,
        /// Freshly issued session token.
        token: Token,
        /// Unix seconds, gateway clock.
        timestamp: Timestamp,
    },

    /// Negative registration reply: the category is held by another
    /// sensor identity.
    ///
    /// Deliberately carries no `sensor_id` of its own: the reply goes
    /// back to the applicant's address, and the applicant never
    /// obtained an accepted identity to echo. Deployed sensors parse
    /// this shape, so it stays frozen.
    RegisterDenied {
        /// Always [`REASON_TYPE_BUSY`].
        reason: String,
        /// The contested category.
        sensor_type: Category,
        /// The identity currently holding the category.
        active_sensor_id: SensorId,
        /// Unix seconds, gateway clock.
        timestamp: Timestamp,
    },

    /// Telemetry payload from a registered sensor.
    Data {
        /// Sensor identity.
        sensor_id: SensorId,
        /// Session token; absence yields `invalid_token`.
        #[serde(default)]
        token: Option<Token>,
        /// Unix seconds, sensor clock.
        timestamp: Timestamp,
        /// Payload fields (field name → scalar value).
        #[serde(default)]
        data: Map<String, Value>,
        /// CRC-32 over the canonical form of `data`. Kept as a raw
        /// JSON value so non-integer checksums decode and fail
        /// verification instead of failing the whole envelope.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        crc32: Option<Value>,
        /// Battery warning flag.
        #[serde(default)]
        low_battery: bool,
    },

    /// Positive acknowledgment of a verified data message.
    DataAck {
        /// Sensor identity.
        sensor_id: SensorId,
        /// Unix seconds, gateway clock.
        timestamp: Timestamp,
    },

    /// Token mismatch or absence on a data message.
    InvalidToken {
        /// Sensor identity from the offending message.
        sensor_id: SensorId,
        /// Unix seconds, gateway clock.
        timestamp: Timestamp,
    },

    /// Integrity failure: ask the sensor to resend its last payload.
    RequestResend {
        /// Sensor identity.
        sensor_id: SensorId,
        /// Unix seconds, gateway clock.
        timestamp: Timestamp,
    },

    /// Heartbeat probe sent by the gateway after a period of silence.
    ActivityCheck {
        /// Sensor category.
        sensor_type: Category,
        /// Sensor identity.
        sensor_id: SensorId,
        /// The sensor's current session token.
        token: Token,
        /// Unix seconds, gateway clock.
        timestamp: Timestamp,
        /// Always `false` on probes.
        low_battery: bool,
        /// Probe attempt number, starting at 1.
        attempt: u32,
    },

    /// Heartbeat acknowledgment from a sensor.
    ActivityAck {
        /// Sensor identity.
        sensor_id: SensorId,
        /// Session token; must match the registry to count.
        #[serde(default)]
        token: Option<Token>,
        /// Unix seconds, sensor clock.
        timestamp: Timestamp,
    },
}

impl Envelope {
    /// All recognized `type` discriminants.
    pub const KNOWN_TYPES: &'static [&'static str] = &[
        "register",
        "register_ack",
        "register_denied",
        "data",
        "data_ack",
        "invalid_token",
        "request_resend",
        "activity_check",
        "activity_ack",
    ];

    /// Builds a `register_ack` reply stamped with the current time.
    #[must_use]
    pub fn register_ack(sensor_id: SensorId, token: Token) -> Self {
        Self::RegisterAck {
            sensor_id,
            token,
            timestamp: Timestamp::now(),
        }
    }

    /// Builds a `register_denied` reply stamped with the current time.
    #[must_use]
    pub fn register_denied(sensor_type: Category, active_sensor_id: SensorId) -> Self {
        Self::RegisterDenied {
            reason: REASON_TYPE_BUSY.to_string(),
            sensor_type,
            active_sensor_id,
            timestamp: Timestamp::now(),
        }
    }

    /// Builds a `data_ack` reply stamped with the current time.
    #[must_use]
    pub fn data_ack(sensor_id: SensorId) -> Self {
        Self::DataAck {
            sensor_id,
            timestamp: Timestamp::now(),
        }
    }

    /// Builds an `invalid_token` reply stamped with the current time.
    #[must_use]
    pub fn invalid_token(sensor_id: SensorId) -> Self {
        Self::InvalidToken {
            sensor_id,
            timestamp: Timestamp::now(),
        }
    }

    /// Builds a `request_resend` reply stamped with the current time.
    #[must_use]
    pub fn request_resend(sensor_id: SensorId) -> Self {
        Self::RequestResend {
            sensor_id,
            timestamp: Timestamp::now(),
        }
    }

    /// Builds an `activity_check` probe stamped with the current time.
    #[must_use]
    pub fn activity_check(
        sensor_id: SensorId,
        sensor_type: Category,
        token: Token,
        attempt: u32,
    ) -> Self {
        Self::ActivityCheck {
            sensor_type,
            sensor_id,
            token,
            timestamp: Timestamp::now(),
            low_battery: false,
            attempt,
        }
    }

    /// Returns the sensor identity carried by this envelope, if any.
    #[must_use]
    pub fn sensor_id(&self) -> Option<&SensorId> {
        match self {
            Self::Register { sensor_id, .. } => sensor_id.as_ref(),
            Self::RegisterAck { sensor_id, .. }
            | Self::Data { sensor_id, .. }
            | Self::DataAck { sensor_id, .. }
            | Self::InvalidToken { sensor_id, .. }
            | Self::RequestResend { sensor_id, .. }
            | Self::ActivityCheck { sensor_id, .. }
            | Self::ActivityAck { sensor_id, .. } => Some(sensor_id),
            Self::RegisterDenied { .. } => None,
        }
    }

    /// Returns the wire discriminant for this envelope.
    #[must_use]
    pub const fn message_type(&self) -> &'static str {
        match self {
            Self::Register { .. } => "register",
            Self::RegisterAck { .. } => "register_ack",
            Self::RegisterDenied { .. } => "register_denied",
            Self::Data { .. } => "data",
            Self::DataAck { .. } => "data_ack",
            Self::InvalidToken { .. } => "invalid_token",
            Self::RequestResend { .. } => "request_resend",
            Self::ActivityCheck { .. } => "activity_check",
            Self::ActivityAck { .. } => "activity_ack",
        }
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_roundtrip() {
        let json = r#"{"type":"register","sensor_id":"T001","sensor_type":"ThermoNode","timestamp":1700000000}"#;
        let env: Envelope = serde_json::from_str(json).unwrap();

        match &env {
            Envelope::Register {
                sensor_id,
                sensor_type,
                timestamp,
            } => {
                assert_eq!(sensor_id.as_ref().unwrap().as_str(), "T001");
                assert_eq!(sensor_type.as_str(), "ThermoNode");
                assert_eq!(timestamp.as_secs(), 1_700_000_000);
            }
            other => panic!("Unexpected envelope: {other:?}"),
        }
    }

    #[test]
    fn test_register_without_identity_decodes() {
        let json = r#"{"type":"register","sensor_type":"ThermoNode","timestamp":1700000000}"#;
        let env: Envelope = serde_json::from_str(json).unwrap();
        assert!(env.sensor_id().is_none());
    }

    #[test]
    fn test_data_with_non_integer_crc_decodes() {
        let json = r#"{"type":"data","sensor_id":"T001","token":"TOKEN_1","timestamp":1700000000,"data":{"temp":21.5},"crc32":"oops"}"#;
        let env: Envelope = serde_json::from_str(json).unwrap();

        match env {
            Envelope::Data { crc32, .. } => {
                assert_eq!(crc32, Some(serde_json::json!("oops")));
            }
            other => panic!("Unexpected envelope: {other:?}"),
        }
    }

    #[test]
    fn test_data_defaults() {
        let json = r#"{"type":"data","sensor_id":"T001","timestamp":1700000000}"#;
        let env: Envelope = serde_json::from_str(json).unwrap();

        match env {
            Envelope::Data {
                token,
                data,
                crc32,
                low_battery,
                ..
            } => {
                assert!(token.is_none());
                assert!(data.is_empty());
                assert!(crc32.is_none());
                assert!(!low_battery);
            }
            other => panic!("Unexpected envelope: {other:?}"),
        }
    }

    #[test]
    fn test_register_denied_shape() {
        let env = Envelope::register_denied("ThermoNode".into(), "T001".into());
        let value = serde_json::to_value(&env).unwrap();

        assert_eq!(value["type"], "register_denied");
        assert_eq!(value["reason"], REASON_TYPE_BUSY);
        assert_eq!(value["active_sensor_id"], "T001");
    }

    #[test]
    fn test_activity_check_shape() {
        let env = Envelope::activity_check(
            "T001".into(),
            "ThermoNode".into(),
            fieldgate_common::Token::new("TOKEN_1"),
            3,
        );
        let value = serde_json::to_value(&env).unwrap();

        assert_eq!(value["type"], "activity_check");
        assert_eq!(value["attempt"], 3);
        assert_eq!(value["low_battery"], false);
        assert_eq!(value["token"], "TOKEN_1");
    }

    #[test]
    fn test_message_type_matches_known_types() {
        let env = Envelope::data_ack("T001".into());
        assert!(Envelope::KNOWN_TYPES.contains(&env.message_type()));
    }

    #[test]
    fn test_extra_fields_ignored() {
        let json = r#"{"type":"activity_ack","sensor_id":"T001","token":"TOKEN_1","timestamp":1700000000,"rssi":-71}"#;
        let env: Envelope = serde_json::from_str(json).unwrap();
        assert_eq!(env.message_type(), "activity_ack");
    }
}
