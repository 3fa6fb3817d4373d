// ============================================
// File: crates/fieldgate-core/src/protocol/codec.rs
// ============================================
//! # Protocol Codec
//!
//! ## Creation Reason
//! Provides JSON serialization and deserialization for protocol
//! envelopes, with decode failures split into the two classes the
//! dispatcher treats differently.
//!
//! ## Parsing Strategy
//! 1. Parse the datagram as a JSON value (failure → malformed)
//! 2. Peek the mandatory `type` discriminant (absent → malformed)
//! 3. Reject discriminants outside the known set (→ unknown type)
//! 4. Deserialize into [`Envelope`] (field errors → malformed)
//!
//! ## ⚠️ Important Note for Next Developer
//! - Outbound envelopes are encoded compact (no inter-token
//!   whitespace); sensors parse them with ordinary JSON parsers
//! - Step 3 exists so an unrecognized discriminant logs its name
//!   instead of a generic serde message
//!
//! ## Last Modified
//! v0.1.0 - Initial codec implementation

use serde_json::Value;

use crate::error::{CoreError, Result};
use crate::protocol::messages::Envelope;

// ============================================
// Decode
// ============================================

/// Decodes an inbound datagram into an [`Envelope`].
///
/// # Errors
/// - [`CoreError::MalformedEnvelope`] if the bytes are not a JSON
///   object, the `type` field is missing or not a string, or the
///   fields of a recognized type fail to deserialize
/// - [`CoreError::UnknownMessageType`] if `type` is well-formed but
///   not one of the recognized discriminants
pub fn decode_envelope(bytes: &[u8]) -> Result<Envelope> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| CoreError::malformed(e.to_string()))?;

    let discriminant = peek_type(&value)?;

    if !Envelope::KNOWN_TYPES.contains(&discriminant) {
        return Err(CoreError::unknown_type(discriminant));
    }

    serde_json::from_value(value).map_err(|e| CoreError::malformed(e.to_string()))
}

/// Extracts the `type` discriminant from a decoded JSON value
/// without consuming it.
///
/// # Errors
/// Returns [`CoreError::MalformedEnvelope`] if the value is not an
/// object or its `type` field is missing or not a string.
pub fn peek_type(value: &Value) -> Result<&str> {
    value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| CoreError::malformed("missing 'type' discriminant"))
}

// ============================================
// Encode
// ============================================

/// Encodes an envelope as compact JSON bytes.
///
/// # Errors
/// Returns [`CoreError::Encode`] if serialization fails.
pub fn encode_envelope(envelope: &Envelope) -> Result<Vec<u8>> {
    serde_json::to_vec(envelope).map_err(|e| CoreError::encode(e.to_string()))
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_register() {
        let bytes =
            br#"{"type":"register","sensor_id":"T001","sensor_type":"ThermoNode","timestamp":1700000000}"#;
        let env = decode_envelope(bytes).unwrap();
        assert_eq!(env.message_type(), "register");
    }

    #[test]
    fn test_decode_invalid_json_is_malformed() {
        let result = decode_envelope(b"not json at all");
        assert!(matches!(result, Err(CoreError::MalformedEnvelope { .. })));
    }

    #[test]
    fn test_decode_missing_type_is_malformed() {
        let result = decode_envelope(br#"{"sensor_id":"T001"}"#);
        assert!(matches!(result, Err(CoreError::MalformedEnvelope { .. })));
    }

    #[test]
    fn test_decode_non_object_is_malformed() {
        let result = decode_envelope(br#"[1,2,3]"#);
        assert!(matches!(result, Err(CoreError::MalformedEnvelope { .. })));
    }

    #[test]
    fn test_decode_unknown_type() {
        let result = decode_envelope(br#"{"type":"telemetry_v2","sensor_id":"T001"}"#);
        match result {
            Err(CoreError::UnknownMessageType { found }) => {
                assert_eq!(found, "telemetry_v2");
            }
            other => panic!("Expected UnknownMessageType, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_known_type_bad_fields_is_malformed() {
        // register with a non-string sensor_type
        let result =
            decode_envelope(br#"{"type":"register","sensor_type":42,"timestamp":1700000000}"#);
        assert!(matches!(result, Err(CoreError::MalformedEnvelope { .. })));
    }

    #[test]
    fn test_encode_is_compact() {
        let env = Envelope::data_ack("T001".into());
        let bytes = encode_envelope(&env).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(!text.contains(' '));
        assert!(text.starts_with('{'));
        assert!(text.contains(r#""type":"data_ack""#));
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let env = Envelope::register_ack("T001".into(), fieldgate_common::Token::new("TOKEN_9"));
        let bytes = encode_envelope(&env).unwrap();
        let back = decode_envelope(&bytes).unwrap();
        assert_eq!(env, back);
    }
}
