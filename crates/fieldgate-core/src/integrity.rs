// ============================================
// File: crates/fieldgate-core/src/integrity.rs
// ============================================
//! # Payload Integrity Verifier
//!
//! ## Creation Reason
//! Detects corrupted telemetry frames. Sensors checksum the canonical
//! form of their payload before sending; the gateway recomputes the
//! checksum over the same canonical form and compares.
//!
//! ## Canonical Form
//! The payload object is serialized as UTF-8 JSON with no inter-token
//! whitespace and field names in strict lexicographic order, applied
//! recursively to nested structures. Insertion order of the original
//! payload therefore never affects the checksum.
//!
//! ## Checksum
//! CRC-32/ISO-HDLC: polynomial 0xEDB88320 (reflected), initial value
//! 0xFFFFFFFF, final XOR 0xFFFFFFFF, bit-reflected input and output.
//! `crc32fast::hash` implements exactly these parameters.
//!
//! ## ⚠️ Important Note for Next Developer
//! - These are pure functions; keep them free of registry state
//! - A received checksum that is absent, non-integer, or mismatched
//!   is a verification failure - there is no "close enough"
//!
//! ## Last Modified
//! v0.1.0 - Initial integrity verifier

use serde_json::{Map, Value};

// ============================================
// Canonical Form
// ============================================

/// Serializes a payload object into its canonical byte form.
///
/// Compact JSON, keys sorted lexicographically at every nesting
/// level, UTF-8 encoded.
#[must_use]
pub fn canonical_bytes(payload: &Map<String, Value>) -> Vec<u8> {
    let mut out = Vec::new();
    write_object(payload, &mut out);
    out
}

fn write_object(map: &Map<String, Value>, out: &mut Vec<u8>) {
    out.push(b'{');

    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort_unstable();

    for (i, key) in keys.iter().enumerate() {
        if i > 0 {
            out.push(b',');
        }
        write_scalar(&Value::String((*key).clone()), out);
        out.push(b':');
        if let Some(value) = map.get(*key) {
            write_value(value, out);
        }
    }

    out.push(b'}');
}

fn write_value(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Object(map) => write_object(map, out),
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_value(item, out);
            }
            out.push(b']');
        }
        scalar => write_scalar(scalar, out),
    }
}

fn write_scalar(value: &Value, out: &mut Vec<u8>) {
    // Scalar serialization cannot fail; serde_json errors only on
    // maps with non-string keys, which Value cannot represent.
    out.extend_from_slice(serde_json::to_string(value).unwrap_or_default().as_bytes());
}

// ============================================
// Checksum
// ============================================

/// Computes the CRC-32/ISO-HDLC checksum of a payload's canonical form.
#[must_use]
pub fn checksum(payload: &Map<String, Value>) -> u32 {
    crc32fast::hash(&canonical_bytes(payload))
}

/// Verifies a received checksum against a payload.
///
/// The received value must be present and an exact unsigned integer
/// equal to [`checksum`] of the payload. Absent, non-integer, and
/// mismatched values all fail.
#[must_use]
pub fn verify(payload: &Map<String, Value>, received: Option<&Value>) -> bool {
    match received.and_then(Value::as_u64) {
        Some(value) => value == u64::from(checksum(payload)),
        None => false,
    }
}

// ============================================
// Tests
// ============================================
