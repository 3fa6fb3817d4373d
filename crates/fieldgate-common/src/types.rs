// ============================================
// File: crates/fieldgate-common/src/types.rs
// ============================================
//! # Core Type Definitions
//!
//! ## Creation Reason
//! Centralizes the fundamental identifiers used throughout the FieldGate
//! gateway, ensuring type safety and consistent wire representations.
//!
//! ## Main Functionality
//! - `SensorId`: Unique identity string for a sensor
//! - `Category`: Sensor classification (device class)
//! - `Token`: Opaque session credential issued at registration
//!
//! ## Main Logical Flow
//! 1. `SensorId` and `Category` arrive in registration envelopes
//! 2. Both are used as keys in the sensor registry
//! 3. `Token` is issued by the gateway and echoed back by sensors
//!
//! ## ⚠️ Important Note for Next Developer
//! - `Token` is collision-resistant but NOT a security credential
//! - Tokens may appear on the wire as a string or an integer; both
//!   deserialize into the same canonical string form
//! - Maintain backward-compatible serialization formats
//!
//! ## Last Modified
//! v0.1.0 - Initial type definitions

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================
// SensorId
// ============================================

/// Unique identifier for a sensor.
///
/// # Purpose
/// Wraps the identity string carried in every envelope to prevent
/// confusion with other string-typed fields (categories, tokens).
///
/// # Example
/// ```
/// use fieldgate_common::types::SensorId;
///
/// let id = SensorId::new("T001");
/// assert_eq!(id.as_str(), "T001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorId(String);

impl SensorId {
    /// Creates a new `SensorId` from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks whether the identity is empty.
    ///
    /// An empty identity in a registration request is malformed input
    /// and must be rejected locally without a reply.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SensorId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SensorId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ============================================
// Category
// ============================================

/// Sensor classification (e.g. device class such as `"ThermoNode"`).
///
/// # Purpose
/// Keys the category-exclusivity map: at most one sensor identity may
/// be active per category at any time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    /// Creates a new `Category` from a string.
    #[must_use]
    pub fn new(category: impl Into<String>) -> Self {
        Self(category.into())
    }

    /// Returns the category as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ============================================
// Token
// ============================================

/// Opaque session credential issued at registration.
///
/// # Properties
/// - Equality-comparable; regenerated on every accepted registration
/// - Collision-resistant opaque value, NOT cryptographically strong
/// - On the wire a token may be a JSON string or an integer; both
///   forms normalize to the same canonical string
///
/// # Example
/// ```
/// use fieldgate_common::types::Token;
///
/// let a = Token::new("TOKEN_1700000000");
/// let b: Token = serde_json::from_str("\"TOKEN_1700000000\"").unwrap();
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Creates a new `Token` from a string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct TokenVisitor;

        impl serde::de::Visitor<'_> for TokenVisitor {
            type Value = Token;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a token string or integer")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Token, E> {
                Ok(Token(v.to_string()))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Token, E> {
                Ok(Token(v.to_string()))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Token, E> {
                Ok(Token(v.to_string()))
            }
        }

        deserializer.deserialize_any(TokenVisitor)
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_id_basics() {
        let id = SensorId::new("T001");
        assert_eq!(id.as_str(), "T001");
        assert!(!id.is_empty());
        assert!(SensorId::new("").is_empty());
    }

    #[test]
    fn test_sensor_id_transparent_serde() {
        let id: SensorId = serde_json::from_str("\"W001\"").unwrap();
        assert_eq!(id, SensorId::new("W001"));
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"W001\"");
    }

    #[test]
    fn test_token_from_string() {
        let token: Token = serde_json::from_str("\"TOKEN_123\"").unwrap();
        assert_eq!(token.as_str(), "TOKEN_123");
    }

    #[test]
    fn test_token_from_integer() {
        let token: Token = serde_json::from_str("1700000000").unwrap();
        assert_eq!(token.as_str(), "1700000000");
    }

    #[test]
    fn test_token_equality() {
        let a = Token::new("TOKEN_1");
        let b = Token::new("TOKEN_1");
        let c = Token::new("TOKEN_2");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_category_display() {
        let cat = Category::new("ThermoNode");
        assert_eq!(cat.to_string(), "ThermoNode");
    }
}
