// ============================================
// File: crates/fieldgate-core/src/token.rs
// ============================================
//! # Token Generation
//!
//! ## Creation Reason
//! Tokens are opaque session credentials issued on every accepted
//! registration. Observed deployments used two strategies
//! (timestamp-derived and random), so generation sits behind one
//! trait and the strategy is configuration-selected.
//!
//! ## Main Functionality
//! - `TokenGenerator`: Strategy trait
//! - `RandomTokenGenerator`: 64 bits of randomness (default)
//! - `TimestampTokenGenerator`: `TOKEN_<unix-seconds>` legacy form
//!
//! ## ⚠️ Important Note for Next Developer
//! - Tokens are collision-resistant, NOT unpredictable; do not use
//!   them as a security boundary
//! - The timestamp strategy can collide for registrations within the
//!   same second; it exists for compatibility with older sensors
//!
//! ## Last Modified
//! v0.1.0 - Initial token generation

use rand::RngCore;

use fieldgate_common::time::unix_timestamp;
use fieldgate_common::types::Token;

// ============================================
// TokenGenerator Trait
// ============================================

/// Strategy for generating session tokens.
///
/// Implementations must be `Send + Sync`; the registration service
/// shares one generator across concurrent handlers.
pub trait TokenGenerator: Send + Sync {
    /// Generates a fresh token.
    fn generate(&self) -> Token;
}

// ============================================
// RandomTokenGenerator
// ============================================

/// Generates tokens from 64 bits of randomness.
///
/// # Example
/// ```
/// use fieldgate_core::token::{RandomTokenGenerator, TokenGenerator};
///
/// let gen = RandomTokenGenerator;
/// let a = gen.generate();
/// let b = gen.generate();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomTokenGenerator;

impl TokenGenerator for RandomTokenGenerator {
    fn generate(&self) -> Token {
        Token::new(format!("TOKEN_{:016x}", rand::thread_rng().next_u64()))
    }
}

// ============================================
// TimestampTokenGenerator
// ============================================

/// Generates tokens from the current Unix timestamp.
///
/// Matches the `TOKEN_<seconds>` form older sensor firmware expects.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimestampTokenGenerator;

impl TokenGenerator for TimestampTokenGenerator {
    fn generate(&self) -> Token {
        Token::new(format!("TOKEN_{}", unix_timestamp()))
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_tokens_differ() {
        let gen = RandomTokenGenerator;
        let a = gen.generate();
        let b = gen.generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_random_token_shape() {
        let token = RandomTokenGenerator.generate();
        assert!(token.as_str().starts_with("TOKEN_"));
        assert_eq!(token.as_str().len(), "TOKEN_".len() + 16);
    }

    #[test]
    fn test_timestamp_token_shape() {
        let token = TimestampTokenGenerator.generate();
        let suffix = token.as_str().strip_prefix("TOKEN_").unwrap();
        let secs: i64 = suffix.parse().unwrap();
        assert!(secs > 1_577_836_800);
    }

    #[test]
    fn test_generators_are_object_safe() {
        let generators: Vec<Box<dyn TokenGenerator>> = vec![
            Box::new(RandomTokenGenerator),
            Box::new(TimestampTokenGenerator),
        ];
        for gen in &generators {
            assert!(!gen.generate().as_str().is_empty());
        }
    }
}
