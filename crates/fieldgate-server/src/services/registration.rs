// ============================================
// File: crates/fieldgate-server/src/services/registration.rs
// ============================================
//! # Registration Service
//!
//! ## Creation Reason
//! Orchestrates sensor registration: token issuance plus the
//! category-exclusivity check against the registry.
//!
//! ## Registration Flow
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   RegistrationService                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  1. Receive register(id, category, addr)                     │
//! │     │                                                        │
//! │     ▼                                                        │
//! │  2. Generate fresh token (TokenGenerator)                    │
//! │     │                                                        │
//! │     ▼                                                        │
//! │  3. Atomic upsert + exclusivity claim (SensorRegistry)       │
//! │     │                                                        │
//! │     ├── category free or held by same id → Accepted{token}   │
//! │     └── held by another id → Denied{active_id}, no change    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - A token is generated before the registry decides; on denial it
//!   is simply discarded, tokens are not a scarce resource
//! - Re-registration of the active identity always succeeds and
//!   invalidates the previous token
//!
//! ## Last Modified
//! v0.1.0 - Initial registration service

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use fieldgate_common::types::{Category, SensorId, Token};
use fieldgate_core::token::TokenGenerator;

use crate::services::registry::{RegisterOutcome, SensorRegistry};

// ============================================
// RegistrationOutcome
// ============================================

/// Result of processing a registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// Registration accepted; the sensor must use this token.
    Accepted {
        /// Freshly issued session token.
        token: Token,
    },
    /// Category held by another identity; nothing changed.
    Denied {
        /// The identity currently holding the category.
        active_id: SensorId,
    },
}

// ============================================
// RegistrationService
// ============================================

/// High-level registration orchestration.
pub struct RegistrationService {
    registry: Arc<SensorRegistry>,
    tokens: Box<dyn TokenGenerator>,
}

impl RegistrationService {
    /// Creates a new registration service.
    #[must_use]
    pub fn new(registry: Arc<SensorRegistry>, tokens: Box<dyn TokenGenerator>) -> Self {
        Self { registry, tokens }
    }

    /// Processes a registration request.
    pub fn register(
        &self,
        id: &SensorId,
        category: &Category,
        addr: SocketAddr,
        now: Instant,
    ) -> RegistrationOutcome {
        let token = self.tokens.generate();

        match self
            .registry
            .upsert_on_register(id, category, addr, token.clone(), now)
        {
            RegisterOutcome::Accepted => {
                info!(
                    sensor_id = %id,
                    sensor_type = %category,
                    source = %addr,
                    "Sensor registered"
                );
                RegistrationOutcome::Accepted { token }
            }
            RegisterOutcome::CategoryBusy { active_id } => {
                debug!(
                    sensor_id = %id,
                    sensor_type = %category,
                    active_sensor_id = %active_id,
                    "Registration denied: category busy"
                );
                RegistrationOutcome::Denied { active_id }
            }
        }
    }
}

impl std::fmt::Debug for RegistrationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationService")
            .field("sensors", &self.registry.count())
            .finish_non_exhaustive()
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::registry::ProbeTiming;
    use fieldgate_core::token::RandomTokenGenerator;

    fn addr(port: u16) -> SocketAddr {
        format!("127.0.0.1:{port}").parse().unwrap()
    }

    fn service() -> (Arc<SensorRegistry>, RegistrationService) {
        let registry = Arc::new(SensorRegistry::new(ProbeTiming::default()));
        let service =
            RegistrationService::new(Arc::clone(&registry), Box::new(RandomTokenGenerator));
        (registry, service)
    }

    #[test]
    fn test_register_then_conflict() {
        let (registry, service) = service();
        let now = Instant::now();

        // T001 claims ThermoNode
        let outcome = service.register(
            &SensorId::new("T001"),
            &Category::new("ThermoNode"),
            addr(9000),
            now,
        );
        let token = match outcome {
            RegistrationOutcome::Accepted { token } => token,
            other => panic!("Expected acceptance, got {other:?}"),
        };
        assert_eq!(registry.lookup(&SensorId::new("T001")).unwrap().token, token);

        // T002 is denied the same category and told who holds it
        let outcome = service.register(
            &SensorId::new("T002"),
            &Category::new("ThermoNode"),
            addr(9001),
            now,
        );
        assert_eq!(
            outcome,
            RegistrationOutcome::Denied {
                active_id: SensorId::new("T001")
            }
        );
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_reregistration_rotates_token() {
        let (registry, service) = service();
        let now = Instant::now();
        let id = SensorId::new("T001");
        let cat = Category::new("ThermoNode");

        let first = match service.register(&id, &cat, addr(9000), now) {
            RegistrationOutcome::Accepted { token } => token,
            other => panic!("Expected acceptance, got {other:?}"),
        };
        let second = match service.register(&id, &cat, addr(9000), now) {
            RegistrationOutcome::Accepted { token } => token,
            other => panic!("Expected acceptance, got {other:?}"),
        };

        assert_ne!(first, second);
        assert_eq!(registry.lookup(&id).unwrap().token, second);
    }
}
