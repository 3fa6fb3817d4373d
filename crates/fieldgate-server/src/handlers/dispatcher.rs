// ============================================
// File: crates/fieldgate-server/src/handlers/dispatcher.rs
// ============================================
//! # Datagram Dispatcher
//!
//! ## Creation Reason
//! Routes every inbound datagram to the right service and decides
//! which reply, if any, goes back to the sensor.
//!
//! ## Inbound Routing
//! ```text
//! datagram ──► decode
//!    │  malformed / unknown type ──► log, drop (no reply)
//!    │
//!    ├─ register ──► RegistrationService
//!    │      accepted ──► register_ack
//!    │      denied   ──► register_denied
//!    │      no identity ──► log, drop
//!    │
//!    ├─ data ──► token check ──► invalid_token
//!    │          crc check   ──► request_resend (1/s per sensor)
//!    │          valid       ──► record activity + data_ack
//!    │
//!    ├─ activity_ack ──► token match ──► record activity
//!    │                   mismatch    ──► log, drop
//!    │
//!    └─ gateway-originated types ──► log, drop
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Only a fully valid data message touches the registry; a bad
//!   token or checksum must leave `last_seen` and the probe state
//!   exactly as they were
//! - The receive timestamp carried by `PacketSource` is the `now`
//!   for every registry operation in one dispatch
//!
//! ## Last Modified
//! v0.1.0 - Initial dispatcher implementation

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use fieldgate_common::types::{SensorId, Token};
use fieldgate_core::integrity;
use fieldgate_core::protocol::codec::decode_envelope;
use fieldgate_core::protocol::Envelope;
use fieldgate_transport::PacketSource;

use crate::services::emitter::ResponseEmitter;
use crate::services::monitor::LivenessMonitor;
use crate::services::registration::{RegistrationOutcome, RegistrationService};
use crate::services::registry::SensorRegistry;

// ============================================
// Dispatcher
// ============================================

/// Routes inbound envelopes to services and emits replies.
pub struct Dispatcher {
    registry: Arc<SensorRegistry>,
    registration: Arc<RegistrationService>,
    emitter: Arc<ResponseEmitter>,
}

impl Dispatcher {
    /// Creates a new dispatcher.
    #[must_use]
    pub fn new(
        registry: Arc<SensorRegistry>,
        registration: Arc<RegistrationService>,
        emitter: Arc<ResponseEmitter>,
    ) -> Self {
        Self {
            registry,
            registration,
            emitter,
        }
    }

    /// Handles one inbound datagram.
    ///
    /// Never fails: every malformed or unauthorized input is logged
    /// and either answered or dropped, per the protocol rules.
    pub async fn handle_datagram(&self, bytes: &[u8], source: PacketSource) {
        let envelope = match decode_envelope(bytes) {
            Ok(envelope) => envelope,
            Err(e) => {
                debug!(source = %source.addr, error = %e, "Dropping undecodable datagram");
                return;
            }
        };

        match envelope {
            Envelope::Register {
                sensor_id,
                sensor_type,
                ..
            } => match sensor_id {
                Some(id) if !id.is_empty() => {
                    let reply = match self.registration.register(
                        &id,
                        &sensor_type,
                        source.addr,
                        source.timestamp,
                    ) {
                        RegistrationOutcome::Accepted { token } => {
                            Envelope::register_ack(id, token)
                        }
                        RegistrationOutcome::Denied { active_id } => {
                            Envelope::register_denied(sensor_type, active_id)
                        }
                    };
                    self.emitter.send(source.addr, &reply).await;
                }
                _ => {
                    debug!(
                        source = %source.addr,
                        sensor_type = %sensor_type,
                        "Dropping register without sensor identity"
                    );
                }
            },

            Envelope::Data {
                sensor_id,
                token,
                data,
                crc32,
                low_battery,
                ..
            } => {
                self.handle_data(&sensor_id, token.as_ref(), &data, crc32.as_ref(), low_battery, source)
                    .await;
            }

            Envelope::ActivityAck {
                sensor_id, token, ..
            } => {
                self.handle_activity_ack(&sensor_id, token.as_ref(), source);
            }

            // Gateway-originated types have no business arriving here
            other => {
                debug!(
                    source = %source.addr,
                    message_type = other.message_type(),
                    "Dropping gateway-originated envelope from the wire"
                );
            }
        }
    }

    /// Handles a telemetry data message.
    async fn handle_data(
        &self,
        sensor_id: &SensorId,
        token: Option<&Token>,
        data: &Map<String, Value>,
        crc32: Option<&Value>,
        low_battery: bool,
        source: PacketSource,
    ) {
        // Token gate: unknown identity or wrong/absent token
        let authorized = self
            .registry
            .lookup(sensor_id)
            .is_some_and(|record| token == Some(&record.token));

        if !authorized {
            debug!(
                sensor_id = %sensor_id,
                source = %source.addr,
                "Rejecting data with invalid token"
            );
            self.emitter
                .send(source.addr, &Envelope::invalid_token(sensor_id.clone()))
                .await;
            return;
        }

        // Integrity gate: checksum must be present, integer, and exact
        if !integrity::verify(data, crc32) {
            if self.registry.should_request_resend(sensor_id, source.timestamp) {
                debug!(
                    sensor_id = %sensor_id,
                    "Data failed integrity check; requesting resend"
                );
                self.emitter
                    .send(source.addr, &Envelope::request_resend(sensor_id.clone()))
                    .await;
            } else {
                debug!(
                    sensor_id = %sensor_id,
                    "Data failed integrity check; resend request debounced"
                );
            }
            return;
        }

        // Fully valid: this is the only data path that touches state.
        // The refresh and the probe clear happen in one critical
        // section so a concurrent tick cannot report a missed probe.
        if let Some(previous) =
            self.registry
                .record_activity(sensor_id, source.addr, source.timestamp)
        {
            if previous.in_episode() {
                LivenessMonitor::note_reconnected(sensor_id);
            }
        }

        if low_battery {
            warn!(
                sensor_id = %sensor_id,
                payload = ?data,
                "Data accepted; sensor reports low battery"
            );
        } else {
            info!(
                sensor_id = %sensor_id,
                payload = ?data,
                "Data accepted"
            );
        }

        self.emitter
            .send(source.addr, &Envelope::data_ack(sensor_id.clone()))
            .await;
    }

    /// Handles a heartbeat acknowledgment. Never replies.
    fn handle_activity_ack(
        &self,
        sensor_id: &SensorId,
        token: Option<&Token>,
        source: PacketSource,
    ) {
        let authorized = self
            .registry
            .lookup(sensor_id)
            .is_some_and(|record| token == Some(&record.token));

        if !authorized {
            debug!(
                sensor_id = %sensor_id,
                source = %source.addr,
                "Ignoring activity_ack with mismatched token"
            );
            return;
        }

        if let Some(previous) =
            self.registry
                .record_activity(sensor_id, source.addr, source.timestamp)
        {
            if previous.in_episode() {
                LivenessMonitor::note_reconnected(sensor_id);
            }
        }

        debug!(sensor_id = %sensor_id, "Activity acknowledged");
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
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
    use std::net::SocketAddr;
    use std::time::{Duration, Instant};

    use serde_json::json;

    use fieldgate_core::token::RandomTokenGenerator;
    use fieldgate_transport::{MockTransport, Transport};

    use crate::services::registry::{ProbeState, ProbeTiming};

    fn addr(port: u16) -> SocketAddr {
        format!("127.0.0.1:{port}").parse().unwrap()
    }

    struct Fixture {
        registry: Arc<SensorRegistry>,
        transport: Arc<MockTransport>,
        dispatcher: Dispatcher,
    }

    fn fixture() -> Fixture {
        let registry = Arc::new(SensorRegistry::new(ProbeTiming::default()));
        let transport = Arc::new(MockTransport::new());
        let emitter = Arc::new(ResponseEmitter::new(
            Arc::clone(&transport) as Arc<dyn Transport>
        ));
        let registration = Arc::new(RegistrationService::new(
            Arc::clone(&registry),
            Box::new(RandomTokenGenerator),
        ));
        let dispatcher = Dispatcher::new(
            Arc::clone(&registry),
            registration,
            emitter,
        );
        Fixture {
            registry,
            transport,
            dispatcher,
        }
    }

    async fn dispatch_at(fix: &Fixture, json: &Value, port: u16, at: Instant) {
        let bytes = serde_json::to_vec(json).unwrap();
        let source = PacketSource::with_timestamp(addr(port), at);
        fix.dispatcher.handle_datagram(&bytes, source).await;
    }

    async fn dispatch(fix: &Fixture, json: &Value, port: u16) {
        dispatch_at(fix, json, port, Instant::now()).await;
    }

    fn replies(fix: &Fixture) -> Vec<(Envelope, SocketAddr)> {
        fix.transport
            .take_sent()
            .into_iter()
            .map(|(bytes, dest)| (decode_envelope(&bytes).unwrap(), dest))
            .collect()
    }

    async fn register(fix: &Fixture, id: &str, category: &str, port: u16) -> Token {
        dispatch(
            fix,
            &json!({"type": "register", "sensor_id": id, "sensor_type": category, "timestamp": 1_700_000_000}),
            port,
        )
        .await;
        let sent = replies(fix);
        match &sent[0].0 {
            Envelope::RegisterAck { token, .. } => token.clone(),
            other => panic!("Expected register_ack, got {other:?}"),
        }
    }

    // Scenario: two sensors contest one category; the first holds it,
    // the second is told who does.
    #[tokio::test]
    async fn test_registration_conflict_scenario() {
        let fix = fixture();

        let _token = register(&fix, "T001", "ThermoNode", 9000).await;

        dispatch(
            &fix,
            &json!({"type": "register", "sensor_id": "T002", "sensor_type": "ThermoNode", "timestamp": 1_700_000_001}),
            9001,
        )
        .await;

        let sent = replies(&fix);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, addr(9001));
        match &sent[0].0 {
            Envelope::RegisterDenied {
                reason,
                active_sensor_id,
                ..
            } => {
                assert_eq!(reason, "type_busy");
                assert_eq!(active_sensor_id, &SensorId::new("T001"));
            }
            other => panic!("Expected register_denied, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_register_without_identity_dropped() {
        let fix = fixture();

        dispatch(
            &fix,
            &json!({"type": "register", "sensor_type": "ThermoNode", "timestamp": 1_700_000_000}),
            9000,
        )
        .await;
        dispatch(
            &fix,
            &json!({"type": "register", "sensor_id": "", "sensor_type": "ThermoNode", "timestamp": 1_700_000_000}),
            9000,
        )
        .await;

        assert_eq!(fix.transport.sent_count(), 0);
        assert_eq!(fix.registry.count(), 0);
    }

    #[tokio::test]
    async fn test_undecodable_datagrams_dropped() {
        let fix = fixture();

        let source = PacketSource::new(addr(9000));
        fix.dispatcher.handle_datagram(b"not json", source).await;
        fix.dispatcher
            .handle_datagram(br#"{"type":"telemetry_v2","sensor_id":"T001"}"#, source)
            .await;
        fix.dispatcher
            .handle_datagram(br#"{"sensor_id":"T001"}"#, source)
            .await;

        assert_eq!(fix.transport.sent_count(), 0);
    }

    // Scenario: a valid data message is acknowledged.
    #[tokio::test]
    async fn test_valid_data_acknowledged() {
        let fix = fixture();
        let token = register(&fix, "T001", "ThermoNode", 9000).await;

        let payload = json!({"temp": 21.5, "humidity": 40});
        let crc = integrity::checksum(payload.as_object().unwrap());

        dispatch(
            &fix,
            &json!({
                "type": "data",
                "sensor_id": "T001",
                "token": token.as_str(),
                "timestamp": 1_700_000_010,
                "data": payload,
                "crc32": crc,
            }),
            9000,
        )
        .await;

        let sent = replies(&fix);
        assert_eq!(sent.len(), 1);
        assert!(matches!(sent[0].0, Envelope::DataAck { .. }));
    }

    // Scenario: wrong token yields invalid_token and mutates nothing.
    #[tokio::test]
    async fn test_invalid_token_rejected_without_mutation() {
        let fix = fixture();
        let _token = register(&fix, "T001", "ThermoNode", 9000).await;
        let before = fix.registry.lookup(&SensorId::new("T001")).unwrap();

        dispatch(
            &fix,
            &json!({
                "type": "data",
                "sensor_id": "T001",
                "token": "TOKEN_forged",
                "timestamp": 1_700_000_010,
                "data": {"temp": 21.5},
                "crc32": 1,
            }),
            9777,
        )
        .await;

        let sent = replies(&fix);
        assert_eq!(sent.len(), 1);
        assert!(matches!(sent[0].0, Envelope::InvalidToken { .. }));

        // Neither last_seen nor the endpoint moved
        let after = fix.registry.lookup(&SensorId::new("T001")).unwrap();
        assert_eq!(after.last_seen, before.last_seen);
        assert_eq!(after.last_addr, before.last_addr);
    }

    #[tokio::test]
    async fn test_missing_token_rejected() {
        let fix = fixture();
        let _token = register(&fix, "T001", "ThermoNode", 9000).await;

        dispatch(
            &fix,
            &json!({
                "type": "data",
                "sensor_id": "T001",
                "timestamp": 1_700_000_010,
                "data": {"temp": 21.5},
            }),
            9000,
        )
        .await;

        let sent = replies(&fix);
        assert_eq!(sent.len(), 1);
        assert!(matches!(sent[0].0, Envelope::InvalidToken { .. }));
    }

    #[tokio::test]
    async fn test_unknown_sensor_data_rejected() {
        let fix = fixture();

        dispatch(
            &fix,
            &json!({
                "type": "data",
                "sensor_id": "GHOST",
                "token": "TOKEN_1",
                "timestamp": 1_700_000_010,
                "data": {"temp": 21.5},
            }),
            9000,
        )
        .await;

        let sent = replies(&fix);
        assert_eq!(sent.len(), 1);
        assert!(matches!(sent[0].0, Envelope::InvalidToken { .. }));
    }

    // Scenario: corrupted frames draw at most one resend request per
    // second, and intact state is untouched.
    #[tokio::test]
    async fn test_checksum_failure_and_resend_debounce() {
        let fix = fixture();
        let token = register(&fix, "T001", "ThermoNode", 9000).await;
        let t0 = Instant::now();

        let bad = json!({
            "type": "data",
            "sensor_id": "T001",
            "token": token.as_str(),
            "timestamp": 1_700_000_010,
            "data": {"temp": 21.5},
            "crc32": 12345,
        });

        // Three corrupted frames inside one debounce window
        dispatch_at(&fix, &bad, 9000, t0).await;
        dispatch_at(&fix, &bad, 9000, t0 + Duration::from_millis(200)).await;
        dispatch_at(&fix, &bad, 9000, t0 + Duration::from_millis(900)).await;

        let sent = replies(&fix);
        assert_eq!(sent.len(), 1);
        assert!(matches!(sent[0].0, Envelope::RequestResend { .. }));

        // Window elapsed: one more is allowed
        dispatch_at(&fix, &bad, 9000, t0 + Duration::from_millis(1100)).await;
        let sent = replies(&fix);
        assert_eq!(sent.len(), 1);
        assert!(matches!(sent[0].0, Envelope::RequestResend { .. }));
    }

    // Scenario: a corrupted frame draws a resend request, and the
    // intact resend is acknowledged even inside the debounce window.
    #[tokio::test]
    async fn test_intact_resend_accepted_after_corruption() {
        let fix = fixture();
        let token = register(&fix, "T001", "ThermoNode", 9000).await;
        let t0 = Instant::now();

        let payload = json!({"temp": 21.5});

        dispatch_at(
            &fix,
            &json!({
                "type": "data",
                "sensor_id": "T001",
                "token": token.as_str(),
                "timestamp": 1_700_000_010,
                "data": payload,
                "crc32": 12345,
            }),
            9000,
            t0,
        )
        .await;

        let sent = replies(&fix);
        assert_eq!(sent.len(), 1);
        assert!(matches!(sent[0].0, Envelope::RequestResend { .. }));

        // The sensor resends the frame with the right checksum 300ms
        // later; the debounce stamp gates resend requests only, never
        // acceptance
        let crc = integrity::checksum(payload.as_object().unwrap());
        dispatch_at(
            &fix,
            &json!({
                "type": "data",
                "sensor_id": "T001",
                "token": token.as_str(),
                "timestamp": 1_700_000_011,
                "data": payload,
                "crc32": crc,
            }),
            9000,
            t0 + Duration::from_millis(300),
        )
        .await;

        let sent = replies(&fix);
        assert_eq!(sent.len(), 1);
        assert!(matches!(sent[0].0, Envelope::DataAck { .. }));
    }

    #[tokio::test]
    async fn test_non_integer_checksum_fails_verification() {
        let fix = fixture();
        let token = register(&fix, "T001", "ThermoNode", 9000).await;

        dispatch(
            &fix,
            &json!({
                "type": "data",
                "sensor_id": "T001",
                "token": token.as_str(),
                "timestamp": 1_700_000_010,
                "data": {"temp": 21.5},
                "crc32": "not-a-number",
            }),
            9000,
        )
        .await;

        let sent = replies(&fix);
        assert_eq!(sent.len(), 1);
        assert!(matches!(sent[0].0, Envelope::RequestResend { .. }));
    }

    // Scenario: a probed sensor answers with data; the episode clears
    // and the sensor counts as reconnected.
    #[tokio::test]
    async fn test_valid_data_clears_probe_episode() {
        let fix = fixture();
        let token = register(&fix, "T001", "ThermoNode", 9000).await;
        let id = SensorId::new("T001");

        fix.registry.set_probe(
            &id,
            ProbeState::Backoff {
                attempts: 2,
                next_at: Instant::now() + Duration::from_secs(5),
            },
        );

        let payload = json!({"temp": 21.5});
        let crc = integrity::checksum(payload.as_object().unwrap());
        dispatch(
            &fix,
            &json!({
                "type": "data",
                "sensor_id": "T001",
                "token": token.as_str(),
                "timestamp": 1_700_000_010,
                "data": payload,
                "crc32": crc,
            }),
            9000,
        )
        .await;

        assert_eq!(fix.registry.get_probe(&id), Some(ProbeState::Active));
    }

    #[tokio::test]
    async fn test_activity_ack_clears_probe_silently() {
        let fix = fixture();
        let token = register(&fix, "T001", "ThermoNode", 9000).await;
        let id = SensorId::new("T001");

        fix.registry.set_probe(
            &id,
            ProbeState::Probing {
                attempts: 1,
                deadline: Instant::now() + Duration::from_secs(1),
            },
        );

        dispatch(
            &fix,
            &json!({
                "type": "activity_ack",
                "sensor_id": "T001",
                "token": token.as_str(),
                "timestamp": 1_700_000_010,
            }),
            9000,
        )
        .await;

        // Probe cleared, no reply sent
        assert_eq!(fix.registry.get_probe(&id), Some(ProbeState::Active));
        assert_eq!(fix.transport.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_activity_ack_with_wrong_token_ignored() {
        let fix = fixture();
        let _token = register(&fix, "T001", "ThermoNode", 9000).await;
        let id = SensorId::new("T001");

        let probing = ProbeState::Probing {
            attempts: 1,
            deadline: Instant::now() + Duration::from_secs(1),
        };
        fix.registry.set_probe(&id, probing);

        dispatch(
            &fix,
            &json!({
                "type": "activity_ack",
                "sensor_id": "T001",
                "token": "TOKEN_stale",
                "timestamp": 1_700_000_010,
            }),
            9000,
        )
        .await;

        // Still probing, still silent
        assert!(matches!(
            fix.registry.get_probe(&id),
            Some(ProbeState::Probing { attempts: 1, .. })
        ));
        assert_eq!(fix.transport.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_gateway_originated_types_dropped() {
        let fix = fixture();

        dispatch(
            &fix,
            &json!({"type": "data_ack", "sensor_id": "T001", "timestamp": 1_700_000_000}),
            9000,
        )
        .await;
        dispatch(
            &fix,
            &json!({
                "type": "activity_check",
                "sensor_type": "ThermoNode",
                "sensor_id": "T001",
                "token": "TOKEN_1",
                "timestamp": 1_700_000_000,
                "low_battery": false,
                "attempt": 1,
            }),
            9000,
        )
        .await;

        assert_eq!(fix.transport.sent_count(), 0);
    }

    // Integer tokens on the wire normalize to the same credential.
    #[tokio::test]
    async fn test_integer_token_on_wire() {
        let fix = fixture();
        let id = SensorId::new("T001");
        fix.registry.upsert_on_register(
            &id,
            &fieldgate_common::types::Category::new("ThermoNode"),
            addr(9000),
            Token::new("1700000000"),
            Instant::now(),
        );

        let payload = json!({"temp": 21.5});
        let crc = integrity::checksum(payload.as_object().unwrap());
        dispatch(
            &fix,
            &json!({
                "type": "data",
                "sensor_id": "T001",
                "token": 1_700_000_000u64,
                "timestamp": 1_700_000_010,
                "data": payload,
                "crc32": crc,
            }),
            9000,
        )
        .await;

        let sent = replies(&fix);
        assert_eq!(sent.len(), 1);
        assert!(matches!(sent[0].0, Envelope::DataAck { .. }));
    }
}
