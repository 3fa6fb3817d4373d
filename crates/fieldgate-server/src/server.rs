// ============================================
// File: crates/fieldgate-server/src/server.rs
// ============================================
//! # Server Orchestrator
//!
//! ## Creation Reason
//! Main gateway implementation that wires all components together and
//! manages the service lifecycle.
//!
//! ## Main Functionality
//! - `Server`: Gateway struct and lifecycle management
//! - Component initialization and wiring
//! - Async task management
//! - Graceful shutdown handling
//!
//! ## Server Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Server                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │  ┌─────────────────────────────────────────────────────┐   │
//! │  │                   Main Loop                          │   │
//! │  │                                                      │   │
//! │  │  ┌──────────────┐          ┌──────────────────┐     │   │
//! │  │  │ Receive Task │          │  Monitor Task    │     │   │
//! │  │  │              │          │                  │     │   │
//! │  │  │ recv → route │          │ 200ms tick →     │     │   │
//! │  │  │ → reply      │          │ probes/notices   │     │   │
//! │  │  └──────┬───────┘          └────────┬─────────┘     │   │
//! │  │         │                           │               │   │
//! │  │         ▼                           ▼               │   │
//! │  │  ┌─────────────────────────────────────────────┐   │   │
//! │  │  │         SensorRegistry (shared)             │   │   │
//! │  │  └─────────────────────────────────────────────┘   │   │
//! │  └─────────────────────────────────────────────────────┘   │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Only the UDP bind failure at startup is fatal; everything after
//!   that is logged and survived
//! - Graceful shutdown waits for tasks with a bounded timeout
//! - Use tokio::select! for concurrent operations
//!
//! ## Last Modified
//! v0.1.0 - Initial server implementation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use fieldgate_core::token::{RandomTokenGenerator, TimestampTokenGenerator, TokenGenerator};
use fieldgate_transport::{Transport, UdpTransport};

use crate::config::{GatewayConfig, TokenStrategy};
use crate::error::{GatewayError, Result};
use crate::handlers::Dispatcher;
use crate::services::registry::ProbeTiming;
use crate::services::{
    LivenessMonitor, RegistrationService, ResponseEmitter, SensorRegistry,
};

// ============================================
// Constants
// ============================================

/// Maximum UDP datagram size we accept.
const RECV_BUFFER_SIZE: usize = 65535;

/// How long to wait for tasks to finish during shutdown.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================
// Server
// ============================================

/// Main FieldGate gateway.
///
/// # Lifecycle
/// 1. Create with `Server::new(config)`
/// 2. Start with `server.run().await`
/// 3. Shutdown via Ctrl+C or [`Server::shutdown`]
pub struct Server {
    /// Gateway configuration.
    config: GatewayConfig,
    /// Shutdown flag.
    shutdown: Arc<AtomicBool>,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
}

impl Server {
    /// Creates a new gateway instance.
    #[must_use]
    pub fn new(config: GatewayConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    /// Runs the gateway until shutdown.
    ///
    /// # Errors
    /// Returns error if the UDP endpoint cannot be bound.
    pub async fn run(&self) -> Result<()> {
        info!("Starting FieldGate gateway v{}", env!("CARGO_PKG_VERSION"));

        // Initialize services
        let registry = Arc::new(SensorRegistry::new(self.probe_timing()));
        let registration = Arc::new(RegistrationService::new(
            Arc::clone(&registry),
            self.token_generator(),
        ));

        info!(
            silence_threshold_secs = self.config.monitor.silence_threshold_secs,
            probe_timeout_ms = self.config.monitor.probe_timeout_ms,
            retry_delay_secs = self.config.monitor.retry_delay_secs,
            max_attempts = self.config.monitor.max_attempts,
            "Services initialized"
        );

        // Initialize transport; bind failure is the one fatal path
        let transport: Arc<dyn Transport> = Arc::new(
            UdpTransport::bind_addr(self.config.network.listen_addr)
                .await
                .map_err(|e| GatewayError::startup_failed(format!("UDP bind failed: {e}")))?,
        );

        info!("UDP transport listening on {}", self.config.network.listen_addr);

        let emitter = Arc::new(ResponseEmitter::new(Arc::clone(&transport)));
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&registry),
            registration,
            Arc::clone(&emitter),
        ));
        let monitor = Arc::new(LivenessMonitor::new(
            Arc::clone(&registry),
            Arc::clone(&emitter),
        ));

        // Spawn worker tasks
        let mut tasks = Vec::new();
        tasks.push(("receive", self.spawn_receive_task(Arc::clone(&transport), dispatcher)));
        tasks.push(("monitor", self.spawn_monitor_task(monitor)));

        info!("Gateway started successfully");

        // Wait for shutdown signal
        self.wait_for_shutdown().await;

        // Shutdown
        info!("Shutting down gateway...");
        self.shutdown.store(true, Ordering::SeqCst);
        let _ = self.shutdown_tx.send(());

        // Wait for tasks to complete
        for (name, task) in tasks {
            match tokio::time::timeout(SHUTDOWN_TIMEOUT, task).await {
                Ok(Ok(())) => debug!("Task '{}' completed", name),
                Ok(Err(e)) => warn!("Task '{}' failed: {}", name, e),
                Err(_) => warn!("Task '{}' timed out during shutdown", name),
            }
        }

        // Cleanup transport
        if let Err(e) = transport.shutdown().await {
            warn!("Transport shutdown error: {}", e);
        }

        registry.log_summary();
        info!("Gateway shutdown complete");
        Ok(())
    }

    /// Builds the probe timing from the monitor configuration.
    fn probe_timing(&self) -> ProbeTiming {
        ProbeTiming {
            silence_threshold: self.config.monitor.silence_threshold(),
            probe_timeout: self.config.monitor.probe_timeout(),
            retry_delay: self.config.monitor.retry_delay(),
            max_attempts: self.config.monitor.max_attempts,
            resend_debounce: self.config.monitor.resend_debounce(),
        }
    }

    /// Builds the configured token generator.
    fn token_generator(&self) -> Box<dyn TokenGenerator> {
        match self.config.token.strategy {
            TokenStrategy::Random => Box::new(RandomTokenGenerator),
            TokenStrategy::Timestamp => Box::new(TimestampTokenGenerator),
        }
    }

    /// Spawns the datagram receive task.
    fn spawn_receive_task(
        &self,
        transport: Arc<dyn Transport>,
        dispatcher: Arc<Dispatcher>,
    ) -> JoinHandle<()> {
        let shutdown = Arc::clone(&self.shutdown);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            let mut buf = vec![0u8; RECV_BUFFER_SIZE];

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        debug!("Receive task received shutdown signal");
                        break;
                    }
                    result = transport.recv(&mut buf) => {
                        match result {
                            Ok((len, source)) => {
                                if shutdown.load(Ordering::SeqCst) {
                                    break;
                                }
                                dispatcher.handle_datagram(&buf[..len], source).await;
                            }
                            Err(e) => {
                                if !shutdown.load(Ordering::SeqCst) {
                                    error!("Receive error: {}", e);
                                }
                            }
                        }
                    }
                }
            }

            debug!("Receive task exiting");
        })
    }

    /// Spawns the liveness monitor task.
    fn spawn_monitor_task(&self, monitor: Arc<LivenessMonitor>) -> JoinHandle<()> {
        let shutdown = Arc::clone(&self.shutdown);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let interval = self.config.monitor.tick_interval();

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        debug!("Monitor task received shutdown signal");
                        break;
                    }
                    _ = interval_timer.tick() => {
                        if shutdown.load(Ordering::SeqCst) {
                            break;
                        }
                        monitor.tick(Instant::now()).await;
                    }
                }
            }

            debug!("Monitor task exiting");
        })
    }

    /// Waits for shutdown signal (Ctrl+C or programmatic).
    async fn wait_for_shutdown(&self) {
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    error!("Failed to listen for Ctrl+C: {}", e);
                }
                info!("Received shutdown signal");
            }
            _ = shutdown_rx.recv() => {
                info!("Received programmatic shutdown");
            }
        }
    }

    /// Triggers gateway shutdown programmatically.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        let _ = self.shutdown_tx.send(());
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("listen_addr", &self.config.network.listen_addr)
            .field("shutdown", &self.shutdown.load(Ordering::SeqCst))
            .finish()
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_generator_selection() {
        let mut config = GatewayConfig::default();
        config.token.strategy = TokenStrategy::Timestamp;

        let server = Server::new(config);
        let token = server.token_generator().generate();
        let suffix = token.as_str().strip_prefix("TOKEN_").unwrap();
        assert!(suffix.parse::<i64>().is_ok());
    }

    #[test]
    fn test_probe_timing_from_config() {
        let server = Server::new(GatewayConfig::default());
        let timing = server.probe_timing();

        assert_eq!(timing.silence_threshold, Duration::from_secs(15));
        assert_eq!(timing.probe_timeout, Duration::from_secs(1));
        assert_eq!(timing.max_attempts, 10);
    }

    #[tokio::test]
    async fn test_run_and_programmatic_shutdown() {
        let mut config = GatewayConfig::default();
        // Ephemeral port so tests don't collide
        config.network.listen_addr = "127.0.0.1:0".parse().unwrap();

        let server = Arc::new(Server::new(config));
        let runner = {
            let server = Arc::clone(&server);
            tokio::spawn(async move { server.run().await })
        };

        // Give the tasks a moment to start, then stop them
        tokio::time::sleep(Duration::from_millis(200)).await;
        server.shutdown();

        let result = tokio::time::timeout(Duration::from_secs(10), runner)
            .await
            .expect("server did not stop")
            .expect("runner panicked");
        assert!(result.is_ok());
    }
}
