// ============================================
// File: crates/fieldgate-server/src/main.rs
// ============================================
//! # FieldGate Server Entry Point
//!
//! ## Creation Reason
//! Main entry point for the FieldGate telemetry gateway binary.
//! Handles CLI parsing, logging setup, and server initialization.
//!
//! ## Main Functionality
//! - CLI argument parsing with clap
//! - Logging initialization with tracing
//! - Configuration loading
//! - Server execution
//!
//! ## Usage
//! ```bash
//! # Start the gateway
//! fieldgate-server start
//!
//! # Start with an explicit config file
//! fieldgate-server start --config /etc/fieldgate/gateway.toml
//!
//! # Validate a config file without starting
//! fieldgate-server validate --config /etc/fieldgate/gateway.toml
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - A missing config file is not an error for `start`; defaults
//!   bind to 127.0.0.1:5005
//! - Use systemd for production deployments
//!
//! ## Last Modified
//! v0.1.0 - Initial CLI implementation

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fieldgate_server::{GatewayConfig, Server};

// ============================================
// CLI Definition
// ============================================

/// FieldGate Telemetry Gateway
///
/// Listens for sensor datagrams on a UDP endpoint, verifies payload
/// integrity, and monitors sensor liveness with heartbeat probes.
#[derive(Parser, Debug)]
#[command(name = "fieldgate-server")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the gateway
    Start {
        /// Path to configuration file
        #[arg(short, long, default_value = "/etc/fieldgate/gateway.toml")]
        config: PathBuf,
    },

    /// Validate configuration file
    Validate {
        /// Path to configuration file
        #[arg(short, long, default_value = "/etc/fieldgate/gateway.toml")]
        config: PathBuf,
    },
}

// ============================================
// Main
// ============================================

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging("info");

    // Execute command
    let result = match cli.command {
        Commands::Start { config } => cmd_start(config).await,
        Commands::Validate { config } => cmd_validate(config).await,
    };

    // Handle errors
    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}

// ============================================
// Commands
// ============================================

/// Starts the gateway.
async fn cmd_start(config_path: PathBuf) -> anyhow::Result<()> {
    info!("Starting FieldGate gateway...");

    // Load configuration
    let config = if config_path.exists() {
        GatewayConfig::load(&config_path).await?
    } else {
        info!("Config file not found, using defaults");
        GatewayConfig::default()
    };

    // Re-initialize logging with config level
    init_logging(&config.logging.level);

    // Create and run server
    let server = Server::new(config);
    server.run().await?;

    Ok(())
}

/// Validates configuration file.
async fn cmd_validate(config_path: PathBuf) -> anyhow::Result<()> {
    if !config_path.exists() {
        println!("⚠️  Config file not found: {}", config_path.display());
        println!("   Gateway will use default values.");
        return Ok(());
    }

    let config = GatewayConfig::load(&config_path).await?;

    println!("✅ Configuration is valid");
    println!();
    println!("Network:");
    println!("   Listen:            {}", config.network.listen_addr);
    println!();
    println!("Monitor:");
    println!("   Silence Threshold: {}s", config.monitor.silence_threshold_secs);
    println!("   Probe Timeout:     {}ms", config.monitor.probe_timeout_ms);
    println!("   Retry Delay:       {}s", config.monitor.retry_delay_secs);
    println!("   Max Attempts:      {}", config.monitor.max_attempts);
    println!();
    println!("Token:");
    println!("   Strategy:          {:?}", config.token.strategy);
    println!();

    Ok(())
}

// ============================================
// Helper Functions
// ============================================

/// Initializes the tracing subscriber.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .try_init()
        .ok();
}
