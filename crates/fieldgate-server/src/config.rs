// ============================================
// File: crates/fieldgate-server/src/config.rs
// ============================================
//! # Gateway Configuration
//!
//! ## Creation Reason
//! Provides configuration management for the FieldGate gateway,
//! supporting TOML files with sensible defaults.
//!
//! ## Main Functionality
//! - `GatewayConfig`: Main configuration structure
//! - TOML file loading and parsing
//! - Configuration validation
//! - Default values matching a single-host deployment
//!
//! ## Configuration Sections
//! - `network`: UDP listen address
//! - `monitor`: Liveness probe timing
//! - `token`: Session token generation strategy
//! - `logging`: Log level
//!
//! ## Example Configuration
//! ```toml
//! [network]
//! listen_addr = "127.0.0.1:5005"
//!
//! [monitor]
//! silence_threshold_secs = 15
//! probe_timeout_ms = 1000
//! retry_delay_secs = 5
//! max_attempts = 10
//!
//! [token]
//! strategy = "random"
//!
//! [logging]
//! level = "info"
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - All config changes require gateway restart
//! - Validate config before gateway startup
//! - Probe timing defaults mirror the deployed field installations;
//!   change them in the config file, not here
//!
//! ## Last Modified
//! v0.1.0 - Initial configuration implementation

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{GatewayError, Result};

// ============================================
// GatewayConfig
// ============================================

/// Main gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Network configuration.
    #[serde(default)]
    pub network: NetworkConfig,

    /// Liveness monitor configuration.
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Token generation configuration.
    #[serde(default)]
    pub token: TokenConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GatewayConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        info!("Loading configuration from: {}", path_str);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| GatewayError::config_load(&path_str, e.to_string()))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| GatewayError::config_load(&path_str, e.to_string()))?;

        config.validate()?;

        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Loads configuration from a string (useful for testing).
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| GatewayError::config_load("<string>", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        self.network.validate()?;
        self.monitor.validate()?;
        self.token.validate()?;
        Ok(())
    }

    /// Serializes configuration to TOML string.
    #[must_use]
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            monitor: MonitorConfig::default(),
            token: TokenConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

// ============================================
// NetworkConfig
// ============================================

/// Network configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// UDP listen address.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
}

fn default_listen_addr() -> SocketAddr {
    "127.0.0.1:5005".parse().expect("static address")
}

impl NetworkConfig {
    fn validate(&self) -> Result<()> {
        if self.listen_addr.port() == 0 {
            return Err(GatewayError::config_invalid(
                "network.listen_addr",
                "port cannot be 0",
            ));
        }
        Ok(())
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

// ============================================
// MonitorConfig
// ============================================

/// Liveness monitor configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Seconds of silence before the first probe is sent.
    #[serde(default = "default_silence_threshold")]
    pub silence_threshold_secs: u64,

    /// Milliseconds a sensor has to answer a probe.
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_ms: u64,

    /// Seconds between a missed probe and the next attempt.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,

    /// Maximum probe attempts before giving up on a sensor.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Milliseconds between monitor scan cycles.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,

    /// Minimum milliseconds between resend requests per sensor.
    #[serde(default = "default_resend_debounce")]
    pub resend_debounce_ms: u64,
}

fn default_silence_threshold() -> u64 {
    15
}

fn default_probe_timeout() -> u64 {
    1000
}

fn default_retry_delay() -> u64 {
    5
}

fn default_max_attempts() -> u32 {
    10
}

fn default_tick_interval() -> u64 {
    200
}

fn default_resend_debounce() -> u64 {
    1000
}

impl MonitorConfig {
    fn validate(&self) -> Result<()> {
        if self.silence_threshold_secs == 0 {
            return Err(GatewayError::config_invalid(
                "monitor.silence_threshold_secs",
                "must be greater than 0",
            ));
        }

        if self.probe_timeout_ms == 0 {
            return Err(GatewayError::config_invalid(
                "monitor.probe_timeout_ms",
                "must be greater than 0",
            ));
        }

        if self.max_attempts == 0 {
            return Err(GatewayError::config_invalid(
                "monitor.max_attempts",
                "must be greater than 0",
            ));
        }

        if self.tick_interval_ms == 0 {
            return Err(GatewayError::config_invalid(
                "monitor.tick_interval_ms",
                "must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Returns the silence threshold as a `Duration`.
    #[must_use]
    pub const fn silence_threshold(&self) -> Duration {
        Duration::from_secs(self.silence_threshold_secs)
    }

    /// Returns the probe timeout as a `Duration`.
    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Returns the retry delay as a `Duration`.
    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    /// Returns the tick interval as a `Duration`.
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Returns the resend debounce window as a `Duration`.
    #[must_use]
    pub const fn resend_debounce(&self) -> Duration {
        Duration::from_millis(self.resend_debounce_ms)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            silence_threshold_secs: default_silence_threshold(),
            probe_timeout_ms: default_probe_timeout(),
            retry_delay_secs: default_retry_delay(),
            max_attempts: default_max_attempts(),
            tick_interval_ms: default_tick_interval(),
            resend_debounce_ms: default_resend_debounce(),
        }
    }
}

// ============================================
// TokenConfig
// ============================================

/// Token generation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStrategy {
    /// Random 64-bit tokens (default, collision-resistant).
    Random,
    /// Tokens derived from the registration wall-clock second.
    Timestamp,
}

/// Token generation configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Which token generator to use.
    #[serde(default = "default_token_strategy")]
    pub strategy: TokenStrategy,
}

fn default_token_strategy() -> TokenStrategy {
    TokenStrategy::Random
}

impl TokenConfig {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            strategy: default_token_strategy(),
        }
    }
}

// ============================================
// LoggingConfig
// ============================================

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ============================================
// Tests
// ============================================
