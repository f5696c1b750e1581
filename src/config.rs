//! # Configuration Management
//!
//! Centralized configuration for the vecsum server.
//!
//! This module provides structured configuration for the listener and the
//! per-connection protocol limits, including timeouts and frame-size caps.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Environment variables via `from_env()`
//! - Direct instantiation with defaults
//!
//! ## Security Considerations
//! - The read timeout applies to every phase of the protocol, including the
//!   identifier/proof exchange, so a client cannot hold a slot open by
//!   stalling before authentication
//! - Frame-size limits bound per-session memory to one vector at a time

use crate::error::{Result, ServerError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Default TCP port, kept from the service this replaces.
pub const DEFAULT_PORT: u16 = 33333;

/// Length of the salt string on the wire (16 uppercase hex characters).
pub const SALT_LEN: usize = 16;

/// Length of the client proof on the wire (raw SHA-256 output).
pub const PROOF_LEN: usize = 32;

/// Main configuration structure containing all configurable settings
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ServerConfig {
    /// Listener configuration
    #[serde(default)]
    pub server: ListenerConfig,

    /// Per-connection protocol limits
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| ServerError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ServerError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config = toml::from_str::<Self>(content)
            .map_err(|e| ServerError::ConfigError(format!("Failed to parse TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("VECSUM_SERVER_ADDRESS") {
            config.server.address = addr;
        }

        if let Ok(timeout) = std::env::var("VECSUM_READ_TIMEOUT_MS") {
            if let Ok(val) = timeout.parse::<u64>() {
                config.limits.read_timeout_ms = val;
            }
        }

        if let Ok(max) = std::env::var("VECSUM_MAX_VECTOR_LEN") {
            if let Ok(val) = max.parse::<u32>() {
                config.limits.max_vector_len = val;
            }
        }

        if let Ok(max) = std::env::var("VECSUM_MAX_VECTORS") {
            if let Ok(val) = max.parse::<u32>() {
                config.limits.max_vectors = val;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Check the configuration for values that cannot work at runtime
    pub fn validate(&self) -> Result<()> {
        if self.server.address.parse::<std::net::SocketAddr>().is_err() {
            return Err(ServerError::ConfigError(format!(
                "Invalid listen address: {}",
                self.server.address
            )));
        }
        if self.limits.read_timeout_ms == 0 {
            return Err(ServerError::ConfigError(
                "read_timeout_ms must be non-zero".to_string(),
            ));
        }
        if self.limits.max_client_id_len == 0 {
            return Err(ServerError::ConfigError(
                "max_client_id_len must be non-zero".to_string(),
            ));
        }
        if self.limits.max_vector_len == 0 || self.limits.max_vectors == 0 {
            return Err(ServerError::ConfigError(
                "vector limits must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings for the TCP listener
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenerConfig {
    /// Address the server binds to
    #[serde(default = "default_address")]
    pub address: String,

    /// How long to wait for in-flight sessions on shutdown, in milliseconds
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}

impl ListenerConfig {
    /// Shutdown grace period as a [`Duration`]
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

/// Per-connection protocol limits
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct LimitsConfig {
    /// Deadline for every single read on a session socket, in milliseconds
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,

    /// Maximum accepted length of the client identifier frame, in bytes
    #[serde(default = "default_max_client_id_len")]
    pub max_client_id_len: u32,

    /// Maximum number of elements accepted in one vector
    #[serde(default = "default_max_vector_len")]
    pub max_vector_len: u32,

    /// Maximum number of vectors accepted in one batch
    #[serde(default = "default_max_vectors")]
    pub max_vectors: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            read_timeout_ms: default_read_timeout_ms(),
            max_client_id_len: default_max_client_id_len(),
            max_vector_len: default_max_vector_len(),
            max_vectors: default_max_vectors(),
        }
    }
}

impl LimitsConfig {
    /// Read deadline as a [`Duration`]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

/// Logging configuration for the binary
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Optional path for the line-oriented event log file
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_address() -> String {
    format!("0.0.0.0:{DEFAULT_PORT}")
}

fn default_shutdown_grace_ms() -> u64 {
    10_000
}

fn default_read_timeout_ms() -> u64 {
    5_000
}

fn default_max_client_id_len() -> u32 {
    256
}

fn default_max_vector_len() -> u32 {
    1 << 20
}

fn default_max_vectors() -> u32 {
    1 << 16
}

fn default_log_level() -> String {
    "info".to_string()
}
