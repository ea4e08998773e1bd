//! Configuration for the Gate API service.

use peergate_core::{AllowedPeerConfig, GateError};

/// Gate API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,

    /// Peer gate configuration
    pub gate: AllowedPeerConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_port = std::env::var("HTTP_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("HTTP_PORT"))?;

        let gate = AllowedPeerConfig::from_env()?;

        // Surface a missing coordinate list before touching any backend
        gate.secret_coordinates()?;

        Ok(Self { http_port, gate })
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Gate config error: {0}")]
    Gate(#[from] GateError),
}
