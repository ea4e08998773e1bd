//! Gate errors

use thiserror::Error;

/// Failures reported by a secret backend.
///
/// This is the opaque boundary error: backends only distinguish a missing
/// secret from everything else.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The secret does not exist
    #[error("secret not found")]
    NotFound,

    /// The backend could not be reached or refused the call
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The secret exists but carries neither a text nor a binary value
    #[error("secret has no value")]
    Empty,
}

/// Failures fetching or decoding one secret payload
#[derive(Error, Debug)]
pub enum SourceError {
    /// Transient backend failure (network, throttling, credentials)
    #[error("secret source unavailable: {0}")]
    Unavailable(String),

    /// The coordinate does not resolve to a secret or fixture
    #[error("secret not found: {0}")]
    NotFound(String),

    /// The payload is not a flat JSON object of string values
    #[error("malformed secret: {0}")]
    Malformed(String),
}

/// Errors raised while constructing an authenticator
#[derive(Error, Debug)]
pub enum GateError {
    /// Loading the peer directory failed; nothing is authenticated against a
    /// partial directory
    #[error("failed to load peer directory from '{coordinate}': {source}")]
    DirectoryLoadFailed {
        /// Coordinate whose fetch or parse failed
        coordinate: String,
        /// Underlying failure
        #[source]
        source: SourceError,
    },

    /// Required configuration missing or invalid
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl GateError {
    /// Build a directory load failure for a coordinate
    pub fn load_failed(coordinate: impl Into<String>, source: SourceError) -> Self {
        Self::DirectoryLoadFailed {
            coordinate: coordinate.into(),
            source,
        }
    }

    /// Build a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Get error code for logs and API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DirectoryLoadFailed { source, .. } => match source {
                SourceError::Unavailable(_) => "SOURCE_UNAVAILABLE",
                SourceError::NotFound(_) => "SECRET_NOT_FOUND",
                SourceError::Malformed(_) => "MALFORMED_SECRET",
            },
            Self::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }
}
