//! Secret source adapter
//!
//! Resolves a [`SecretCoordinate`] to the raw text of its payload. Coordinates
//! carrying the static prefix are read from local fixture files; everything
//! else goes to the injected [`SecretBackend`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use peergate_types::{CoordinateKind, SecretCoordinate};
use tracing::debug;

use crate::error::{BackendError, SourceError};

/// A secret value as delivered by the backend
#[derive(Clone, PartialEq, Eq)]
pub enum SecretPayload {
    /// Plain text value
    Text(String),
    /// Standard base64 encoded value
    Binary(Vec<u8>),
}

impl SecretPayload {
    /// Decode the payload to text
    pub fn into_text(self) -> Result<String, SourceError> {
        match self {
            Self::Text(text) => Ok(text),
            Self::Binary(encoded) => {
                let decoded = STANDARD
                    .decode(&encoded)
                    .map_err(|e| SourceError::Malformed(format!("invalid base64 payload: {e}")))?;
                String::from_utf8(decoded)
                    .map_err(|_| SourceError::Malformed("binary payload is not UTF-8".to_string()))
            }
        }
    }
}

impl std::fmt::Debug for SecretPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => write!(f, "Text({} bytes)", text.len()),
            Self::Binary(bytes) => write!(f, "Binary({} bytes)", bytes.len()),
        }
    }
}

/// Remote secret management backend
///
/// Long-lived and injected at construction so tests can substitute a stub.
#[async_trait]
pub trait SecretBackend: Send + Sync {
    /// Fetch the value stored under `secret_id`
    async fn get_secret_value(&self, secret_id: &str) -> Result<SecretPayload, BackendError>;
}

/// Capability shared by the static and remote sources
#[async_trait]
pub trait SecretFetch: Send + Sync {
    /// Fetch the text payload stored under `key`
    async fn fetch(&self, key: &str) -> Result<String, SourceError>;
}

/// Reads fixtures from a directory on disk
#[derive(Debug, Clone)]
pub struct StaticSource {
    root: PathBuf,
}

impl StaticSource {
    /// Create a static source rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory fixtures are resolved against
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> PathBuf {
        // A leading slash is relative to the root, like a resource path
        self.root.join(key.trim_start_matches('/'))
    }
}

impl Default for StaticSource {
    fn default() -> Self {
        Self::new(".")
    }
}

#[async_trait]
impl SecretFetch for StaticSource {
    async fn fetch(&self, key: &str) -> Result<String, SourceError> {
        let path = self.resolve(key);
        debug!(path = %path.display(), "loading allowed peers from static fixture");

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content.trim().to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SourceError::NotFound(path.display().to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => Err(SourceError::Malformed(
                format!("{} is not UTF-8", path.display()),
            )),
            Err(e) => Err(SourceError::Unavailable(format!("{}: {e}", path.display()))),
        }
    }
}

/// Fetches secrets from a [`SecretBackend`]
#[derive(Clone)]
pub struct RemoteSource {
    backend: Arc<dyn SecretBackend>,
}

impl RemoteSource {
    /// Wrap a backend
    pub fn new(backend: Arc<dyn SecretBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl SecretFetch for RemoteSource {
    async fn fetch(&self, key: &str) -> Result<String, SourceError> {
        debug!(coordinate = key, "loading allowed peers from secret backend");

        let payload = self
            .backend
            .get_secret_value(key)
            .await
            .map_err(|e| match e {
                BackendError::NotFound => SourceError::NotFound(key.to_string()),
                BackendError::Empty => SourceError::Malformed(format!("{key} has no value")),
                BackendError::Unavailable(message) => SourceError::Unavailable(message),
            })?;

        payload.into_text()
    }
}

/// Routes each coordinate to the static or remote source by prefix
#[derive(Clone, Default)]
pub struct SecretSource {
    fixtures: StaticSource,
    remote: Option<RemoteSource>,
}

impl SecretSource {
    /// Create a source; `backend` may be absent when only static coordinates
    /// will be fetched
    pub fn new(backend: Option<Arc<dyn SecretBackend>>) -> Self {
        Self {
            fixtures: StaticSource::default(),
            remote: backend.map(RemoteSource::new),
        }
    }

    /// Resolve static coordinates against `root`
    #[must_use]
    pub fn with_static_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.fixtures = StaticSource::new(root);
        self
    }

    /// Whether a remote backend is attached
    pub fn has_backend(&self) -> bool {
        self.remote.is_some()
    }

    /// Fetch the raw text payload for a coordinate
    pub async fn fetch(&self, coordinate: &SecretCoordinate) -> Result<String, SourceError> {
        match coordinate.kind() {
            CoordinateKind::Static(key) => self.fixtures.fetch(key).await,
            CoordinateKind::Remote(key) => match &self.remote {
                Some(remote) => remote.fetch(key).await,
                None => Err(SourceError::Unavailable(
                    "no secret backend configured".to_string(),
                )),
            },
        }
    }
}

impl std::fmt::Debug for SecretSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretSource")
            .field("static_root", &self.fixtures.root)
            .field("has_backend", &self.remote.is_some())
            .finish()
    }
}
