//! Gate configuration and composition
//!
//! [`AllowedPeerConfig`] follows the "config + factory" pattern: it holds the
//! realm, an optional cache policy and the secret coordinates, and builds the
//! authenticator the host pipeline should use. With a cache policy the result
//! is a [`CachingAuthenticator`], otherwise a plain [`PeerAuthenticator`].

use std::path::PathBuf;
use std::sync::Arc;

use peergate_types::SecretCoordinate;
use serde::Deserialize;

use crate::authenticator::{Authenticator, PeerAuthenticator};
use crate::cache::CachingAuthenticator;
use crate::directory::PeerDirectoryLoader;
use crate::error::GateError;
use crate::policy::CachePolicy;
use crate::source::SecretBackend;

/// Realm used in Basic-Auth challenges when none is configured
pub const DEFAULT_REALM: &str = "peers";

/// Allowed-peer gate configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowedPeerConfig {
    /// Basic-Auth realm; cosmetic, only used in the challenge response
    #[serde(default = "default_realm")]
    pub realm: String,

    /// Decision cache policy; absent disables caching
    #[serde(default)]
    pub cache_policy: Option<CachePolicy>,

    /// Comma separated secret coordinates, e.g.
    /// `"service/prod/echo/auth/general, service/prod/echo/auth/admin"`.
    ///
    /// Coordinates starting with `mock:` are read from JSON files under
    /// `static_root` instead of the secret backend.
    #[serde(default)]
    pub secret_coordinates: Option<String>,

    /// Directory `mock:` coordinates are resolved against
    #[serde(default)]
    pub static_root: Option<PathBuf>,
}

fn default_realm() -> String {
    DEFAULT_REALM.to_string()
}

impl Default for AllowedPeerConfig {
    fn default() -> Self {
        Self {
            realm: default_realm(),
            cache_policy: None,
            secret_coordinates: None,
            static_root: None,
        }
    }
}

impl AllowedPeerConfig {
    /// Create an empty configuration with the default realm
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// | Variable                      | Meaning                          |
    /// |-------------------------------|----------------------------------|
    /// | `PEERGATE_REALM`              | realm, default `peers`           |
    /// | `PEERGATE_CACHE_POLICY`       | cache policy; unset or empty disables caching |
    /// | `PEERGATE_SECRET_COORDINATES` | comma separated coordinates      |
    /// | `PEERGATE_STATIC_ROOT`        | root for `mock:` coordinates     |
    pub fn from_env() -> Result<Self, GateError> {
        let realm = std::env::var("PEERGATE_REALM").unwrap_or_else(|_| default_realm());

        let cache_policy = match std::env::var("PEERGATE_CACHE_POLICY") {
            Ok(spec) if !spec.trim().is_empty() => Some(spec.parse()?),
            _ => None,
        };

        Ok(Self {
            realm,
            cache_policy,
            secret_coordinates: std::env::var("PEERGATE_SECRET_COORDINATES").ok(),
            static_root: std::env::var("PEERGATE_STATIC_ROOT").ok().map(PathBuf::from),
        })
    }

    /// Set the realm
    #[must_use]
    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    /// Set the cache policy
    #[must_use]
    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = Some(policy);
        self
    }

    /// Set the comma separated secret coordinates
    #[must_use]
    pub fn with_secret_coordinates(mut self, coordinates: impl Into<String>) -> Self {
        self.secret_coordinates = Some(coordinates.into());
        self
    }

    /// Set the directory `mock:` coordinates are resolved against
    #[must_use]
    pub fn with_static_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.static_root = Some(root.into());
        self
    }

    /// Configured coordinates, each trimmed
    pub fn secret_coordinates(&self) -> Result<Vec<SecretCoordinate>, GateError> {
        let list = self
            .secret_coordinates
            .as_deref()
            .ok_or_else(|| GateError::configuration("secretCoordinates is not set"))?;

        let coordinates = SecretCoordinate::parse_list(list);
        if coordinates.is_empty() {
            return Err(GateError::configuration("secretCoordinates is empty"));
        }
        Ok(coordinates)
    }

    /// Whether any configured coordinate needs the remote secret backend
    pub fn needs_backend(&self) -> bool {
        self.secret_coordinates()
            .map(|coordinates| coordinates.iter().any(|c| !c.is_static()))
            .unwrap_or(false)
    }

    /// Build the directory loader for the configured coordinates
    pub fn loader(
        &self,
        backend: Option<Arc<dyn SecretBackend>>,
    ) -> Result<PeerDirectoryLoader, GateError> {
        let loader = PeerDirectoryLoader::new(backend, self.secret_coordinates()?)?;
        Ok(match &self.static_root {
            Some(root) => loader.with_static_root(root.clone()),
            None => loader,
        })
    }

    /// Build a plain authenticator, loading the directory eagerly
    pub async fn create_authenticator(
        &self,
        backend: Option<Arc<dyn SecretBackend>>,
    ) -> Result<PeerAuthenticator, GateError> {
        PeerAuthenticator::load(&self.loader(backend)?).await
    }

    /// Build a caching authenticator.
    ///
    /// Fails with a configuration error when no cache policy is set, before
    /// anything is fetched.
    pub async fn create_caching_authenticator(
        &self,
        backend: Option<Arc<dyn SecretBackend>>,
    ) -> Result<CachingAuthenticator<PeerAuthenticator>, GateError> {
        let policy = self.cache_policy.as_ref().ok_or_else(|| {
            GateError::configuration(
                "a cache policy is required to create a caching authenticator",
            )
        })?;

        let authenticator = self.create_authenticator(backend).await?;
        Ok(CachingAuthenticator::new(authenticator, policy))
    }

    /// Build the authenticator the host should register: caching when a
    /// policy is configured, plain otherwise
    pub async fn build_authenticator(
        &self,
        backend: Option<Arc<dyn SecretBackend>>,
    ) -> Result<Arc<dyn Authenticator>, GateError> {
        if self.cache_policy.is_some() {
            Ok(Arc::new(self.create_caching_authenticator(backend).await?))
        } else {
            Ok(Arc::new(self.create_authenticator(backend).await?))
        }
    }
}
