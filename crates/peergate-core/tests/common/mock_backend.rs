//! In-memory secret backend and authenticator doubles for testing

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use peergate_core::{
    Authenticator, BackendError, Credential, Decision, PeerAuthenticator, SecretBackend,
    SecretPayload,
};

/// In-memory secret backend that counts every fetch
#[derive(Default, Clone)]
pub struct MockSecretBackend {
    secrets: Arc<DashMap<String, SecretPayload>>,
    failing: Arc<DashMap<String, String>>,
    fetches: Arc<DashMap<String, usize>>,
}

#[allow(dead_code)]
impl MockSecretBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a text secret
    pub fn with_text(self, secret_id: &str, value: &str) -> Self {
        self.secrets
            .insert(secret_id.to_string(), SecretPayload::Text(value.to_string()));
        self
    }

    /// Store a binary secret (already base64 encoded)
    pub fn with_binary(self, secret_id: &str, encoded: &str) -> Self {
        self.secrets.insert(
            secret_id.to_string(),
            SecretPayload::Binary(encoded.as_bytes().to_vec()),
        );
        self
    }

    /// Make fetches of `secret_id` fail as if the backend were unreachable
    pub fn with_failure(self, secret_id: &str, message: &str) -> Self {
        self.failing
            .insert(secret_id.to_string(), message.to_string());
        self
    }

    /// Fetches of one secret id
    pub fn fetch_count(&self, secret_id: &str) -> usize {
        self.fetches.get(secret_id).map(|n| *n).unwrap_or(0)
    }

    /// Fetches across all secret ids
    pub fn total_fetches(&self) -> usize {
        self.fetches.iter().map(|entry| *entry.value()).sum()
    }

    pub fn shared(&self) -> Option<Arc<dyn SecretBackend>> {
        Some(Arc::new(self.clone()))
    }
}

#[async_trait]
impl SecretBackend for MockSecretBackend {
    async fn get_secret_value(&self, secret_id: &str) -> Result<SecretPayload, BackendError> {
        *self.fetches.entry(secret_id.to_string()).or_insert(0) += 1;

        if let Some(message) = self.failing.get(secret_id) {
            return Err(BackendError::Unavailable(message.value().clone()));
        }

        self.secrets
            .get(secret_id)
            .map(|entry| entry.value().clone())
            .ok_or(BackendError::NotFound)
    }
}

/// Authenticator that counts calls and can be slowed down to widen races
pub struct CountingAuthenticator {
    inner: PeerAuthenticator,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl CountingAuthenticator {
    pub fn new(inner: PeerAuthenticator) -> Self {
        Self {
            inner,
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Handle to the call counter that outlives moving the authenticator
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl Authenticator for CountingAuthenticator {
    async fn authenticate(&self, credential: &Credential) -> Decision {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.check(credential)
    }
}
