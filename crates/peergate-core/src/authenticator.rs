//! Peer authentication
//!
//! [`Authenticator`] is the contract the host pipeline consumes. The plain
//! [`PeerAuthenticator`] answers from a directory snapshot taken at
//! construction; [`crate::CachingAuthenticator`] decorates any authenticator
//! with a bounded decision cache.

use std::sync::Arc;

use async_trait::async_trait;
use peergate_types::{Credential, Peer};
use tracing::{debug, info};

use crate::directory::{PeerDirectory, PeerDirectoryLoader};
use crate::error::GateError;

/// Outcome of one authentication attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The credential matches a known peer
    Allowed(Peer),
    /// Unknown username or wrong secret; the two are not distinguished
    Denied,
}

impl Decision {
    /// Whether the caller was accepted
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed(_))
    }

    /// The authenticated peer, if any
    pub fn peer(&self) -> Option<&Peer> {
        match self {
            Self::Allowed(peer) => Some(peer),
            Self::Denied => None,
        }
    }

    /// Convert into the host-facing optional principal
    pub fn into_peer(self) -> Option<Peer> {
        match self {
            Self::Allowed(peer) => Some(peer),
            Self::Denied => None,
        }
    }
}

/// Decides whether a credential belongs to a known peer.
///
/// Implementations must be safe to call concurrently without external
/// locking. Rejection is a [`Decision::Denied`], never an error.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Authenticate a presented credential
    async fn authenticate(&self, credential: &Credential) -> Decision;
}

#[async_trait]
impl<A: Authenticator + ?Sized> Authenticator for Arc<A> {
    async fn authenticate(&self, credential: &Credential) -> Decision {
        (**self).authenticate(credential).await
    }
}

/// Exact-match authenticator over a fixed directory
#[derive(Debug, Clone)]
pub struct PeerAuthenticator {
    peers: Arc<PeerDirectory>,
}

impl PeerAuthenticator {
    /// Create an authenticator over an already loaded directory
    pub fn new(directory: PeerDirectory) -> Self {
        info!(
            peers = directory.len(),
            "constructed authenticator with allowed peers"
        );
        Self {
            peers: Arc::new(directory),
        }
    }

    /// Load the directory eagerly and build an authenticator over it
    pub async fn load(loader: &PeerDirectoryLoader) -> Result<Self, GateError> {
        let directory = loader.load().await?;
        Ok(Self::new(directory))
    }

    /// The directory snapshot this authenticator answers from
    pub fn directory(&self) -> &PeerDirectory {
        &self.peers
    }

    /// Synchronous form of [`Authenticator::authenticate`]
    pub fn check(&self, credential: &Credential) -> Decision {
        let probe = credential.to_peer();

        match self.peers.get(&probe) {
            Some(peer) => {
                debug!(
                    username = credential.username(),
                    "peer authenticated and allowed to request service"
                );
                Decision::Allowed(peer.clone())
            }
            None => {
                debug!(
                    username = credential.username(),
                    "not known in the list of allowed peers"
                );
                Decision::Denied
            }
        }
    }
}

#[async_trait]
impl Authenticator for PeerAuthenticator {
    async fn authenticate(&self, credential: &Credential) -> Decision {
        self.check(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authenticator() -> PeerAuthenticator {
        PeerAuthenticator::new(
            [Peer::new("foo", "secret1"), Peer::new("bar", "secret2")]
                .into_iter()
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_peer_is_allowed() {
        let decision = authenticator()
            .authenticate(&Credential::new("foo", "secret1"))
            .await;
        assert_eq!(decision, Decision::Allowed(Peer::new("foo", "secret1")));
    }

    #[tokio::test]
    async fn test_wrong_secret_is_denied() {
        let decision = authenticator()
            .authenticate(&Credential::new("foo", "secret2"))
            .await;
        assert_eq!(decision, Decision::Denied);
    }

    #[tokio::test]
    async fn test_unknown_peer_is_denied() {
        let decision = authenticator()
            .authenticate(&Credential::new("baz", "secret1"))
            .await;
        assert!(!decision.is_allowed());
        assert!(decision.into_peer().is_none());
    }

    #[test]
    fn test_empty_credentials_are_denied() {
        assert_eq!(authenticator().check(&Credential::new("", "")), Decision::Denied);
    }

    #[tokio::test]
    async fn test_shared_authenticator_delegates() {
        let shared: Arc<dyn Authenticator> = Arc::new(authenticator());
        let decision = shared.authenticate(&Credential::new("bar", "secret2")).await;
        assert_eq!(decision.peer(), Some(&Peer::new("bar", "secret2")));
    }
}
