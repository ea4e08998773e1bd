//! Authorization rules applied after a peer authenticates.

use axum::http::request::Parts;
use peergate_types::Peer;

/// Decides whether an authenticated peer may access a request.
pub trait Authorizer: Send + Sync {
    /// Return `true` to let the request through.
    fn authorize(&self, peer: &Peer, request: &Parts) -> bool;
}

/// Permits every peer that authenticated.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermitAll;

impl Authorizer for PermitAll {
    fn authorize(&self, _peer: &Peer, _request: &Parts) -> bool {
        true
    }
}

impl<F> Authorizer for F
where
    F: Fn(&Peer, &Parts) -> bool + Send + Sync,
{
    fn authorize(&self, peer: &Peer, request: &Parts) -> bool {
        self(peer, request)
    }
}
