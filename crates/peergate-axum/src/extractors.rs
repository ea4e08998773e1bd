//! Handler access to the peer admitted by the gate.
//!
//! [`crate::PeerGateLayer`] stores the admitted peer as an
//! [`AuthenticatedPeer`] request extension. Handlers behind the gate take
//! [`RequirePeer`]; routes mounted outside it can take [`MaybePeer`] and
//! branch on whether the request carried a gate decision at all.

use std::ops::Deref;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use peergate_types::Peer;

use crate::error::GateRejection;

/// Request extension written by the gate for admitted requests.
#[derive(Debug, Clone)]
pub struct AuthenticatedPeer(pub Peer);

fn admitted_peer(parts: &Parts) -> Option<Peer> {
    parts
        .extensions
        .get::<AuthenticatedPeer>()
        .map(|admitted| admitted.0.clone())
}

/// The peer the gate admitted.
///
/// A handler reached without passing the gate (mounted outside the layer)
/// rejects with [`GateRejection::Unauthenticated`], a 401 without a challenge.
#[derive(Debug, Clone)]
pub struct RequirePeer(pub Peer);

impl Deref for RequirePeer {
    type Target = Peer;

    fn deref(&self) -> &Peer {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequirePeer
where
    S: Send + Sync,
{
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, GateRejection> {
        match admitted_peer(parts) {
            Some(peer) => Ok(Self(peer)),
            None => Err(GateRejection::Unauthenticated),
        }
    }
}

/// The admitted peer, or `None` when the request never went through the gate.
///
/// Extraction cannot fail.
#[derive(Debug, Clone, Default)]
pub struct MaybePeer(pub Option<Peer>);

impl MaybePeer {
    /// Take the peer out
    pub fn into_inner(self) -> Option<Peer> {
        self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MaybePeer
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(admitted_peer(parts)))
    }
}
