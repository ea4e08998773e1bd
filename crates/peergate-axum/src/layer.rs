//! Tower middleware layer that gates requests on peer authentication.
//!
//! The [`PeerGateLayer`] extracts Basic-Auth credentials, asks the configured
//! [`Authenticator`] for a decision and applies the [`Authorizer`]. Accepted
//! requests carry the peer in their extensions; everything else is answered
//! with a challenge or a 403 without reaching the inner service.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};

use axum::body::Body;
use axum::http::request::Parts;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;
use peergate_core::{
    AllowedPeerConfig, Authenticator, Decision, GateError, SecretBackend, DEFAULT_REALM,
};
use peergate_types::Peer;
use pin_project_lite::pin_project;
use tower::{Layer, Service};
use tracing::debug;

use crate::authorizer::{Authorizer, PermitAll};
use crate::credentials::basic_credential;
use crate::error::GateRejection;
use crate::extractors::AuthenticatedPeer;

/// Tower layer that puts the peer gate in front of a service.
#[derive(Clone)]
pub struct PeerGateLayer {
    authenticator: Arc<dyn Authenticator>,
    authorizer: Arc<dyn Authorizer>,
    realm: Arc<str>,
}

impl PeerGateLayer {
    /// Gate with the default realm and the permit-all authorizer.
    #[must_use]
    pub fn new(authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            authenticator,
            authorizer: Arc::new(PermitAll),
            realm: Arc::from(DEFAULT_REALM),
        }
    }

    /// Build the authenticator described by `config` and gate with it.
    ///
    /// A cache policy in the config selects the caching authenticator. All
    /// load failures surface here, before any request is served.
    pub async fn from_config(
        config: &AllowedPeerConfig,
        backend: Option<Arc<dyn SecretBackend>>,
    ) -> Result<Self, GateError> {
        let authenticator = config.build_authenticator(backend).await?;
        Ok(Self::new(authenticator).with_realm(config.realm.as_str()))
    }

    /// Set the realm advertised in challenges.
    #[must_use]
    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Arc::from(realm.into());
        self
    }

    /// Replace the permit-all authorizer.
    #[must_use]
    pub fn with_authorizer(mut self, authorizer: impl Authorizer + 'static) -> Self {
        self.authorizer = Arc::new(authorizer);
        self
    }

    /// The realm advertised in challenges.
    pub fn realm(&self) -> &str {
        &self.realm
    }

    async fn admit(&self, parts: &Parts) -> Result<Peer, GateRejection> {
        let Some(credential) = basic_credential(&parts.headers) else {
            debug!("request without basic credentials");
            return Err(GateRejection::challenge(&*self.realm));
        };

        let peer = match self.authenticator.authenticate(&credential).await {
            Decision::Allowed(peer) => peer,
            Decision::Denied => return Err(GateRejection::challenge(&*self.realm)),
        };

        if !self.authorizer.authorize(&peer, parts) {
            debug!(peer = peer.id(), uri = %parts.uri, "peer not authorized");
            return Err(GateRejection::Forbidden);
        }

        Ok(peer)
    }
}

impl<S> Layer<S> for PeerGateLayer {
    type Service = PeerGateService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        PeerGateService {
            inner,
            gate: self.clone(),
        }
    }
}

/// The peer gate service.
#[derive(Clone)]
pub struct PeerGateService<S> {
    inner: S,
    gate: PeerGateLayer,
}

/// Request parts plus the gate's verdict on them
type Admission = (Parts, Result<Peer, GateRejection>);

impl<S> Service<Request<Body>> for PeerGateService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = PeerGateFuture<S>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        // Keep the service that was driven to readiness, leave a clone behind
        let clone = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, clone);
        let gate = self.gate.clone();

        let (parts, body) = req.into_parts();
        let admission: BoxFuture<'static, Admission> = Box::pin(async move {
            let verdict = gate.admit(&parts).await;
            (parts, verdict)
        });

        PeerGateFuture {
            state: FutureState::Authenticating {
                admission,
                inner,
                body: Some(body),
            },
        }
    }
}

pin_project! {
    /// Future for the peer gate service.
    pub struct PeerGateFuture<S>
    where
        S: Service<Request<Body>, Response = Response>,
    {
        #[pin]
        state: FutureState<S>,
    }
}

pin_project! {
    #[project = FutureStateProj]
    enum FutureState<S>
    where
        S: Service<Request<Body>, Response = Response>,
    {
        Authenticating {
            admission: BoxFuture<'static, Admission>,
            inner: S,
            body: Option<Body>,
        },
        Calling {
            #[pin]
            future: S::Future,
        },
        Done,
    }
}

impl<S> Future for PeerGateFuture<S>
where
    S: Service<Request<Body>, Response = Response>,
{
    type Output = Result<Response, S::Error>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        loop {
            let this = self.as_mut().project();

            match this.state.project() {
                FutureStateProj::Authenticating {
                    admission,
                    inner,
                    body,
                } => {
                    let (mut parts, verdict) = ready!(admission.as_mut().poll(cx));

                    let peer = match verdict {
                        Ok(peer) => peer,
                        Err(rejection) => {
                            self.set(PeerGateFuture {
                                state: FutureState::Done,
                            });
                            return Poll::Ready(Ok(rejection.into_response()));
                        }
                    };

                    parts.extensions.insert(AuthenticatedPeer(peer));
                    let request = Request::from_parts(parts, body.take().unwrap_or_default());
                    let future = inner.call(request);

                    self.set(PeerGateFuture {
                        state: FutureState::Calling { future },
                    });
                }
                FutureStateProj::Calling { future } => {
                    return future.poll(cx);
                }
                FutureStateProj::Done => {
                    panic!("polled after completion");
                }
            }
        }
    }
}
