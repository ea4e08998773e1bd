//! Peergate Axum Integration
//!
//! Axum middleware and extractors that put a peergate authenticator in front
//! of a router.
//!
//! # Quick Start
//!
//! ```ignore
//! use peergate_axum::{PeerGateLayer, RequirePeer};
//! use axum::{Router, routing::get};
//!
//! async fn whoami(peer: RequirePeer) -> String {
//!     peer.id().to_string()
//! }
//!
//! let gate = PeerGateLayer::from_config(&config, backend).await?;
//! let app = Router::new()
//!     .route("/whoami", get(whoami))
//!     .layer(gate);
//! ```
//!
//! Requests without valid Basic credentials get a `401` with a
//! `WWW-Authenticate: Basic realm="..."` challenge. The default authorizer
//! permits every peer that authenticates; see [`Authorizer`].

pub mod authorizer;
pub mod credentials;
pub mod error;
pub mod extractors;
pub mod layer;

pub use authorizer::{Authorizer, PermitAll};
pub use credentials::basic_credential;
pub use error::GateRejection;
pub use extractors::{AuthenticatedPeer, MaybePeer, RequirePeer};
pub use layer::{PeerGateFuture, PeerGateLayer, PeerGateService};
