//! Peergate Core - Peer allow-list authentication
//!
//! Decides whether a presented username/password pair belongs to a known,
//! pre-provisioned peer. Peers are loaded from one or more secret stores into
//! an immutable directory; decisions can be cached with a bounded,
//! time-aware policy.
//!
//! Data flow: [`SecretSource`] -> [`PeerDirectoryLoader`] -> [`PeerDirectory`]
//! -> [`PeerAuthenticator`], optionally wrapped by [`CachingAuthenticator`].

pub mod authenticator;
#[cfg(feature = "aws")]
pub mod aws;
pub mod cache;
pub mod config;
pub mod directory;
pub mod error;
pub mod policy;
pub mod source;

pub use authenticator::*;
#[cfg(feature = "aws")]
pub use aws::SecretsManagerBackend;
pub use cache::{CacheStats, CachingAuthenticator};
pub use config::*;
pub use directory::*;
pub use error::*;
pub use policy::CachePolicy;
pub use source::*;

pub use peergate_types::{Credential, Peer, SecretCoordinate};
