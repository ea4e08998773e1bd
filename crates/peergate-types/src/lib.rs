//! Peergate Types - Shared domain types
//!
//! This crate contains the domain types shared by the peergate crates:
//! - Peer identities and presented credentials
//! - Secret coordinates naming where peer credentials are stored

pub mod coordinate;
pub mod peer;

pub use coordinate::*;
pub use peer::*;
