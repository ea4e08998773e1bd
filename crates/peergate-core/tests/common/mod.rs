//! Common test utilities for peergate-core integration tests

pub mod mock_backend;

#[allow(unused_imports)]
pub use mock_backend::{CountingAuthenticator, MockSecretBackend};

/// Directory holding the static fixtures
#[allow(dead_code)]
pub fn fixture_root() -> &'static str {
    env!("CARGO_MANIFEST_DIR")
}
