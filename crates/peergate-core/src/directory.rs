//! Peer directory loading
//!
//! Each secret coordinate holds a flat JSON object mapping usernames to
//! secrets. The loader fetches every coordinate and folds all entries into a
//! single immutable [`PeerDirectory`].

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use futures::future::try_join_all;
use peergate_types::{Peer, SecretCoordinate};
use tracing::{debug, instrument, warn};

use crate::error::{GateError, SourceError};
use crate::source::{SecretBackend, SecretSource};

/// Immutable set of known peers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeerDirectory {
    peers: HashSet<Peer>,
}

impl PeerDirectory {
    /// Number of distinct (id, secret) pairs
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// Whether the directory holds no peers
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Exact membership test over both id and secret
    pub fn contains(&self, peer: &Peer) -> bool {
        self.peers.contains(peer)
    }

    /// Look up the stored peer equal to `peer`
    pub fn get(&self, peer: &Peer) -> Option<&Peer> {
        self.peers.get(peer)
    }

    /// Iterate over all peers in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &Peer> {
        self.peers.iter()
    }
}

impl FromIterator<Peer> for PeerDirectory {
    fn from_iter<I: IntoIterator<Item = Peer>>(iter: I) -> Self {
        Self {
            peers: iter.into_iter().collect(),
        }
    }
}

/// Parse a secret payload as a flat `string -> string` JSON object.
pub fn parse_secret_map(payload: &str) -> Result<BTreeMap<String, String>, SourceError> {
    serde_json::from_str(payload).map_err(|e| SourceError::Malformed(e.to_string()))
}

/// Builds a [`PeerDirectory`] from one or more secret coordinates
#[derive(Debug, Clone)]
pub struct PeerDirectoryLoader {
    source: SecretSource,
    coordinates: Vec<SecretCoordinate>,
}

impl PeerDirectoryLoader {
    /// Create a loader.
    ///
    /// A backend is required as soon as one coordinate is not static; when
    /// every coordinate is static the backend may be absent.
    pub fn new(
        backend: Option<Arc<dyn SecretBackend>>,
        coordinates: Vec<SecretCoordinate>,
    ) -> Result<Self, GateError> {
        if coordinates.is_empty() {
            return Err(GateError::configuration(
                "at least one secret coordinate is required",
            ));
        }

        if backend.is_none() && coordinates.iter().any(|c| !c.is_static()) {
            return Err(GateError::configuration(
                "a secret backend client is required for non-static coordinates",
            ));
        }

        debug!(?coordinates, "constructing peer directory loader");

        Ok(Self {
            source: SecretSource::new(backend),
            coordinates,
        })
    }

    /// Resolve static coordinates against `root` instead of the working directory
    #[must_use]
    pub fn with_static_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.source = self.source.with_static_root(root);
        self
    }

    /// Coordinates this loader reads
    pub fn coordinates(&self) -> &[SecretCoordinate] {
        &self.coordinates
    }

    /// Fetch and parse every coordinate.
    ///
    /// Any failure aborts the whole load; partial directories are never
    /// returned.
    #[instrument(skip(self), fields(coordinates = self.coordinates.len()))]
    pub async fn load(&self) -> Result<PeerDirectory, GateError> {
        let maps = try_join_all(self.coordinates.iter().map(|c| self.load_one(c))).await?;

        Ok(maps
            .into_iter()
            .flatten()
            .map(|(id, secret)| Peer::new(id, secret))
            .collect())
    }

    async fn load_one(
        &self,
        coordinate: &SecretCoordinate,
    ) -> Result<BTreeMap<String, String>, GateError> {
        let result = match self.source.fetch(coordinate).await {
            Ok(payload) => parse_secret_map(&payload),
            Err(e) => Err(e),
        };

        result.map_err(|source| {
            warn!(%coordinate, error = %source, "failed to load allowed peers");
            GateError::load_failed(coordinate.as_str(), source)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_secret_map() {
        let json = r#"{"db_username":"test",
            "db_password":"supersecretpassword",
            "upside":"xxxxxxx",
            "upside2":"yyyyyyy"}"#;

        let map = parse_secret_map(json).unwrap();
        assert_eq!(map.len(), 4);
        assert_eq!(map["upside"], "xxxxxxx");
        assert_eq!(map["upside2"], "yyyyyyy");
    }

    #[test]
    fn test_parse_rejects_non_string_values() {
        assert!(matches!(
            parse_secret_map(r#"{"foo": 1}"#),
            Err(SourceError::Malformed(_))
        ));
        assert!(matches!(
            parse_secret_map(r#"{"foo": {"nested": "x"}}"#),
            Err(SourceError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_rejects_non_objects() {
        assert!(parse_secret_map(r#"["foo", "bar"]"#).is_err());
        assert!(parse_secret_map("not json").is_err());
        assert!(parse_secret_map("").is_err());
    }

    #[test]
    fn test_empty_object_is_empty_map() {
        assert!(parse_secret_map("{}").unwrap().is_empty());
    }

    #[test]
    fn test_loader_requires_backend_for_remote_coordinates() {
        let err = PeerDirectoryLoader::new(
            None,
            vec![
                SecretCoordinate::new("mock:/a.json"),
                SecretCoordinate::new("foo/secret"),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, GateError::Configuration(_)));
    }

    #[test]
    fn test_loader_allows_missing_backend_when_all_static() {
        let loader = PeerDirectoryLoader::new(
            None,
            vec![SecretCoordinate::new("mock:/fake_allowed_peers.json")],
        );
        assert!(loader.is_ok());
    }

    #[test]
    fn test_loader_requires_coordinates() {
        let err = PeerDirectoryLoader::new(None, Vec::new()).unwrap_err();
        assert!(matches!(err, GateError::Configuration(_)));
    }

    #[test]
    fn test_directory_from_iter_absorbs_exact_duplicates() {
        let directory: PeerDirectory = [
            Peer::new("foo", "a"),
            Peer::new("foo", "a"),
            Peer::new("foo", "b"),
        ]
        .into_iter()
        .collect();

        assert_eq!(directory.len(), 2);
        assert!(directory.contains(&Peer::new("foo", "a")));
        assert!(directory.contains(&Peer::new("foo", "b")));
    }
}
