//! Secret coordinate types

use serde::{Deserialize, Serialize};

/// Coordinates starting with this prefix are served from a local static
/// fixture instead of the remote secret backend.
pub const STATIC_PREFIX: &str = "mock:";

/// Opaque key naming where one JSON map of peer credentials is stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretCoordinate(String);

/// Where a coordinate resolves to, decided purely by prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateKind<'a> {
    /// Local fixture; holds the remainder after the prefix
    Static(&'a str),
    /// Remote secret backend; holds the whole coordinate
    Remote(&'a str),
}

impl SecretCoordinate {
    /// Create a coordinate from a raw string
    pub fn new(coordinate: impl Into<String>) -> Self {
        Self(coordinate.into())
    }

    /// Split a comma separated list into trimmed coordinates.
    ///
    /// Empty pieces are dropped, so `"a/b, ,c/d,"` yields two coordinates.
    pub fn parse_list(list: &str) -> Vec<Self> {
        list.split(',')
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .map(Self::new)
            .collect()
    }

    /// The raw coordinate string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this coordinate is served from a local fixture
    pub fn is_static(&self) -> bool {
        self.0.starts_with(STATIC_PREFIX)
    }

    /// Classify the coordinate by its prefix
    pub fn kind(&self) -> CoordinateKind<'_> {
        match self.0.strip_prefix(STATIC_PREFIX) {
            Some(rest) => CoordinateKind::Static(rest),
            None => CoordinateKind::Remote(&self.0),
        }
    }
}

impl std::fmt::Display for SecretCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SecretCoordinate {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SecretCoordinate {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_trims_each_piece() {
        let coordinates = SecretCoordinate::parse_list("  a/b/c, d/e/f   ");
        assert_eq!(
            coordinates,
            vec![SecretCoordinate::new("a/b/c"), SecretCoordinate::new("d/e/f")]
        );
    }

    #[test]
    fn test_parse_list_drops_empty_pieces() {
        assert_eq!(SecretCoordinate::parse_list("a, ,b,").len(), 2);
        assert!(SecretCoordinate::parse_list("  ").is_empty());
    }

    #[test]
    fn test_kind_by_prefix() {
        let mock = SecretCoordinate::new("mock:/x/y/allowed-peers.json");
        assert!(mock.is_static());
        assert_eq!(mock.kind(), CoordinateKind::Static("/x/y/allowed-peers.json"));

        let remote = SecretCoordinate::new("service/prod/echo/auth");
        assert!(!remote.is_static());
        assert_eq!(remote.kind(), CoordinateKind::Remote("service/prod/echo/auth"));
    }

    #[test]
    fn test_prefix_must_be_leading() {
        let coordinate = SecretCoordinate::new("service/mock:/x");
        assert!(!coordinate.is_static());
    }
}
