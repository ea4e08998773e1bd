//! Peer identity types

/// An allowed caller: a username and the secret it must present.
///
/// Equality and hashing cover both fields, so two peers sharing an id but
/// holding different secrets are distinct entries.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Peer {
    id: String,
    secret: String,
}

impl Peer {
    /// Create a new peer
    pub fn new(id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            secret: secret.into(),
        }
    }

    /// The peer's username
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The peer's secret
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl std::fmt::Debug for Peer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Peer")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl std::fmt::Display for Peer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}

/// A username/password pair presented by a caller.
///
/// Credentials are transient: they are compared against the directory and
/// never stored as-is.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential {
    username: String,
    password: String,
}

impl Credential {
    /// Create a new credential
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The presented username
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The presented password
    pub fn password(&self) -> &str {
        &self.password
    }

    /// The peer this credential would identify if it is known
    pub fn to_peer(&self) -> Peer {
        Peer::new(self.username.clone(), self.password.clone())
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
