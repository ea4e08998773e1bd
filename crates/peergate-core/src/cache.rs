//! Decision caching layer
//!
//! Wraps any [`Authenticator`] with a bounded, time-aware cache of decisions
//! keyed by credential. Denials are cached too, so repeated guessing is
//! answered from memory under the same eviction policy.
//!
//! # Usage
//!
//! ```ignore
//! use peergate_core::{CachePolicy, CachingAuthenticator, PeerAuthenticator};
//!
//! let policy: CachePolicy = "maximumSize=100, expireAfterAccess=10m".parse()?;
//! let cached = CachingAuthenticator::new(PeerAuthenticator::load(&loader).await?, &policy);
//!
//! // First call computes the decision, later calls within policy reuse it
//! let decision = cached.authenticate(&credential).await;
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use moka::policy::EvictionPolicy;
use peergate_types::Credential;
use sha2::{Digest, Sha256};
use tracing::instrument;

use crate::authenticator::{Authenticator, Decision};
use crate::policy::{CachePolicy, MAX_EXPIRY};

/// Cache key derived from a credential.
///
/// Raw passwords are not kept as map keys; the digest covers the
/// length-prefixed username and the password, so distinct credentials never
/// share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CredentialKey([u8; 32]);

impl CredentialKey {
    fn new(credential: &Credential) -> Self {
        let username = credential.username().as_bytes();
        let mut hasher = Sha256::new();
        hasher.update((username.len() as u64).to_be_bytes());
        hasher.update(username);
        hasher.update(credential.password().as_bytes());
        Self(hasher.finalize().into())
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that computed a fresh decision
    pub misses: u64,
    /// Approximate number of live entries
    pub entries: u64,
}

impl CacheStats {
    /// Total number of lookups.
    pub fn requests(&self) -> u64 {
        self.hits + self.misses
    }
}

/// Caching authenticator wrapper.
///
/// # Cache Behavior
///
/// - `maximumSize` evicts least-recently-used entries
/// - `expireAfterAccess` / `expireAfterWrite` are checked at lookup time;
///   no background refresh is performed
/// - Concurrent misses for the same credential share one computation: the
///   first caller runs the wrapped authenticator and the others wait for its
///   result
///
/// # Thread Safety
///
/// This authenticator is thread-safe and can be shared across tasks via `Arc`.
pub struct CachingAuthenticator<A> {
    inner: A,
    decisions: Cache<CredentialKey, Decision>,
    policy: CachePolicy,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<A: Authenticator> CachingAuthenticator<A> {
    /// Wrap `inner` with a cache built from `policy`
    pub fn new(inner: A, policy: &CachePolicy) -> Self {
        let mut builder = Cache::builder().eviction_policy(EvictionPolicy::lru());

        if let Some(size) = policy.maximum_size {
            builder = builder.max_capacity(size);
        }
        if let Some(capacity) = policy.initial_capacity {
            builder = builder.initial_capacity(capacity);
        }
        // Parsed policies are already bounded; built ones may not be
        if let Some(ttl) = policy.expire_after_access {
            builder = builder.time_to_idle(ttl.min(MAX_EXPIRY));
        }
        if let Some(ttl) = policy.expire_after_write {
            builder = builder.time_to_live(ttl.min(MAX_EXPIRY));
        }

        tracing::debug!(%policy, "constructed caching authenticator");

        Self {
            inner,
            decisions: builder.build(),
            policy: policy.clone(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// The wrapped authenticator
    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// The policy this cache was built with
    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.decisions.entry_count(),
        }
    }

    /// Drop the cached decision for one credential
    pub async fn invalidate(&self, credential: &Credential) {
        self.decisions.invalidate(&CredentialKey::new(credential)).await;
    }

    /// Drop every cached decision
    pub fn invalidate_all(&self) {
        self.decisions.invalidate_all();
    }

    /// Apply pending evictions so `stats().entries` is exact
    pub async fn sync(&self) {
        self.decisions.run_pending_tasks().await;
    }

    fn record(&self, computed: bool) {
        if computed {
            self.misses.fetch_add(1, Ordering::Relaxed);
            if self.policy.record_stats {
                metrics::counter!("peergate_cache_misses", "operation" => "authenticate")
                    .increment(1);
            }
        } else {
            tracing::trace!("decision cache hit");
            self.hits.fetch_add(1, Ordering::Relaxed);
            if self.policy.record_stats {
                metrics::counter!("peergate_cache_hits", "operation" => "authenticate")
                    .increment(1);
            }
        }
    }
}

#[async_trait]
impl<A: Authenticator> Authenticator for CachingAuthenticator<A> {
    #[instrument(skip_all, fields(username = credential.username()), level = "debug")]
    async fn authenticate(&self, credential: &Credential) -> Decision {
        let mut computed = false;

        let decision = self
            .decisions
            .get_with(CredentialKey::new(credential), async {
                computed = true;
                self.inner.authenticate(credential).await
            })
            .await;

        self.record(computed);
        decision
    }
}

impl<A> std::fmt::Debug for CachingAuthenticator<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingAuthenticator")
            .field("policy", &self.policy)
            .field("entries", &self.decisions.entry_count())
            .finish_non_exhaustive()
    }
}
