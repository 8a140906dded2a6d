//! In-flight authorization attempts, keyed by the OAuth `state` parameter.
//!
//! Each authorize call parks its PKCE verifier here until the matching
//! callback consumes it. Entries are single-use and expire after a TTL.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Default lifetime of an in-flight authorization (10 minutes).
pub const DEFAULT_PENDING_TTL: Duration = Duration::from_secs(10 * 60);

/// Upper bound on simultaneously parked authorizations.
pub const MAX_PENDING: usize = 256;

/// A parked authorization attempt.
#[derive(Debug, Clone)]
pub struct PendingAuthorization {
    /// PKCE code verifier generated at authorize time.
    pub verifier: String,
    /// Redirect URI sent to the provider at authorize time.
    pub redirect_uri: String,
    created_at: Instant,
}

/// Keyed store of in-flight authorizations.
#[derive(Debug)]
pub struct PendingAuthorizations {
    entries: Mutex<HashMap<String, PendingAuthorization>>,
    ttl: Duration,
}

impl PendingAuthorizations {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Park a verifier under `state`.
    pub fn insert(&self, state: String, verifier: String, redirect_uri: String) {
        let mut entries = self.entries.lock();
        let ttl = self.ttl;
        entries.retain(|_, p| p.created_at.elapsed() <= ttl);

        if entries.len() >= MAX_PENDING
            && let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, p)| p.created_at)
                .map(|(k, _)| k.clone())
        {
            tracing::warn!("Too many pending authorizations, dropping the oldest");
            entries.remove(&oldest);
        }

        entries.insert(
            state,
            PendingAuthorization {
                verifier,
                redirect_uri,
                created_at: Instant::now(),
            },
        );
    }

    /// Remove and return the authorization parked under `state`.
    ///
    /// Expired entries are discarded and reported as absent.
    pub fn take(&self, state: &str) -> Option<PendingAuthorization> {
        let pending = self.entries.lock().remove(state)?;
        if pending.created_at.elapsed() > self.ttl {
            tracing::debug!("Pending authorization expired");
            return None;
        }
        Some(pending)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for PendingAuthorizations {
    fn default() -> Self {
        Self::new(DEFAULT_PENDING_TTL)
    }
}
