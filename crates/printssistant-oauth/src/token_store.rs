//! Token persistence.
//!
//! Holds the single [`TokenSet`] for a deployment. Persistence is
//! best-effort: stores constructed read-only skip writes, and write failures
//! are logged rather than returned.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Default token file name, relative to the working directory.
pub const TOKEN_FILE: &str = "tokens.json";

/// Access/refresh token pair with its absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Issuance time plus the provider-declared lifetime.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
}

impl TokenSet {
    /// Build a token set issued at `issued_at` that lives for `expires_in_secs`.
    ///
    /// `expires_at` is kept at millisecond precision, the resolution it is
    /// persisted with.
    pub fn issued(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: u64,
        issued_at: DateTime<Utc>,
    ) -> Self {
        let expires_at = i64::try_from(expires_in_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
            .trunc_subsecs(3);
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at,
        }
    }

    /// Whether `expires_at` has passed at `now`. Informational only.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Seconds remaining until expiry at `now`, saturating at zero.
    pub fn expires_in_secs(&self, now: DateTime<Utc>) -> u64 {
        (self.expires_at - now).num_seconds().max(0) as u64
    }
}

/// Abbreviate a token for display and logs.
pub fn preview(token: &str) -> String {
    let head: String = token.chars().take(12).collect();
    format!("{}…", head)
}

// ============================================================================
// TokenStore Trait
// ============================================================================

/// Storage for the deployment's token set.
#[async_trait]
pub trait TokenStore: Send + Sync + std::fmt::Debug {
    /// Read the last persisted set. Missing or corrupt data reads as `None`.
    async fn load(&self) -> Option<TokenSet>;

    /// Replace the persisted set. Best-effort; never fails the caller.
    async fn save(&self, tokens: &TokenSet);

    /// Remove the persisted set. Best-effort.
    async fn clear(&self);

    /// Whether this store persists writes.
    fn is_writable(&self) -> bool;
}

/// Shared token store for use across async contexts.
pub type SharedTokenStore = Arc<dyn TokenStore>;

// ============================================================================
// FileTokenStore
// ============================================================================

/// JSON file token store.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    writable: bool,
}

impl FileTokenStore {
    /// Create a store backed by `path`. With `writable = false`, `save` and
    /// `clear` are no-ops.
    pub fn new(path: impl Into<PathBuf>, writable: bool) -> Self {
        Self {
            path: path.into(),
            writable,
        }
    }

    /// Store at [`TOKEN_FILE`] inside `dir`.
    pub fn in_dir(dir: &Path, writable: bool) -> Self {
        Self::new(dir.join(TOKEN_FILE), writable)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write to a uniquely named sibling file, then rename it over the
    /// target. Concurrent saves each rename a complete file.
    fn write_atomically(&self, tokens: &TokenSet) -> std::io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let json = serde_json::to_vec_pretty(tokens).map_err(std::io::Error::other)?;
        let mut temp = tempfile::Builder::new()
            .prefix(TOKEN_FILE)
            .suffix(".tmp")
            .tempfile_in(dir)?;
        temp.write_all(&json)?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Option<TokenSet> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read token file");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(tokens) => Some(tokens),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring unparseable token file");
                None
            }
        }
    }

    async fn save(&self, tokens: &TokenSet) {
        if !self.writable {
            tracing::debug!("Token store is read-only, skipping save");
            return;
        }

        match self.write_atomically(tokens) {
            Ok(()) => tracing::info!("Tokens saved to {}", self.path.display()),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to persist tokens")
            }
        }
    }

    async fn clear(&self) {
        if !self.writable {
            tracing::debug!("Token store is read-only, skipping clear");
            return;
        }

        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::info!("Tokens removed from {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to delete token file")
            }
        }
    }

    fn is_writable(&self) -> bool {
        self.writable
    }
}

// ============================================================================
// InMemoryTokenStore (for testing)
// ============================================================================

/// In-memory token store for testing.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    tokens: RwLock<Option<TokenSet>>,
    save_count: std::sync::atomic::AtomicU32,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: TokenSet) -> Self {
        Self {
            tokens: RwLock::new(Some(tokens)),
            save_count: std::sync::atomic::AtomicU32::new(0),
        }
    }

    pub fn save_count(&self) -> u32 {
        self.save_count.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn load(&self) -> Option<TokenSet> {
        self.tokens.read().await.clone()
    }

    async fn save(&self, tokens: &TokenSet) {
        *self.tokens.write().await = Some(tokens.clone());
        self.save_count
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }

    async fn clear(&self) {
        *self.tokens.write().await = None;
    }

    fn is_writable(&self) -> bool {
        true
    }
}
