//! OAuth flow controller.
//!
//! Orchestrates `authorize → callback exchange → persist → refresh → reuse`
//! for a single provider using the authorization-code grant with PKCE.

use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::RwLock;

use crate::error::{OAuthError, Result};
use crate::pending::{DEFAULT_PENDING_TTL, PendingAuthorizations};
use crate::pkce::{PkceChallenge, generate_state};
use crate::provider::{ClientCredentials, ProviderClient, TokenResponse};
use crate::redirect::RedirectResolver;
use crate::token_store::{SharedTokenStore, TokenSet, preview};

/// Default provider authorization endpoint.
pub const DEFAULT_AUTHORIZE_URL: &str = "https://www.canva.com/api/oauth/authorize";

/// Scopes requested on every authorization.
pub const DEFAULT_SCOPES: &[&str] = &[
    "design:content:read",
    "design:content:write",
    "asset:read",
    "asset:write",
    "folder:read",
    "app:read",
    "app:write",
];

/// OAuth client configuration.
#[derive(Clone)]
pub struct OAuthConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub authorize_url: String,
    pub scopes: Vec<String>,
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[redacted]"))
            .field("authorize_url", &self.authorize_url)
            .field("scopes", &self.scopes)
            .finish()
    }
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl OAuthConfig {
    pub fn new(client_id: Option<String>, client_secret: Option<String>) -> Self {
        Self {
            client_id,
            client_secret,
            ..Default::default()
        }
    }

    pub fn with_authorize_url(mut self, url: impl Into<String>) -> Self {
        self.authorize_url = url.into();
        self
    }

    fn client_id(&self) -> Result<&str> {
        self.client_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| OAuthError::ConfigMissing("CANVA_CLIENT_ID is not set".to_string()))
    }

    fn credentials(&self) -> Result<ClientCredentials> {
        let client_id = self.client_id()?.to_string();
        let client_secret = self
            .client_secret
            .clone()
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| {
                OAuthError::ConfigMissing("CANVA_CLIENT_SECRET is not set".to_string())
            })?;
        Ok(ClientCredentials {
            client_id,
            client_secret,
        })
    }
}

/// Coarse lifecycle phase of the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPhase {
    Idle,
    AwaitingCallback,
    Authenticated,
    Failed,
}

/// A started authorization: where to send the user, and how to correlate
/// the callback.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: String,
    pub redirect_uri: String,
}

/// The OAuth flow controller.
#[derive(Debug)]
pub struct OAuthFlow {
    config: OAuthConfig,
    resolver: RedirectResolver,
    provider: ProviderClient,
    store: SharedTokenStore,
    pending: PendingAuthorizations,
    current: RwLock<Option<TokenSet>>,
    phase: Mutex<FlowPhase>,
}

impl OAuthFlow {
    pub fn new(
        config: OAuthConfig,
        resolver: RedirectResolver,
        provider: ProviderClient,
        store: SharedTokenStore,
    ) -> Self {
        Self {
            config,
            resolver,
            provider,
            store,
            pending: PendingAuthorizations::new(DEFAULT_PENDING_TTL),
            current: RwLock::new(None),
            phase: Mutex::new(FlowPhase::Idle),
        }
    }

    /// Override how long an authorization may wait for its callback.
    pub fn with_pending_ttl(mut self, ttl: Duration) -> Self {
        self.pending = PendingAuthorizations::new(ttl);
        self
    }

    pub fn phase(&self) -> FlowPhase {
        *self.phase.lock()
    }

    pub fn resolver(&self) -> &RedirectResolver {
        &self.resolver
    }

    pub fn store(&self) -> &SharedTokenStore {
        &self.store
    }

    fn set_phase(&self, phase: FlowPhase) {
        let mut current = self.phase.lock();
        if *current != phase {
            tracing::debug!(from = ?*current, to = ?phase, "OAuth flow phase change");
            *current = phase;
        }
    }

    /// Pick up tokens persisted by an earlier process.
    pub async fn restore(&self) -> bool {
        let restored = self.tokens().await.is_some();
        if restored {
            self.set_phase(FlowPhase::Authenticated);
        }
        restored
    }

    /// Start an authorization for a request arriving on `request_host`.
    pub fn authorize(&self, request_host: &str) -> Result<AuthorizationRequest> {
        let client_id = self.config.client_id()?;
        let redirect_uri = self.resolver.resolve(request_host).to_string();
        let pkce = PkceChallenge::generate();
        let state = generate_state();

        let url = build_authorization_url(&self.config, client_id, &redirect_uri, &pkce, &state);

        self.pending
            .insert(state.clone(), pkce.verifier, redirect_uri.clone());
        self.set_phase(FlowPhase::AwaitingCallback);

        tracing::info!(redirect_uri = %redirect_uri, tier = %self.resolver.tier(), "Starting OAuth authorization");

        Ok(AuthorizationRequest {
            url,
            state,
            redirect_uri,
        })
    }

    /// Complete an authorization: exchange `code` for tokens and persist them.
    pub async fn handle_callback(
        &self,
        code: &str,
        state: Option<&str>,
        request_host: &str,
    ) -> Result<TokenSet> {
        let pending = state
            .and_then(|s| self.pending.take(s))
            .ok_or(OAuthError::MissingVerifier)?;
        let credentials = self.config.credentials()?;

        let redirect_uri = self.resolver.resolve(request_host);
        if redirect_uri != pending.redirect_uri {
            tracing::warn!(
                authorize_redirect = %pending.redirect_uri,
                callback_redirect = %redirect_uri,
                "Redirect URI differs from the one used at authorize time"
            );
        }

        tracing::info!("Exchanging auth code for tokens");
        let response = match self
            .provider
            .exchange_code(&credentials, code, &pending.verifier, redirect_uri)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Token exchange failed");
                self.set_phase(FlowPhase::Failed);
                return Err(e);
            }
        };

        let tokens = issue(response, None);
        self.install(&tokens).await;
        self.set_phase(FlowPhase::Authenticated);

        tracing::info!(access_token = %preview(&tokens.access_token), "Token response received");
        Ok(tokens)
    }

    /// Trade the stored refresh token for a new token set.
    pub async fn refresh(&self) -> Result<TokenSet> {
        let previous = self.tokens().await;
        let refresh_token = previous
            .and_then(|t| t.refresh_token)
            .ok_or(OAuthError::NoRefreshToken)?;
        let credentials = self.config.credentials()?;

        let response = match self.provider.refresh(&credentials, &refresh_token).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Token refresh failed");
                self.set_phase(FlowPhase::Failed);
                return Err(e);
            }
        };

        let tokens = issue(response, Some(refresh_token));
        self.install(&tokens).await;
        self.set_phase(FlowPhase::Authenticated);

        tracing::info!("Token refreshed successfully");
        Ok(tokens)
    }

    /// The stored access token, if any.
    ///
    /// Expiry is not checked here: the API's 401 is the signal to refresh.
    pub async fn get_valid_access_token(&self) -> Option<String> {
        self.tokens().await.map(|t| t.access_token)
    }

    /// Current token set.
    ///
    /// A writable store is authoritative, so refreshes and logouts made by
    /// another process are seen here. A read-only store cannot hold what this
    /// process obtained, so the in-process copy wins.
    pub async fn tokens(&self) -> Option<TokenSet> {
        if self.store.is_writable() {
            let loaded = self.store.load().await;
            *self.current.write().await = loaded.clone();
            return loaded;
        }

        {
            let cache = self.current.read().await;
            if cache.is_some() {
                return cache.clone();
            }
        }

        let loaded = self.store.load().await?;
        let mut cache = self.current.write().await;
        *cache = Some(loaded.clone());
        Some(loaded)
    }

    /// Identity associated with the stored access token.
    pub async fn current_user(&self) -> Result<serde_json::Value> {
        let token = self.get_valid_access_token().await.ok_or_else(|| {
            OAuthError::ConfigMissing("No access token. Visit /auth first.".to_string())
        })?;
        self.provider.current_user(&token).await
    }

    /// Forget the current tokens, in process and in the store.
    pub async fn logout(&self) {
        *self.current.write().await = None;
        self.store.clear().await;
        self.set_phase(FlowPhase::Idle);
    }

    async fn install(&self, tokens: &TokenSet) {
        *self.current.write().await = Some(tokens.clone());
        self.store.save(tokens).await;
    }
}

fn issue(response: TokenResponse, previous_refresh: Option<String>) -> TokenSet {
    TokenSet::issued(
        response.access_token,
        response.refresh_token.or(previous_refresh),
        response.expires_in.unwrap_or(0),
        Utc::now(),
    )
}

/// Build the provider authorization URL.
pub fn build_authorization_url(
    config: &OAuthConfig,
    client_id: &str,
    redirect_uri: &str,
    pkce: &PkceChallenge,
    state: &str,
) -> String {
    let scope = config.scopes.join(" ");
    let params = [
        ("response_type", "code"),
        ("client_id", client_id),
        ("redirect_uri", redirect_uri),
        ("scope", &scope),
        ("code_challenge_method", "S256"),
        ("code_challenge", &pkce.challenge),
        ("state", state),
    ];

    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", config.authorize_url, query)
}
