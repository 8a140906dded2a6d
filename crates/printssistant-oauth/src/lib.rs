//! OAuth 2.0 PKCE token lifecycle for the Canva design API.
//!
//! Drives a single-provider authorization-code grant: authorize, callback
//! exchange, persistence, refresh and reuse of the resulting tokens.
//!
//! # Components
//!
//! - [`pkce`]: verifier/challenge generation and CSRF `state` values
//! - [`redirect`]: callback URL selection per deployment tier
//! - [`pending`]: in-flight authorizations keyed by `state`, with TTL
//! - [`token_store`]: best-effort token persistence
//! - [`provider`]: token endpoint and identity calls against the provider
//! - [`flow`]: the flow controller tying the above together

pub mod error;
pub mod flow;
pub mod pending;
pub mod pkce;
pub mod provider;
pub mod redirect;
pub mod token_store;

pub use error::{OAuthError, Result};
pub use flow::{AuthorizationRequest, DEFAULT_SCOPES, FlowPhase, OAuthConfig, OAuthFlow};
pub use pending::{PendingAuthorization, PendingAuthorizations};
pub use pkce::PkceChallenge;
pub use provider::{ClientCredentials, ProviderClient, TokenResponse};
pub use redirect::{DeploymentTier, RedirectResolver};
pub use token_store::{
    FileTokenStore, InMemoryTokenStore, SharedTokenStore, TokenSet, TokenStore, preview,
};
