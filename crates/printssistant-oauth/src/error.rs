//! Error types for the OAuth token lifecycle.

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, OAuthError>;

/// Errors that can occur while acquiring, refreshing or using tokens.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// Client credentials or an access token are not available.
    #[error("Config missing: {0}")]
    ConfigMissing(String),

    /// A callback arrived with no matching in-flight authorization.
    #[error("Missing PKCE code_verifier. Start again at /auth.")]
    MissingVerifier,

    /// The provider rejected the authorization-code exchange.
    #[error("OAuth token exchange failed: {body}")]
    AuthExchangeFailed {
        /// HTTP status from the provider, if a response was received.
        status: Option<u16>,
        /// Provider error payload, or the transport error text.
        body: String,
    },

    /// A refresh was requested but no refresh token is stored.
    #[error("No refresh_token stored.")]
    NoRefreshToken,

    /// The provider rejected the refresh-token exchange.
    #[error("Failed to refresh token: {body}")]
    RefreshFailed {
        status: Option<u16>,
        body: String,
    },

    /// The provider rejected the identity lookup.
    #[error("Failed to fetch user info: {body}")]
    IntrospectionFailed {
        status: Option<u16>,
        body: String,
    },
}

impl OAuthError {
    /// Provider payload attached to a remote failure, if any.
    pub fn provider_body(&self) -> Option<&str> {
        match self {
            OAuthError::AuthExchangeFailed { body, .. }
            | OAuthError::RefreshFailed { body, .. }
            | OAuthError::IntrospectionFailed { body, .. } => Some(body),
            _ => None,
        }
    }
}
