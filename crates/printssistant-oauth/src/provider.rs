//! HTTP calls against the provider's OAuth and identity endpoints.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{OAuthError, Result};

/// Token endpoint path relative to the API base.
pub const TOKEN_PATH: &str = "/rest/v1/oauth/token";

/// Identity endpoint path relative to the API base.
pub const USER_PATH: &str = "/rest/v1/users/me";

/// Confidential client credentials.
#[derive(Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .finish()
    }
}

/// Raw token endpoint response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Debug, Serialize)]
struct CodeExchangeForm<'a> {
    grant_type: &'static str,
    code: &'a str,
    redirect_uri: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    code_verifier: &'a str,
}

#[derive(Debug, Serialize)]
struct RefreshForm<'a> {
    grant_type: &'static str,
    refresh_token: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
}

/// Client for the provider's token and identity endpoints.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    http: Client,
    api_base: String,
}

impl ProviderClient {
    /// Create a client whose requests time out after `timeout`.
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build().map_err(|e| {
            OAuthError::ConfigMissing(format!("Failed to build HTTP client: {}", e))
        })?;
        Ok(Self::with_client(http, api_base))
    }

    /// Create with an existing reqwest client.
    pub fn with_client(http: Client, api_base: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Exchange an authorization code and its PKCE verifier for tokens.
    pub async fn exchange_code(
        &self,
        credentials: &ClientCredentials,
        code: &str,
        verifier: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse> {
        let form = CodeExchangeForm {
            grant_type: "authorization_code",
            code,
            redirect_uri,
            client_id: &credentials.client_id,
            client_secret: &credentials.client_secret,
            code_verifier: verifier,
        };

        self.post_token_form(&form, |status, body| OAuthError::AuthExchangeFailed {
            status,
            body,
        })
        .await
    }

    /// Exchange a refresh token for a new access token.
    pub async fn refresh(
        &self,
        credentials: &ClientCredentials,
        refresh_token: &str,
    ) -> Result<TokenResponse> {
        let form = RefreshForm {
            grant_type: "refresh_token",
            refresh_token,
            client_id: &credentials.client_id,
            client_secret: &credentials.client_secret,
        };

        self.post_token_form(&form, |status, body| OAuthError::RefreshFailed {
            status,
            body,
        })
        .await
    }

    /// Fetch the identity behind `access_token`.
    pub async fn current_user(&self, access_token: &str) -> Result<serde_json::Value> {
        let fail = |status, body| OAuthError::IntrospectionFailed { status, body };

        let response = self
            .http
            .get(format!("{}{}", self.api_base, USER_PATH))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| fail(None, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| fail(Some(status.as_u16()), e.to_string()))?;

        if !status.is_success() {
            return Err(fail(Some(status.as_u16()), body));
        }

        serde_json::from_str(&body).map_err(|e| {
            fail(
                Some(status.as_u16()),
                format!("Failed to parse user response: {}", e),
            )
        })
    }

    async fn post_token_form<F, E>(&self, form: &F, fail: E) -> Result<TokenResponse>
    where
        F: Serialize + ?Sized,
        E: Fn(Option<u16>, String) -> OAuthError,
    {
        let response = self
            .http
            .post(format!("{}{}", self.api_base, TOKEN_PATH))
            .form(form)
            .send()
            .await
            .map_err(|e| fail(None, format!("Token request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if !status.is_success() {
            return Err(fail(Some(status.as_u16()), body));
        }

        serde_json::from_str(&body).map_err(|e| {
            fail(
                Some(status.as_u16()),
                format!("Failed to parse token response: {}", e),
            )
        })
    }
}
