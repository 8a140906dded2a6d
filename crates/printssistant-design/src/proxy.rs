//! Authenticated design creation.

use std::sync::Arc;

use printssistant_oauth::OAuthFlow;

use crate::client::{DesignClient, DesignCreated};
use crate::error::{DesignError, Result};
use crate::request::DesignSpec;

/// Forwards normalised design requests using the flow's access token.
#[derive(Debug, Clone)]
pub struct DesignProxy {
    flow: Arc<OAuthFlow>,
    client: DesignClient,
    fallback_token: Option<String>,
}

impl DesignProxy {
    pub fn new(flow: Arc<OAuthFlow>, client: DesignClient) -> Self {
        Self {
            flow,
            client,
            fallback_token: None,
        }
    }

    /// Token used when the flow holds none.
    pub fn with_fallback_token(mut self, token: Option<String>) -> Self {
        self.fallback_token = token.filter(|t| !t.is_empty());
        self
    }

    async fn access_token(&self) -> Result<String> {
        if let Some(token) = self.flow.get_valid_access_token().await {
            return Ok(token);
        }
        match &self.fallback_token {
            Some(token) => {
                tracing::debug!("No stored token, using configured access token");
                Ok(token.clone())
            }
            None => Err(DesignError::MissingAccessToken),
        }
    }

    /// Create a design from a caller-supplied request.
    pub async fn create_design(&self, spec: &DesignSpec) -> Result<DesignCreated> {
        let design = spec.normalize()?;
        let token = self.access_token().await?;
        self.client.create(&token, &design).await
    }
}
