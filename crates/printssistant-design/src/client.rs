//! Client for the remote design-creation endpoint.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{DesignError, Result, body_to_details};
use crate::request::NormalizedDesign;

/// Design-creation path relative to the API base.
pub const DESIGNS_PATH: &str = "/rest/v1/designs";

/// Host used to synthesise viewable URLs when the API omits them.
pub const DEFAULT_VIEW_BASE: &str = "https://www.canva.com";

/// Outbound timeout for design creation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Serialize)]
struct CreateDesignBody<'a> {
    design: DesignBody<'a>,
}

#[derive(Debug, Serialize)]
struct DesignBody<'a> {
    design_type: DesignType,
    title: &'a str,
}

#[derive(Debug, Serialize)]
struct DesignType {
    #[serde(rename = "type")]
    kind: &'static str,
    width: u32,
    height: u32,
}

#[derive(Debug, Default, Deserialize)]
struct CreateDesignResponse {
    #[serde(default)]
    design: Option<RemoteDesign>,
}

#[derive(Debug, Default, Deserialize)]
struct RemoteDesign {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    urls: Option<RemoteUrls>,
}

#[derive(Debug, Default, Deserialize)]
struct RemoteUrls {
    #[serde(default)]
    view_url: Option<String>,
    #[serde(default)]
    edit_url: Option<String>,
}

/// Stable shape returned to callers after a design is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignCreated {
    pub status: String,
    pub design_id: String,
    /// Preferred link: view URL, else edit URL, else a synthesised view URL.
    pub url: String,
    pub view_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub message: String,
}

/// HTTP client for the remote design API.
#[derive(Debug, Clone)]
pub struct DesignClient {
    http: Client,
    api_base: String,
    view_base: String,
}

impl DesignClient {
    /// Create a client whose requests time out after `timeout`.
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DesignError::Client(e.to_string()))?;
        Ok(Self::with_client(http, api_base))
    }

    /// Create with an existing reqwest client.
    pub fn with_client(http: Client, api_base: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            view_base: DEFAULT_VIEW_BASE.to_string(),
        }
    }

    /// Set the host used for synthesised view URLs.
    pub fn with_view_base(mut self, view_base: impl Into<String>) -> Self {
        self.view_base = view_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Viewable URL for a design id.
    pub fn view_url_for(&self, design_id: &str) -> String {
        format!("{}/design/{}/view", self.view_base, design_id)
    }

    /// Create a design with the given bearer token.
    pub async fn create(
        &self,
        access_token: &str,
        design: &NormalizedDesign,
    ) -> Result<DesignCreated> {
        let body = CreateDesignBody {
            design: DesignBody {
                design_type: DesignType {
                    kind: "custom",
                    width: design.width_px,
                    height: design.height_px,
                },
                title: &design.title,
            },
        };

        tracing::info!(
            title = %design.title,
            width = design.width_px,
            height = design.height_px,
            "Creating design"
        );

        let response = self
            .http
            .post(format!("{}{}", self.api_base, DESIGNS_PATH))
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| DesignError::DesignCreationFailed {
                status: None,
                details: serde_json::Value::String(e.to_string()),
            })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            tracing::error!(status = %status, body = %text, "Create design failed");
            return Err(DesignError::DesignCreationFailed {
                status: Some(status.as_u16()),
                details: body_to_details(&text),
            });
        }

        let parsed: CreateDesignResponse = serde_json::from_str(&text).unwrap_or_default();
        let remote = parsed.design.unwrap_or_default();
        let Some(design_id) = remote.id.filter(|id| !id.is_empty()) else {
            return Err(DesignError::DesignCreationFailed {
                status: Some(status.as_u16()),
                details: body_to_details(&text),
            });
        };

        let urls = remote.urls.unwrap_or_default();
        let synthesized = self.view_url_for(&design_id);
        let url = urls
            .view_url
            .clone()
            .or_else(|| urls.edit_url.clone())
            .unwrap_or_else(|| synthesized.clone());

        tracing::info!(design_id = %design_id, "Design created");

        Ok(DesignCreated {
            status: "ok".to_string(),
            url,
            view_url: urls.view_url.unwrap_or(synthesized),
            edit_url: urls.edit_url,
            description: design.description.clone(),
            message: "Design created".to_string(),
            design_id,
        })
    }
}
