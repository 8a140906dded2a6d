//! Durable-workflow dispatch.
//!
//! Instead of creating a design inline, a request can be handed to a hosted
//! workflow run which calls back into the design endpoint on its own.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::error::{DesignError, Result};
use crate::request::DesignSpec;

/// Default workflow runs endpoint.
pub const DEFAULT_WORKFLOW_API_URL: &str = "https://api.vercel.com/v1/workflow/runs";

/// Default workflow name.
pub const DEFAULT_WORKFLOW_NAME: &str = "canva-template-generator";

/// Default workflow environment header value.
pub const DEFAULT_WORKFLOW_ENVIRONMENT: &str = "production";

/// Workflow trigger configuration.
#[derive(Clone)]
pub struct WorkflowConfig {
    pub api_url: String,
    pub workflow_name: String,
    pub auth_token: Option<String>,
    pub environment: String,
    pub project_id: Option<String>,
    pub team_id: Option<String>,
}

impl std::fmt::Debug for WorkflowConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowConfig")
            .field("api_url", &self.api_url)
            .field("workflow_name", &self.workflow_name)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[redacted]"))
            .field("environment", &self.environment)
            .field("project_id", &self.project_id)
            .field("team_id", &self.team_id)
            .finish()
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_WORKFLOW_API_URL.to_string(),
            workflow_name: DEFAULT_WORKFLOW_NAME.to_string(),
            auth_token: None,
            environment: DEFAULT_WORKFLOW_ENVIRONMENT.to_string(),
            project_id: None,
            team_id: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunRequest<'a> {
    workflow_name: &'a str,
    input: RunInput<'a>,
}

#[derive(Debug, Serialize)]
struct RunInput<'a> {
    name: &'a str,
    width: u32,
    height: u32,
}

/// Successful workflow dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowStarted {
    pub message: String,
    pub run: Value,
}

/// Starts workflow runs for design requests.
#[derive(Debug, Clone)]
pub struct WorkflowTrigger {
    http: Client,
    config: WorkflowConfig,
}

impl WorkflowTrigger {
    pub fn new(config: WorkflowConfig, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DesignError::Client(e.to_string()))?;
        Ok(Self::with_client(http, config))
    }

    pub fn with_client(http: Client, config: WorkflowConfig) -> Self {
        Self { http, config }
    }

    pub fn is_configured(&self) -> bool {
        self.config
            .auth_token
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }

    /// Start a workflow run for `spec`.
    pub async fn start(&self, spec: &DesignSpec) -> Result<WorkflowStarted> {
        let design = spec.normalize()?;
        let token = self
            .config
            .auth_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(DesignError::WorkflowUnavailable)?;

        let body = RunRequest {
            workflow_name: &self.config.workflow_name,
            input: RunInput {
                name: &design.title,
                width: design.width_px,
                height: design.height_px,
            },
        };

        let mut request = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(token)
            .header("x-vercel-environment", &self.config.environment)
            .json(&body);
        if let Some(project) = &self.config.project_id {
            request = request.header("x-vercel-project-id", project);
        }
        if let Some(team) = &self.config.team_id {
            request = request.header("x-vercel-team-id", team);
        }

        tracing::info!(workflow = %self.config.workflow_name, "Starting workflow run");

        let response = request
            .send()
            .await
            .map_err(|e| DesignError::WorkflowFailed {
                status: None,
                details: Value::String(e.to_string()),
            })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let data = parse_lenient(&text);

        if !status.is_success() {
            tracing::error!(status = %status, details = %data, "Workflow creation failed");
            return Err(DesignError::WorkflowFailed {
                status: Some(status.as_u16()),
                details: data,
            });
        }

        Ok(WorkflowStarted {
            message: "Workflow started successfully".to_string(),
            run: data,
        })
    }
}

/// Empty → `{}`, JSON → as-is, anything else → `{ "raw": text }`.
fn parse_lenient(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Object(Default::default());
    }
    serde_json::from_str(text).unwrap_or_else(|_| {
        tracing::warn!("Non-JSON workflow response");
        serde_json::json!({ "raw": text })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lenient() {
        assert_eq!(parse_lenient(""), serde_json::json!({}));
        assert_eq!(parse_lenient(r#"{"id":"run_1"}"#), serde_json::json!({"id": "run_1"}));
        assert_eq!(
            parse_lenient("<html>oops</html>"),
            serde_json::json!({"raw": "<html>oops</html>"})
        );
    }

    #[test]
    fn test_unconfigured_trigger() {
        let trigger = WorkflowTrigger::with_client(Client::new(), WorkflowConfig::default());
        assert!(!trigger.is_configured());
    }

    #[tokio::test]
    async fn test_start_without_token_is_unavailable() {
        let trigger = WorkflowTrigger::with_client(Client::new(), WorkflowConfig::default());
        let err = trigger
            .start(&DesignSpec::pixels("Banner", 1200, 600))
            .await
            .unwrap_err();
        assert!(matches!(err, DesignError::WorkflowUnavailable));
    }

    #[tokio::test]
    async fn test_start_validates_before_dispatch() {
        let trigger = WorkflowTrigger::with_client(Client::new(), WorkflowConfig::default());
        let err = trigger.start(&DesignSpec::default()).await.unwrap_err();
        assert!(matches!(err, DesignError::InvalidRequest(_)));
    }
}
