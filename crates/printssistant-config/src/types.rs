//! Configuration types.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use printssistant_design::workflow::{
    DEFAULT_WORKFLOW_API_URL, DEFAULT_WORKFLOW_ENVIRONMENT, DEFAULT_WORKFLOW_NAME,
};
use printssistant_design::{DEFAULT_VIEW_BASE, WorkflowConfig, client::DEFAULT_TIMEOUT};
use printssistant_oauth::DeploymentTier;
use printssistant_oauth::flow::DEFAULT_AUTHORIZE_URL;
use printssistant_oauth::redirect::DEFAULT_PRODUCTION_MARKERS;
use printssistant_oauth::token_store::TOKEN_FILE;

use crate::error::{ConfigError, Result};

/// Environment variable names.
pub mod env_vars {
    pub const CLIENT_ID: &str = "CANVA_CLIENT_ID";
    pub const CLIENT_SECRET: &str = "CANVA_CLIENT_SECRET";
    pub const API_BASE: &str = "CANVA_API_BASE";
    pub const AUTHORIZE_URL: &str = "CANVA_AUTHORIZE_URL";
    pub const VIEW_BASE: &str = "CANVA_VIEW_BASE";
    pub const REDIRECT_LOCAL: &str = "CANVA_REDIRECT_URI";
    pub const REDIRECT_PRODUCTION: &str = "CANVA_REDIRECT_URI_PROD";
    pub const ACCESS_TOKEN: &str = "CANVA_ACCESS_TOKEN";
    pub const DEPLOYMENT_TIER: &str = "DEPLOYMENT_TIER";
    pub const PRODUCTION_MARKERS: &str = "PRODUCTION_HOST_MARKERS";
    pub const TOKENS_PATH: &str = "TOKENS_PATH";
    pub const TOKENS_READ_ONLY: &str = "TOKENS_READ_ONLY";
    pub const VERCEL: &str = "VERCEL";
    pub const PORT: &str = "PORT";
    pub const BIND_ADDRESS: &str = "BIND_ADDRESS";
    pub const HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";
    pub const WORKFLOW_API_URL: &str = "WORKFLOW_API_URL";
    pub const WORKFLOW_NAME: &str = "WORKFLOW_NAME";
    pub const WORKFLOW_AUTH_TOKEN: &str = "WORKFLOW_VERCEL_AUTH_TOKEN";
    pub const WORKFLOW_ENV: &str = "WORKFLOW_VERCEL_ENV";
    pub const WORKFLOW_PROJECT: &str = "WORKFLOW_VERCEL_PROJECT";
    pub const WORKFLOW_TEAM: &str = "WORKFLOW_VERCEL_TEAM";
}

pub const DEFAULT_API_BASE: &str = "https://api.canva.com";
pub const DEFAULT_REDIRECT_LOCAL: &str = "http://127.0.0.1:4000/callback";
pub const DEFAULT_REDIRECT_PRODUCTION: &str =
    "https://printssistant-canva-backend.vercel.app/callback";
pub const DEFAULT_PORT: u16 = 4000;

/// Full backend configuration.
#[derive(Clone)]
pub struct AppConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub api_base: String,
    pub authorize_url: String,
    /// Host used for synthesised design view URLs.
    pub view_base: String,
    pub redirect_local: String,
    pub redirect_production: String,
    /// Used when no stored token exists.
    pub static_access_token: Option<String>,
    pub deployment_tier: DeploymentTier,
    pub production_markers: Vec<String>,
    pub tokens_path: PathBuf,
    /// False on read-only deployments; token writes are skipped.
    pub tokens_writable: bool,
    pub bind_address: IpAddr,
    pub port: u16,
    pub http_timeout: Duration,
    pub workflow: WorkflowConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &redacted(&self.client_secret))
            .field("api_base", &self.api_base)
            .field("authorize_url", &self.authorize_url)
            .field("view_base", &self.view_base)
            .field("redirect_local", &self.redirect_local)
            .field("redirect_production", &self.redirect_production)
            .field("static_access_token", &redacted(&self.static_access_token))
            .field("deployment_tier", &self.deployment_tier)
            .field("production_markers", &self.production_markers)
            .field("tokens_path", &self.tokens_path)
            .field("tokens_writable", &self.tokens_writable)
            .field("bind_address", &self.bind_address)
            .field("port", &self.port)
            .field("http_timeout", &self.http_timeout)
            .field("workflow", &self.workflow)
            .finish()
    }
}

fn redacted(value: &Option<String>) -> Option<&'static str> {
    value.as_ref().map(|_| "[redacted]")
}

fn truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        use env_vars::*;

        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let on_vercel = get(VERCEL).is_some();

        let deployment_tier = match get(DEPLOYMENT_TIER) {
            Some(raw) => raw
                .parse::<DeploymentTier>()
                .map_err(|reason| ConfigError::invalid(DEPLOYMENT_TIER, reason))?,
            None if on_vercel => DeploymentTier::Production,
            None => DeploymentTier::Local,
        };

        let production_markers = match get(PRODUCTION_MARKERS) {
            Some(raw) => raw
                .split(',')
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect(),
            None => DEFAULT_PRODUCTION_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
        };

        let tokens_read_only = get(TOKENS_READ_ONLY).is_some_and(|v| truthy(&v));

        let bind_address = match get(BIND_ADDRESS) {
            Some(raw) => raw
                .trim()
                .parse::<IpAddr>()
                .map_err(|e| ConfigError::invalid(BIND_ADDRESS, format!("{}", e)))?,
            None => IpAddr::from([127, 0, 0, 1]),
        };

        let port = match get(PORT) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::invalid(PORT, format!("{}", e)))?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match get(HTTP_TIMEOUT_SECS) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(0) => return Err(ConfigError::invalid(HTTP_TIMEOUT_SECS, "must be positive")),
                Ok(secs) => secs,
                Err(e) => return Err(ConfigError::invalid(HTTP_TIMEOUT_SECS, format!("{}", e))),
            },
            None => DEFAULT_TIMEOUT.as_secs(),
        };

        Ok(Self {
            client_id: get(CLIENT_ID),
            client_secret: get(CLIENT_SECRET),
            api_base: get_or(API_BASE, DEFAULT_API_BASE),
            authorize_url: get_or(AUTHORIZE_URL, DEFAULT_AUTHORIZE_URL),
            view_base: get_or(VIEW_BASE, DEFAULT_VIEW_BASE),
            redirect_local: get_or(REDIRECT_LOCAL, DEFAULT_REDIRECT_LOCAL),
            redirect_production: get_or(REDIRECT_PRODUCTION, DEFAULT_REDIRECT_PRODUCTION),
            static_access_token: get(ACCESS_TOKEN),
            deployment_tier,
            production_markers,
            tokens_path: get(TOKENS_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(TOKEN_FILE)),
            tokens_writable: !(tokens_read_only || on_vercel),
            bind_address,
            port,
            http_timeout: Duration::from_secs(timeout_secs),
            workflow: WorkflowConfig {
                api_url: get_or(WORKFLOW_API_URL, DEFAULT_WORKFLOW_API_URL),
                workflow_name: get_or(WORKFLOW_NAME, DEFAULT_WORKFLOW_NAME),
                auth_token: get(WORKFLOW_AUTH_TOKEN),
                environment: get_or(WORKFLOW_ENV, DEFAULT_WORKFLOW_ENVIRONMENT),
                project_id: get(WORKFLOW_PROJECT),
                team_id: get(WORKFLOW_TEAM),
            },
        })
    }

    /// Whether OAuth client credentials are present.
    pub fn has_client_credentials(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }
}
