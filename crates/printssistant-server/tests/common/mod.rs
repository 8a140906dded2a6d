//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use reqwest::redirect::Policy;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use wiremock::MockServer;

use printssistant_design::{DesignClient, DesignProxy, WorkflowConfig, WorkflowTrigger};
use printssistant_oauth::{
    DeploymentTier, FileTokenStore, OAuthConfig, OAuthFlow, ProviderClient, RedirectResolver,
    SharedTokenStore, TokenSet, TokenStore,
};
use printssistant_server::{AppState, Server, ServerConfig};

pub const LOCAL_REDIRECT: &str = "http://127.0.0.1:4000/callback";
pub const PROD_REDIRECT: &str = "https://printssistant-canva-backend.vercel.app/callback";
pub const WORKFLOW_PATH: &str = "/v1/workflow/runs";

/// A test server that runs in the background against a mock provider.
pub struct TestServer {
    /// The server's address.
    pub addr: SocketAddr,
    /// HTTP client configured for this server (redirects are not followed).
    pub client: Client,
    /// Stands in for the Canva API and the workflow service.
    pub provider: MockServer,
    /// Holds the token file.
    pub temp_dir: TempDir,
    /// Handle to the server task.
    _handle: JoinHandle<()>,
}

/// Knobs for [`TestServer::start_with`].
#[derive(Default)]
pub struct TestOptions {
    pub tokens: Option<TokenSet>,
    pub fallback_token: Option<String>,
    pub workflow_token: Option<String>,
    pub writable: Option<bool>,
}

impl TestServer {
    /// Start a new test server with no stored tokens.
    pub async fn start() -> Result<Self> {
        Self::start_with(TestOptions::default()).await
    }

    /// Start a test server whose store already holds `tokens`.
    pub async fn start_with_tokens(tokens: TokenSet) -> Result<Self> {
        Self::start_with(TestOptions {
            tokens: Some(tokens),
            ..Default::default()
        })
        .await
    }

    pub async fn start_with(options: TestOptions) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let provider = MockServer::start().await;
        let api_base = provider.uri();

        // Seed through a writable handle, then hand the server its own view.
        if let Some(tokens) = &options.tokens {
            FileTokenStore::in_dir(temp_dir.path(), true)
                .save(tokens)
                .await;
        }
        let store: SharedTokenStore = Arc::new(FileTokenStore::in_dir(
            temp_dir.path(),
            options.writable.unwrap_or(true),
        ));

        let addr = find_available_port().await?;

        let oauth = OAuthConfig::new(Some("client-123".into()), Some("s3cret".into()))
            .with_authorize_url(format!("{}/oauth/authorize", api_base));
        let resolver = RedirectResolver::new(DeploymentTier::Auto, LOCAL_REDIRECT, PROD_REDIRECT);
        let timeout = Duration::from_secs(5);
        let flow = Arc::new(OAuthFlow::new(
            oauth,
            resolver,
            ProviderClient::new(&api_base, timeout)?,
            store,
        ));
        flow.restore().await;

        let designs = DesignProxy::new(flow.clone(), DesignClient::new(&api_base, timeout)?)
            .with_fallback_token(options.fallback_token);

        let workflow = WorkflowTrigger::new(
            WorkflowConfig {
                api_url: format!("{}{}", api_base, WORKFLOW_PATH),
                auth_token: options.workflow_token,
                ..Default::default()
            },
            timeout,
        )?;

        let config = ServerConfig::new(addr).with_request_logging(false);
        let state = AppState::new(flow, designs, config).with_workflows(workflow);

        let server = Server::from_state(state);
        let handle = tokio::spawn(async move {
            let _ = server.run_on(addr).await;
        });

        let client = Client::builder().redirect(Policy::none()).build()?;
        wait_for_server(&client, addr).await?;

        Ok(Self {
            addr,
            client,
            provider,
            temp_dir,
            _handle: handle,
        })
    }

    /// Get the base URL for the server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(format!("{}{}", self.base_url(), path))
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(format!("{}{}", self.base_url(), path))
    }

    /// Path of the persisted token file.
    pub fn token_file(&self) -> std::path::PathBuf {
        FileTokenStore::in_dir(self.temp_dir.path(), false)
            .path()
            .to_path_buf()
    }
}

/// A token set that stays valid for the duration of a test.
pub fn live_tokens(access: &str, refresh: Option<&str>) -> TokenSet {
    TokenSet::issued(access, refresh.map(str::to_string), 3600, chrono::Utc::now())
}

/// Find an available port for the test server.
async fn find_available_port() -> Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}

/// Wait for the server to become ready.
async fn wait_for_server(client: &Client, addr: SocketAddr) -> Result<()> {
    let url = format!("http://{}/health", addr);

    let result = timeout(Duration::from_secs(5), async {
        loop {
            match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => return,
                _ => tokio::time::sleep(Duration::from_millis(50)).await,
            }
        }
    })
    .await;

    match result {
        Ok(()) => Ok(()),
        Err(_) => anyhow::bail!("Timeout waiting for server to start"),
    }
}
