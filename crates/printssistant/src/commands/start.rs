//! Start command - launches the backend server.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Args;

use printssistant_config::AppConfig;
use printssistant_design::{DesignClient, DesignProxy, WorkflowTrigger};
use printssistant_oauth::{
    DeploymentTier, FileTokenStore, OAuthConfig, OAuthFlow, ProviderClient, RedirectResolver,
    SharedTokenStore,
};
use printssistant_server::{AppState, Server, ServerConfig};

use super::Context;

/// Arguments for the start command.
///
/// CLI arguments override environment values.
#[derive(Args, Debug)]
pub struct StartArgs {
    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind to (overrides BIND_ADDRESS)
    #[arg(short, long)]
    pub bind: Option<IpAddr>,

    /// Deployment tier: local, production or auto (overrides DEPLOYMENT_TIER)
    #[arg(long)]
    pub tier: Option<DeploymentTier>,

    /// Disable CORS headers
    #[arg(long)]
    pub no_cors: bool,
}

/// Run the start command.
pub async fn run(args: StartArgs, ctx: &Context) -> Result<()> {
    let mut config = AppConfig::from_env().context("Invalid configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }
    if let Some(tier) = args.tier {
        config.deployment_tier = tier;
    }

    if ctx.verbose {
        tracing::debug!(config = ?config, "Resolved configuration");
    }
    if !config.has_client_credentials() {
        tracing::warn!(
            "CANVA_CLIENT_ID / CANVA_CLIENT_SECRET not set; /auth and /callback will fail"
        );
    }

    let addr = SocketAddr::new(config.bind_address, config.port);
    let state = build_state(&config, addr).await?;
    let server = Server::from_state(state);

    tracing::info!(
        tier = %config.deployment_tier,
        tokens = %config.tokens_path.display(),
        writable = config.tokens_writable,
        "Starting printssistant backend"
    );

    server.run_until(addr, shutdown_signal()).await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wire configuration into the flow, proxies and server state.
async fn build_state(config: &AppConfig, addr: SocketAddr) -> Result<AppState> {
    let store: SharedTokenStore = Arc::new(FileTokenStore::new(
        config.tokens_path.clone(),
        config.tokens_writable,
    ));

    let oauth = OAuthConfig::new(config.client_id.clone(), config.client_secret.clone())
        .with_authorize_url(config.authorize_url.clone());
    let resolver = RedirectResolver::new(
        config.deployment_tier,
        config.redirect_local.clone(),
        config.redirect_production.clone(),
    )
    .with_production_markers(config.production_markers.clone());
    let provider = ProviderClient::new(config.api_base.clone(), config.http_timeout)?;

    let flow = Arc::new(OAuthFlow::new(oauth, resolver, provider, store));
    if flow.restore().await {
        tracing::info!("Restored tokens from previous session");
    }

    let design_client = DesignClient::new(config.api_base.clone(), config.http_timeout)?
        .with_view_base(config.view_base.clone());
    let designs = DesignProxy::new(flow.clone(), design_client)
        .with_fallback_token(config.static_access_token.clone());

    let trigger = WorkflowTrigger::new(config.workflow.clone(), config.http_timeout)?;

    let server_config = ServerConfig::new(addr);
    Ok(AppState::new(flow, designs, server_config).with_workflows(trigger))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
