//! Status command - shows stored token state and whether the server answers.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context as _, Result};
use chrono::Utc;
use clap::Args;
use console::{Style, style};
use serde::Serialize;

use printssistant_config::AppConfig;
use printssistant_oauth::{FileTokenStore, TokenStore, preview};

use super::Context;

/// Arguments for the status command.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Skip probing the running server
    #[arg(long)]
    pub offline: bool,
}

/// Status response for JSON output.
#[derive(Debug, Serialize)]
struct StatusOutput {
    authenticated: bool,
    access_token: Option<String>,
    has_refresh_token: bool,
    expires_in: Option<u64>,
    expired: bool,
    tokens_path: String,
    tokens_writable: bool,
    server_url: String,
    running: Option<bool>,
}

/// Run the status command.
pub async fn run(args: StatusArgs, ctx: &Context) -> Result<()> {
    let config = AppConfig::from_env().context("Invalid configuration")?;
    let store = FileTokenStore::new(config.tokens_path.clone(), false);
    let tokens = store.load().await;
    let now = Utc::now();

    let server_url = format!("http://{}", SocketAddr::new(config.bind_address, config.port));
    let running = if args.offline {
        None
    } else {
        Some(check_health(&server_url).await)
    };

    let output = StatusOutput {
        authenticated: tokens.is_some(),
        access_token: tokens.as_ref().map(|t| preview(&t.access_token)),
        has_refresh_token: tokens.as_ref().is_some_and(|t| t.refresh_token.is_some()),
        expires_in: tokens.as_ref().map(|t| t.expires_in_secs(now)),
        expired: tokens.as_ref().is_some_and(|t| t.is_expired_at(now)),
        tokens_path: config.tokens_path.display().to_string(),
        tokens_writable: config.tokens_writable,
        server_url,
        running,
    };

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let green = Style::new().green();
    let red = Style::new().red();
    let yellow = Style::new().yellow();
    let dim = Style::new().dim();

    println!();
    println!("{}", style("Printssistant Status").bold());
    println!("{}", dim.apply_to("─".repeat(40)));
    println!();

    match (&output.access_token, output.expired) {
        (Some(token), false) => {
            println!("  {} {}", dim.apply_to("Auth:"), green.apply_to("● authenticated"));
            println!("  {} {}", dim.apply_to("Token:"), token);
            if let Some(secs) = output.expires_in {
                println!("  {} {}s", dim.apply_to("Expires in:"), secs);
            }
        }
        (Some(token), true) => {
            println!("  {} {}", dim.apply_to("Auth:"), yellow.apply_to("● expired"));
            println!("  {} {}", dim.apply_to("Token:"), token);
        }
        (None, _) => {
            println!("  {} {}", dim.apply_to("Auth:"), red.apply_to("● no tokens"));
        }
    }
    println!(
        "  {} {}",
        dim.apply_to("Refresh token:"),
        if output.has_refresh_token { "yes" } else { "no" }
    );
    println!(
        "  {} {}{}",
        dim.apply_to("Token file:"),
        output.tokens_path,
        if output.tokens_writable { "" } else { " (read-only)" }
    );

    match output.running {
        Some(true) => println!(
            "  {} {} {}",
            dim.apply_to("Server:"),
            green.apply_to("● running"),
            output.server_url
        ),
        Some(false) => println!(
            "  {} {} {}",
            dim.apply_to("Server:"),
            red.apply_to("● not running"),
            output.server_url
        ),
        None => {}
    }

    if output.access_token.is_none() {
        println!();
        println!(
            "  {}",
            dim.apply_to("Start the server and visit /auth to sign in")
        );
    }
    println!();

    Ok(())
}

async fn check_health(server_url: &str) -> bool {
    let Ok(client) = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
    else {
        return false;
    };

    match client.get(format!("{}/health", server_url)).send().await {
        Ok(resp) => resp.status().is_success(),
        Err(e) => {
            tracing::debug!(error = %e, "Health check failed");
            false
        }
    }
}
