//! Printssistant - Canva design backend
//!
//! Main entry point for the printssistant CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod commands;

use commands::{logout, start, status};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Printssistant - Canva design backend
#[derive(Parser)]
#[command(name = "printssistant")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Also write JSON logs to a daily rolling file in this directory
    #[arg(long, global = true, env = "PRINTSSISTANT_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the backend server
    Start(start::StartArgs),

    /// Show stored token and server status
    Status(status::StatusArgs),

    /// Forget the stored tokens
    ///
    /// A running server with a writable token file stops using them on its
    /// next request. One with a read-only store keeps its in-memory copy
    /// until restarted.
    Logout(logout::LogoutArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // A missing .env is the normal case in deployed environments.
    let dotenv = dotenvy::dotenv();

    let filter = if cli.verbose {
        "printssistant=debug,printssistant_server=debug,printssistant_oauth=debug,printssistant_design=debug,printssistant_config=debug,tower_http=debug,info"
    } else {
        "printssistant=info,printssistant_server=info,printssistant_oauth=info,printssistant_design=info,warn"
    };

    let (file_layer, _guard) = match &cli.log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "printssistant.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(EnvFilter::new(
                    "printssistant=trace,printssistant_server=trace,printssistant_oauth=trace,printssistant_design=trace,printssistant_config=trace,info",
                ));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
                ),
        )
        .with(file_layer)
        .init();

    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded environment file");
    }

    let ctx = commands::Context {
        json_output: cli.json,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Start(args) => start::run(args, &ctx).await,
        Commands::Status(args) => status::run(args, &ctx).await,
        Commands::Logout(args) => logout::run(args, &ctx).await,
    }
}
