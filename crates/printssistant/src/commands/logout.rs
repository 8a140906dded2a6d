//! Logout command - deletes the persisted token record.

use anyhow::{Context as _, Result, bail};
use clap::Args;
use console::Style;

use printssistant_config::AppConfig;
use printssistant_oauth::{FileTokenStore, TokenStore};

use super::Context;

/// Arguments for the logout command.
#[derive(Args, Debug)]
pub struct LogoutArgs {}

/// Run the logout command.
pub async fn run(_args: LogoutArgs, ctx: &Context) -> Result<()> {
    let config = AppConfig::from_env().context("Invalid configuration")?;
    if !config.tokens_writable {
        bail!(
            "Token store at {} is read-only; nothing to remove",
            config.tokens_path.display()
        );
    }

    let store = FileTokenStore::new(config.tokens_path.clone(), true);
    let had_tokens = store.load().await.is_some();
    store.clear().await;

    if ctx.json_output {
        println!(
            "{}",
            serde_json::json!({ "logged_out": true, "had_tokens": had_tokens })
        );
    } else if had_tokens {
        println!("{} Tokens removed", Style::new().green().apply_to("✓"));
    } else {
        println!("No tokens were stored");
    }

    Ok(())
}
