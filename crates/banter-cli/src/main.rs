//! # Banter CLI
//!
//! Minimal terminal driver for the Banter chat client.
//!
//! ## Usage
//!
//! ```bash
//! # Join with a username
//! banter alice
//!
//! # Run with custom config
//! banter --config /path/to/banter.toml alice
//!
//! # Run with environment variables
//! BANTER_ENDPOINT=ws://chat.example:8080/ws banter alice
//! ```

use anyhow::{bail, Context, Result};
use banter_client::{ClientConfig, EventKind, Session};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Load configuration from an explicit path or the conventional locations.
fn load_config(path: Option<&str>) -> Result<ClientConfig> {
    if let Some(path) = path {
        return ClientConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {path}"));
    }

    let config_paths = [
        "banter.toml",
        "/etc/banter/banter.toml",
        "~/.config/banter/banter.toml",
    ];

    for path in &config_paths {
        let expanded = shellexpand::tilde(path);
        if std::path::Path::new(expanded.as_ref()).exists() {
            return Ok(ClientConfig::from_file(expanded.as_ref())?);
        }
    }

    // Fall back to defaults with environment overrides
    Ok(ClientConfig::default())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "banter_client=info,banter_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Arguments: [--config <path>] <username>
    let mut args = std::env::args().skip(1);
    let mut config_path = None;
    let mut username = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config_path = args.next(),
            other => username = Some(other.to_string()),
        }
    }
    let Some(username) = username else {
        bail!("Usage: banter [--config <path>] <username>");
    };

    let config = load_config(config_path.as_deref())?;
    tracing::info!("Connecting to {}", config.endpoint);

    let session = Session::with_config(config);

    let _messages = session.on_message(|event| match event.kind {
        EventKind::Chat => println!("[{}] {}", event.sender, event.content),
        EventKind::Join => println!("* {} joined", event.sender),
        EventKind::Leave => println!("* {} left", event.sender),
    });
    let _status = session.on_status_change(|connected| {
        tracing::info!(connected, "Connectivity changed");
    });

    session.join(&username).await?;
    println!("Joined as {username}. Type messages; Ctrl-D leaves.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        if let Err(e) = session.send_message(&line, &username) {
            tracing::warn!(error = %e, "Message not sent");
        }
    }

    session.leave(&username).await;
    Ok(())
}
