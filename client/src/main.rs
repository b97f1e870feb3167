//! Main entry point for the Tô Off command-line client.
//!
//! Loads configuration, wires the API client, the session store and the
//! session manager together, then runs one command.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt};

use cli::{App, Cli};
use tooff::api::ApiClient;
use tooff::auth::{FileSessionStore, SessionManager};
use tooff::config::Config;
use tooff::services::notification_service::ConsoleNotifier;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?.with_overrides(cli.api_url, cli.session_file)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;

    runtime.block_on(async {
        let gateway = ApiClient::from_config(&config).context("Failed to create API client")?;
        let notifier = Arc::new(ConsoleNotifier);
        let store = FileSessionStore::new(config.session_file.clone());
        let session = Arc::new(SessionManager::new(
            Arc::new(gateway),
            Arc::new(store),
            notifier.clone(),
        ));

        let app = App {
            config,
            session,
            notifier,
        };
        cli::run(cli.command, &app).await
    })
}
