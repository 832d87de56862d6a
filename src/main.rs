//! jobboard - command-line client for the job board API
//!
//! Main entry point for the CLI.
//!
//! # Overview
//!
//! Each invocation runs one command against the API. On startup it:
//! - Loads settings ([`ConfigManager`]) from `jobboard.yaml` and `JOBBOARD_*` variables
//! - Initializes logging (daily rolling file, optional stderr mirror)
//! - Builds the [`AppContext`] (HTTP gateway, store, session storage)
//! - Restores a previously saved session without contacting the server
//!
//! # Execution Flow
//!
//! 1. Parse arguments
//! 2. Load settings, apply `--api-url` / `--debug` overrides
//! 3. Initialize logging → `<log_dir>/jobboard.log.<date>`
//! 4. Restore the stored session, if any
//! 5. Run the command
//! 6. Log request metrics and exit

mod cli;

use anyhow::Result;
use clap::Parser;
use jobboard::logging::{LogOptions, init_logging};
use jobboard::services;
use jobboard::{APP_NAME, AppContext, ConfigManager, VERSION};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new(&cli.config_dir)?;
    let mut settings = config_manager.load_settings()?;
    if let Some(api_url) = cli.api_url.clone() {
        settings.api_base_url = api_url;
    }
    settings.debug_mode |= cli.debug;

    let _guard = init_logging(&LogOptions::from_settings(&settings).with_console(cli.verbose))?;
    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let ctx = AppContext::from_settings(&settings)?;
    if let Err(err) = services::restore_session(&ctx) {
        // a broken session file should not block login
        tracing::warn!("Could not restore session: {}", err);
    }

    let result = cli::run(&ctx, cli.command).await;

    ctx.metrics().log_summary();

    result.map_err(|e| {
        tracing::error!("Command failed: {}", e);
        e
    })
}
