use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};

use crate::models::ClientSettings;

pub const LOG_PREFIX: &str = "jobboard.log";

/// Where and how the client logs.
#[derive(Debug, Clone, PartialEq)]
pub struct LogOptions {
    pub log_dir: Utf8PathBuf,
    pub prefix: String,
    pub debug_mode: bool,
    /// Mirror records to stderr.
    pub console: bool,
    /// Write the file log as JSON lines.
    pub json: bool,
}

impl LogOptions {
    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self {
            log_dir: settings.log_dir.clone(),
            prefix: LOG_PREFIX.to_string(),
            debug_mode: settings.debug_mode,
            console: false,
            json: false,
        }
    }

    pub fn with_console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// `RUST_LOG` wins when set; otherwise debug or info depending on `debug_mode`.
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.default_level()))
    }

    pub fn default_level(&self) -> &'static str {
        if self.debug_mode { "debug" } else { "info" }
    }
}

fn ensure_dir(log_dir: &Utf8Path) -> Result<()> {
    if !log_dir.exists() {
        fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir))?;
    }
    Ok(())
}

/// Install the global subscriber: a daily rolling file plus an optional console layer.
///
/// The returned guard flushes the background writer on drop; hold it until exit.
/// Fails if a global subscriber is already installed.
pub fn init_logging(options: &LogOptions) -> Result<WorkerGuard> {
    ensure_dir(&options.log_dir)?;

    let file_appender = rolling::daily(&options.log_dir, &options.prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer: Box<dyn Layer<Registry> + Send + Sync> = if options.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_target(true)
            .with_thread_ids(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    let mut layers = vec![file_layer];
    if options.console {
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(options.filter())
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    tracing::info!(
        "Logging initialized: dir={}, level={}, console={}, json={}",
        options.log_dir,
        options.default_level(),
        options.console,
        options.json
    );

    Ok(guard)
}
