// jobboard - client core for the job board REST API
//
// This is the library crate: the API gateway, cached resource state, the action
// modules views call, and the derived view logic. The binary crate (main.rs)
// provides a command-line front end over the same pieces.

pub mod api;
pub mod config;
pub mod context;
pub mod derived;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;

// Re-export commonly used types for convenience
pub use api::{ApiClient, ApiError, HttpTransport, Transport};
pub use config::ConfigManager;
pub use context::AppContext;
pub use metrics::Metrics;
pub use models::ClientSettings;
pub use state::{AppState, StateChange, Store};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
