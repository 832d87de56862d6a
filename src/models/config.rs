use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Client configuration from `jobboard.yaml`, overridable with `JOBBOARD_*` variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// REST API root, joined with every endpoint path.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Directory holding the persisted session.
    #[serde(default = "default_data_dir")]
    pub data_dir: Utf8PathBuf,

    #[serde(default = "default_log_dir")]
    pub log_dir: Utf8PathBuf,

    #[serde(default)]
    pub debug_mode: bool,

    /// Off by default: a hung call keeps the slice loading until the caller gives up.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            data_dir: default_data_dir(),
            log_dir: default_log_dir(),
            debug_mode: false,
            request_timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

fn default_api_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_data_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("jobboard-data")
}

fn default_log_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("logs")
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
