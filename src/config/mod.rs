use crate::models::ClientSettings;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, Environment, File, FileFormat};
use std::fs;

pub const SETTINGS_FILE: &str = "jobboard.yaml";
pub const ENV_PREFIX: &str = "JOBBOARD";

/// Configuration manager for the client settings file.
///
/// Settings are layered, later sources winning:
/// 1. Built-in defaults ([`ClientSettings::default`])
/// 2. `jobboard.yaml` in the config directory, if present
/// 3. `JOBBOARD_*` environment variables (e.g. `JOBBOARD_API_BASE_URL`)
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    settings_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager, creating `config_dir` if needed.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            settings_path: config_dir.join(SETTINGS_FILE),
            config_dir,
        })
    }

    /// Load settings from defaults, the YAML file and the process environment.
    pub fn load_settings(&self) -> Result<ClientSettings> {
        self.load_settings_with_env(None)
    }

    /// Same as [`load_settings`](Self::load_settings) but reads overrides from `env`
    /// instead of the process environment when given.
    pub fn load_settings_with_env(&self, env: Option<config::Map<String, String>>) -> Result<ClientSettings> {
        if !self.settings_path.exists() {
            tracing::warn!("Settings file not found at {}, using defaults", self.settings_path);
        }

        let defaults = Config::try_from(&ClientSettings::default())
            .context("Failed to build default settings")?;

        let settings: ClientSettings = Config::builder()
            .add_source(defaults)
            .add_source(
                File::from(self.settings_path.as_std_path())
                    .format(FileFormat::Yaml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .with_context(|| format!("Failed to read settings: {}", self.settings_path))?
            .try_deserialize()
            .with_context(|| format!("Failed to parse settings: {}", self.settings_path))?;

        tracing::info!("Loaded settings (api: {})", settings.api_base_url);
        Ok(settings)
    }

    /// Save settings as YAML.
    pub fn save_settings(&self, settings: &ClientSettings) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(settings).context("Failed to serialize settings to YAML")?;

        fs::write(&self.settings_path, yaml_string)
            .with_context(|| format!("Failed to write settings: {}", self.settings_path))?;

        tracing::info!("Saved settings to {}", self.settings_path);
        Ok(())
    }

    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }
}
