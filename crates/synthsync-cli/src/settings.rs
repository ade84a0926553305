use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use synthsync_core::graphql::DEFAULT_ENDPOINT;

use crate::cli::Cli;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub endpoint: String,
    pub request_timeout_secs: u64,
    pub changed_manifest: PathBuf,
    pub deleted_manifest: PathBuf,
    pub logging: LoggingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: 30,
            changed_manifest: PathBuf::from("changed_monitors.json"),
            deleted_manifest: PathBuf::from("deleted_monitors.json"),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Flags given on the command line win over file and environment.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(endpoint) = &cli.endpoint {
            self.endpoint = endpoint.clone();
        }
        if let Some(secs) = cli.timeout_secs {
            self.request_timeout_secs = secs;
        }
        if let Some(path) = &cli.changed {
            self.changed_manifest = path.clone();
        }
        if let Some(path) = &cli.deleted {
            self.deleted_manifest = path.clone();
        }
        if let Some(level) = &cli.log_level {
            self.logging.level = level.clone();
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let url = url::Url::parse(&self.endpoint)
            .map_err(|e| format!("endpoint {:?} is not a valid URL: {e}", self.endpoint))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!("endpoint must use http or https, got {}", url.scheme()));
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".into());
        }
        if self.logging.level.trim().is_empty() {
            return Err("logging.level must not be empty".into());
        }
        Ok(())
    }
}

pub mod loader {
    use super::Settings;
    use config::{Config, Environment, File};
    use std::path::{Path, PathBuf};

    /// Layers an optional TOML file under `SYNTHSYNC__*` environment
    /// overrides, e.g. `SYNTHSYNC__REQUEST_TIMEOUT_SECS=60`.
    ///
    /// An explicit path must exist; the default `synthsync.toml` is optional.
    pub fn load_settings(path: Option<&Path>) -> Result<Settings, String> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                builder = builder.add_source(File::from(p.to_path_buf()).required(true));
            }
            None => {
                let default_path = PathBuf::from("synthsync.toml");
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        builder = builder.add_source(
            Environment::with_prefix("SYNTHSYNC")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        cfg.try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))
    }
}

/// Settings for this run: file, then environment, then flags.
pub fn resolve(cli: &Cli) -> Result<Settings> {
    let mut settings = loader::load_settings(cli.config.as_deref())
        .map_err(anyhow::Error::msg)
        .context("Failed to load settings")?;
    settings.apply_cli(cli);
    settings
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid settings")?;
    Ok(settings)
}
