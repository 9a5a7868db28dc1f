use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use log::{debug, info, LevelFilter};
use serde::{Deserialize, Serialize};

use crate::config::env_vars::expand_env_vars;

fn default_file_log_level() -> String {
    "debug".to_string()
}

fn default_adb_path() -> PathBuf {
    PathBuf::from("adb")
}

/// Settings for an acquisition session.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AcquisitionConfig {
    /// Directory under which `<session id>/` is staged. Defaults to the
    /// directory of the running executable.
    #[serde(default)]
    pub base_path: Option<PathBuf>,
    #[serde(default = "default_file_log_level")]
    pub file_log_level: String,
    #[serde(default = "default_adb_path")]
    pub adb_path: PathBuf,
    #[serde(default)]
    pub device_serial: Option<String>,
    /// Local directory holding `collector_<arch>` binaries.
    #[serde(default)]
    pub collector_assets_dir: Option<PathBuf>,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            base_path: None,
            file_log_level: default_file_log_level(),
            adb_path: default_adb_path(),
            device_serial: None,
            collector_assets_dir: None,
        }
    }
}

impl AcquisitionConfig {
    /// Configuration staging sessions under `base_path`.
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: Some(base_path.into()),
            ..Self::default()
        }
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: AcquisitionConfig =
            serde_yaml::from_str(&content).context("Failed to parse YAML config")?;
        config.file_log_level_filter()?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save_to_yaml_file(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .context(format!("Failed to write config to {}", path.display()))?;

        info!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Base directory for staging, with environment variables expanded.
    pub fn resolve_base_path(&self) -> Result<PathBuf> {
        match &self.base_path {
            Some(path) => Ok(PathBuf::from(expand_env_vars(&path.to_string_lossy()))),
            None => executable_directory(),
        }
    }

    pub fn file_log_level_filter(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(&self.file_log_level)
            .map_err(|_| anyhow!("Invalid file log level '{}'", self.file_log_level))
    }
}

/// Directory containing the running executable.
pub fn executable_directory() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to locate the running executable")?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| anyhow!("Executable path {} has no parent", exe.display()))
}
