//! Runtime configuration.
//!
//! Every field defaults to the fixed conventions in [`crate::consts`] and
//! [`crate::ignore`], so an empty JSON object is a valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::{BASE_IMAGE, MOUNT_ROOT, TARGET_FRAMEWORK};
use crate::ignore::IgnoreSpec;
use crate::platform::paths::config_dir;

/// File name looked up in the configuration directory.
pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("invalid config {}: {source}", path.display())]
  Parse { path: PathBuf, source: serde_json::Error },

  /// The mount root must be an absolute container path.
  #[error("mount root must be absolute, got '{0}'")]
  RelativeMountRoot(String),

  #[error("failed to serialize config: {0}")]
  Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
  /// Toolchain image every environment starts from.
  pub base_image: String,
  /// Where the context tree is mounted.
  pub mount_root: String,
  /// Framework new module projects target.
  pub target_framework: String,
  pub ignore: IgnoreSpec,
}

impl Default for RuntimeConfig {
  fn default() -> Self {
    Self {
      base_image: BASE_IMAGE.to_string(),
      mount_root: MOUNT_ROOT.to_string(),
      target_framework: TARGET_FRAMEWORK.to_string(),
      ignore: IgnoreSpec::default(),
    }
  }
}

impl RuntimeConfig {
  /// Default location: `<config_dir>/config.json`.
  pub fn default_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
  }

  /// Load and validate the config at `path`.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })?;
    config.validate()?;
    debug!(path = ?path, "loaded config");
    Ok(config)
  }

  /// Load the config from [`default_path`](Self::default_path) if it exists,
  /// otherwise use the defaults.
  pub fn load_default() -> Result<Self, ConfigError> {
    let path = Self::default_path();
    if path.is_file() {
      Self::load(&path)
    } else {
      debug!(path = ?path, "no config file, using defaults");
      Ok(Self::default())
    }
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if !self.mount_root.starts_with('/') {
      return Err(ConfigError::RelativeMountRoot(self.mount_root.clone()));
    }
    Ok(())
  }

  pub fn to_json(&self) -> Result<String, ConfigError> {
    Ok(serde_json::to_string_pretty(self)?)
  }
}
