//! Implementation of the `csmod init-config` command.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use csmod_lib::config::RuntimeConfig;

use crate::output::{print_info, print_success};
use crate::prompts::confirm;

/// Write the default configuration to `path` (or the default location).
pub fn cmd_init_config(path: Option<PathBuf>, force: bool) -> Result<()> {
  let path = path.unwrap_or_else(RuntimeConfig::default_path);

  if path.exists() && !confirm(&format!("Overwrite {}?", path.display()), force)? {
    bail!("Config already exists: {}", path.display());
  }

  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).with_context(|| format!("Failed to create directory: {}", parent.display()))?;
  }
  let json = RuntimeConfig::default().to_json().context("Failed to serialize config")?;
  fs::write(&path, format!("{json}\n")).with_context(|| format!("Failed to write config: {}", path.display()))?;

  print_success("Wrote default configuration");
  print_info(&path.display().to_string());
  Ok(())
}
