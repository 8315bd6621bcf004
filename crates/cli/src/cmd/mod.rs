mod codegen;
mod init_config;
mod run;

pub use codegen::cmd_codegen;
pub use init_config::cmd_init_config;
pub use run::cmd_run;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use csmod_lib::config::RuntimeConfig;
use csmod_lib::module::ModuleSource;
use csmod_lib::sdk::SdkSource;

/// How solution and project files are edited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ToolchainKind {
  /// Run the `dotnet` CLI inside the environment
  #[default]
  Dotnet,
  /// Write `.sln`/`.csproj` files directly
  Manifest,
}

/// Arguments describing the module to build.
#[derive(Debug, Args)]
pub struct ModuleArgs {
  /// Context directory holding the module sources
  #[arg(long, default_value = ".")]
  pub context: PathBuf,

  /// Module name, as the user wrote it
  #[arg(long)]
  pub name: String,

  /// Location of the module inside the context
  #[arg(long, default_value = "")]
  pub subpath: String,

  /// SDK checkout holding the three components
  #[arg(long)]
  pub sdk: PathBuf,

  /// Schema artifact
  #[arg(long)]
  pub introspection: PathBuf,

  #[arg(long, value_enum, default_value_t = ToolchainKind::Dotnet)]
  pub toolchain: ToolchainKind,
}

impl ModuleArgs {
  pub fn source(&self) -> ModuleSource {
    ModuleSource::new(&self.context, &self.name, &self.subpath)
  }

  pub fn sdk_source(&self) -> SdkSource {
    SdkSource::new(&self.sdk)
  }
}

pub fn load_config(path: Option<&Path>) -> Result<RuntimeConfig> {
  match path {
    Some(path) => RuntimeConfig::load(path).with_context(|| format!("Failed to load config: {}", path.display())),
    None => RuntimeConfig::load_default().context("Failed to load default config"),
  }
}

pub fn runtime() -> Result<tokio::runtime::Runtime> {
  tokio::runtime::Runtime::new().context("Failed to create async runtime")
}
