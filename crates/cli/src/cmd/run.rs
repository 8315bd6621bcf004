//! Implementation of the `csmod run` command.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use csmod_lib::config::RuntimeConfig;
use csmod_lib::runtime::DotnetSdk;
use csmod_lib::substrate::LocalSubstrate;
use csmod_lib::toolchain::{DotnetCli, ManifestWriter, ProjectToolchain};

use super::{ModuleArgs, ToolchainKind, load_config, runtime};

/// Build the module environment and run its entrypoint.
///
/// Returns the entrypoint's exit code.
pub fn cmd_run(config: Option<&Path>, args: &ModuleArgs) -> Result<i32> {
  let config = load_config(config)?;
  match args.toolchain {
    ToolchainKind::Dotnet => run(config, args, DotnetCli),
    ToolchainKind::Manifest => run(config, args, ManifestWriter),
  }
}

fn run<T: ProjectToolchain>(config: RuntimeConfig, args: &ModuleArgs, toolchain: T) -> Result<i32> {
  let driver = DotnetSdk::new(config, args.sdk_source(), toolchain, LocalSubstrate::default());
  let rt = runtime()?;

  let exe = rt
    .block_on(driver.module_runtime(&args.source(), &args.introspection))
    .context("Failed to build module runtime")?;
  info!(entrypoint = %exe.entrypoint().join(" "), "starting module");

  let status = rt
    .block_on(driver.substrate().run(&exe.env))
    .context("Failed to run module")?;
  Ok(status.code().unwrap_or(1))
}
