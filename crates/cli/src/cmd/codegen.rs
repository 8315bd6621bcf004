//! Implementation of the `csmod codegen` command.
//!
//! Runs the pipeline, writes the mount-root tree over the output directory
//! and reports which paths are generated or ignored.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;

use csmod_lib::config::RuntimeConfig;
use csmod_lib::runtime::DotnetSdk;
use csmod_lib::substrate::{LocalSubstrate, LocalTree};
use csmod_lib::toolchain::{DotnetCli, ManifestWriter, ProjectToolchain};

use super::{ModuleArgs, ToolchainKind, load_config, runtime};
use crate::output::{OutputFormat, format_duration, print_json, print_stat, print_success, truncate_hash};

#[derive(Debug, Serialize)]
struct CodegenReport {
  module: String,
  identifier: String,
  source_subpath: String,
  output: PathBuf,
  files_written: usize,
  digest: String,
  vcs_generated_paths: Vec<String>,
  vcs_ignored_paths: Vec<String>,
}

pub fn cmd_codegen(config: Option<&Path>, args: &ModuleArgs, output: Option<PathBuf>, format: OutputFormat) -> Result<()> {
  let start = Instant::now();
  let config = load_config(config)?;
  let output = output.unwrap_or_else(|| args.context.clone());

  let report = match args.toolchain {
    ToolchainKind::Dotnet => generate(config, args, DotnetCli, &output)?,
    ToolchainKind::Manifest => generate(config, args, ManifestWriter, &output)?,
  };

  if format.is_json() {
    print_json(&report)?;
  } else {
    print_success(&format!("Generated module {}", report.identifier));
    print_stat("Output", &report.output.display().to_string());
    print_stat("Files written", &report.files_written.to_string());
    print_stat("Digest", truncate_hash(&report.digest));
    print_stat("Generated", &report.vcs_generated_paths.join(", "));
    print_stat("Ignored", &report.vcs_ignored_paths.join(", "));
    print_stat("Duration", &format_duration(start.elapsed()));
  }

  Ok(())
}

fn generate<T: ProjectToolchain>(
  config: RuntimeConfig,
  args: &ModuleArgs,
  toolchain: T,
  output: &Path,
) -> Result<CodegenReport> {
  let driver = DotnetSdk::new(config, args.sdk_source(), toolchain, LocalSubstrate::default());
  let code = runtime()?
    .block_on(driver.codegen(&args.source(), &args.introspection))
    .context("Code generation failed")?;

  let tree: &LocalTree = &code.tree;
  let files_written = tree
    .export(output)
    .with_context(|| format!("Failed to write generated tree to {}", output.display()))?;
  let digest = tree.digest().context("Failed to hash generated tree")?;

  Ok(CodegenReport {
    module: code.module.raw_name.clone(),
    identifier: code.module.identifier.clone(),
    source_subpath: code.source_subpath().to_string(),
    output: output.to_path_buf(),
    files_written,
    digest: digest.0,
    vcs_generated_paths: code.vcs_generated_paths(),
    vcs_ignored_paths: code.vcs_ignored_paths(),
  })
}
