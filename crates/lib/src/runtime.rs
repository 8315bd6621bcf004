//! The runtime driver.
//!
//! [`DotnetSdk`] threads one [`BuildEnvironment`] through the pipeline stages
//! and turns the result into either a runnable environment or a generated
//! source tree. It owns no state between invocations; concurrent calls only
//! share the read-only SDK source.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::config::RuntimeConfig;
use crate::env::{BuildEnvironment, join_container_path};
use crate::ignore::GlobSet;
use crate::module::{ModuleDescriptor, ModuleSource};
use crate::pipeline::{
  InStage, LayerLedger, PipelineError, Stage, with_base, with_introspection, with_project, with_sdk,
  with_solution,
};
use crate::sdk::SdkSource;
use crate::substrate::Substrate;
use crate::toolchain::ProjectToolchain;

pub struct DotnetSdk<T, S> {
  config: RuntimeConfig,
  sdk: SdkSource,
  toolchain: T,
  substrate: S,
}

/// A finished environment whose entrypoint runs the module.
#[derive(Debug, Clone)]
pub struct ExecutableEnvironment {
  pub module: ModuleDescriptor,
  pub env: BuildEnvironment,
}

impl ExecutableEnvironment {
  pub fn entrypoint(&self) -> &[String] {
    self.env.entrypoint().unwrap_or_default()
  }
}

/// How a path in a generated tree is treated by version control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
  pub generated: bool,
  pub ignored: bool,
}

/// The mount-root tree after a pipeline run, with its classification globs.
///
/// Globs are relative to the module source directory, which sits at
/// `source_subpath` inside the tree.
#[derive(Debug)]
pub struct GeneratedCode<Tree> {
  pub tree: Tree,
  pub module: ModuleDescriptor,
  generated: GlobSet,
  ignored: GlobSet,
}

impl<Tree> GeneratedCode<Tree> {
  pub fn source_subpath(&self) -> &str {
    &self.module.subpath
  }

  pub fn vcs_generated_paths(&self) -> Vec<String> {
    self.generated.patterns()
  }

  pub fn vcs_ignored_paths(&self) -> Vec<String> {
    self.ignored.patterns()
  }

  /// Classify `path`, given relative to the tree root.
  ///
  /// Paths outside the module source directory are neither generated nor
  /// ignored.
  pub fn classify(&self, path: &str) -> Classification {
    let path = path.trim_start_matches('/');
    let subpath = self.source_subpath();
    let rel = if subpath.is_empty() {
      Some(path)
    } else if path == subpath {
      Some("")
    } else {
      path.strip_prefix(subpath).and_then(|rest| rest.strip_prefix('/'))
    };

    match rel {
      Some(rel) => Classification {
        generated: self.generated.covers(rel),
        ignored: self.ignored.covers(rel),
      },
      None => Classification::default(),
    }
  }
}

impl<T, S> DotnetSdk<T, S>
where
  T: ProjectToolchain,
  S: Substrate,
{
  pub fn new(config: RuntimeConfig, sdk: SdkSource, toolchain: T, substrate: S) -> Self {
    Self {
      config,
      sdk,
      toolchain,
      substrate,
    }
  }

  pub fn config(&self) -> &RuntimeConfig {
    &self.config
  }

  pub fn substrate(&self) -> &S {
    &self.substrate
  }

  /// Run all five stages in order, stopping at the first failure.
  ///
  /// A recorded command that fails while a later stage realizes the
  /// environment is reported under the stage that recorded it.
  pub async fn build(
    &self,
    source: &ModuleSource,
    introspection: &Path,
  ) -> Result<(ModuleDescriptor, BuildEnvironment), PipelineError> {
    let (module, env, _) = self.assemble(source, introspection).await?;
    Ok((module, env))
  }

  async fn assemble(
    &self,
    source: &ModuleSource,
    introspection: &Path,
  ) -> Result<(ModuleDescriptor, BuildEnvironment, LayerLedger), PipelineError> {
    let module = source.descriptor().in_stage(Stage::Base)?;
    info!(
      module = %module.raw_name,
      identifier = %module.identifier,
      subpath = %module.subpath,
      "building module environment"
    );

    let mut ledger = LayerLedger::default();
    let env = BuildEnvironment::new();
    let env = with_base(&env, &self.config, &source.context_dir, &module.subpath).in_stage(Stage::Base)?;
    ledger.record(Stage::Base, &env);
    let env = with_solution(&env, &self.toolchain, &module).in_stage(Stage::Solution)?;
    ledger.record(Stage::Solution, &env);
    let env = with_sdk(&env, &self.toolchain, &self.sdk, &self.config.ignore).in_stage(Stage::Sdk)?;
    ledger.record(Stage::Sdk, &env);
    let env = with_introspection(&env, introspection).in_stage(Stage::Introspection)?;
    ledger.record(Stage::Introspection, &env);
    let env = with_project(
      &env,
      &self.substrate,
      &self.toolchain,
      &module,
      &self.config.target_framework,
    )
    .await
    .in_stage(Stage::Project)
    .map_err(|e| ledger.attribute(e))?;
    ledger.record(Stage::Project, &env);

    Ok((module, env, ledger))
  }

  /// Build the environment and point its entrypoint at the module project.
  pub async fn module_runtime(
    &self,
    source: &ModuleSource,
    introspection: &Path,
  ) -> Result<ExecutableEnvironment, PipelineError> {
    let (module, env) = self.build(source, introspection).await?;
    let module_dir = join_container_path(&self.config.mount_root, &module.subpath);
    let project = join_container_path(&module_dir, &module.identifier);
    info!(project = %project, "module runtime ready");

    let env = env.with_entrypoint(["dotnet", "run", "--project", project.as_str()]);
    Ok(ExecutableEnvironment { module, env })
  }

  /// Build the environment and extract the whole mount-root tree.
  pub async fn codegen(
    &self,
    source: &ModuleSource,
    introspection: &Path,
  ) -> Result<GeneratedCode<S::Tree>, PipelineError> {
    let (module, env, ledger) = self.assemble(source, introspection).await?;
    let tree = self
      .substrate
      .directory(&env, &self.config.mount_root)
      .await
      .in_stage(Stage::Realize)
      .map_err(|e| ledger.attribute(e))?;
    info!(identifier = %module.identifier, "generated code ready");

    Ok(GeneratedCode {
      tree,
      module,
      generated: self.config.ignore.generated_set(),
      ignored: self.config.ignore.ignored_set(),
    })
  }
}
