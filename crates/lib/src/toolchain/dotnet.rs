//! Toolchain backed by the `dotnet` CLI.

use tracing::debug;

use super::{ProjectToolchain, ToolchainError, check_project_path};
use crate::env::{BuildEnvironment, ExecOpts, Layer};

const DOTNET: &str = "dotnet";

/// Records `dotnet` invocations as `Exec` layers.
#[derive(Debug, Clone, Copy, Default)]
pub struct DotnetCli;

impl DotnetCli {
  fn exec<I, S>(&self, env: &BuildEnvironment, args: I) -> BuildEnvironment
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let argv = std::iter::once(DOTNET.to_string()).chain(args.into_iter().map(Into::into));
    let opts = ExecOpts::new(argv, env.workdir())
      .with_env("DOTNET_CLI_TELEMETRY_OPTOUT", "1")
      .with_env("DOTNET_NOLOGO", "1");
    debug!(cmd = %opts.display(), "recording dotnet command");
    env.with_layer(Layer::Exec(opts))
  }
}

impl ProjectToolchain for DotnetCli {
  fn name(&self) -> &'static str {
    "dotnet"
  }

  fn create_group(&self, env: &BuildEnvironment, name: &str) -> Result<BuildEnvironment, ToolchainError> {
    check_project_path(name)?;
    let next = self.exec(env, ["new", "sln", "--name", name, "--force"]);
    Ok(next.with_group(name))
  }

  /// `dotnet sln add` locates the solution in the workdir itself, so this
  /// works whether the SDK wrote `.sln` or `.slnx`.
  fn add_member(&self, env: &BuildEnvironment, project: &str) -> Result<BuildEnvironment, ToolchainError> {
    check_project_path(project)?;
    if env.group().is_none() {
      return Err(ToolchainError::NoGroup(project.to_string()));
    }
    if env.is_member(project) {
      debug!(project, "already a group member");
      return Ok(env.clone());
    }
    Ok(self.exec(env, ["sln", "add", project]).with_member(project))
  }

  fn create_executable(
    &self,
    env: &BuildEnvironment,
    name: &str,
    framework: &str,
  ) -> Result<BuildEnvironment, ToolchainError> {
    check_project_path(name)?;
    let next = self.exec(
      env,
      ["new", "console", "--framework", framework, "--output", name, "-n", name],
    );
    Ok(next.with_scaffolded(name, framework))
  }

  fn add_reference(&self, env: &BuildEnvironment, from: &str, to: &str) -> Result<BuildEnvironment, ToolchainError> {
    check_project_path(from)?;
    check_project_path(to)?;
    Ok(self.exec(env, ["add", from, "reference", to]).with_reference(from, to))
  }
}
