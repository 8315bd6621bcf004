//! Project-graph operations.
//!
//! The pipeline never edits solution or project files itself. It asks a
//! [`ProjectToolchain`] to record the layers that do, so the same stages run
//! against the real `dotnet` CLI or against a writer that produces the files
//! directly.
//!
//! Every operation takes the environment by reference and returns the next
//! one. Project paths are relative to the workdir the group lives in.

mod dotnet;
mod manifest;

pub use dotnet::DotnetCli;
pub use manifest::ManifestWriter;

use thiserror::Error;

use crate::env::BuildEnvironment;

#[derive(Debug, Error)]
pub enum ToolchainError {
  /// A member was added before any group was created.
  #[error("no project group exists to add '{0}' to")]
  NoGroup(String),

  /// The toolchain cannot edit a project it did not create.
  #[error("project '{project}' was not created in this environment")]
  UnmanagedProject { project: String },

  #[error("invalid project path '{0}'")]
  InvalidProjectPath(String),
}

pub trait ProjectToolchain {
  /// Short name for logs.
  fn name(&self) -> &'static str;

  /// Create the group `name`, replacing any existing one.
  fn create_group(&self, env: &BuildEnvironment, name: &str) -> Result<BuildEnvironment, ToolchainError>;

  /// Register `project` in the group. Registering a member twice is a no-op.
  fn add_member(&self, env: &BuildEnvironment, project: &str) -> Result<BuildEnvironment, ToolchainError>;

  /// Scaffold an executable project named `name` in directory `name`.
  fn create_executable(
    &self,
    env: &BuildEnvironment,
    name: &str,
    framework: &str,
  ) -> Result<BuildEnvironment, ToolchainError>;

  /// Record that `from` depends on `to`.
  fn add_reference(&self, env: &BuildEnvironment, from: &str, to: &str) -> Result<BuildEnvironment, ToolchainError>;
}

/// Reject paths the group cannot address: empty, absolute or escaping.
pub(crate) fn check_project_path(project: &str) -> Result<(), ToolchainError> {
  let bad = project.is_empty()
    || project.starts_with('/')
    || project.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..");
  if bad {
    return Err(ToolchainError::InvalidProjectPath(project.to_string()));
  }
  Ok(())
}
