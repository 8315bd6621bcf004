use tracing::info;

use super::StageError;
use crate::env::BuildEnvironment;
use crate::module::ModuleDescriptor;
use crate::toolchain::ProjectToolchain;

/// Recreate the project group named after the module identifier.
///
/// Any group file already in the tree is replaced and the recorded
/// membership starts empty; later stages register every member again.
pub fn with_solution<T: ProjectToolchain>(
  env: &BuildEnvironment,
  toolchain: &T,
  module: &ModuleDescriptor,
) -> Result<BuildEnvironment, StageError> {
  info!(group = %module.identifier, toolchain = toolchain.name(), "creating project group");
  Ok(toolchain.create_group(env, &module.identifier)?)
}
