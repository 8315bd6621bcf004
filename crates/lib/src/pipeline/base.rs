use std::path::Path;

use tracing::info;

use super::StageError;
use crate::config::RuntimeConfig;
use crate::env::{BuildEnvironment, join_container_path};
use crate::substrate::SubstrateError;

/// Pin the toolchain image, mount `context_dir` at the mount root and move
/// into the module's subpath.
///
/// The context directory is resolved to an absolute host path; a missing
/// directory is the only failure.
pub fn with_base(
  env: &BuildEnvironment,
  config: &RuntimeConfig,
  context_dir: &Path,
  subpath: &str,
) -> Result<BuildEnvironment, StageError> {
  let source = dunce::canonicalize(context_dir)
    .ok()
    .filter(|p| p.is_dir())
    .ok_or_else(|| SubstrateError::MountSource {
      path: context_dir.to_path_buf(),
    })?;

  let workdir = join_container_path(&config.mount_root, subpath);
  info!(image = %config.base_image, context = ?source, workdir = %workdir, "bootstrapping environment");

  Ok(
    env
      .with_base_image(&config.base_image)
      .with_mounted_directory(&config.mount_root, source)
      .with_workdir(&workdir),
  )
}
