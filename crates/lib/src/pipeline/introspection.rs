use std::path::Path;

use tracing::info;

use super::StageError;
use crate::consts::{INTROSPECTION_FILE, SDK_API_DIR};
use crate::env::BuildEnvironment;

/// Copy the schema artifact into the API component, replacing any copy there.
pub fn with_introspection(env: &BuildEnvironment, artifact: &Path) -> Result<BuildEnvironment, StageError> {
  let source = dunce::canonicalize(artifact)
    .and_then(|p| {
      if p.is_file() {
        Ok(p)
      } else {
        Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a file"))
      }
    })
    .map_err(|source| StageError::Artifact {
      path: artifact.to_path_buf(),
      source,
    })?;

  let dest = format!("{SDK_API_DIR}/{INTROSPECTION_FILE}");
  info!(artifact = ?source, dest = %dest, "injecting introspection");
  Ok(env.with_file(&dest, source))
}
