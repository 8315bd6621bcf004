//! Directory copies with glob exclusion.

use std::fs;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use super::SubstrateError;
use crate::ignore::GlobSet;

/// Copy `source` into `dest`, skipping every path covered by `exclude`.
///
/// Paths are matched relative to `source`; an excluded directory is skipped
/// with everything below it. Existing files in `dest` are overwritten, other
/// files already in `dest` are left alone. Returns the number of files copied.
pub fn copy_dir_filtered(source: &Path, dest: &Path, exclude: &GlobSet) -> Result<usize, SubstrateError> {
  let walk_err = |message: String| SubstrateError::Walk {
    path: source.to_path_buf(),
    message,
  };

  let walker = WalkDir::new(source).sort_by_file_name().into_iter().filter_entry(|e| {
    match e.path().strip_prefix(source) {
      Ok(rel) if !rel.as_os_str().is_empty() => !exclude.matches(&relative_str(rel)),
      _ => true,
    }
  });

  fs::create_dir_all(dest).map_err(|e| SubstrateError::Copy {
    from: source.to_path_buf(),
    to: dest.to_path_buf(),
    source: e,
  })?;

  let mut copied = 0;
  for entry in walker {
    let entry = entry.map_err(|e| walk_err(e.to_string()))?;
    let rel = entry.path().strip_prefix(source).map_err(|e| walk_err(e.to_string()))?;
    if rel.as_os_str().is_empty() {
      continue;
    }

    let target = dest.join(rel);
    let copy_err = |e: std::io::Error| SubstrateError::Copy {
      from: entry.path().to_path_buf(),
      to: target.clone(),
      source: e,
    };

    let file_type = entry.file_type();
    if file_type.is_dir() {
      fs::create_dir_all(&target).map_err(copy_err)?;
    } else if file_type.is_file() || (file_type.is_symlink() && entry.path().is_file()) {
      if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(copy_err)?;
      }
      fs::copy(entry.path(), &target).map_err(copy_err)?;
      copied += 1;
    } else {
      debug!(path = ?entry.path(), "skipping non-regular entry");
    }
  }

  Ok(copied)
}

fn relative_str(rel: &Path) -> String {
  rel.to_string_lossy().replace('\\', "/")
}
