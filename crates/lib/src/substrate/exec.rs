//! Command execution for `Exec` layers.
//!
//! Commands run directly (no shell) with a cleared environment. Only the
//! variables the layer declares are set, plus a fixed baseline:
//!
//! - `PATH` built from `tool_dirs` followed by the host `PATH` when
//!   `inherit_path` is set; `/path-not-set` (to fail fast) when both are empty
//! - `HOME` from the host when `inherit_path` is set, otherwise inside the
//!   scratch root
//! - `TMPDIR` inside the scratch root
//! - `LANG`/`LC_ALL` set to `C`
//! - `SOURCE_DATE_EPOCH` for reproducible timestamps

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use super::SubstrateError;

/// Run `args[0]` with the remaining arguments in `cwd`.
///
/// Returns trimmed stdout on success. A non-zero exit is
/// [`SubstrateError::CmdFailed`]; stderr is logged at debug level.
pub async fn execute_cmd(
  args: &[String],
  env: &BTreeMap<String, String>,
  cwd: &Path,
  scratch: &Path,
  tool_dirs: &[PathBuf],
  inherit_path: bool,
) -> Result<String, SubstrateError> {
  let (bin, rest) = args.split_first().ok_or(SubstrateError::EmptyCommand)?;
  let cmd_line = args.join(" ");
  info!(cmd = %cmd_line, "executing command");

  let tmp_dir = scratch.join("tmp");
  let home_dir = scratch.join("home");
  tokio::fs::create_dir_all(&tmp_dir).await?;

  let mut command = Command::new(bin);
  command
    .args(rest)
    .current_dir(cwd)
    .env_clear()
    .env("TMPDIR", &tmp_dir)
    .env("TMP", &tmp_dir)
    .env("TEMP", &tmp_dir)
    .env("LANG", "C")
    .env("LC_ALL", "C")
    // 1980-01-01T00:00:00Z, the ZIP epoch
    .env("SOURCE_DATE_EPOCH", "315532800")
    .stdin(Stdio::null());

  match search_path(tool_dirs, inherit_path) {
    Some(path) => command.env("PATH", path),
    None => command.env("PATH", "/path-not-set"),
  };

  match std::env::var_os("HOME").filter(|_| inherit_path) {
    Some(home) => command.env("HOME", home),
    None => {
      tokio::fs::create_dir_all(&home_dir).await?;
      command.env("HOME", &home_dir)
    }
  };

  for (key, value) in env {
    command.env(key, value);
  }

  debug!(cwd = ?cwd, "spawning process");

  let output = command.output().await.map_err(|source| SubstrateError::CmdSpawn {
    cmd: cmd_line.clone(),
    source,
  })?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stderr.is_empty() {
      debug!(stderr = %stderr, "command stderr");
    }
    if !stdout.is_empty() {
      debug!(stdout = %stdout, "command stdout");
    }

    return Err(SubstrateError::CmdFailed {
      cmd: cmd_line,
      code: output.status.code(),
    });
  }

  let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
  if !stdout.is_empty() {
    debug!(stdout = %stdout, "command output");
  }

  Ok(stdout)
}

/// `tool_dirs` followed by the host `PATH` (when inherited), or `None` if
/// that leaves nothing to search.
pub fn search_path(tool_dirs: &[PathBuf], inherit_path: bool) -> Option<OsString> {
  let mut dirs: Vec<PathBuf> = tool_dirs.to_vec();
  if inherit_path {
    if let Some(host) = std::env::var_os("PATH") {
      dirs.extend(std::env::split_paths(&host));
    }
  }
  if dirs.is_empty() {
    return None;
  }
  std::env::join_paths(dirs).ok()
}
