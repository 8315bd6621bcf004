//! Test utilities for csmod-lib.
//!
//! Cross-platform helpers for tests that execute commands, plus fixture trees
//! shaped like an SDK checkout and a user context directory.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use crate::consts::{INTROSPECTION_FILE, SDK_API_DIR, SDK_GENERATOR_DIR, SDK_MOD_DIR};

/// Returns the shell command and args to echo an environment variable.
///
/// Since environment variable expansion requires a shell, this returns
/// the shell binary and appropriate arguments.
#[cfg(unix)]
pub fn shell_echo_env(var: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), format!("echo \"${}\"", var)])
}

#[cfg(windows)]
pub fn shell_echo_env(var: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), format!("echo %{}%", var)])
}

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

/// Returns the command and args to create a marker file in the current directory.
#[cfg(unix)]
pub fn touch_file(filename: &str) -> (&'static str, Vec<String>) {
  ("/usr/bin/touch", vec![filename.to_string()])
}

#[cfg(windows)]
pub fn touch_file(filename: &str) -> (&'static str, Vec<String>) {
  (
    "powershell.exe",
    vec![
      "-NoProfile".to_string(),
      "-Command".to_string(),
      format!("New-Item -ItemType File -Path '{}' -Force | Out-Null", filename),
    ],
  )
}

/// Returns the command and args to echo a message.
#[cfg(unix)]
pub fn echo_msg(msg: &str) -> (&'static str, Vec<String>) {
  ("/bin/echo", vec![msg.to_string()])
}

#[cfg(windows)]
pub fn echo_msg(msg: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), format!("echo {}", msg)])
}

fn write(path: &Path, contents: &str) {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  fs::write(path, contents).unwrap();
}

/// An SDK checkout with all three components.
///
/// Every component holds a project file and one source file, plus stale
/// `bin/`, `obj/` and `introspection.json` that must never be copied.
pub fn sdk_tree() -> TempDir {
  let root = TempDir::new().unwrap();
  for dir in [SDK_API_DIR, SDK_MOD_DIR, SDK_GENERATOR_DIR] {
    let component = root.path().join(dir);
    let name = dir.rsplit('/').next().unwrap_or(dir);
    write(&component.join(format!("{name}.csproj")), "<Project Sdk=\"Microsoft.NET.Sdk\" />\n");
    write(&component.join("Generated.cs"), &format!("// {name}\n"));
    write(&component.join("bin/Debug/stale.dll"), "stale");
    write(&component.join("obj/project.assets.json"), "{}");
    write(&component.join(INTROSPECTION_FILE), "{\"stale\":true}");
  }
  root
}

/// A user context directory with a `ci/` subdirectory holding one file.
pub fn context_tree() -> TempDir {
  let root = TempDir::new().unwrap();
  write(&root.path().join("ci/README.md"), "# ci\n");
  root
}

/// A schema artifact with the given contents.
pub fn introspection_file(dir: &Path, contents: &str) -> std::path::PathBuf {
  let path = dir.join(INTROSPECTION_FILE);
  write(&path, contents);
  path
}
