//! Host-backed substrate.
//!
//! Every realization gets a fresh scratch directory under the configured work
//! root. Inside it, `rootfs/` stands in for the container filesystem: the
//! mount is copied to `rootfs/<mount path>` (the host tree itself is never
//! written) and each layer is replayed in order. Commands run against the host
//! toolchain; the base image is recorded but not pulled.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tempfile::TempDir;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info};

use super::copy::copy_dir_filtered;
use super::exec::{execute_cmd, search_path};
use super::{Substrate, SubstrateError};
use crate::env::{BuildEnvironment, Layer};
use crate::ignore::GlobSet;
use crate::platform::paths::cache_dir;
use crate::util::hash::{ContentHash, DirHashError, Hashable, hash_directory};

/// Environment variable overriding [`LocalSubstrateConfig::work_root`].
pub const WORK_DIR_ENV: &str = "CSMOD_WORK_DIR";

/// Configuration for [`LocalSubstrate`].
#[derive(Debug, Clone)]
pub struct LocalSubstrateConfig {
  /// Directory scratch roots are created in.
  pub work_root: PathBuf,
  /// Pass the host `PATH` and `HOME` to commands.
  pub inherit_path: bool,
  /// Directories searched for programs before the host `PATH`.
  pub tool_dirs: Vec<PathBuf>,
}

impl Default for LocalSubstrateConfig {
  fn default() -> Self {
    let work_root = std::env::var_os(WORK_DIR_ENV)
      .map(PathBuf::from)
      .unwrap_or_else(|| cache_dir().join("envs"));
    Self {
      work_root,
      inherit_path: true,
      tool_dirs: Vec::new(),
    }
  }
}

#[derive(Debug, Clone, Default)]
pub struct LocalSubstrate {
  config: LocalSubstrateConfig,
}

/// A realized environment: the scratch directory and its stand-in root.
struct Realized {
  scratch: TempDir,
  rootfs: PathBuf,
  mount: Option<String>,
}

impl Realized {
  fn host_path(&self, container_path: &str) -> PathBuf {
    self.rootfs.join(container_path.trim_start_matches('/'))
  }

  /// Rewrite arguments that name a path under the mount.
  fn map_arg(&self, arg: &str) -> String {
    match &self.mount {
      Some(mount) if arg == mount || arg.starts_with(&format!("{mount}/")) => {
        self.host_path(arg).to_string_lossy().to_string()
      }
      _ => arg.to_string(),
    }
  }
}

impl LocalSubstrate {
  pub fn new(config: LocalSubstrateConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &LocalSubstrateConfig {
    &self.config
  }

  /// Replay every layer of `env` into a new scratch directory.
  ///
  /// A failing layer is reported as [`SubstrateError::LayerFailed`] with its
  /// index in `env.layers()`.
  async fn realize(&self, env: &BuildEnvironment) -> Result<Realized, SubstrateError> {
    let hash = env.compute_hash()?;
    fs::create_dir_all(&self.config.work_root).await?;
    let scratch = tempfile::Builder::new()
      .prefix(&format!("{hash}-"))
      .tempdir_in(&self.config.work_root)?;

    let realized = Realized {
      rootfs: scratch.path().join("rootfs"),
      mount: env.mount().map(|m| m.path.clone()),
      scratch,
    };

    debug!(
      hash = %hash,
      image = env.base_image().unwrap_or("<none>"),
      scratch = ?realized.scratch.path(),
      layers = env.layers().len(),
      "realizing environment"
    );

    if let Some(mount) = env.mount() {
      if !mount.source.is_dir() {
        return Err(SubstrateError::MountSource {
          path: mount.source.clone(),
        });
      }
      copy_dir_filtered(&mount.source, &realized.host_path(&mount.path), &GlobSet::default())?;
    }
    fs::create_dir_all(realized.host_path(env.workdir())).await?;

    for (idx, layer) in env.layers().iter().enumerate() {
      debug!(layer = idx, "applying layer");
      self
        .apply_layer(&realized, layer)
        .await
        .map_err(|e| SubstrateError::LayerFailed {
          index: idx,
          source: Box::new(e),
        })?;
    }

    Ok(realized)
  }

  async fn apply_layer(&self, realized: &Realized, layer: &Layer) -> Result<(), SubstrateError> {
    match layer {
      Layer::CopyDir { dest, source, exclude } => {
        let copied = copy_dir_filtered(source, &realized.host_path(dest), &GlobSet::new(exclude))?;
        debug!(dest = %dest, files = copied, "copied directory");
      }
      Layer::CopyFile { dest, source } => {
        let target = realized.host_path(dest);
        create_parent(&target).await?;
        fs::copy(source, &target).await.map_err(|e| SubstrateError::Copy {
          from: source.clone(),
          to: target.clone(),
          source: e,
        })?;
      }
      Layer::WriteFile { dest, contents } => {
        let target = realized.host_path(dest);
        create_parent(&target).await?;
        fs::write(&target, contents).await?;
      }
      Layer::Exec(opts) => {
        let cwd = realized.host_path(&opts.cwd);
        fs::create_dir_all(&cwd).await?;
        let args: Vec<String> = opts.args.iter().map(|a| realized.map_arg(a)).collect();
        execute_cmd(
          &args,
          &opts.env,
          &cwd,
          realized.scratch.path(),
          &self.config.tool_dirs,
          self.config.inherit_path,
        )
        .await?;
      }
    }
    Ok(())
  }

  /// Realize `env` and run its entrypoint with inherited stdio.
  pub async fn run(&self, env: &BuildEnvironment) -> Result<ExitStatus, SubstrateError> {
    let entrypoint = env.entrypoint().ok_or(SubstrateError::NoEntrypoint)?;
    let realized = self.realize(env).await?;

    let args: Vec<String> = entrypoint.iter().map(|a| realized.map_arg(a)).collect();
    let (bin, rest) = args.split_first().ok_or(SubstrateError::EmptyCommand)?;
    let cmd_line = args.join(" ");
    info!(cmd = %cmd_line, "running entrypoint");

    let mut command = Command::new(bin);
    command
      .args(rest)
      .current_dir(realized.host_path(env.workdir()))
      .stdin(Stdio::inherit())
      .stdout(Stdio::inherit())
      .stderr(Stdio::inherit());
    if !self.config.tool_dirs.is_empty() {
      if let Some(path) = search_path(&self.config.tool_dirs, true) {
        command.env("PATH", path);
      }
    }

    let status = command
      .status()
      .await
      .map_err(|source| SubstrateError::CmdSpawn { cmd: cmd_line, source })?;

    Ok(status)
  }
}

async fn create_parent(path: &Path) -> Result<(), SubstrateError> {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).await?;
  }
  Ok(())
}

impl Substrate for LocalSubstrate {
  type Tree = LocalTree;

  async fn entries(&self, env: &BuildEnvironment, path: &str) -> Result<Vec<String>, SubstrateError> {
    let realized = self.realize(env).await?;
    let dir = realized.host_path(&env.resolve(path));

    let mut names = Vec::new();
    let mut read_dir = fs::read_dir(&dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
      names.push(entry.file_name().to_string_lossy().to_string());
    }
    names.sort();
    Ok(names)
  }

  async fn directory(&self, env: &BuildEnvironment, path: &str) -> Result<LocalTree, SubstrateError> {
    let realized = self.realize(env).await?;
    let root = realized.host_path(&env.resolve(path));
    if !root.is_dir() {
      return Err(SubstrateError::Io(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("{} is not a directory", env.resolve(path)),
      )));
    }
    Ok(LocalTree {
      _scratch: realized.scratch,
      root,
    })
  }
}

/// A directory produced by [`LocalSubstrate`].
///
/// The backing scratch directory is removed when the tree is dropped; use
/// [`export`](Self::export) to keep the contents.
#[derive(Debug)]
pub struct LocalTree {
  _scratch: TempDir,
  root: PathBuf,
}

impl LocalTree {
  pub fn path(&self) -> &Path {
    &self.root
  }

  /// Every regular file, as sorted `/`-separated paths relative to the root.
  pub fn files(&self) -> Result<Vec<String>, SubstrateError> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(&self.root).sort_by_file_name() {
      let entry = entry.map_err(|e| SubstrateError::Walk {
        path: self.root.clone(),
        message: e.to_string(),
      })?;
      if entry.file_type().is_file() {
        if let Ok(rel) = entry.path().strip_prefix(&self.root) {
          files.push(rel.to_string_lossy().replace('\\', "/"));
        }
      }
    }
    files.sort();
    Ok(files)
  }

  pub fn read_to_string(&self, rel: &str) -> Result<String, SubstrateError> {
    Ok(std::fs::read_to_string(self.root.join(rel))?)
  }

  /// Copy the tree over `dest`. Files only present in `dest` are left alone.
  pub fn export(&self, dest: &Path) -> Result<usize, SubstrateError> {
    let copied = copy_dir_filtered(&self.root, dest, &GlobSet::default())?;
    info!(dest = ?dest, files = copied, "exported tree");
    Ok(copied)
  }

  /// Content digest of the whole tree.
  pub fn digest(&self) -> Result<ContentHash, DirHashError> {
    hash_directory(&self.root)
  }
}
