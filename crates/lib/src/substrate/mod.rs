//! Execution substrates.
//!
//! A substrate turns a recorded [`BuildEnvironment`] into real files. The
//! pipeline needs only two capabilities from it: listing a directory of the
//! environment as realized so far, and handing back a directory tree once the
//! environment is complete.
//!
//! [`LocalSubstrate`] realizes environments on the host, each in its own
//! scratch directory.

mod copy;
mod exec;
mod local;

pub use copy::copy_dir_filtered;
pub use exec::execute_cmd;
pub use local::{LocalSubstrate, LocalSubstrateConfig, LocalTree};

use std::future::Future;
use std::path::PathBuf;

use thiserror::Error;

use crate::env::BuildEnvironment;

#[derive(Debug, Error)]
pub enum SubstrateError {
  /// The host directory to mount is missing or not a directory.
  #[error("cannot mount {}: not a directory", path.display())]
  MountSource { path: PathBuf },

  #[error("failed to copy {} to {}: {source}", from.display(), to.display())]
  Copy {
    from: PathBuf,
    to: PathBuf,
    source: std::io::Error,
  },

  #[error("failed to walk {}: {message}", path.display())]
  Walk { path: PathBuf, message: String },

  /// Command exited unsuccessfully.
  #[error("command failed with exit code {code:?}: {cmd}")]
  CmdFailed { cmd: String, code: Option<i32> },

  /// Command could not be started at all, e.g. the program is not on `PATH`.
  #[error("failed to start command: {cmd}: {source}")]
  CmdSpawn { cmd: String, source: std::io::Error },

  /// A replayed layer failed. `index` is its position in the environment.
  #[error("layer {index} failed: {source}")]
  LayerFailed {
    index: usize,
    #[source]
    source: Box<SubstrateError>,
  },

  #[error("cannot run an empty command")]
  EmptyCommand,

  /// The environment has no entrypoint to run.
  #[error("environment has no entrypoint")]
  NoEntrypoint,

  #[error("failed to hash environment: {0}")]
  Hash(#[from] serde_json::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// Capability interface over whatever executes environments.
pub trait Substrate {
  /// Handle to a directory produced by a realized environment.
  type Tree;

  /// Names of the entries in `path` (resolved against the workdir), sorted.
  fn entries(&self, env: &BuildEnvironment, path: &str) -> impl Future<Output = Result<Vec<String>, SubstrateError>>;

  /// The directory at `path` (resolved against the workdir) after all layers ran.
  fn directory(&self, env: &BuildEnvironment, path: &str) -> impl Future<Output = Result<Self::Tree, SubstrateError>>;
}
