use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::path::join_container_path;
use crate::util::hash::Hashable;

/// A host directory mounted into the environment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mount {
  /// Absolute container path.
  pub path: String,
  /// Host directory providing the contents.
  pub source: PathBuf,
}

/// Options for a recorded command.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecOpts {
  /// Program followed by its arguments.
  pub args: Vec<String>,
  /// Extra environment variables.
  pub env: BTreeMap<String, String>,
  /// Absolute container path the command runs in.
  pub cwd: String,
}

impl ExecOpts {
  pub fn new<I, S>(args: I, cwd: &str) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      args: args.into_iter().map(Into::into).collect(),
      env: BTreeMap::new(),
      cwd: cwd.to_string(),
    }
  }

  pub fn with_env(mut self, key: &str, value: &str) -> Self {
    self.env.insert(key.to_string(), value.to_string());
    self
  }

  /// The command line as a single display string.
  pub fn display(&self) -> String {
    self.args.join(" ")
  }
}

/// A single recorded mutation of the environment's filesystem.
///
/// Every `dest` is an absolute container path, resolved against the working
/// directory that was current when the layer was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
  /// Copy a host directory tree, skipping paths matched by `exclude`.
  ///
  /// Exclusion globs are matched against paths relative to `source`.
  CopyDir {
    dest: String,
    source: PathBuf,
    exclude: Vec<String>,
  },
  /// Copy a single host file byte-for-byte.
  CopyFile { dest: String, source: PathBuf },
  /// Write a file with the given contents, replacing any existing file.
  WriteFile { dest: String, contents: String },
  /// Run a command to completion; a non-zero exit aborts realization.
  Exec(ExecOpts),
}

/// A directed build dependency between two projects.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectReference {
  /// Path of the depending project, relative to the group directory.
  pub from: String,
  /// Path of the dependency, relative to the group directory.
  pub to: String,
}

/// Immutable description of a build environment.
///
/// See the [module documentation](crate::env) for the copy-on-write contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildEnvironment {
  base_image: Option<String>,
  mount: Option<Mount>,
  workdir: String,
  layers: Vec<Layer>,
  group: Option<String>,
  members: BTreeSet<String>,
  references: BTreeSet<ProjectReference>,
  /// Projects created during this invocation, with their target framework.
  scaffolded: BTreeMap<String, String>,
  entrypoint: Option<Vec<String>>,
}

impl Hashable for BuildEnvironment {}

impl Default for BuildEnvironment {
  fn default() -> Self {
    Self::new()
  }
}

impl BuildEnvironment {
  /// An empty environment rooted at `/`.
  pub fn new() -> Self {
    Self {
      base_image: None,
      mount: None,
      workdir: "/".to_string(),
      layers: Vec::new(),
      group: None,
      members: BTreeSet::new(),
      references: BTreeSet::new(),
      scaffolded: BTreeMap::new(),
      entrypoint: None,
    }
  }

  pub fn base_image(&self) -> Option<&str> {
    self.base_image.as_deref()
  }

  pub fn mount(&self) -> Option<&Mount> {
    self.mount.as_ref()
  }

  pub fn workdir(&self) -> &str {
    &self.workdir
  }

  pub fn layers(&self) -> &[Layer] {
    &self.layers
  }

  /// Name of the project group, once one was created.
  pub fn group(&self) -> Option<&str> {
    self.group.as_deref()
  }

  /// Projects registered in the current group.
  pub fn members(&self) -> &BTreeSet<String> {
    &self.members
  }

  pub fn is_member(&self, project: &str) -> bool {
    self.members.contains(project)
  }

  pub fn references(&self) -> &BTreeSet<ProjectReference> {
    &self.references
  }

  /// Dependencies recorded for one project.
  pub fn references_from<'a>(&'a self, project: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    self
      .references
      .iter()
      .filter(move |r| r.from == project)
      .map(|r| r.to.as_str())
  }

  /// Target framework of a project created during this invocation.
  pub fn scaffolded(&self, project: &str) -> Option<&str> {
    self.scaffolded.get(project).map(String::as_str)
  }

  pub fn entrypoint(&self) -> Option<&[String]> {
    self.entrypoint.as_deref()
  }

  /// Resolve `path` against the current working directory.
  pub fn resolve(&self, path: &str) -> String {
    join_container_path(&self.workdir, path)
  }

  /// Start from a base image. Earlier state is kept.
  pub fn with_base_image(&self, image: &str) -> Self {
    let mut next = self.clone();
    next.base_image = Some(image.to_string());
    next
  }

  /// Mount a host directory at an absolute container path.
  pub fn with_mounted_directory(&self, path: &str, source: impl Into<PathBuf>) -> Self {
    let mut next = self.clone();
    next.mount = Some(Mount {
      path: join_container_path("/", path),
      source: source.into(),
    });
    next
  }

  /// Change the working directory. Relative paths resolve against the current one.
  pub fn with_workdir(&self, path: &str) -> Self {
    let mut next = self.clone();
    next.workdir = self.resolve(path);
    next
  }

  /// Copy a host directory to `dest`, excluding paths matched by `exclude`.
  pub fn with_directory(&self, dest: &str, source: impl Into<PathBuf>, exclude: &[String]) -> Self {
    self.with_layer(Layer::CopyDir {
      dest: self.resolve(dest),
      source: source.into(),
      exclude: exclude.to_vec(),
    })
  }

  /// Copy a single host file to `dest`.
  pub fn with_file(&self, dest: &str, source: impl Into<PathBuf>) -> Self {
    self.with_layer(Layer::CopyFile {
      dest: self.resolve(dest),
      source: source.into(),
    })
  }

  /// Write `contents` to `dest`, replacing whatever is there.
  pub fn with_new_file(&self, dest: &str, contents: impl Into<String>) -> Self {
    self.with_layer(Layer::WriteFile {
      dest: self.resolve(dest),
      contents: contents.into(),
    })
  }

  /// Run a command in the current working directory.
  pub fn with_exec<I, S>(&self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.with_layer(Layer::Exec(ExecOpts::new(args, &self.workdir)))
  }

  pub fn with_layer(&self, layer: Layer) -> Self {
    let mut next = self.clone();
    next.layers.push(layer);
    next
  }

  /// Start a new project group. Any previously registered membership is dropped.
  pub fn with_group(&self, name: &str) -> Self {
    let mut next = self.clone();
    next.group = Some(name.to_string());
    next.members.clear();
    next
  }

  /// Register a project in the group. Registering twice is a no-op.
  pub fn with_member(&self, project: &str) -> Self {
    let mut next = self.clone();
    next.members.insert(project.to_string());
    next
  }

  pub fn with_reference(&self, from: &str, to: &str) -> Self {
    let mut next = self.clone();
    next.references.insert(ProjectReference {
      from: from.to_string(),
      to: to.to_string(),
    });
    next
  }

  pub fn with_scaffolded(&self, project: &str, framework: &str) -> Self {
    let mut next = self.clone();
    next.scaffolded.insert(project.to_string(), framework.to_string());
    next
  }

  /// Fix the command the environment runs when executed.
  pub fn with_entrypoint<I, S>(&self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let mut next = self.clone();
    next.entrypoint = Some(args.into_iter().map(Into::into).collect());
    next
  }
}
