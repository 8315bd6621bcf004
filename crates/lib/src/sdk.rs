//! The SDK source tree and its three components.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::consts::{SDK_API_DIR, SDK_GENERATOR_DIR, SDK_MOD_DIR};

#[derive(Debug, Error)]
pub enum SdkError {
  #[error("sdk source {} is not a directory", .0.display())]
  MissingRoot(PathBuf),

  #[error("sdk component '{component}' not found at {}", path.display())]
  MissingComponent { component: &'static str, path: PathBuf },
}

/// One piece of the SDK copied into every module tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SdkComponent {
  /// Public API; also receives the schema artifact.
  Api,
  /// Code-generation extension every module project references.
  ModSourceGenerator,
  /// Source generator library.
  SourceGenerator,
}

impl SdkComponent {
  /// Installation order.
  pub const ALL: [SdkComponent; 3] = [Self::Api, Self::ModSourceGenerator, Self::SourceGenerator];

  /// Path relative to the SDK root. Components are installed at the same
  /// relative path under the module workdir.
  pub fn path(self) -> &'static str {
    match self {
      Self::Api => SDK_API_DIR,
      Self::ModSourceGenerator => SDK_MOD_DIR,
      Self::SourceGenerator => SDK_GENERATOR_DIR,
    }
  }

  /// Components a freshly scaffolded module project references.
  pub fn referenced_by_module(self) -> bool {
    matches!(self, Self::Api | Self::ModSourceGenerator)
  }
}

/// Read-only SDK checkout on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkSource {
  root: PathBuf,
}

impl SdkSource {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Host directory holding `component`.
  pub fn component_dir(&self, component: SdkComponent) -> PathBuf {
    component
      .path()
      .split('/')
      .fold(self.root.clone(), |dir, segment| dir.join(segment))
  }

  /// Check that every component exists.
  pub fn validate(&self) -> Result<(), SdkError> {
    if !self.root.is_dir() {
      return Err(SdkError::MissingRoot(self.root.clone()));
    }
    for component in SdkComponent::ALL {
      let path = self.component_dir(component);
      if !path.is_dir() {
        return Err(SdkError::MissingComponent {
          component: component.path(),
          path,
        });
      }
      debug!(component = component.path(), "found sdk component");
    }
    Ok(())
  }
}
