//! The build-environment pipeline.
//!
//! Each stage is a transformation of an immutable [`BuildEnvironment`]:
//!
//! 1. [`with_base`]: pin the image, mount the context, enter the module subpath
//! 2. [`with_solution`]: recreate the project group
//! 3. [`with_sdk`]: install the SDK components and register them
//! 4. [`with_introspection`]: drop in the schema artifact
//! 5. [`with_project`]: scaffold the module project if missing, then rewrite
//!    its entrypoint sources
//!
//! A stage either returns the next environment or a [`StageError`]. Callers
//! tag the error with its [`Stage`] through [`InStage::in_stage`] and stop;
//! nothing is retried.
//!
//! Recorded commands only run when a later stage realizes the environment, so
//! a [`LayerLedger`] remembers which stage appended which layers and moves a
//! replay failure back to the stage that recorded the failing layer.
//!
//! [`BuildEnvironment`]: crate::env::BuildEnvironment

mod base;
mod introspection;
mod project;
mod sdk;
mod solution;

pub use base::with_base;
pub use introspection::with_introspection;
pub use project::with_project;
pub use sdk::with_sdk;
pub use solution::with_solution;

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::env::BuildEnvironment;
use crate::module::ModuleError;
use crate::sdk::SdkError;
use crate::substrate::SubstrateError;
use crate::template::TemplateError;
use crate::toolchain::ToolchainError;

/// Pipeline position, used to attribute failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
  Base,
  Solution,
  Sdk,
  Introspection,
  Project,
  /// Realizing the finished environment to extract its result.
  Realize,
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Stage::Base => "base",
      Stage::Solution => "solution",
      Stage::Sdk => "sdk",
      Stage::Introspection => "introspection",
      Stage::Project => "project",
      Stage::Realize => "realize",
    };
    f.write_str(name)
  }
}

#[derive(Debug, Error)]
pub enum StageError {
  #[error(transparent)]
  Module(#[from] ModuleError),

  #[error(transparent)]
  Sdk(#[from] SdkError),

  #[error(transparent)]
  Toolchain(#[from] ToolchainError),

  #[error(transparent)]
  Template(#[from] TemplateError),

  #[error(transparent)]
  Substrate(#[from] SubstrateError),

  /// The schema artifact could not be read.
  #[error("introspection artifact {}: {source}", path.display())]
  Artifact { path: PathBuf, source: std::io::Error },
}

/// First failure of a pipeline run.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
  pub stage: Stage,
  #[source]
  pub source: StageError,
}

/// Attach a [`Stage`] to a stage result.
pub trait InStage<T> {
  fn in_stage(self, stage: Stage) -> Result<T, PipelineError>;
}

impl<T, E: Into<StageError>> InStage<T> for Result<T, E> {
  fn in_stage(self, stage: Stage) -> Result<T, PipelineError> {
    self.map_err(|e| PipelineError {
      stage,
      source: e.into(),
    })
  }
}

/// Layer count of the environment at the end of each completed stage.
#[derive(Debug, Clone, Default)]
pub struct LayerLedger {
  ends: Vec<(Stage, usize)>,
}

impl LayerLedger {
  pub fn record(&mut self, stage: Stage, env: &BuildEnvironment) {
    self.ends.push((stage, env.layers().len()));
  }

  /// Stage that appended the layer at `index`, if it has completed.
  pub fn stage_of(&self, index: usize) -> Option<Stage> {
    self.ends.iter().find(|(_, end)| index < *end).map(|(stage, _)| *stage)
  }

  /// Re-attribute a failed layer replay to the stage that recorded the layer.
  ///
  /// The layer wrapper is dropped so the cause is the command or copy error
  /// itself. Other errors pass through unchanged.
  pub fn attribute(&self, err: PipelineError) -> PipelineError {
    match err.source {
      StageError::Substrate(SubstrateError::LayerFailed { index, source }) => PipelineError {
        stage: self.stage_of(index).unwrap_or(err.stage),
        source: StageError::Substrate(*source),
      },
      source => PipelineError { stage: err.stage, source },
    }
  }
}
