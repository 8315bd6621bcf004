use tracing::{debug, info};

use super::StageError;
use crate::env::BuildEnvironment;
use crate::ignore::IgnoreSpec;
use crate::sdk::{SdkComponent, SdkSource};
use crate::toolchain::ProjectToolchain;

/// Copy the SDK components into the workdir and register each in the group.
///
/// Build outputs and stale schema artifacts are filtered with the
/// `copy_exclude` set. Files already in the tree are overwritten, anything
/// else in the destination is left alone.
///
/// Only the source side is filtered: `bin/`, `obj/` or files dropped from a
/// newer SDK that already sit under a `Dagger.SDK*` directory of the context
/// survive installation. A clean context holds no excluded file afterwards.
pub fn with_sdk<T: ProjectToolchain>(
  env: &BuildEnvironment,
  toolchain: &T,
  sdk: &SdkSource,
  ignore: &IgnoreSpec,
) -> Result<BuildEnvironment, StageError> {
  sdk.validate()?;
  info!(root = ?sdk.root(), "installing sdk");

  let mut next = env.clone();
  for component in SdkComponent::ALL {
    debug!(component = component.path(), "copying sdk component");
    next = next.with_directory(component.path(), sdk.component_dir(component), &ignore.copy_exclude);
  }
  for component in SdkComponent::ALL {
    next = toolchain.add_member(&next, component.path())?;
  }
  Ok(next)
}
