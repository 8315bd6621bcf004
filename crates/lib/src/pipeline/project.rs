use tracing::{debug, info};

use super::StageError;
use crate::env::BuildEnvironment;
use crate::module::ModuleDescriptor;
use crate::sdk::SdkComponent;
use crate::substrate::Substrate;
use crate::template::Template;
use crate::toolchain::ProjectToolchain;

/// Make sure the module project exists, register it and rewrite its two
/// entrypoint sources.
///
/// The project counts as existing when the workdir, as realized so far, has
/// an entry named exactly like the identifier. Only a missing project is
/// scaffolded and wired to the SDK; an existing one keeps its project file and
/// every other source untouched.
pub async fn with_project<S, T>(
  env: &BuildEnvironment,
  substrate: &S,
  toolchain: &T,
  module: &ModuleDescriptor,
  framework: &str,
) -> Result<BuildEnvironment, StageError>
where
  S: Substrate,
  T: ProjectToolchain,
{
  let name = module.identifier.as_str();
  let entries = substrate.entries(env, ".").await?;
  let exists = entries.iter().any(|e| e == name);

  let mut next = env.clone();
  if exists {
    debug!(project = name, "project already present");
  } else {
    info!(project = name, framework, "scaffolding project");
    next = toolchain.create_executable(&next, name, framework)?;
    for component in SdkComponent::ALL.into_iter().filter(|c| c.referenced_by_module()) {
      next = toolchain.add_reference(&next, name, component.path())?;
    }
  }

  let mut rendered = Vec::with_capacity(Template::ALL.len());
  for template in Template::ALL {
    rendered.push((template.output_path(name), template.render(module)?));
  }

  next = toolchain.add_member(&next, name)?;
  for (path, contents) in rendered {
    debug!(path = %path, "writing entrypoint source");
    next = next.with_new_file(&path, contents);
  }
  Ok(next)
}
