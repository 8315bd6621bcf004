//! Toolchain that writes solution and project files itself.
//!
//! Output follows the layout `dotnet new sln` and `dotnet new console` produce,
//! so a tree built this way opens and builds like one built with the CLI.
//! Nothing runs on the host, which makes this the toolchain for hosts
//! without a .NET SDK.
//!
//! Every operation rewrites the affected file from the environment's recorded
//! group state, so the last write always reflects the full membership.

use sha2::{Digest, Sha256};
use tracing::debug;

use super::{ProjectToolchain, ToolchainError, check_project_path};
use crate::consts::PROJECT_EXT;
use crate::env::BuildEnvironment;

/// Project type GUID for C# projects.
const CSHARP_PROJECT_TYPE: &str = "FAE04EC0-301F-11D3-BF4B-00C04F79EFBC";

const CONFIGURATIONS: [&str; 2] = ["Debug", "Release"];

#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestWriter;

impl ProjectToolchain for ManifestWriter {
  fn name(&self) -> &'static str {
    "manifest"
  }

  fn create_group(&self, env: &BuildEnvironment, name: &str) -> Result<BuildEnvironment, ToolchainError> {
    check_project_path(name)?;
    let next = env.with_group(name);
    Ok(write_solution(&next, name))
  }

  fn add_member(&self, env: &BuildEnvironment, project: &str) -> Result<BuildEnvironment, ToolchainError> {
    check_project_path(project)?;
    let group = env.group().ok_or_else(|| ToolchainError::NoGroup(project.to_string()))?;
    if env.is_member(project) {
      debug!(project, "already a group member");
      return Ok(env.clone());
    }
    let group = group.to_string();
    Ok(write_solution(&env.with_member(project), &group))
  }

  fn create_executable(
    &self,
    env: &BuildEnvironment,
    name: &str,
    framework: &str,
  ) -> Result<BuildEnvironment, ToolchainError> {
    check_project_path(name)?;
    let next = env.with_scaffolded(name, framework);
    Ok(write_project(&next, name, framework))
  }

  fn add_reference(&self, env: &BuildEnvironment, from: &str, to: &str) -> Result<BuildEnvironment, ToolchainError> {
    check_project_path(from)?;
    check_project_path(to)?;
    let framework = env
      .scaffolded(from)
      .ok_or_else(|| ToolchainError::UnmanagedProject {
        project: from.to_string(),
      })?
      .to_string();
    let next = env.with_reference(from, to);
    Ok(write_project(&next, from, &framework))
  }
}

/// Project file path of `project`, relative to the group directory.
fn project_file(project: &str) -> String {
  let name = project.rsplit('/').next().unwrap_or(project);
  format!("{project}/{name}.{PROJECT_EXT}")
}

/// Stable GUID for a project path, so rewrites never churn the solution.
fn project_guid(project: &str) -> String {
  let digest = Sha256::digest(project.as_bytes());
  let hex = hex::encode_upper(&digest[..16]);
  format!(
    "{}-{}-{}-{}-{}",
    &hex[0..8],
    &hex[8..12],
    &hex[12..16],
    &hex[16..20],
    &hex[20..32]
  )
}

fn write_solution(env: &BuildEnvironment, group: &str) -> BuildEnvironment {
  let contents = render_solution(env.members().iter().map(String::as_str));
  debug!(group, members = env.members().len(), "writing solution");
  env.with_new_file(&format!("{group}.sln"), contents)
}

fn write_project(env: &BuildEnvironment, project: &str, framework: &str) -> BuildEnvironment {
  let contents = render_project(project, framework, env.references_from(project));
  debug!(project, "writing project file");
  env.with_new_file(&project_file(project), contents)
}

fn render_solution<'a>(members: impl IntoIterator<Item = &'a str>) -> String {
  let members: Vec<(&str, String)> = members.into_iter().map(|m| (m, project_guid(m))).collect();

  let mut out = String::new();
  out.push('\n');
  out.push_str("Microsoft Visual Studio Solution File, Format Version 12.00\n");
  out.push_str("# Visual Studio Version 17\n");
  out.push_str("VisualStudioVersion = 17.0.31903.59\n");
  out.push_str("MinimumVisualStudioVersion = 10.0.40219.1\n");

  for (member, guid) in &members {
    let name = member.rsplit('/').next().unwrap_or(member);
    let path = project_file(member).replace('/', "\\");
    out.push_str(&format!(
      "Project(\"{{{CSHARP_PROJECT_TYPE}}}\") = \"{name}\", \"{path}\", \"{{{guid}}}\"\n"
    ));
    out.push_str("EndProject\n");
  }

  out.push_str("Global\n");
  out.push_str("\tGlobalSection(SolutionConfigurationPlatforms) = preSolution\n");
  for config in CONFIGURATIONS {
    out.push_str(&format!("\t\t{config}|Any CPU = {config}|Any CPU\n"));
  }
  out.push_str("\tEndGlobalSection\n");
  out.push_str("\tGlobalSection(SolutionProperties) = preSolution\n");
  out.push_str("\t\tHideSolutionNode = FALSE\n");
  out.push_str("\tEndGlobalSection\n");
  if !members.is_empty() {
    out.push_str("\tGlobalSection(ProjectConfigurationPlatforms) = postSolution\n");
    for (_, guid) in &members {
      for config in CONFIGURATIONS {
        out.push_str(&format!("\t\t{{{guid}}}.{config}|Any CPU.ActiveCfg = {config}|Any CPU\n"));
        out.push_str(&format!("\t\t{{{guid}}}.{config}|Any CPU.Build.0 = {config}|Any CPU\n"));
      }
    }
    out.push_str("\tEndGlobalSection\n");
  }
  out.push_str("EndGlobal\n");
  out
}

fn render_project<'a>(project: &str, framework: &str, references: impl IntoIterator<Item = &'a str>) -> String {
  let up = "..\\".repeat(project.split('/').count());
  let references: Vec<String> = references
    .into_iter()
    .map(|to| format!("{up}{}", project_file(to).replace('/', "\\")))
    .collect();

  let mut out = String::from("<Project Sdk=\"Microsoft.NET.Sdk\">\n\n");
  if !references.is_empty() {
    out.push_str("  <ItemGroup>\n");
    for reference in &references {
      out.push_str(&format!("    <ProjectReference Include=\"{reference}\" />\n"));
    }
    out.push_str("  </ItemGroup>\n\n");
  }
  out.push_str("  <PropertyGroup>\n");
  out.push_str("    <OutputType>Exe</OutputType>\n");
  out.push_str(&format!("    <TargetFramework>{framework}</TargetFramework>\n"));
  out.push_str("    <ImplicitUsings>enable</ImplicitUsings>\n");
  out.push_str("    <Nullable>enable</Nullable>\n");
  out.push_str("  </PropertyGroup>\n\n");
  out.push_str("</Project>\n");
  out
}
