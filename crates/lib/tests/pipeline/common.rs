//! Shared fixtures for pipeline tests.

use std::path::{Path, PathBuf};

use csmod_lib::config::RuntimeConfig;
use csmod_lib::module::ModuleSource;
use csmod_lib::runtime::DotnetSdk;
use csmod_lib::sdk::SdkSource;
use csmod_lib::substrate::{LocalSubstrate, LocalSubstrateConfig};
use csmod_lib::toolchain::{DotnetCli, ManifestWriter};
use tempfile::TempDir;

pub const SDK_COMPONENTS: [&str; 3] = [
  "Dagger.SDK",
  "Dagger.SDK.Mod.SourceGenerator",
  "Dagger.SDK.SourceGenerator/Dagger.SDK.SourceGenerator",
];

pub const SCHEMA_V1: &str = r#"{"__schema":{"types":[{"name":"Query"}]}}"#;
pub const SCHEMA_V2: &str = r#"{"__schema":{"types":[{"name":"Query"},{"name":"Container"}]}}"#;

/// Isolated SDK checkout, context tree, schema and scratch root.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// SDK with all components, a context with a `ci/` directory and [`SCHEMA_V1`].
  pub fn new() -> Self {
    let env = Self {
      temp: TempDir::new().unwrap(),
    };
    for component in SDK_COMPONENTS {
      let name = component.rsplit('/').next().unwrap();
      let dir = format!("sdk/{component}");
      env.write_file(&format!("{dir}/{name}.csproj"), "<Project Sdk=\"Microsoft.NET.Sdk\" />\n");
      env.write_file(&format!("{dir}/Client.cs"), &format!("namespace {name};\n"));
      env.write_file(&format!("{dir}/bin/Debug/net8.0/{name}.dll"), "binary");
      env.write_file(&format!("{dir}/obj/project.assets.json"), "{}");
      env.write_file(&format!("{dir}/introspection.json"), "{\"stale\":true}");
    }
    env.write_file("context/ci/README.md", "# ci\n");
    env.write_schema(SCHEMA_V1);
    env
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  pub fn read_context(&self, relative_path: &str) -> String {
    std::fs::read_to_string(self.context_path().join(relative_path)).unwrap()
  }

  pub fn write_schema(&self, content: &str) {
    self.write_file("schema/introspection.json", content);
  }

  pub fn schema_path(&self) -> PathBuf {
    self.temp.path().join("schema/introspection.json")
  }

  pub fn sdk_path(&self) -> PathBuf {
    self.temp.path().join("sdk")
  }

  pub fn context_path(&self) -> PathBuf {
    self.temp.path().join("context")
  }

  pub fn work_path(&self) -> PathBuf {
    let p = self.temp.path().join("work");
    std::fs::create_dir_all(&p).unwrap();
    p
  }

  pub fn source(&self, name: &str, subpath: &str) -> ModuleSource {
    ModuleSource::new(self.context_path(), name, subpath)
  }

  pub fn driver(&self) -> DotnetSdk<ManifestWriter, LocalSubstrate> {
    DotnetSdk::new(
      RuntimeConfig::default(),
      SdkSource::new(self.sdk_path()),
      ManifestWriter,
      self.substrate(true, Vec::new()),
    )
  }

  /// Driver recording real `dotnet` commands. Programs are looked up in
  /// `tool_dirs` only.
  pub fn dotnet_driver(&self, tool_dirs: Vec<PathBuf>) -> DotnetSdk<DotnetCli, LocalSubstrate> {
    DotnetSdk::new(
      RuntimeConfig::default(),
      SdkSource::new(self.sdk_path()),
      DotnetCli,
      self.substrate(false, tool_dirs),
    )
  }

  fn substrate(&self, inherit_path: bool, tool_dirs: Vec<PathBuf>) -> LocalSubstrate {
    LocalSubstrate::new(LocalSubstrateConfig {
      work_root: self.work_path(),
      inherit_path,
      tool_dirs,
    })
  }

  /// Install a `dotnet` stand-in that appends `<cwd>|<args>` to
  /// [`dotnet_log`](Self::dotnet_log) and then runs `extra` (shell script).
  /// Returns the directory holding it.
  #[cfg(unix)]
  pub fn fake_dotnet(&self, extra: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let bin = self.temp.path().join("bin");
    let script = format!(
      "#!/bin/sh\necho \"$(pwd)|$*\" >> '{}'\n{extra}\n",
      self.temp.path().join("dotnet.log").display()
    );
    self.write_file("bin/dotnet", &script);
    std::fs::set_permissions(bin.join("dotnet"), std::fs::Permissions::from_mode(0o755)).unwrap();
    bin
  }

  /// Invocations recorded by [`fake_dotnet`](Self::fake_dotnet), in order.
  pub fn dotnet_log(&self) -> Vec<String> {
    std::fs::read_to_string(self.temp.path().join("dotnet.log"))
      .unwrap_or_default()
      .lines()
      .map(str::to_string)
      .collect()
  }
}

/// True if any segment of `path` equals `segment`.
pub fn has_segment(path: &str, segment: &str) -> bool {
  path.split('/').any(|s| s == segment)
}

/// Files under `root`, relative and sorted.
pub fn list_files(root: &Path) -> Vec<String> {
  let mut files: Vec<String> = walkdir::WalkDir::new(root)
    .into_iter()
    .filter_map(Result::ok)
    .filter(|e| e.file_type().is_file())
    .map(|e| {
      e.path()
        .strip_prefix(root)
        .unwrap()
        .to_string_lossy()
        .replace('\\', "/")
    })
    .collect();
  files.sort();
  files
}
