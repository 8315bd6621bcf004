//! Generated tree contents and classification.

use super::common::{SCHEMA_V1, SDK_COMPONENTS, TestEnv, has_segment};

#[tokio::test]
async fn hello_world_tree() {
  let env = TestEnv::new();
  let code = env
    .driver()
    .codegen(&env.source("hello world", "ci"), &env.schema_path())
    .await
    .unwrap();

  assert_eq!(code.module.identifier, "HelloWorld");
  assert_eq!(code.source_subpath(), "ci");

  let files = code.tree.files().unwrap();
  for expected in [
    "ci/README.md",
    "ci/HelloWorld.sln",
    "ci/HelloWorld/HelloWorld.csproj",
    "ci/HelloWorld/Program.cs",
    "ci/HelloWorld/HelloWorld.cs",
    "ci/Dagger.SDK/introspection.json",
    "ci/Dagger.SDK/Dagger.SDK.csproj",
    "ci/Dagger.SDK.Mod.SourceGenerator/Client.cs",
    "ci/Dagger.SDK.SourceGenerator/Dagger.SDK.SourceGenerator/Client.cs",
  ] {
    assert!(files.contains(&expected.to_string()), "missing {expected} in {files:?}");
  }

  let program = code.tree.read_to_string("ci/HelloWorld/Program.cs").unwrap();
  assert!(program.contains("Entrypoint.Invoke<HelloWorld.HelloWorld>(args)"));

  let module = code.tree.read_to_string("ci/HelloWorld/HelloWorld.cs").unwrap();
  assert!(module.contains("namespace HelloWorld;"));
  assert!(module.contains("public partial class HelloWorld"));
  assert!(!module.contains("{{"));

  assert_eq!(code.vcs_generated_paths(), vec!["Dagger.SDK*/**"]);
  assert_eq!(code.vcs_ignored_paths(), vec!["Dagger.SDK*/**", "**/obj", "**/bin", "**/.idea"]);
}

#[tokio::test]
async fn solution_registers_sdk_and_module() {
  let env = TestEnv::new();
  let code = env
    .driver()
    .codegen(&env.source("hello world", "ci"), &env.schema_path())
    .await
    .unwrap();

  let sln = code.tree.read_to_string("ci/HelloWorld.sln").unwrap();
  for project in ["Dagger.SDK", "Dagger.SDK.Mod.SourceGenerator", "Dagger.SDK.SourceGenerator", "HelloWorld"] {
    assert!(sln.contains(&format!("= \"{project}\"")), "{project} not in solution");
  }
  assert_eq!(sln.matches("EndProject").count(), 4);

  let csproj = code.tree.read_to_string("ci/HelloWorld/HelloWorld.csproj").unwrap();
  assert!(csproj.contains("..\\Dagger.SDK\\Dagger.SDK.csproj"));
  assert!(csproj.contains("..\\Dagger.SDK.Mod.SourceGenerator\\Dagger.SDK.Mod.SourceGenerator.csproj"));
  assert!(!csproj.contains("Dagger.SDK.SourceGenerator\\Dagger.SDK.SourceGenerator"));
}

#[tokio::test]
async fn sdk_build_outputs_and_stale_schemas_are_excluded() {
  let env = TestEnv::new();
  let code = env
    .driver()
    .codegen(&env.source("hello world", "ci"), &env.schema_path())
    .await
    .unwrap();

  let files = code.tree.files().unwrap();
  for file in &files {
    let under_sdk = SDK_COMPONENTS.iter().any(|c| file.starts_with(&format!("ci/{c}/")));
    if under_sdk {
      assert!(!has_segment(file, "bin"), "copied build output {file}");
      assert!(!has_segment(file, "obj"), "copied build output {file}");
    }
  }

  let schemas: Vec<&String> = files.iter().filter(|f| f.ends_with("introspection.json")).collect();
  assert_eq!(schemas, vec!["ci/Dagger.SDK/introspection.json"]);
  assert_eq!(code.tree.read_to_string("ci/Dagger.SDK/introspection.json").unwrap(), SCHEMA_V1);
}

#[tokio::test]
async fn every_sdk_path_is_generated_and_ignored() {
  let env = TestEnv::new();
  env.write_file("context/ci/.idea/workspace.xml", "<project />");
  let code = env
    .driver()
    .codegen(&env.source("hello world", "ci"), &env.schema_path())
    .await
    .unwrap();

  for file in code.tree.files().unwrap() {
    let class = code.classify(&file);
    let rel = file.strip_prefix("ci/").unwrap();
    if rel.starts_with("Dagger.SDK") {
      assert!(class.generated && class.ignored, "{file} should be generated and ignored");
    } else if rel.starts_with(".idea/") {
      assert!(!class.generated && class.ignored, "{file} should only be ignored");
    } else {
      assert!(!class.generated, "{file} should not be generated");
    }
  }

  let module = code.classify("ci/HelloWorld/HelloWorld.cs");
  assert!(!module.generated && !module.ignored);
}

#[tokio::test]
async fn context_outside_subpath_is_carried_along() {
  let env = TestEnv::new();
  env.write_file("context/other/keep.txt", "keep");
  let code = env
    .driver()
    .codegen(&env.source("hello world", "ci"), &env.schema_path())
    .await
    .unwrap();

  assert_eq!(code.tree.read_to_string("other/keep.txt").unwrap(), "keep");
  assert!(!code.tree.files().unwrap().iter().any(|f| f.starts_with("other/Dagger.SDK")));
}

#[tokio::test]
async fn host_context_is_never_written() {
  let env = TestEnv::new();
  let before = super::common::list_files(&env.context_path());
  let _code = env
    .driver()
    .codegen(&env.source("hello world", "ci"), &env.schema_path())
    .await
    .unwrap();

  assert_eq!(super::common::list_files(&env.context_path()), before);
}
