//! Re-running the pipeline over its own output.

use super::common::{SCHEMA_V2, TestEnv};

/// Run codegen and write the tree back into the context.
async fn codegen_and_export(env: &TestEnv, name: &str) -> String {
  let code = env
    .driver()
    .codegen(&env.source(name, "ci"), &env.schema_path())
    .await
    .unwrap();
  code.tree.export(&env.context_path()).unwrap();
  code.tree.digest().unwrap().0
}

#[tokio::test]
async fn second_run_is_identical() {
  let env = TestEnv::new();

  let first = codegen_and_export(&env, "hello world").await;
  let second = codegen_and_export(&env, "hello world").await;

  assert_eq!(first, second);
}

#[tokio::test]
async fn user_edits_survive_a_rerun() {
  let env = TestEnv::new();
  codegen_and_export(&env, "hello world").await;

  let custom_csproj = "<Project Sdk=\"Microsoft.NET.Sdk\">\n  <!-- user edit -->\n</Project>\n";
  env.write_file("context/ci/HelloWorld/HelloWorld.csproj", custom_csproj);
  env.write_file("context/ci/HelloWorld/Helper.cs", "class Helper {}\n");
  env.write_file("context/ci/HelloWorld/Program.cs", "// scribbled over\n");

  let code = env
    .driver()
    .codegen(&env.source("hello world", "ci"), &env.schema_path())
    .await
    .unwrap();

  assert_eq!(code.tree.read_to_string("ci/HelloWorld/HelloWorld.csproj").unwrap(), custom_csproj);
  assert_eq!(code.tree.read_to_string("ci/HelloWorld/Helper.cs").unwrap(), "class Helper {}\n");
  let program = code.tree.read_to_string("ci/HelloWorld/Program.cs").unwrap();
  assert!(program.contains("Entrypoint.Invoke<HelloWorld.HelloWorld>"));
}

#[tokio::test]
async fn modified_schema_replaces_only_the_artifact() {
  let env = TestEnv::new();
  codegen_and_export(&env, "hello world").await;
  env.write_file("context/ci/HelloWorld/Helper.cs", "class Helper {}\n");
  env.write_schema(SCHEMA_V2);

  let code = env
    .driver()
    .codegen(&env.source("hello world", "ci"), &env.schema_path())
    .await
    .unwrap();

  assert_eq!(code.tree.read_to_string("ci/Dagger.SDK/introspection.json").unwrap(), SCHEMA_V2);
  assert_eq!(code.tree.read_to_string("ci/HelloWorld/Helper.cs").unwrap(), "class Helper {}\n");
  let sln = code.tree.read_to_string("ci/HelloWorld.sln").unwrap();
  assert_eq!(sln.matches("EndProject").count(), 4);
}

#[tokio::test]
async fn solution_is_rebuilt_from_scratch() {
  let env = TestEnv::new();
  codegen_and_export(&env, "hello world").await;
  env.write_file(
    "context/ci/HelloWorld.sln",
    "Project(\"{X}\") = \"Extra\", \"Extra\\Extra.csproj\", \"{Y}\"\nEndProject\n",
  );

  let code = env
    .driver()
    .codegen(&env.source("hello world", "ci"), &env.schema_path())
    .await
    .unwrap();

  let sln = code.tree.read_to_string("ci/HelloWorld.sln").unwrap();
  assert!(!sln.contains("Extra"));
  assert!(sln.contains("= \"HelloWorld\""));
}

#[tokio::test]
async fn equivalent_names_share_one_project() {
  let env = TestEnv::new();
  codegen_and_export(&env, "my-module").await;
  let second = env
    .driver()
    .codegen(&env.source("My_Module", "ci"), &env.schema_path())
    .await
    .unwrap();

  let projects: Vec<String> = second
    .tree
    .files()
    .unwrap()
    .into_iter()
    .filter(|f| f.ends_with(".csproj") && !f.contains("Dagger.SDK"))
    .collect();
  assert_eq!(projects, vec!["ci/MyModule/MyModule.csproj"]);
}

#[tokio::test]
async fn export_leaves_unrelated_files() {
  let env = TestEnv::new();
  codegen_and_export(&env, "hello world").await;

  assert_eq!(env.read_context("ci/README.md"), "# ci\n");
  assert!(env.context_path().join("ci/HelloWorld/HelloWorld.cs").exists());
  assert!(!env.context_path().join("ci/Dagger.SDK/bin").exists());
}

#[tokio::test]
async fn stale_sdk_files_in_the_context_are_kept() {
  let env = TestEnv::new();
  env.write_file("context/ci/Dagger.SDK/obj/stale.assets.json", "{\"old\":true}");
  env.write_file("context/ci/Dagger.SDK/Removed.cs", "// gone upstream\n");

  let code = env
    .driver()
    .codegen(&env.source("hello world", "ci"), &env.schema_path())
    .await
    .unwrap();

  assert_eq!(
    code.tree.read_to_string("ci/Dagger.SDK/obj/stale.assets.json").unwrap(),
    "{\"old\":true}"
  );
  assert_eq!(
    code.tree.read_to_string("ci/Dagger.SDK/Removed.cs").unwrap(),
    "// gone upstream\n"
  );
  assert!(code.classify("ci/Dagger.SDK/obj/stale.assets.json").ignored);
  let files = code.tree.files().unwrap();
  assert!(!files.contains(&"ci/Dagger.SDK/obj/project.assets.json".to_string()));
}
