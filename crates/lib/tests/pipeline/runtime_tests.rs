//! Runnable environments and failure attribution.

use csmod_lib::pipeline::{Stage, StageError};
use csmod_lib::sdk::SdkError;
use csmod_lib::substrate::SubstrateError;

use super::common::TestEnv;

#[tokio::test]
async fn entrypoint_runs_module_project() {
  let env = TestEnv::new();
  let exe = env
    .driver()
    .module_runtime(&env.source("hello world", "ci"), &env.schema_path())
    .await
    .unwrap();

  assert_eq!(exe.entrypoint(), ["dotnet", "run", "--project", "/src/ci/HelloWorld"]);
  assert_eq!(exe.env.workdir(), "/src/ci");
  assert!(exe.env.is_member("HelloWorld"));
}

#[tokio::test]
async fn entrypoint_at_context_root() {
  let env = TestEnv::new();
  let exe = env
    .driver()
    .module_runtime(&env.source("hello world", ""), &env.schema_path())
    .await
    .unwrap();

  assert_eq!(exe.entrypoint()[3], "/src/HelloWorld");
}

#[tokio::test]
async fn normalization_is_deterministic() {
  let env = TestEnv::new();
  let driver = env.driver();

  let mut projects = Vec::new();
  for name in ["my-module", "My_Module", "my module", "my.module"] {
    let exe = driver.module_runtime(&env.source(name, "ci"), &env.schema_path()).await.unwrap();
    assert_eq!(exe.module.identifier, "MyModule");
    projects.push(exe.entrypoint()[3].clone());
  }
  projects.dedup();
  assert_eq!(projects, vec!["/src/ci/MyModule"]);
}

#[tokio::test]
#[cfg(unix)]
async fn realized_environment_holds_module_sources() {
  let env = TestEnv::new();
  let driver = env.driver();
  let exe = driver
    .module_runtime(&env.source("hello world", "ci"), &env.schema_path())
    .await
    .unwrap();

  let cat_program = exe.env.with_entrypoint(["/bin/cat", "/src/ci/HelloWorld/Program.cs"]);
  let status = driver.substrate().run(&cat_program).await.unwrap();
  assert!(status.success());
}

#[tokio::test]
async fn invalid_name_fails_in_base_stage() {
  let env = TestEnv::new();
  let err = env
    .driver()
    .module_runtime(&env.source("123", "ci"), &env.schema_path())
    .await
    .unwrap_err();

  assert_eq!(err.stage, Stage::Base);
  assert!(matches!(err.source, StageError::Module(_)));
}

#[tokio::test]
async fn missing_context_fails_in_base_stage() {
  let env = TestEnv::new();
  let source = csmod_lib::module::ModuleSource::new(env.temp.path().join("nowhere"), "hello world", "");
  let err = env.driver().codegen(&source, &env.schema_path()).await.unwrap_err();

  assert_eq!(err.stage, Stage::Base);
  assert!(matches!(err.source, StageError::Substrate(SubstrateError::MountSource { .. })));
}

#[tokio::test]
async fn missing_sdk_component_fails_in_sdk_stage() {
  let env = TestEnv::new();
  std::fs::remove_dir_all(env.sdk_path().join("Dagger.SDK.Mod.SourceGenerator")).unwrap();

  let err = env
    .driver()
    .codegen(&env.source("hello world", "ci"), &env.schema_path())
    .await
    .unwrap_err();

  assert_eq!(err.stage, Stage::Sdk);
  assert!(matches!(err.source, StageError::Sdk(SdkError::MissingComponent { .. })));
}

#[tokio::test]
async fn missing_schema_fails_in_introspection_stage() {
  let env = TestEnv::new();
  let err = env
    .driver()
    .codegen(&env.source("hello world", "ci"), &env.temp.path().join("missing.json"))
    .await
    .unwrap_err();

  assert_eq!(err.stage, Stage::Introspection);
  assert!(err.to_string().contains("introspection stage failed"));
}
