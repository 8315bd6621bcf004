//! Fixed conventions shared by the pipeline stages.

pub const APP_NAME: &str = "csmod";

/// Pinned toolchain image every environment starts from.
pub const BASE_IMAGE: &str = "mcr.microsoft.com/dotnet/sdk:8.0-alpine3.20";

/// Absolute path the module's context tree is mounted at.
pub const MOUNT_ROOT: &str = "/src";

/// Target framework moniker matching the base image's runtime.
pub const TARGET_FRAMEWORK: &str = "net8.0";

/// Source file extension for rendered entrypoints.
pub const SOURCE_EXT: &str = "cs";

/// Project file extension written by the manifest toolchain.
pub const PROJECT_EXT: &str = "csproj";

/// Public API component the schema artifact is written into.
pub const SDK_API_DIR: &str = "Dagger.SDK";

/// Code-generation extension referenced by every module project.
pub const SDK_MOD_DIR: &str = "Dagger.SDK.Mod.SourceGenerator";

/// Source generator library.
pub const SDK_GENERATOR_DIR: &str = "Dagger.SDK.SourceGenerator/Dagger.SDK.SourceGenerator";

/// File name of the schema artifact inside [`SDK_API_DIR`].
pub const INTROSPECTION_FILE: &str = "introspection.json";

/// Length of the truncated hash used for scratch directory names.
pub const OBJ_HASH_PREFIX_LEN: usize = 20;
