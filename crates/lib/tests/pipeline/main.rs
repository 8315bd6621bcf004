//! End-to-end pipeline tests.
//!
//! Every test builds a real tree with the local substrate. Most use the
//! manifest toolchain; the `dotnet` ones put a recording stand-in on `PATH`,
//! so no .NET SDK is needed on the host.

mod codegen_tests;
mod common;
mod rerun_tests;
mod runtime_tests;
