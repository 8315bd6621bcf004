//! Bundled template text.

/// Program entry file.
pub const PROGRAM_TEMPLATE: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/Program.cs"));

/// Module-root class file.
pub const MAIN_MODULE_TEMPLATE: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/MainModule.cs"));
