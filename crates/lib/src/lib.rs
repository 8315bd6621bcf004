//! csmod-lib: build-environment construction for C# modules.
//!
//! Given a user's context tree, a versioned SDK checkout and a schema
//! artifact, the pipeline records every mutation needed to turn the tree
//! into a compilable project graph:
//! - `env`: the immutable, copy-on-write `BuildEnvironment`
//! - `pipeline`: the five stages that build it up
//! - `toolchain`: how solution and project files get edited
//! - `substrate`: what realizes an environment into real files
//! - `runtime`: the driver producing runnable environments and generated trees

pub mod config;
pub mod consts;
pub mod env;
pub mod ignore;
pub mod module;
pub mod pipeline;
pub mod platform;
pub mod runtime;
pub mod sdk;
pub mod substrate;
pub mod template;
pub mod toolchain;
pub mod util;
