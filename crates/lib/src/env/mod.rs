//! The build environment value threaded through the pipeline.
//!
//! A [`BuildEnvironment`] records every mutation as an ordered [`Layer`]
//! instead of performing it. All `with_*` methods borrow the current value and
//! return a new one, so a stage can never observe or disturb the state another
//! invocation is building. Realizing the layers is the job of a
//! [`Substrate`](crate::substrate::Substrate).

mod path;
mod types;

pub use path::join_container_path;
pub use types::*;
