//! Shared utilities.
//!
//! Content hashing for environments and produced trees, plus test helpers.

pub mod hash;

#[cfg(test)]
pub mod testutil;
