//! gorun - build and run Go programs without installing them
//!
//! This crate provides the library behind the `gorun` binary: a pinned,
//! self-provisioned Go toolchain, a per-user cache of built executables,
//! and the launcher that runs them.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Stub downloaders and builders for gorun unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests.
#[cfg(test)]
pub mod test_support;

pub use builder::{GoBuilder, PackageBuilder, Provisioner, Toolchain};
pub use crate::core::{GorunError, InstallRequest, PackageSpec};
pub use util::context::GlobalContext;
