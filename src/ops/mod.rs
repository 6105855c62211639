//! High-level operations.
//!
//! This module contains the implementation of what a gorun invocation does:
//! make sure the requested executable is cached, then run it.

pub mod gorun_install;
pub mod gorun_run;

pub use gorun_install::{cached_executable_path, ensure_installed};
pub use gorun_run::run;
