//! Core data types.

pub mod cache_key;
pub mod error;
pub mod platform;
pub mod request;

pub use cache_key::CacheKey;
pub use error::GorunError;
pub use platform::{exe_extension, ArchiveFormat, GoPlatform};
pub use request::{InstallRequest, PackageSpec};
