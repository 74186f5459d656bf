//! Data-driven rotation content and loaders.
//!
//! Configuration is supplied to the core as an immutable struct at catalogue
//! construction time; this crate turns TOML files into those structs:
//! - Rotation configuration (timing windows, priority choices, pair settings)
//! - Per-action energy cost tables
//!
//! The core itself never touches the filesystem.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, CostTableLoader, LoadResult};
