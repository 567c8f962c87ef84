//! tb-packager - release build and packaging for the tradingbot binaries
//!
//! Replaces the per-product, per-platform build launcher scripts with one
//! configurable sequence: release build, prepare the distribution
//! directory, copy the artifact, verify the copy. The sequence is fail-fast
//! throughout; the first failing step aborts the run with a non-zero exit.

pub mod config;
pub mod errors;
pub mod pipeline;
pub mod steps;
pub mod summary;

pub use config::{PackagerConfig, Product};
pub use errors::PackageError;
pub use pipeline::{PackageOptions, package_product};
pub use summary::PackagedArtifact;
