//! Packaging error types

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors raised by the packaging sequence
#[derive(Debug, Error)]
pub enum PackageError {
    /// Release build returned a non-zero status
    #[error("release build for `{product}` failed ({status})")]
    BuildFailed {
        /// Product whose build failed
        product: String,
        /// Exit status reported by the build tool
        status: ExitStatus,
    },

    /// Release build ran past the configured timeout
    #[error("release build for `{product}` timed out after {seconds}s")]
    BuildTimeout {
        /// Product whose build was killed
        product: String,
        /// Configured timeout
        seconds: u64,
    },

    /// Expected release artifact is not on disk after a successful build
    #[error("release artifact not found at {}", .path.display())]
    ArtifactMissing {
        /// Path that was expected to hold the compiled executable
        path: PathBuf,
    },

    /// Copied artifact is absent or differs in length from the source
    #[error("copied artifact {} does not match {}", .dest.display(), .src.display())]
    ArtifactMismatch {
        /// Release artifact the copy was taken from
        src: PathBuf,
        /// Destination inside the distribution directory
        dest: PathBuf,
    },

    /// Bad `packager.toml` or bad product selection
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem or process-spawn failure
    #[error("failed to {op} {}: {source}", .path.display())]
    Io {
        /// Operation that failed
        op: &'static str,
        /// Path involved in the failed operation
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
