//! Fail-fast packaging sequence
//!
//! The sequence is an ordered list of fallible steps; the first step that
//! fails aborts the remainder and its error becomes the run's outcome. No
//! retries, no recovery.

use std::env::consts::EXE_SUFFIX;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Product;
use crate::errors::PackageError;
use crate::steps::{BuildStep, CopyArtifact, PrepareDistDir, VerifyArtifact};
use crate::summary::PackagedArtifact;

/// Per-product run state shared by the steps
pub struct PackageContext {
    /// Project root the build runs in
    pub root: PathBuf,
    /// Distribution directory, already resolved against the root
    pub dist_dir: PathBuf,
    /// Product being packaged
    pub product: Product,
    /// Report planned work instead of performing it
    pub dry_run: bool,
}

impl PackageContext {
    /// Executable file name with the platform suffix applied
    pub fn artifact_file(&self) -> String {
        format!("{}{}", self.product.bin_name(), EXE_SUFFIX)
    }

    /// Release artifact produced by the toolchain
    pub fn source_path(&self) -> PathBuf {
        self.root
            .join("target")
            .join("release")
            .join(self.artifact_file())
    }

    /// Destination inside the distribution directory
    pub fn dest_path(&self) -> PathBuf {
        self.dist_dir.join(self.artifact_file())
    }
}

/// One fallible step of the packaging sequence
pub trait Step {
    /// Short identifier for diagnostics
    fn name(&self) -> &'static str;
    /// Perform the step, or fail the whole run
    fn run(&self, ctx: &PackageContext) -> Result<(), PackageError>;
}

/// Execute steps in declared order, stopping at the first failure
pub fn run_steps(steps: &[Box<dyn Step>], ctx: &PackageContext) -> Result<(), PackageError> {
    for step in steps {
        tracing::debug!(step = step.name(), product = %ctx.product.name, "running step");
        step.run(ctx)?;
    }
    Ok(())
}

/// Knobs shared by every product in a run
#[derive(Debug, Clone)]
pub struct PackageOptions {
    /// Build tool invoked as `<program> build --release ...`
    pub program: String,
    /// Pass `--locked` to the build
    pub locked: bool,
    /// Kill the build after this many seconds; `None` waits indefinitely
    pub timeout_seconds: Option<u64>,
    /// Report planned work instead of performing it
    pub dry_run: bool,
}

impl Default for PackageOptions {
    fn default() -> Self {
        Self {
            program: "cargo".to_string(),
            locked: false,
            timeout_seconds: None,
            dry_run: false,
        }
    }
}

/// Build one product and collect its binary into the distribution directory.
///
/// Returns the packaged artifact, or `None` for a dry run.
pub fn package_product(
    root: &Path,
    dist_dir: &Path,
    product: &Product,
    opts: &PackageOptions,
) -> Result<Option<PackagedArtifact>, PackageError> {
    let dist_dir = if dist_dir.is_absolute() {
        dist_dir.to_path_buf()
    } else {
        root.join(dist_dir)
    };
    let ctx = PackageContext {
        root: root.to_path_buf(),
        dist_dir,
        product: product.clone(),
        dry_run: opts.dry_run,
    };

    let steps: Vec<Box<dyn Step>> = vec![
        Box::new(BuildStep {
            program: opts.program.clone(),
            locked: opts.locked,
            timeout_seconds: opts.timeout_seconds,
        }),
        Box::new(PrepareDistDir),
        Box::new(CopyArtifact),
        Box::new(VerifyArtifact),
    ];
    run_steps(&steps, &ctx)?;

    if ctx.dry_run {
        return Ok(None);
    }

    let dest = ctx.dest_path();
    let meta = fs::metadata(&dest).map_err(|e| PackageError::Io {
        op: "stat",
        path: dest.clone(),
        source: e,
    })?;
    Ok(Some(PackagedArtifact {
        product: ctx.product.name.clone(),
        path: dest,
        size_bytes: meta.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn test_ctx() -> PackageContext {
        PackageContext {
            root: PathBuf::from("/project"),
            dist_dir: PathBuf::from("/project/bin"),
            product: Product::new("tradingbot"),
            dry_run: false,
        }
    }

    struct RecordingStep {
        label: &'static str,
        fail: bool,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Step for RecordingStep {
        fn name(&self) -> &'static str {
            self.label
        }

        fn run(&self, _ctx: &PackageContext) -> Result<(), PackageError> {
            self.log.lock().expect("log lock").push(self.label);
            if self.fail {
                return Err(PackageError::Config(format!("{} failed", self.label)));
            }
            Ok(())
        }
    }

    #[test]
    fn test_artifact_paths_use_platform_suffix() {
        let ctx = test_ctx();
        let expected = format!("tradingbot{}", EXE_SUFFIX);

        assert_eq!(ctx.artifact_file(), expected);
        assert_eq!(
            ctx.source_path(),
            PathBuf::from("/project").join("target").join("release").join(&expected)
        );
        assert_eq!(ctx.dest_path(), PathBuf::from("/project/bin").join(&expected));
    }

    #[test]
    fn test_steps_run_in_declared_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let steps: Vec<Box<dyn Step>> = vec![
            Box::new(RecordingStep { label: "first", fail: false, log: Arc::clone(&log) }),
            Box::new(RecordingStep { label: "second", fail: false, log: Arc::clone(&log) }),
            Box::new(RecordingStep { label: "third", fail: false, log: Arc::clone(&log) }),
        ];

        run_steps(&steps, &test_ctx()).expect("all steps succeed");

        assert_eq!(*log.lock().expect("log lock"), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_first_failure_short_circuits() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let steps: Vec<Box<dyn Step>> = vec![
            Box::new(RecordingStep { label: "build", fail: false, log: Arc::clone(&log) }),
            Box::new(RecordingStep { label: "copy", fail: true, log: Arc::clone(&log) }),
            Box::new(RecordingStep { label: "verify", fail: false, log: Arc::clone(&log) }),
        ];

        let err = run_steps(&steps, &test_ctx()).unwrap_err();

        assert!(err.to_string().contains("copy failed"));
        assert_eq!(*log.lock().expect("log lock"), vec!["build", "copy"]);
    }
}
