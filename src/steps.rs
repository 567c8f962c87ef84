//! Concrete packaging steps

use std::fs;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};
use std::time::{Duration, Instant};

use colored::Colorize;

use crate::errors::PackageError;
use crate::pipeline::{PackageContext, Step};

/// Release build invocation
pub struct BuildStep {
    /// Build tool, `cargo` outside of tests
    pub program: String,
    /// Pass `--locked` to the build
    pub locked: bool,
    /// Kill the build after this many seconds; `None` waits indefinitely
    pub timeout_seconds: Option<u64>,
}

impl BuildStep {
    fn command(&self, ctx: &PackageContext) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["build", "--release"]);
        if self.locked {
            cmd.arg("--locked");
        }
        if let Some(package) = &ctx.product.package {
            cmd.args(["-p", package]);
        }
        cmd.current_dir(&ctx.root);
        cmd
    }
}

impl Step for BuildStep {
    fn name(&self) -> &'static str {
        "build"
    }

    fn run(&self, ctx: &PackageContext) -> Result<(), PackageError> {
        println!(
            "{}",
            format!("🔨 Building {} (release)...", ctx.product.name).bold()
        );

        let mut cmd = self.command(ctx);
        if ctx.dry_run {
            println!("  {} would run: {}", "→".cyan(), render_command(&cmd));
            return Ok(());
        }

        // Stdio is inherited so compiler output streams to the operator.
        let status = match self.timeout_seconds {
            None => cmd.status().map_err(|e| PackageError::Io {
                op: "spawn",
                path: PathBuf::from(&self.program),
                source: e,
            })?,
            Some(seconds) => wait_with_timeout(&mut cmd, seconds, &ctx.product.name)?,
        };

        if !status.success() {
            return Err(PackageError::BuildFailed {
                product: ctx.product.name.clone(),
                status,
            });
        }
        tracing::info!(product = %ctx.product.name, "release build succeeded");
        Ok(())
    }
}

fn wait_with_timeout(
    cmd: &mut Command,
    seconds: u64,
    product: &str,
) -> Result<ExitStatus, PackageError> {
    let timeout = Duration::from_secs(seconds);
    let start = Instant::now();

    let mut child = cmd.spawn().map_err(|e| PackageError::Io {
        op: "spawn",
        path: PathBuf::from(cmd.get_program()),
        source: e,
    })?;

    loop {
        let polled = child.try_wait().map_err(|e| PackageError::Io {
            op: "wait for",
            path: PathBuf::from(cmd.get_program()),
            source: e,
        })?;
        match polled {
            Some(status) => return Ok(status),
            None => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(PackageError::BuildTimeout {
                        product: product.to_string(),
                        seconds,
                    });
                }
                std::thread::sleep(Duration::from_millis(100));
            }
        }
    }
}

fn render_command(cmd: &Command) -> String {
    let mut rendered = cmd.get_program().to_string_lossy().into_owned();
    for arg in cmd.get_args() {
        rendered.push(' ');
        rendered.push_str(&arg.to_string_lossy());
    }
    rendered
}

/// Distribution directory creation; a pre-existing directory is fine
pub struct PrepareDistDir;

impl Step for PrepareDistDir {
    fn name(&self) -> &'static str {
        "dist-dir"
    }

    fn run(&self, ctx: &PackageContext) -> Result<(), PackageError> {
        if ctx.dry_run {
            println!(
                "  {} would create {} if missing",
                "→".cyan(),
                ctx.dist_dir.display()
            );
            return Ok(());
        }
        fs::create_dir_all(&ctx.dist_dir).map_err(|e| PackageError::Io {
            op: "create",
            path: ctx.dist_dir.clone(),
            source: e,
        })
    }
}

/// Copy of the release artifact into the distribution directory,
/// overwriting any prior copy
pub struct CopyArtifact;

impl Step for CopyArtifact {
    fn name(&self) -> &'static str {
        "copy"
    }

    fn run(&self, ctx: &PackageContext) -> Result<(), PackageError> {
        let src = ctx.source_path();
        let dest = ctx.dest_path();

        if ctx.dry_run {
            println!(
                "  {} would copy {} to {}",
                "→".cyan(),
                src.display(),
                dest.display()
            );
            return Ok(());
        }

        if !src.is_file() {
            return Err(PackageError::ArtifactMissing { path: src });
        }
        fs::copy(&src, &dest).map_err(|e| PackageError::Io {
            op: "copy to",
            path: dest.clone(),
            source: e,
        })?;
        tracing::debug!(src = %src.display(), dest = %dest.display(), "artifact copied");
        Ok(())
    }
}

/// Post-copy check that the destination exists and matches the source length
pub struct VerifyArtifact;

impl Step for VerifyArtifact {
    fn name(&self) -> &'static str {
        "verify"
    }

    fn run(&self, ctx: &PackageContext) -> Result<(), PackageError> {
        if ctx.dry_run {
            return Ok(());
        }

        let src = ctx.source_path();
        let dest = ctx.dest_path();

        let src_len = fs::metadata(&src).map_err(|e| PackageError::Io {
            op: "stat",
            path: src.clone(),
            source: e,
        })?.len();
        let dest_len = match fs::metadata(&dest) {
            Ok(meta) => meta.len(),
            Err(_) => return Err(PackageError::ArtifactMismatch { src, dest }),
        };
        if src_len != dest_len {
            return Err(PackageError::ArtifactMismatch { src, dest });
        }

        println!(
            "{}",
            format!("✅ {} updated ({dest_len} bytes)", dest.display()).green()
        );
        Ok(())
    }
}
