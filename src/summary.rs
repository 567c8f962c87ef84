//! End-of-run summary output

use std::path::PathBuf;

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;

/// Summary format selected on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

/// One binary collected into the distribution directory
#[derive(Debug, Serialize)]
pub struct PackagedArtifact {
    /// Product the binary belongs to
    pub product: String,
    /// Final artifact path
    pub path: PathBuf,
    /// Artifact length on disk
    pub size_bytes: u64,
}

#[derive(Serialize)]
struct SummaryReport<'a> {
    packaged: &'a [PackagedArtifact],
    count: usize,
}

/// Print the end-of-run summary in the selected format
pub fn print_summary(artifacts: &[PackagedArtifact], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Human => {
            println!("\n{}", "═══ Packaging Summary ═══".bold());
            for artifact in artifacts {
                println!(
                    "  {} {} {} {} ({} bytes)",
                    "✓".green(),
                    artifact.product.bold(),
                    "→".cyan(),
                    artifact.path.display(),
                    artifact.size_bytes
                );
            }
            println!(
                "\n{}",
                format!("✅ {} binaries updated", artifacts.len()).green().bold()
            );
        }
        OutputFormat::Json => {
            let report = SummaryReport {
                packaged: artifacts,
                count: artifacts.len(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
