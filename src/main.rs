//! Release packager CLI for the tradingbot product family

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use tb_packager::config::PackagerConfig;
use tb_packager::pipeline::{PackageOptions, package_product};
use tb_packager::summary::{self, OutputFormat};

#[derive(Parser, Debug)]
#[command(name = "tb-packager")]
#[command(about = "Builds the release binaries and collects them under bin/", long_about = None)]
struct Cli {
    /// Products to package (defaults to every configured product)
    products: Vec<String>,

    /// Project root containing the Cargo project to build
    #[arg(long, default_value = ".")]
    path: PathBuf,

    /// Distribution directory (overrides packager.toml)
    #[arg(long)]
    dist_dir: Option<PathBuf>,

    /// Pass --locked to cargo
    #[arg(long, default_value_t = false)]
    locked: bool,

    /// Kill the build after this many seconds
    #[arg(long)]
    timeout_seconds: Option<u64>,

    /// Show the plan without building or copying
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// List configured products and exit
    #[arg(long, default_value_t = false)]
    list: bool,

    /// Summary output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    format: OutputFormat,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{}", format!("❌ {e:#}").red().bold());
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let root = cli.path.canonicalize().unwrap_or_else(|_| cli.path.clone());
    let config = PackagerConfig::load(&root)?;

    if cli.list {
        list_products(&config);
        return Ok(());
    }

    let products = config.select(&cli.products)?;
    let dist_dir = cli.dist_dir.clone().unwrap_or(config.dist_dir);

    println!("{}", "📦 tradingbot Release Packager".bold());
    println!("{}", "=".repeat(40));
    if cli.dry_run {
        println!("{}", "Dry run: nothing will be built or copied".yellow());
    }

    let opts = PackageOptions {
        program: "cargo".to_string(),
        locked: cli.locked || config.locked,
        timeout_seconds: cli.timeout_seconds,
        dry_run: cli.dry_run,
    };

    let mut artifacts = Vec::new();
    for product in &products {
        let packaged = package_product(&root, &dist_dir, product, &opts)
            .with_context(|| format!("packaging {}", product.name))?;
        if let Some(artifact) = packaged {
            artifacts.push(artifact);
        }
    }

    if !cli.dry_run {
        summary::print_summary(&artifacts, cli.format)?;
    }
    Ok(())
}

fn list_products(config: &PackagerConfig) {
    println!("{}", "Configured products:".bold());
    for product in &config.products {
        let mut line = format!("  {}", product.name);
        if product.bin.is_some() {
            line.push_str(&format!("  (bin: {})", product.bin_name()));
        }
        if let Some(package) = &product.package {
            line.push_str(&format!("  (package: {package})"));
        }
        println!("{line}");
    }
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();
}
