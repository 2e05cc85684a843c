//! Partsbin - collection gap analysis and purchase planning
//!
//! Thin composition layer: picks the file store once at startup and hands
//! every command to the core planner.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use partsbin_core::analysis::{AssemblyRequest, PartTriad};
use partsbin_core::config::PartsbinConfig;
use partsbin_core::planner::Planner;
use partsbin_core::storage::{FileStore, KeyValueStore};
use partsbin_core::validator::{SchemaValidator, ValidationReport};

mod catalog_cli;
mod collection_cli;
mod output;

use catalog_cli::CatalogCommand;
use collection_cli::CollectionCommand;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "partsbin",
    about = "Track owned three-part products and plan the cheapest purchases to complete a build",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Set log level (overrides RUST_LOG)
    #[clap(long, global = true)]
    log_level: Option<LogLevel>,

    /// Configuration file (default: .partsbin/config.yml, then the global config)
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory for the catalog and collection documents
    #[clap(long, global = true)]
    storage_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a catalog database or a single product JSON file
    Validate {
        /// Path to the JSON file
        file: PathBuf,

        /// Output the report as JSON
        #[clap(long)]
        json: bool,
    },

    /// Inspect and edit the product catalog
    Catalog(CatalogCommand),

    /// Mark products as owned or not owned
    Collection(CollectionCommand),

    /// Show which parts are missing for the requested builds
    Gap {
        /// A build as PRIMARY/SECONDARY/TERTIARY; blank segments are ignored
        #[clap(long = "build", required = true)]
        builds: Vec<PartTriad>,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Recommend products to buy for the requested builds
    Plan {
        /// A build as PRIMARY/SECONDARY/TERTIARY; blank segments are ignored
        #[clap(long = "build", required = true)]
        builds: Vec<PartTriad>,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },
}

/// Configures logging from --log-level, falling back to RUST_LOG, then warn.
/// Logs go to stderr so stdout stays machine-readable.
fn initialize_tracing(log_level: Option<&LogLevel>) {
    let filter = match log_level {
        Some(level) => EnvFilter::new(level.to_filter_directive()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        command,
        log_level,
        config,
        storage_dir,
    } = Cli::parse();

    initialize_tracing(log_level.as_ref());

    let open = || open_planner(config.as_deref(), storage_dir.clone());

    match command {
        Command::Validate { file, json } => validate_command(&file, json),
        Command::Catalog(command) => command.execute(&mut open()?).await,
        Command::Collection(command) => command.execute(&mut open()?).await,
        Command::Gap { builds, json } => gap_command(&mut open()?, builds, json).await,
        Command::Plan { builds, json } => plan_command(&mut open()?, builds, json).await,
    }
}

/// Resolve configuration and build the planner over the file store
fn open_planner(config_path: Option<&Path>, storage_override: Option<PathBuf>) -> Result<Planner> {
    let project_root = std::env::current_dir().context("Failed to determine current directory")?;
    let global_dir = PartsbinConfig::global_config_dir();
    let config = PartsbinConfig::load(config_path, &project_root, global_dir.as_deref())?;

    let storage_dir = match storage_override {
        Some(dir) => dir,
        None => config.resolve_storage_dir()?,
    };
    debug!("Using storage directory {}", storage_dir.display());

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(storage_dir));
    Planner::from_config(store, &config).context("Failed to initialize planner")
}

fn validate_command(file: &Path, json: bool) -> Result<()> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;

    let validator = SchemaValidator::new();
    let report = if value.get("products").is_some() || value.get("metadata").is_some() {
        validator.validate_database(&value)?
    } else {
        validator.validate_product(&value)?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(file, &report);
    }

    if !report.is_acceptable() {
        bail!(
            "{} failed validation with {} error(s)",
            file.display(),
            report.error_count()
        );
    }
    Ok(())
}

fn print_report(file: &Path, report: &ValidationReport) {
    for issue in &report.errors {
        println!("  ❌ {issue}");
    }
    for issue in &report.warnings {
        println!("  ⚠️  {issue}");
    }
    if report.is_acceptable() {
        println!(
            "✅ {} is valid ({} warning(s))",
            file.display(),
            report.warning_count()
        );
    }
}

async fn gap_command(planner: &mut Planner, builds: Vec<PartTriad>, json: bool) -> Result<()> {
    let report = planner.gap(&AssemblyRequest::new(builds)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output::print_gap(&report);
    }
    Ok(())
}

async fn plan_command(planner: &mut Planner, builds: Vec<PartTriad>, json: bool) -> Result<()> {
    let result = planner.plan(&AssemblyRequest::new(builds)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        output::print_plan(&result);
    }
    Ok(())
}
