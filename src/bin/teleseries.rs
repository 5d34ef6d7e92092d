//! Teleseries CLI
//!
//! Standalone shell around the write and read paths. In a deployment the
//! stream-processing host drives the dispatcher directly; this binary
//! replays a recorded batch file (one host record per line, JSON) against
//! the in-memory store so both paths can be exercised end to end.
//!
//! # Commands
//!
//! - `ingest <records.jsonl>` - run the write path over a batch file
//! - `report <records.jsonl>` - ingest, then print per-type summaries
//! - `check-config` - validate configuration and print the resolved values

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use teleseries::config::Config;
use teleseries::error::Result;
use teleseries::ingest::{Dispatcher, SinkRecord};
use teleseries::query::QueryExecutor;
use teleseries::registry::SensorRegistry;
use teleseries::store::MemoryStore;

#[derive(Parser)]
#[command(name = "teleseries", version, about = "Sensor telemetry sink and viewer")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the write path over a recorded batch file
    Ingest {
        /// Batch file with one host record per line
        records: PathBuf,
    },
    /// Ingest a batch file, then run the read path and print summaries
    Report {
        /// Batch file with one host record per line
        records: PathBuf,
        /// Override the configured window start (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,
        /// Override the configured window end (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
    },
    /// Validate the configuration file and print the resolved values
    CheckConfig,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::discover()?,
    };
    init_tracing(&config);

    match cli.command {
        Command::Ingest { records } => cmd_ingest(&records),
        Command::Report {
            records,
            start,
            end,
        } => cmd_report(&config, &records, start, end),
        Command::CheckConfig => cmd_check_config(&config),
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.monitoring.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Read a batch file, skipping lines that are not valid host records
fn load_records(path: &Path) -> Result<Vec<SinkRecord>> {
    let text = std::fs::read_to_string(path)?;
    let mut records = Vec::new();
    for (number, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<SinkRecord>(line) {
            Ok(record) => records.push(record),
            Err(err) => warn!(line = number + 1, error = %err, "skipping malformed record line"),
        }
    }
    info!(count = records.len(), path = %path.display(), "loaded batch file");
    Ok(records)
}

fn build_pipeline() -> (Arc<MemoryStore>, SensorRegistry) {
    let store = Arc::new(MemoryStore::new());
    let registry = SensorRegistry::new(store.clone());
    (store, registry)
}

fn cmd_ingest(records_path: &Path) -> Result<()> {
    let records = load_records(records_path)?;
    let (store, registry) = build_pipeline();
    let dispatcher = Dispatcher::new(store, registry);

    let report = dispatcher.process_batch(&records)?;
    println!("{report}");
    for skipped in &report.skipped {
        println!("  skipped #{}: {}", skipped.index, skipped.reason);
    }
    Ok(())
}

fn cmd_report(
    config: &Config,
    records_path: &Path,
    start: Option<String>,
    end: Option<String>,
) -> Result<()> {
    let mut query = config.query.clone();
    if start.is_some() {
        query.start = start;
    }
    if end.is_some() {
        query.end = end;
    }
    let window = query.window()?;

    let records = load_records(records_path)?;
    let (store, registry) = build_pipeline();
    let dispatcher = Dispatcher::new(store.clone(), registry.clone());
    let report = dispatcher.process_batch(&records)?;
    info!(%report, "ingestion complete");

    let executor = QueryExecutor::new(store, registry);
    for summary in executor.run(window)? {
        println!("{summary}");
    }
    Ok(())
}

fn cmd_check_config(config: &Config) -> Result<()> {
    config.validate()?;
    let window = config.query.window()?;
    println!(
        "configuration ok: cluster `{}` at {}:{}, window {:?}..{:?}",
        config.connection.cluster,
        config.connection.host,
        config.connection.port,
        window.start,
        window.end
    );
    Ok(())
}
