// src/main.rs

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use tracing::info;

use surface_probe::core::models::Document;
use surface_probe::core::scanner::ScanPipeline;
use surface_probe::core::scanner::target_scanner::{documents_from_urls, expand_documents};
use surface_probe::core::storage::JsonLinesStore;
use surface_probe::{ScanConfig, logging};

/// Probe web endpoints and extract titles, links, forms, scripts and
/// subdomain-takeover signal.
#[derive(Debug, Parser)]
#[command(name = "surface-probe", version, about)]
struct Cli {
    /// File with one hostname per line (defaults to stdin).
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// JSON target list instead of hostnames: an array of documents or
    /// `{"urls": [...]}`.
    #[arg(long, conflicts_with = "input")]
    targets: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of concurrent workers (overrides the config file).
    #[arg(short, long)]
    workers: Option<usize>,

    /// Persist kept documents to this JSON-lines store.
    #[arg(short = 'o', long = "store")]
    store: Option<PathBuf>,

    /// Empty the store before writing.
    #[arg(long, requires = "store")]
    empty_store: bool,
}

/// Accepted shapes of a `--targets` file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TargetFile {
    Documents(Vec<Document>),
    Urls { urls: Vec<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let log_path = logging::initialize_logging()?;
    info!(log = %log_path.display(), "Logging initialized.");

    let mut config = ScanConfig::load(cli.config.as_deref())?;
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    config.validate()?;

    let candidates = load_candidates(&cli, &config)?;
    let pipeline = ScanPipeline::from_config(&config).wrap_err("Failed to build HTTP client")?;

    let report = match &cli.store {
        Some(path) => {
            let store = JsonLinesStore::open(path).await?;
            if cli.empty_store {
                store.truncate().await?;
            }
            pipeline.scan_and_store(candidates, &store).await?
        }
        None => pipeline.run(candidates).await,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &report.documents).wrap_err("Failed to write results")?;
    writeln!(out)?;
    Ok(())
}

/// Builds the candidate set from `--targets` or from hostnames.
fn load_candidates(cli: &Cli, config: &ScanConfig) -> Result<Vec<Document>> {
    if let Some(path) = &cli.targets {
        let file = File::open(path).wrap_err_with(|| format!("Failed to open {}", path.display()))?;
        let parsed: TargetFile = serde_json::from_reader(BufReader::new(file))
            .wrap_err_with(|| format!("Invalid target list {}", path.display()))?;
        let docs = match parsed {
            TargetFile::Documents(docs) => docs,
            TargetFile::Urls { urls } => documents_from_urls(urls),
        };
        return Ok(expand_documents(docs));
    }

    let expander = config.expander();
    match &cli.input {
        Some(path) => {
            let file = File::open(path).wrap_err_with(|| format!("Failed to open {}", path.display()))?;
            Ok(expander.expand_reader(BufReader::new(file)))
        }
        None => Ok(expander.expand_reader(io::stdin().lock())),
    }
}
