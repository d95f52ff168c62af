//! Command-line interface.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::{extract_files, ListingCrawler, StopReason};
use crate::domain::ValidationOutcome;
use crate::infrastructure::config::{AppConfig, ConfigManager};
use crate::infrastructure::csv_export::CsvExporter;
use crate::infrastructure::logging::{init_logging_with_config, log_system_info};
use crate::infrastructure::parsing::ListingParser;
use crate::infrastructure::simple_http_client::{HttpClient, HttpClientConfig};

/// Extract house and apartment listings into CSV.
#[derive(Parser)]
#[command(name = "immo-annonces")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Crawl the regional index and every listing it links to.
    Crawl {
        /// Configuration file (default: user config directory)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// CSV output file (default: from configuration)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Stop after this many index pages
        #[arg(long)]
        max_pages: Option<u32>,
    },
    /// Extract records from saved listing pages.
    Extract {
        /// Saved listing pages
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// CSV output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file (default: user config directory)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Run the CLI.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl { config, output, max_pages } => crawl_command(config.as_deref(), output, max_pages).await,
        Commands::Extract { files, output, config } => extract_command(&files, output.as_deref(), config.as_deref()).await,
    }
}

async fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let manager = match path {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    let config = manager.load_config().await?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn crawl_command(config_path: Option<&Path>, output: Option<PathBuf>, max_pages: Option<u32>) -> Result<()> {
    let mut config = load_config(config_path).await?;
    if let Some(output) = output {
        config.crawling.output_path = output;
    }
    if max_pages.is_some() {
        config.crawling.max_pages = max_pages;
        config.validate().context("Invalid --max-pages")?;
    }

    init_logging_with_config(config.logging.clone())?;
    log_system_info();

    let client = HttpClient::with_config(HttpClientConfig::from(&config.http))?;
    let crawler = ListingCrawler::new(Arc::new(client), &config)?;
    let mut exporter = CsvExporter::create(&config.crawling.output_path)?;

    let report = crawler.run(&mut exporter).await?;

    println!("Pages visited: {}", report.pages_visited);
    println!("Listings: {} found, {} accepted, {} rejected, {} failed",
        report.listings_found, report.accepted, report.rejected, report.failed);
    for (column, count) in crate::domain::ListingRecord::COLUMNS.iter().zip(report.placeholder_counts) {
        if count > 0 {
            println!("  {}: {} placeholder(s)", column, count);
        }
    }
    if let Some(StopReason::IndexFailed { page, error }) = &report.stop_reason {
        println!("Stopped on index page {}: {}", page, error);
    }
    println!("Saved to {}", config.crawling.output_path.display());

    Ok(())
}

async fn extract_command(files: &[PathBuf], output: Option<&Path>, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path).await?;

    // CSV goes to stdout when no file is given, so keep log lines off it
    let mut logging = config.logging.clone();
    if output.is_none() {
        logging.console_output = false;
        logging.file_output = true;
    }
    init_logging_with_config(logging)?;

    let parser = ListingParser::with_config(&config.selectors)?;
    let results = extract_files(files, &parser);

    let mut rejected = 0;
    let mut unreadable = 0;
    match output {
        Some(path) => {
            let mut exporter = CsvExporter::create(path)?;
            write_accepted(&mut exporter, &results, &mut rejected, &mut unreadable)?;
        }
        None => {
            let mut exporter = CsvExporter::new(std::io::stdout().lock())?;
            write_accepted(&mut exporter, &results, &mut rejected, &mut unreadable)?;
        }
    }

    eprintln!(
        "{} files: {} accepted, {} rejected, {} unreadable",
        results.len(),
        results.len() - rejected - unreadable,
        rejected,
        unreadable
    );
    Ok(())
}

fn write_accepted<W: Write>(
    exporter: &mut CsvExporter<W>,
    results: &[crate::application::ExtractedFile],
    rejected: &mut usize,
    unreadable: &mut usize,
) -> Result<()> {
    for result in results {
        match &result.outcome {
            Ok(ValidationOutcome::Accepted(record)) => exporter.write_record(record)?,
            Ok(ValidationOutcome::Rejected { reason }) => {
                *rejected += 1;
                eprintln!("{}: {}", result.path.display(), reason);
            }
            Err(e) => {
                *unreadable += 1;
                eprintln!("{}: {:#}", result.path.display(), e);
            }
        }
    }
    Ok(())
}
