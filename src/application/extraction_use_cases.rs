//! Offline extraction of saved listing pages
//!
//! Each file is an independent document, so files are parsed in parallel and
//! reported back in input order.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::domain::ValidationOutcome;
use crate::infrastructure::parsing::ListingParser;

/// Result for one saved page
#[derive(Debug)]
pub struct ExtractedFile {
    pub path: PathBuf,
    /// Read errors; classification itself never fails
    pub outcome: Result<ValidationOutcome>,
}

fn extract_file(path: &Path, parser: &ListingParser) -> Result<ValidationOutcome> {
    let markup = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(parser.parse_document(&markup))
}

/// Classify saved listing pages in parallel, preserving input order
pub fn extract_files(paths: &[PathBuf], parser: &ListingParser) -> Vec<ExtractedFile> {
    let results: Vec<ExtractedFile> = paths
        .par_iter()
        .map(|path| ExtractedFile { path: path.clone(), outcome: extract_file(path, parser) })
        .collect();

    let accepted = results.iter().filter(|r| matches!(&r.outcome, Ok(o) if o.is_accepted())).count();
    for result in &results {
        match &result.outcome {
            Ok(ValidationOutcome::Rejected { reason }) => info!("{}: {}", result.path.display(), reason),
            Err(e) => warn!("{}: {:#}", result.path.display(), e),
            Ok(ValidationOutcome::Accepted(_)) => {}
        }
    }
    info!("Extracted {} files, {} accepted", results.len(), accepted);

    results
}
