//! Crawling use cases
//!
//! Walks the region index page by page, fetches every listing it links to,
//! classifies each one and streams accepted records to CSV.

use anyhow::Result;
use scraper::Html;
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::domain::constants::record::PLACEHOLDER;
use crate::domain::constants::site::PAGE_NUMBERING_BASE;
use crate::domain::{ListingRecord, ValidationOutcome};
use crate::infrastructure::config::{AppConfig, CrawlingConfig};
use crate::infrastructure::csv_export::CsvExporter;
use crate::infrastructure::parsing::{
    ContextualParser, IndexParseContext, ListingIndexParser, ListingParseContext, ListingParser,
};
use crate::infrastructure::simple_http_client::PageFetcher;

/// Why the page loop ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StopReason {
    /// An index page listed no listings
    EmptyPage { page: u32 },
    /// The configured page limit was reached
    PageLimit { pages: u32 },
    /// An index page could not be fetched or read
    IndexFailed { page: u32, error: String },
}

/// Summary of one crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlReport {
    pub pages_visited: u32,
    pub listings_found: usize,
    pub accepted: usize,
    pub rejected: usize,
    /// Listings that could not be fetched
    pub failed: usize,
    /// Placeholder cells per column, in column order
    pub placeholder_counts: [usize; 8],
    pub stop_reason: Option<StopReason>,
}

impl Default for CrawlReport {
    fn default() -> Self {
        Self {
            pages_visited: 0,
            listings_found: 0,
            accepted: 0,
            rejected: 0,
            failed: 0,
            placeholder_counts: [0; 8],
            stop_reason: None,
        }
    }
}

impl CrawlReport {
    pub fn record_accepted(&mut self, record: &ListingRecord) {
        self.accepted += 1;
        for (count, value) in self.placeholder_counts.iter_mut().zip(record.values()) {
            if value == PLACEHOLDER {
                *count += 1;
            }
        }
    }

    /// Placeholder count for a column name such as `"DPE"`
    pub fn placeholders_in(&self, column: &str) -> Option<usize> {
        ListingRecord::COLUMNS
            .iter()
            .position(|c| *c == column)
            .map(|i| self.placeholder_counts[i])
    }
}

/// Page-by-page crawler over one region index
pub struct ListingCrawler {
    fetcher: Arc<dyn PageFetcher>,
    index_parser: ListingIndexParser,
    listing_parser: ListingParser,
    config: CrawlingConfig,
}

impl ListingCrawler {
    /// Build parsers from the configured selectors
    pub fn new(fetcher: Arc<dyn PageFetcher>, app_config: &AppConfig) -> Result<Self> {
        Ok(Self::with_parsers(
            fetcher,
            ListingIndexParser::with_config(&app_config.selectors)?,
            ListingParser::with_config(&app_config.selectors)?,
            app_config.crawling.clone(),
        ))
    }

    pub fn with_parsers(
        fetcher: Arc<dyn PageFetcher>,
        index_parser: ListingIndexParser,
        listing_parser: ListingParser,
        config: CrawlingConfig,
    ) -> Self {
        Self { fetcher, index_parser, listing_parser, config }
    }

    /// Crawl until an empty index page or the page limit, writing accepted rows
    pub async fn run<W: Write>(&self, exporter: &mut CsvExporter<W>) -> Result<CrawlReport> {
        let mut report = CrawlReport::default();
        let mut page = PAGE_NUMBERING_BASE;

        loop {
            if let Some(max_pages) = self.config.max_pages {
                if report.pages_visited >= max_pages {
                    report.stop_reason = Some(StopReason::PageLimit { pages: max_pages });
                    break;
                }
            }

            let links = match self.collect_page_links(page).await {
                Ok(links) => links,
                Err(e) => {
                    error!("Index page {} failed: {}", page, e);
                    report.stop_reason = Some(StopReason::IndexFailed { page, error: e.to_string() });
                    break;
                }
            };
            report.pages_visited += 1;
            info!("Page {}: {} listings found", page, links.len());

            if links.is_empty() {
                report.stop_reason = Some(StopReason::EmptyPage { page });
                break;
            }
            report.listings_found += links.len();

            for (index, url) in links.iter().enumerate() {
                match self.process_listing(url, page, index).await {
                    Ok(ValidationOutcome::Accepted(record)) => {
                        exporter.write_record(&record)?;
                        report.record_accepted(&record);
                    }
                    Ok(ValidationOutcome::Rejected { .. }) => report.rejected += 1,
                    Err(e) => {
                        warn!("Listing failed: {} ({})", url, e);
                        report.failed += 1;
                    }
                }
                self.pause(self.config.listing_delay_ms).await;
            }

            page += 1;
            self.pause(self.config.page_delay_ms).await;
        }

        info!(
            "Crawl finished: {} pages, {} accepted, {} rejected, {} failed",
            report.pages_visited, report.accepted, report.rejected, report.failed
        );
        Ok(report)
    }

    /// Listing URLs of one index page
    pub async fn collect_page_links(&self, page: u32) -> Result<Vec<String>> {
        let url = self.config.index_page_url(page);
        let markup = self.fetcher.fetch_html(&url).await?;

        let context = IndexParseContext::new(page, &self.config.base_url);
        let links = self.index_parser.parse_with_context(&Html::parse_document(&markup), &context)?;
        Ok(links)
    }

    /// Fetch and classify one listing
    pub async fn process_listing(&self, url: &str, page: u32, index: usize) -> Result<ValidationOutcome> {
        let markup = self.fetcher.fetch_html(url).await?;

        let context = ListingParseContext::new(url).with_source(page, index);
        let outcome = self.listing_parser.parse_with_context(&Html::parse_document(&markup), &context)?;
        Ok(outcome)
    }

    async fn pause(&self, base_ms: u64) {
        let jitter = if self.config.jitter_ms > 0 { fastrand::u64(0..=self.config.jitter_ms) } else { 0 };
        let total = base_ms + jitter;
        if total > 0 {
            tokio::time::sleep(Duration::from_millis(total)).await;
        }
    }
}
