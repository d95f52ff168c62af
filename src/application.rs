//! Application layer module
//!
//! Use cases that drive the extraction core: the live crawl and the offline
//! extraction of saved pages.

pub mod crawling_use_cases;
pub mod extraction_use_cases;

pub use crawling_use_cases::{CrawlReport, ListingCrawler, StopReason};
pub use extraction_use_cases::{extract_files, ExtractedFile};
