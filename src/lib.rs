//! immo-annonces - real-estate listing extraction
//!
//! Crawls a listing site's regional index, extracts one record per listing page,
//! rejects listings that fail the property-type and price rules, and writes the
//! accepted records as CSV.

// Module declarations
pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod cli;

pub use application::{extract_files, CrawlReport, ListingCrawler};
pub use domain::{FieldValue, ListingRecord, PropertyType, ValidationOutcome};
pub use infrastructure::{AppConfig, ListingParser};
