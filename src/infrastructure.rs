//! Infrastructure layer: HTML extraction, page fetching, CSV output and the
//! ambient configuration and logging setup.

pub mod config;
pub mod csv_export;
pub mod logging;
pub mod parsing;
pub mod parsing_error;
pub mod simple_http_client;

// Re-export commonly used items
pub use config::{AppConfig, ConfigManager, CrawlingConfig, HttpConfig, LoggingConfig};
pub use csv_export::CsvExporter;
pub use logging::{get_log_directory, init_logging, init_logging_with_config};
pub use parsing::{
    ContextualParser, ExtractionSelectors, IndexParseContext, ListingIndexParser, ListingParseContext, ListingParser,
    ParsingError, ParsingResult,
};
pub use simple_http_client::{HttpClient, HttpClientConfig, PageFetcher};
