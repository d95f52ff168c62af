//! Parsing context for listing and index pages
//!
//! Provenance carried alongside a parsed document, used only for logging.

/// Context information for a listing detail page
#[derive(Debug, Clone, Default)]
pub struct ListingParseContext {
    /// Listing URL (or file path for offline extraction)
    pub source: String,

    /// Index page where this listing was found
    pub source_page: Option<u32>,

    /// Position within the index page
    pub index_in_page: Option<usize>,
}

impl ListingParseContext {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            source_page: None,
            index_in_page: None,
        }
    }

    /// Set index page provenance
    pub fn with_source(mut self, page: u32, index: usize) -> Self {
        self.source_page = Some(page);
        self.index_in_page = Some(index);
        self
    }
}

/// Context information for an index page
#[derive(Debug, Clone)]
pub struct IndexParseContext {
    /// Index page number (1-based)
    pub page: u32,

    /// Base URL for resolving relative links
    pub base_url: String,
}

impl IndexParseContext {
    pub fn new(page: u32, base_url: impl Into<String>) -> Self {
        Self {
            page,
            base_url: base_url.into(),
        }
    }
}
