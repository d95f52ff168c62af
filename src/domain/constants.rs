//! Site characteristics and domain constants
//!
//! Constants describing the listing site layout and the fixed shape of the
//! extracted dataset.

/// Listing site characteristics
pub mod site {
    /// Site base URL
    pub const BASE_URL: &str = "https://www.immo-entre-particuliers.com";

    /// Index path of the crawled region (page 1 has no page suffix)
    pub const REGION_PATH: &str = "/annonces/france-ile-de-france";

    /// Links to listing detail pages on an index page
    pub const LISTING_LINK_SELECTOR: &str = r#"h3.mt-0 a[href^="/annonce-"]"#;

    /// Index pages use 1-based numbering
    pub const PAGE_NUMBERING_BASE: u32 = 1;
}

/// Dataset shape and validation rules
pub mod record {
    /// CSV header, in the fixed column order of a listing record
    pub const CSV_HEADER: [&str; 8] = [
        "Ville",
        "Type",
        "Surface",
        "NbrPieces",
        "NbrChambres",
        "NbrSdb",
        "DPE",
        "Prix",
    ];

    /// Sentinel for "attribute absent, listing still valid"
    pub const PLACEHOLDER: &str = "-";

    /// City value when no location could be determined
    pub const UNKNOWN_CITY: &str = "Ville inconnue";

    /// Prefix applied by the assembler to every rejection reason
    pub const REJECTION_PREFIX: &str = "Annonce non conforme - ";

    /// Smallest accepted price (inclusive)
    pub const MIN_PRICE: u64 = 10_000;

    /// Currency symbol stripped from price texts
    pub const CURRENCY_SYMBOL: char = '€';

    /// Area unit stripped from surface values
    pub const AREA_UNIT: &str = "m²";

    /// Separator between address segments in location headings
    pub const ADDRESS_SEPARATOR: &str = ", ";
}

/// Bounds used when validating user configuration
pub mod validation {
    /// Maximum index pages per crawl
    pub const MAX_PAGE_RANGE: u32 = 500;

    /// Maximum politeness delay (milliseconds)
    pub const MAX_REQUEST_DELAY_MS: u64 = 60_000;
}
