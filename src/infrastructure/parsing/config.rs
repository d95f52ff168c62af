//! Parsing configuration for listing extraction
//!
//! Centralized CSS selectors for every markup pattern the extractors look for.
//! Each list is ordered: earlier selectors are preferred.

use serde::{Deserialize, Serialize};

use crate::domain::constants::site;

/// CSS selectors for listing detail pages and index pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSelectors {
    /// Classed characteristics container (first layout variant)
    pub characteristics_container: Vec<String>,

    /// Headings that may introduce the characteristics list (second layout variant)
    pub characteristics_heading: String,

    /// Text a heading must contain to introduce the characteristics list
    pub characteristics_heading_keyword: String,

    /// List element following the characteristics heading
    pub characteristics_list: String,

    /// One labelled entry inside the container
    pub entry: String,

    /// Label sub-element of an entry
    pub entry_label: String,

    /// Value sub-element of an entry
    pub entry_value: String,

    /// Price element
    pub price: Vec<String>,

    /// Location marker icons, matched by class whatever the tag
    pub location_icon: Vec<String>,

    /// Location headings that end with a postal code
    pub postal_code_heading: Vec<String>,

    /// Heading read by the first-heading city fallback
    pub heading: String,

    /// Links to listing pages on an index page
    pub listing_link: Vec<String>,
}

impl Default for ExtractionSelectors {
    fn default() -> Self {
        Self {
            characteristics_container: vec![
                "div.product-features ul.list-inline".to_string(),
            ],
            characteristics_heading: "h1, h2, h3, h4, h5, h6".to_string(),
            characteristics_heading_keyword: "Caractéristiques".to_string(),
            characteristics_list: "ul".to_string(),
            entry: "li".to_string(),
            entry_label: "span.text-muted".to_string(),
            entry_value: "span.fw-bold".to_string(),
            price: vec![
                "p.product-price".to_string(),
            ],
            location_icon: vec![
                ".fa-location-dot".to_string(),
                ".fa-map-marker".to_string(),
                ".fa-map-marker-alt".to_string(),
                ".bi-geo-alt".to_string(),
                "[data-icon='location']".to_string(),
            ],
            postal_code_heading: vec![
                "h2.mt-0".to_string(),
            ],
            heading: "h2".to_string(),
            listing_link: vec![
                site::LISTING_LINK_SELECTOR.to_string(),
            ],
        }
    }
}
