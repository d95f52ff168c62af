//! HTML parsing infrastructure for listing extraction
//!
//! Field extractors locate one attribute each on a parsed listing page; the
//! listing parser runs them in a fixed order and applies the validation gate.

pub mod error;
pub mod config;
pub mod context;
pub mod characteristics;
pub mod city;
pub mod field_extractors;
pub mod listing_parser;
pub mod listing_index_parser;

// Re-export public types
pub use error::{FieldResult, NonValid, ParsingError, ParsingResult};
pub use config::ExtractionSelectors;
pub use context::{IndexParseContext, ListingParseContext};
pub use characteristics::{CharacteristicEntry, CharacteristicsLocator, CharacteristicsSection, ContainerLookup};
pub use city::{CityExtractor, CityStrategy};
pub use field_extractors::CharacteristicField;
pub use listing_parser::ListingParser;
pub use listing_index_parser::ListingIndexParser;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

/// Parser trait for documents that need provenance information
pub trait ContextualParser {
    type Output;
    type Context;

    /// Parse an already-built document with contextual information
    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output>;
}

/// Compile a selector string
pub fn compile_selector(selector_str: &str) -> ParsingResult<Selector> {
    Selector::parse(selector_str).map_err(|e| ParsingError::invalid_selector(selector_str, e))
}

/// Compile a selector list, skipping invalid entries as long as one survives
pub fn compile_selectors(field: &str, selector_strings: &[String]) -> ParsingResult<Vec<Selector>> {
    let mut selectors = Vec::new();
    let mut errors = Vec::new();

    for selector_str in selector_strings {
        match compile_selector(selector_str) {
            Ok(selector) => selectors.push(selector),
            Err(e) => {
                warn!("Failed to compile {} selector: {}", field, e);
                errors.push(e);
            }
        }
    }

    if selectors.is_empty() {
        return Err(errors.into_iter().next().unwrap_or_else(|| ParsingError::empty_selector_list(field)));
    }

    if !errors.is_empty() {
        debug!("{} of {} {} selectors failed to compile", errors.len(), selector_strings.len(), field);
    }

    Ok(selectors)
}

/// First element matched by any selector, trying selectors in order
pub(crate) fn select_first<'a>(html: &'a Html, selectors: &[Selector]) -> Option<ElementRef<'a>> {
    selectors.iter().find_map(|selector| html.select(selector).next())
}

/// Element text with whitespace runs collapsed to single spaces
pub(crate) fn collapsed_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_selectors_skips_invalid_entries() {
        let selectors = compile_selectors("price", &["p[".to_string(), "p.product-price".to_string()]).unwrap();
        assert_eq!(selectors.len(), 1);
    }

    #[test]
    fn test_compile_selectors_rejects_all_invalid() {
        let err = compile_selectors("price", &["p[".to_string()]).unwrap_err();
        assert!(matches!(err, ParsingError::InvalidSelector { .. }));

        let err = compile_selectors("price", &[]).unwrap_err();
        assert!(matches!(err, ParsingError::EmptySelectorList { .. }));
    }

    #[test]
    fn test_collapsed_text_joins_text_nodes() {
        let html = Html::parse_fragment("<h2>  12 Rue X,\n   <b>Le  Vauclin</b> </h2>");
        let h2 = html.select(&Selector::parse("h2").unwrap()).next().unwrap();
        assert_eq!(collapsed_text(h2), "12 Rue X, Le Vauclin");
    }
}
