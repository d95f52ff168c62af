//! Listing index parser
//!
//! Extracts listing detail URLs from one index page of the listing site.

use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::{debug, warn};
use url::Url;

use super::config::ExtractionSelectors;
use super::context::IndexParseContext;
use super::error::{ParsingError, ParsingResult};
use super::{compile_selectors, ContextualParser};

/// Parser for extracting listing links from index pages
pub struct ListingIndexParser {
    link_selectors: Vec<Selector>,
}

impl ListingIndexParser {
    /// Create a new index parser with default selectors
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&ExtractionSelectors::default())
    }

    /// Create parser with custom selector configuration
    pub fn with_config(selectors: &ExtractionSelectors) -> ParsingResult<Self> {
        Ok(Self {
            link_selectors: compile_selectors("listing_link", &selectors.listing_link)?,
        })
    }

    /// Resolve a link against the base URL
    fn resolve_url(href: &str, base: &Url) -> ParsingResult<String> {
        base.join(href)
            .map(String::from)
            .map_err(|e| ParsingError::UrlResolutionFailed {
                url: href.to_string(),
                reason: format!("Failed to join URL: {e}"),
                base_url: Some(base.to_string()),
            })
    }
}

impl ContextualParser for ListingIndexParser {
    type Output = Vec<String>;
    type Context = IndexParseContext;

    /// Listing URLs in first-occurrence order, duplicates removed
    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output> {
        let base = Url::parse(&context.base_url).map_err(|e| ParsingError::UrlResolutionFailed {
            url: context.base_url.clone(),
            reason: format!("Invalid base URL: {e}"),
            base_url: None,
        })?;

        let mut seen = HashSet::new();
        let mut urls = Vec::new();

        for selector in &self.link_selectors {
            for link in html.select(selector) {
                let Some(href) = link.value().attr("href") else {
                    continue;
                };
                match Self::resolve_url(href, &base) {
                    Ok(url) => {
                        if seen.insert(url.clone()) {
                            urls.push(url);
                        }
                    }
                    Err(e) => warn!("Skipping listing link on page {}: {}", context.page, e),
                }
            }
        }

        debug!("Found {} listing links on page {}", urls.len(), context.page);
        Ok(urls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX_PAGE: &str = r#"
        <div class="results">
            <h3 class="mt-0"><a href="/annonce-maison-paris-1">Maison</a></h3>
            <h3 class="mt-0"><a href="/annonce-appartement-vincennes-2">Appartement</a></h3>
            <h3 class="mt-0"><a href="/annonce-maison-paris-1">Maison (doublon)</a></h3>
            <h3 class="mt-0"><a href="/agence/contact">Contact</a></h3>
            <h3><a href="/annonce-hors-liste-3">Sans classe</a></h3>
        </div>
    "#;

    #[test]
    fn test_parser_creation() {
        assert!(ListingIndexParser::new().is_ok());
    }

    #[test]
    fn test_extracts_unique_listing_links() {
        let parser = ListingIndexParser::new().unwrap();
        let html = Html::parse_document(INDEX_PAGE);
        let context = IndexParseContext::new(1, "https://www.immo-entre-particuliers.com");

        let urls = parser.parse_with_context(&html, &context).unwrap();
        assert_eq!(urls, vec![
            "https://www.immo-entre-particuliers.com/annonce-maison-paris-1".to_string(),
            "https://www.immo-entre-particuliers.com/annonce-appartement-vincennes-2".to_string(),
        ]);
    }

    #[test]
    fn test_empty_page_yields_no_links() {
        let parser = ListingIndexParser::new().unwrap();
        let html = Html::parse_document("<p>Aucune annonce</p>");
        let context = IndexParseContext::new(7, "https://www.immo-entre-particuliers.com");
        assert!(parser.parse_with_context(&html, &context).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_base_url() {
        let parser = ListingIndexParser::new().unwrap();
        let html = Html::parse_document(INDEX_PAGE);
        let context = IndexParseContext::new(1, "not a url");
        assert!(matches!(
            parser.parse_with_context(&html, &context),
            Err(ParsingError::UrlResolutionFailed { .. })
        ));
    }
}
