//! City extraction
//!
//! The location is read from a page heading rather than from the characteristics
//! table. Addresses are formatted `street, ..., city`, so the city is the segment
//! after the last `", "`. City is a soft field: extraction never rejects and falls
//! back to `Ville inconnue`.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::config::ExtractionSelectors;
use super::{collapsed_text, compile_selector, compile_selectors, ParsingResult};
use crate::domain::constants::record::{ADDRESS_SEPARATOR, UNKNOWN_CITY};

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// One markup pattern that may carry the listing location
pub enum CityStrategy {
    /// Location marker icon inside a heading
    MarkerIcon(Vec<Selector>),
    /// Location heading whose text may end with a postal code
    PostalCodeHeading(Vec<Selector>),
    /// First `h2` of the page, only when it looks like an address
    FirstHeading(Selector),
}

impl CityStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MarkerIcon(_) => "marker-icon",
            Self::PostalCodeHeading(_) => "postal-code-heading",
            Self::FirstHeading(_) => "first-heading",
        }
    }

    /// City found by this strategy, `None` when the pattern is absent or yields nothing
    pub fn locate(&self, html: &Html) -> Option<String> {
        let city = match self {
            Self::MarkerIcon(icons) => {
                let icon = super::select_first(html, icons)?;
                let text = collapsed_text(enclosing_heading(icon)?);
                last_segment(&text).to_string()
            }
            Self::PostalCodeHeading(headings) => {
                let text = collapsed_text(super::select_first(html, headings)?);
                last_segment(strip_postal_code(&text)?).to_string()
            }
            Self::FirstHeading(headings) => {
                let text = collapsed_text(html.select(headings).next()?);
                let (_, city) = text.rsplit_once(ADDRESS_SEPARATOR)?;
                city.trim().to_string()
            }
        };

        (!city.is_empty()).then_some(city)
    }
}

/// Nearest `h1`..`h6` ancestor of an element
fn enclosing_heading(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| HEADING_TAGS.contains(&ancestor.value().name()))
}

/// Segment after the last separator, or the whole text without one
fn last_segment(text: &str) -> &str {
    text.rsplit_once(ADDRESS_SEPARATOR).map_or(text, |(_, city)| city).trim()
}

/// Drop a trailing numeric token (`"..., Paris 75011"` -> `"..., Paris"`).
///
/// A text made of the postal code alone carries no city.
fn strip_postal_code(text: &str) -> Option<&str> {
    if !text.ends_with(|c: char| c.is_ascii_digit()) {
        return Some(text);
    }
    let (rest, _) = text.rsplit_once(' ')?;
    Some(rest.trim_end_matches(',').trim_end())
}

/// Ordered city strategies with the unknown-city fallback
pub struct CityExtractor {
    strategies: Vec<CityStrategy>,
}

impl CityExtractor {
    /// Marker icon first, then the postal-code heading variant, then the first heading
    pub fn with_config(selectors: &ExtractionSelectors) -> ParsingResult<Self> {
        Ok(Self::with_strategies(vec![
            CityStrategy::MarkerIcon(compile_selectors("location_icon", &selectors.location_icon)?),
            CityStrategy::PostalCodeHeading(compile_selectors("postal_code_heading", &selectors.postal_code_heading)?),
            CityStrategy::FirstHeading(compile_selector(&selectors.heading)?),
        ]))
    }

    pub fn with_strategies(strategies: Vec<CityStrategy>) -> Self {
        Self { strategies }
    }

    /// Total: always returns a non-empty city name
    pub fn extract(&self, html: &Html) -> String {
        for strategy in &self.strategies {
            if let Some(city) = strategy.locate(html) {
                debug!("Extracted city via {}: {}", strategy.name(), city);
                return city;
            }
        }

        debug!("No location found, using '{}'", UNKNOWN_CITY);
        UNKNOWN_CITY.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn extractor() -> CityExtractor {
        CityExtractor::with_config(&ExtractionSelectors::default()).unwrap()
    }

    #[test]
    fn test_marker_icon_heading() {
        let html = Html::parse_document(r#"
            <h1>Belle maison, vue mer</h1>
            <h4 class="location"><i class="fa fa-map-marker"></i> 12 Rue X, Le Vauclin</h4>
        "#);
        assert_eq!(extractor().extract(&html), "Le Vauclin");
    }

    #[test]
    fn test_marker_span_under_title() {
        let html = Html::parse_document(r#"
            <h1>Maison 5 pièces</h1>
            <h2><span class="fa-solid fa-location-dot"></span> 12 Rue X, Le Vauclin</h2>
        "#);
        assert_eq!(extractor().extract(&html), "Le Vauclin");
    }

    #[test]
    fn test_marker_icon_without_heading_falls_through() {
        let html = Html::parse_document(r#"
            <div><i class="fa-map-marker"></i> 3 Allée Y, Nantes</div>
            <h2>Appartement, Lyon</h2>
        "#);
        assert_eq!(extractor().extract(&html), "Lyon");
    }

    #[rstest]
    #[case("8 rue des Lilas, Vincennes 94300", "Vincennes")]
    #[case("Montreuil 93100", "Montreuil")]
    #[case("Boulevard Voltaire, Paris", "Paris")]
    #[case("Saint-Denis", "Saint-Denis")]
    fn test_postal_code_heading(#[case] heading: &str, #[case] expected: &str) {
        let html = Html::parse_document(&format!(r#"<h2 class="mt-0">{heading}</h2>"#));
        assert_eq!(extractor().extract(&html), expected);
    }

    #[test]
    fn test_postal_code_alone_is_not_a_city() {
        let html = Html::parse_document(r#"<h2 class="mt-0">75011</h2>"#);
        assert_eq!(extractor().extract(&html), UNKNOWN_CITY);
    }

    #[test]
    fn test_first_h2_skips_title() {
        let html = Html::parse_document("<h1>Superbe appartement, vue</h1><h2>Quartier, Vanves</h2>");
        assert_eq!(extractor().extract(&html), "Vanves");
    }

    #[test]
    fn test_first_heading_needs_separator() {
        let html = Html::parse_document("<h2>Superbe appartement</h2><h2>Quartier, Vanves</h2>");
        assert_eq!(extractor().extract(&html), UNKNOWN_CITY);
    }

    #[test]
    fn test_empty_heading_falls_back() {
        let html = Html::parse_document(r#"<h3><i class="fa-location-dot"></i> </h3>"#);
        assert_eq!(extractor().extract(&html), UNKNOWN_CITY);
    }

    #[test]
    fn test_no_location_markers() {
        let html = Html::parse_document("<div><p>Annonce sans adresse</p></div>");
        assert_eq!(extractor().extract(&html), "Ville inconnue");
    }

    proptest! {
        #[test]
        fn city_extraction_is_total(heading in "[a-zA-Z0-9 ,éè-]{0,40}", use_icon in any::<bool>()) {
            let icon = if use_icon { r#"<i class="fa-map-marker"></i>"# } else { "" };
            let html = Html::parse_document(&format!("<h2 class=\"mt-0\">{icon}{heading}</h2>"));
            let city = extractor().extract(&html);
            prop_assert!(!city.is_empty());
        }
    }
}
