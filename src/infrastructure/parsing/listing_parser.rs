//! Listing parser: record assembly and validation gate
//!
//! Runs the field extractors in the fixed order City, PropertyType, Surface,
//! RoomCount, BedroomCount, BathroomCount, EnergyRating, Price. The first
//! rejection aborts the record; its reason surfaces with the
//! `Annonce non conforme - ` prefix.

use scraper::{Html, Selector};
use tracing::{debug, info};

use super::characteristics::{CharacteristicsLocator, CharacteristicsSection};
use super::city::CityExtractor;
use super::config::ExtractionSelectors;
use super::context::ListingParseContext;
use super::error::{FieldResult, ParsingResult};
use super::field_extractors::{self, CharacteristicField};
use super::{compile_selectors, ContextualParser};
use crate::domain::constants::record::REJECTION_PREFIX;
use crate::domain::{FieldValue, ListingRecord, Price, PropertyType, ValidationOutcome};

/// Extracts and validates one listing page.
///
/// Holds only compiled selectors, so one parser can be shared across threads;
/// each call works on its own document.
pub struct ListingParser {
    characteristics: CharacteristicsLocator,
    city: CityExtractor,
    price_selectors: Vec<Selector>,
}

impl ListingParser {
    /// Create a parser with the default selectors
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&ExtractionSelectors::default())
    }

    /// Create a parser with custom selector configuration
    pub fn with_config(selectors: &ExtractionSelectors) -> ParsingResult<Self> {
        Ok(Self {
            characteristics: CharacteristicsLocator::with_config(selectors)?,
            city: CityExtractor::with_config(selectors)?,
            price_selectors: compile_selectors("price", &selectors.price)?,
        })
    }

    /// Parse markup and classify the listing
    pub fn parse_document(&self, markup: &str) -> ValidationOutcome {
        self.assemble(&Html::parse_document(markup))
    }

    /// Classify an already-parsed listing page
    pub fn assemble(&self, html: &Html) -> ValidationOutcome {
        match self.try_assemble(html) {
            Ok(record) => ValidationOutcome::Accepted(record),
            Err(rejection) => ValidationOutcome::Rejected {
                reason: rejection.with_prefix(REJECTION_PREFIX).reason,
            },
        }
    }

    fn try_assemble(&self, html: &Html) -> FieldResult<ListingRecord> {
        let city = self.city.extract(html);

        let section = self.characteristics.locate(html);
        let section = section.as_ref();
        let property_type = field_extractors::extract_property_type(section)?;

        let surface = field_extractors::extract_optional(section, CharacteristicField::Surface);
        let room_count = field_extractors::extract_optional(section, CharacteristicField::RoomCount);
        let bedroom_count = field_extractors::extract_optional(section, CharacteristicField::BedroomCount);
        let bathroom_count = field_extractors::extract_optional(section, CharacteristicField::BathroomCount);
        let energy_rating = field_extractors::extract_optional(section, CharacteristicField::EnergyRating);

        let price = field_extractors::extract_price(html, &self.price_selectors)?;

        Ok(ListingRecord {
            city,
            property_type,
            surface,
            room_count,
            bedroom_count,
            bathroom_count,
            energy_rating,
            price,
        })
    }

    /// Locate the characteristics container
    pub fn characteristics(&self, html: &Html) -> Option<CharacteristicsSection> {
        self.characteristics.locate(html)
    }

    pub fn extract_city(&self, html: &Html) -> String {
        self.city.extract(html)
    }

    pub fn extract_property_type(&self, html: &Html) -> FieldResult<PropertyType> {
        field_extractors::extract_property_type(self.characteristics(html).as_ref())
    }

    /// Any optional characteristics field
    pub fn extract_field(&self, html: &Html, field: CharacteristicField) -> FieldValue {
        field_extractors::extract_optional(self.characteristics(html).as_ref(), field)
    }

    pub fn extract_price(&self, html: &Html) -> FieldResult<Price> {
        field_extractors::extract_price(html, &self.price_selectors)
    }
}

impl ContextualParser for ListingParser {
    type Output = ValidationOutcome;
    type Context = ListingParseContext;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output> {
        debug!("Parsing listing from: {}", context.source);

        let outcome = self.assemble(html);
        match &outcome {
            ValidationOutcome::Accepted(record) => info!("Listing accepted: {} -> {}", context.source, record.to_row()),
            ValidationOutcome::Rejected { reason } => info!("Listing skipped: {} ({})", context.source, reason),
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPLETE_LISTING: &str = r#"
        <html><body>
            <h1>Maison de ville</h1>
            <h4><i class="fa fa-map-marker"></i> 12 Rue X, Le Vauclin</h4>
            <div class="product-features">
                <ul class="list-inline">
                    <li><span class="text-muted">Type</span> <span class="fw-bold">Maison</span></li>
                    <li><span class="text-muted">Surface</span> <span class="fw-bold">140 m²</span></li>
                    <li><span class="text-muted">Nombre de pièces</span> <span class="fw-bold">5</span></li>
                    <li><span class="text-muted">Nombre de chambres</span> <span class="fw-bold">3</span></li>
                    <li><span class="text-muted">Salle de bain</span> <span class="fw-bold">1</span></li>
                    <li><span class="text-muted">DPE</span> <span class="fw-bold">D (120)</span></li>
                </ul>
            </div>
            <p class="product-price">370 000 €</p>
        </body></html>
    "#;

    #[test]
    fn test_parser_creation() {
        assert!(ListingParser::new().is_ok());
    }

    #[test]
    fn test_invalid_selector_config_is_rejected() {
        let selectors = ExtractionSelectors {
            entry_label: "span[".to_string(),
            ..ExtractionSelectors::default()
        };
        assert!(ListingParser::with_config(&selectors).is_err());
    }

    #[test]
    fn test_complete_listing_is_accepted() {
        let parser = ListingParser::new().unwrap();
        let outcome = parser.parse_document(COMPLETE_LISTING);
        assert_eq!(outcome.record().unwrap().to_row(), "Le Vauclin,Maison,140,5,3,1,D,370000");
    }

    #[test]
    fn test_per_field_extractors() {
        let parser = ListingParser::new().unwrap();
        let html = Html::parse_document(COMPLETE_LISTING);

        assert_eq!(parser.extract_city(&html), "Le Vauclin");
        assert_eq!(parser.extract_property_type(&html).unwrap(), PropertyType::Maison);
        assert_eq!(parser.extract_field(&html, CharacteristicField::EnergyRating).as_str(), "D");
        assert_eq!(parser.extract_price(&html).unwrap().amount(), 370_000);
    }

    #[test]
    fn test_type_rejection_wins_over_price_rejection() {
        let parser = ListingParser::new().unwrap();
        let markup = COMPLETE_LISTING
            .replace(">Maison<", ">Parking<")
            .replace("370 000 €", "9 500 €");

        let outcome = parser.parse_document(&markup);
        assert_eq!(outcome.rejection_reason(), Some("Annonce non conforme - invalid property type: Parking"));
    }

    #[test]
    fn test_missing_section_rejects() {
        let parser = ListingParser::new().unwrap();
        let outcome = parser.parse_document(r#"<p class="product-price">370 000 €</p>"#);
        assert_eq!(outcome.rejection_reason(), Some("Annonce non conforme - characteristics section missing"));
    }

    #[test]
    fn test_missing_price_rejects() {
        let parser = ListingParser::new().unwrap();
        let markup = COMPLETE_LISTING.replace("product-price", "product-old-price");
        let outcome = parser.parse_document(&markup);
        assert_eq!(outcome.rejection_reason(), Some("Annonce non conforme - price not found"));
    }

    #[test]
    fn test_parse_with_context_returns_outcome() {
        let parser = ListingParser::new().unwrap();
        let html = Html::parse_document(COMPLETE_LISTING);
        let context = ListingParseContext::new("https://example.com/annonce-1").with_source(1, 0);
        let outcome = parser.parse_with_context(&html, &context).unwrap();
        assert!(outcome.is_accepted());
    }
}
