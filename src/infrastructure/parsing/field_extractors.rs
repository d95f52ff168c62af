//! Per-field extraction rules
//!
//! Every attribute of the characteristics table is found the same way: scan the
//! entries in document order, keep the first whose label matches the field's
//! predicate, normalise its value. Only the property type and the price can reject
//! a listing; every other field degrades to the placeholder.

use scraper::{Html, Selector};
use tracing::debug;

use super::characteristics::CharacteristicsSection;
use super::error::{FieldResult, NonValid};
use crate::domain::constants::record::{AREA_UNIT, CURRENCY_SYMBOL, MIN_PRICE};
use crate::domain::{FieldValue, Price, PropertyType};

const BATHROOM_KEYWORDS: [&str; 4] = ["salle de bain", "salles de bain", "sdb", "sales de bain"];

/// Attributes read from the characteristics table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacteristicField {
    PropertyType,
    Surface,
    RoomCount,
    BedroomCount,
    BathroomCount,
    EnergyRating,
}

impl CharacteristicField {
    pub fn name(self) -> &'static str {
        match self {
            Self::PropertyType => "property_type",
            Self::Surface => "surface",
            Self::RoomCount => "room_count",
            Self::BedroomCount => "bedroom_count",
            Self::BathroomCount => "bathroom_count",
            Self::EnergyRating => "energy_rating",
        }
    }

    /// Label predicate for this field
    pub fn matches_label(self, label: &str) -> bool {
        match self {
            Self::PropertyType => label.contains("Type"),
            Self::Surface => label.contains("Surface"),
            Self::RoomCount => label.to_lowercase().contains("pièces"),
            Self::BedroomCount => label.to_lowercase().contains("chambres"),
            Self::BathroomCount => {
                let label = label.to_lowercase();
                BATHROOM_KEYWORDS.iter().any(|keyword| label.contains(keyword))
            }
            Self::EnergyRating => label.to_uppercase().contains("DPE") || label.to_lowercase().contains("énergie"),
        }
    }

    /// Normalise a raw value of this field
    pub fn normalize(self, raw: &str) -> String {
        match self {
            Self::Surface => normalize_surface(raw),
            Self::EnergyRating => normalize_energy_rating(raw),
            Self::PropertyType | Self::RoomCount | Self::BedroomCount | Self::BathroomCount => raw.trim().to_string(),
        }
    }
}

/// `"140 m²"` -> `"140"`; no numeric coercion
pub fn normalize_surface(raw: &str) -> String {
    raw.trim().replace(AREA_UNIT, "").trim().to_string()
}

/// `"D (120)"` -> `"D"`: the parenthesised score is discarded
pub fn normalize_energy_rating(raw: &str) -> String {
    let raw = raw.trim();
    raw.split_once('(').map_or(raw, |(rating, _)| rating).trim().to_string()
}

/// Optional field: placeholder when the section, the entry or the value is missing
pub fn extract_optional(section: Option<&CharacteristicsSection>, field: CharacteristicField) -> FieldValue {
    let Some(section) = section else {
        debug!("No characteristics section, {} defaults to placeholder", field.name());
        return FieldValue::Placeholder;
    };

    match section.find_value(|label| field.matches_label(label)) {
        Some(raw) => FieldValue::from_normalized(field.normalize(raw)),
        None => {
            debug!("No entry for {}, using placeholder", field.name());
            FieldValue::Placeholder
        }
    }
}

/// Property type: rejects when the section or the entry is missing, or the value
/// is outside the allow-list
pub fn extract_property_type(section: Option<&CharacteristicsSection>) -> FieldResult<PropertyType> {
    let section = section.ok_or_else(NonValid::characteristics_missing)?;
    let raw = section
        .find_value(|label| CharacteristicField::PropertyType.matches_label(label))
        .ok_or_else(NonValid::type_not_found)?;

    let value = CharacteristicField::PropertyType.normalize(raw);
    PropertyType::parse(&value).ok_or_else(|| NonValid::invalid_property_type(&value))
}

/// Validate a raw price text such as `"370 000 €"`
pub fn parse_price_text(raw: &str) -> FieldResult<Price> {
    let digits: String = raw
        .trim()
        .chars()
        .filter(|c| *c != CURRENCY_SYMBOL && !c.is_whitespace())
        .collect();

    // A sign is a format error, never a small amount
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NonValid::invalid_price_format());
    }

    let amount: u64 = digits.parse().map_err(|_| NonValid::invalid_price_format())?;
    if amount < MIN_PRICE {
        return Err(NonValid::price_below_floor());
    }

    Ok(Price::new(digits, amount))
}

/// Price: rejects when the price element is missing or its text is not a valid price
pub fn extract_price(html: &Html, selectors: &[Selector]) -> FieldResult<Price> {
    let element = super::select_first(html, selectors).ok_or_else(NonValid::price_not_found)?;
    parse_price_text(&element.text().collect::<String>())
}
