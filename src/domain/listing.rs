//! Listing record entities
//!
//! A listing page is classified into exactly one [`ValidationOutcome`]: either an
//! accepted [`ListingRecord`] carrying eight normalised fields, or a rejection with
//! a human-readable reason.

use serde::{Serialize, Serializer};
use std::fmt;

use super::constants::record::{CSV_HEADER, PLACEHOLDER};

/// Value of an optional attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Normalised, non-empty value
    Value(String),
    /// Attribute absent, listing still valid
    Placeholder,
}

impl FieldValue {
    /// Wrap a normalised value; empty text becomes the placeholder
    pub fn from_normalized(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() || value == PLACEHOLDER {
            Self::Placeholder
        } else {
            Self::Value(value)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Value(v) => v,
            Self::Placeholder => PLACEHOLDER,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Closed set of accepted property types, as labelled on the listing site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PropertyType {
    Maison,
    Appartement,
}

impl PropertyType {
    /// Exact, case-sensitive match against the allow-list
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "Maison" => Some(Self::Maison),
            "Appartement" => Some(Self::Appartement),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Maison => "Maison",
            Self::Appartement => "Appartement",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated asking price.
///
/// Keeps the digit string exactly as extracted (currency symbol and separators
/// removed) alongside its numeric value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Price {
    digits: String,
    amount: u64,
}

impl Price {
    pub(crate) fn new(digits: String, amount: u64) -> Self {
        Self { digits, amount }
    }

    pub fn digits(&self) -> &str {
        &self.digits
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digits)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.digits)
    }
}

/// One accepted listing, immutable once assembled
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingRecord {
    pub city: String,
    pub property_type: PropertyType,
    pub surface: FieldValue,
    pub room_count: FieldValue,
    pub bedroom_count: FieldValue,
    pub bathroom_count: FieldValue,
    pub energy_rating: FieldValue,
    pub price: Price,
}

impl ListingRecord {
    /// Column names, in the fixed field order
    pub const COLUMNS: [&'static str; 8] = CSV_HEADER;

    /// Field values in the fixed column order
    pub fn values(&self) -> [&str; 8] {
        [
            self.city.as_str(),
            self.property_type.as_str(),
            self.surface.as_str(),
            self.room_count.as_str(),
            self.bedroom_count.as_str(),
            self.bathroom_count.as_str(),
            self.energy_rating.as_str(),
            self.price.digits(),
        ]
    }

    /// Comma-joined row, without quoting
    pub fn to_row(&self) -> String {
        self.values().join(",")
    }
}

/// Final classification of one listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Accepted(ListingRecord),
    Rejected { reason: String },
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    pub fn record(&self) -> Option<&ListingRecord> {
        match self {
            Self::Accepted(record) => Some(record),
            Self::Rejected { .. } => None,
        }
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        match self {
            Self::Accepted(_) => None,
            Self::Rejected { reason } => Some(reason),
        }
    }
}
