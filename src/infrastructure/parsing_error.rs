//! Parsing error types for listing extraction
//!
//! Two separate families live here:
//! - [`NonValid`]: a listing does not belong in the dataset. This is a normal
//!   classification outcome, never a fault.
//! - [`ParsingError`]: the extraction layer itself is misconfigured or an input
//!   cannot be resolved (bad selector, bad URL).

use thiserror::Error;

use crate::domain::FieldValue;

/// Rejection of a listing by a fallible field extractor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct NonValid {
    pub reason: String,
}

impl NonValid {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }

    pub fn characteristics_missing() -> Self {
        Self::new("characteristics section missing")
    }

    pub fn type_not_found() -> Self {
        Self::new("type not found")
    }

    pub fn invalid_property_type(value: &str) -> Self {
        Self::new(format!("invalid property type: {value}"))
    }

    pub fn price_not_found() -> Self {
        Self::new("price not found")
    }

    pub fn invalid_price_format() -> Self {
        Self::new("invalid price format")
    }

    pub fn price_below_floor() -> Self {
        Self::new("price below 10,000")
    }

    /// Rewrap with a contextual prefix
    pub fn with_prefix(self, prefix: &str) -> Self {
        Self { reason: format!("{prefix}{}", self.reason) }
    }
}

/// Outcome of extracting one optional or fallible attribute
pub type FieldResult<T = FieldValue> = Result<T, NonValid>;

#[derive(Error, Debug, Clone)]
pub enum ParsingError {
    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("No valid selectors configured for {field}")]
    EmptySelectorList { field: String },

    #[error("URL resolution failed: {url} - {reason}")]
    UrlResolutionFailed {
        url: String,
        reason: String,
        base_url: Option<String>,
    },
}

impl ParsingError {
    pub fn invalid_selector(selector: &str, reason: impl ToString) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn empty_selector_list(field: &str) -> Self {
        Self::EmptySelectorList { field: field.to_string() }
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_messages() {
        assert_eq!(NonValid::price_below_floor().to_string(), "price below 10,000");
        assert_eq!(NonValid::invalid_property_type("Parking").to_string(), "invalid property type: Parking");
    }

    #[test]
    fn test_prefix_wraps_reason() {
        let wrapped = NonValid::type_not_found().with_prefix("Annonce non conforme - ");
        assert_eq!(wrapped.reason, "Annonce non conforme - type not found");
    }

    #[test]
    fn test_parsing_error_display() {
        let err = ParsingError::invalid_selector("div[", "unexpected end of input");
        assert_eq!(err.to_string(), "Invalid CSS selector: div[ - unexpected end of input");
    }
}
