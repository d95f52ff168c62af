//! Domain module - Core business entities
//!
//! Listing records, their field values and the validation outcome of a
//! listing page, plus the site and dataset constants.

pub mod constants;
pub mod listing;

// Re-export commonly used items for convenience
pub use listing::{FieldValue, ListingRecord, Price, PropertyType, ValidationOutcome};
