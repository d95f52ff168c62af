//! Parsing error module re-export

pub use crate::infrastructure::parsing_error::{FieldResult, NonValid, ParsingError, ParsingResult};
