//! Field extraction for auto24 detail pages.
//!
//! Every extractor returns `Result<String, ExtractionError>`; callers decide
//! whether a failure is worth more than a null cell.

pub mod fields;
pub mod text;

pub use fields::*;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ExtractionError {
    #[error("{field}: no element matches `{selector}`")]
    MissingContainer {
        field: &'static str,
        selector: String,
    },
    #[error("{field}: container has no `{selector}` element")]
    MissingValue {
        field: &'static str,
        selector: String,
    },
    #[error("{field}: value element is empty")]
    EmptyValue { field: &'static str },
    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },
}

impl ExtractionError {
    /// Absent rows are routine on this site; only the other kinds point at markup drift
    pub fn is_missing_container(&self) -> bool {
        matches!(self, Self::MissingContainer { .. })
    }
}
