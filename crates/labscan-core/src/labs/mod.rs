//! Lab report field extraction module.

mod parser;
pub mod rules;
pub mod table;

pub use parser::{ExtractionResult, LabReportParser};
pub use table::{TableMapper, column_key};

use std::collections::BTreeMap;

use crate::models::lab::{FieldKey, LabValue};

/// Trait for lab report parsers.
///
/// Parsing never fails: fields that cannot be resolved are absent from the
/// result, and unreadable documents give an empty result.
pub trait LabParser {
    /// Extract lab values from document text.
    fn parse(&self, text: &str) -> ExtractionResult;

    /// Extract lab values from a text-based PDF.
    fn parse_pdf(&self, data: &[u8]) -> ExtractionResult;

    /// Coerce and clamp values from any source, e.g. manual edits.
    fn sanitize(&self, values: BTreeMap<FieldKey, LabValue>) -> BTreeMap<FieldKey, LabValue>;
}
