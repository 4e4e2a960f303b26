//! Rule-based field extraction for lab reports.

pub mod catalog;
pub mod normalize;
pub mod number;
pub mod patterns;
pub mod range;
pub mod sanitize;
pub mod tiered;
pub mod units;

pub use catalog::{FieldPatternCatalog, FieldSpec};
pub use normalize::{normalize_sex, normalize_text};
pub use number::parse_lab_number;
pub use range::RangeExtractor;
pub use sanitize::ValueSanitizer;
pub use tiered::TieredFieldExtractor;
pub use units::{UnitConversion, UnitNormalizer};

use crate::models::lab::{ExtractedField, FieldKey};

/// Trait for single-field extractors.
pub trait FieldExtractor {
    /// Field this extractor resolves.
    fn key(&self) -> FieldKey;

    /// Resolve the field against normalized text. Never fails; an unresolved
    /// field comes back with tier `Unmatched`.
    fn extract(&self, text: &str) -> ExtractedField;
}
