//! Upper-limit-of-normal extraction from reference ranges.

use regex::Regex;
use rust_decimal::Decimal;
use tracing::trace;

use crate::models::lab::{ExtractedField, FieldKey, LabValue, MatchTier};

use super::patterns::{AST_RANGE_AFTER_REFERENCE, AST_RANGE_AFTER_UNIT, AST_RANGE_PARENTHESIZED};
use super::FieldExtractor;

/// Extracts the high end of a `low-high` interval on an analyte's line.
///
/// Patterns are tried in priority order and the first one that matches wins;
/// later patterns are never consulted or merged.
pub struct RangeExtractor {
    key: FieldKey,
    patterns: Vec<&'static Regex>,
}

impl RangeExtractor {
    pub fn new(key: FieldKey, patterns: Vec<&'static Regex>) -> Self {
        Self { key, patterns }
    }

    /// Range extractor for the AST upper limit of normal.
    ///
    /// Priority: interval after the unit token, interval after
    /// "reference"/"range", parenthesized interval.
    pub fn ast_uln() -> Self {
        Self::new(
            FieldKey::UlnAst,
            vec![
                &*AST_RANGE_AFTER_UNIT,
                &*AST_RANGE_AFTER_REFERENCE,
                &*AST_RANGE_PARENTHESIZED,
            ],
        )
    }
}

impl FieldExtractor for RangeExtractor {
    fn key(&self) -> FieldKey {
        self.key
    }

    fn extract(&self, text: &str) -> ExtractedField {
        for (priority, pattern) in self.patterns.iter().enumerate() {
            let Some(caps) = pattern.captures(text) else {
                continue;
            };
            let low: Option<u32> = caps[1].parse().ok();
            let high: Option<u32> = caps[2].parse().ok();
            trace!("{} range pattern {} matched {:?}", self.key, priority, &caps[0]);

            // First matching pattern decides, even if its bounds are unusable.
            return match (low, high) {
                (Some(low), Some(high)) => ExtractedField::matched(
                    self.key,
                    format!("{}-{}", &caps[1], &caps[2]),
                    MatchTier::Strict,
                    LabValue::Number(Decimal::from(low.max(high))),
                ),
                _ => ExtractedField::unmatched(self.key),
            };
        }
        ExtractedField::unmatched(self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn uln(text: &str) -> Option<LabValue> {
        RangeExtractor::ast_uln().extract(text).value
    }

    #[test]
    fn test_range_after_unit_takes_high_bound() {
        assert_eq!(uln("AST 32 U/L 3-50"), Some(LabValue::Number(Decimal::from(50))));
        assert_eq!(uln("SGOT: 28 IU/L 5 - 40"), Some(LabValue::Number(Decimal::from(40))));
    }

    #[test]
    fn test_en_dash_separator() {
        assert_eq!(uln("AST 32 U/L 10–35"), Some(LabValue::Number(Decimal::from(35))));
    }

    #[test]
    fn test_reversed_bounds_use_maximum() {
        assert_eq!(uln("AST 32 U/L 50-3"), Some(LabValue::Number(Decimal::from(50))));
    }

    #[test]
    fn test_range_after_reference_words() {
        assert_eq!(
            uln("AST reference range: 8-45"),
            Some(LabValue::Number(Decimal::from(45)))
        );
    }

    #[test]
    fn test_parenthesized_range() {
        assert_eq!(uln("AST 32 (0-41) U/L"), Some(LabValue::Number(Decimal::from(41))));
    }

    #[test]
    fn test_priority_order() {
        // The after-unit interval wins over the later reference interval.
        let text = "AST 32 U/L 3-50 reference 0-99";
        let field = RangeExtractor::ast_uln().extract(text);
        assert_eq!(field.raw.as_deref(), Some("3-50"));
        assert_eq!(field.tier, MatchTier::Strict);
    }

    #[test]
    fn test_range_on_other_line_is_ignored() {
        assert_eq!(uln("AST 32 U/L\n3-50"), None);
    }

    #[test]
    fn test_no_range() {
        assert_eq!(uln("AST 32 U/L"), None);
        assert_eq!(uln("ALT 20 U/L 3-50"), None);
    }
}
