//! Two-tier (strict, then loose) extraction for one field.

use regex::Regex;
use tracing::trace;

use crate::models::lab::{ExtractedField, FieldKey, LabValue, MatchTier, ValueKind};

use super::catalog::FieldSpec;
use super::normalize::normalize_sex;
use super::number::parse_lab_number;
use super::patterns::NAME_STOP;
use super::FieldExtractor;

/// Resolves a field by trying its strict pattern, then its loose pattern.
///
/// Transitions are `NOT_ATTEMPTED -> STRICT_MATCHED`, or
/// `NOT_ATTEMPTED -> LOOSE_ATTEMPTED -> LOOSE_MATCHED | UNMATCHED`.
/// A capture that cannot be converted to the field's kind counts as no match.
pub struct TieredFieldExtractor<'a> {
    spec: &'a FieldSpec,
    loose_enabled: bool,
}

impl<'a> TieredFieldExtractor<'a> {
    pub fn new(spec: &'a FieldSpec) -> Self {
        Self {
            spec,
            loose_enabled: true,
        }
    }

    /// Enable or disable the loose fallback tier.
    pub fn with_loose_tier(mut self, enabled: bool) -> Self {
        self.loose_enabled = enabled;
        self
    }

    fn tiers(&self) -> Vec<(MatchTier, &'static Regex)> {
        let mut tiers = vec![(MatchTier::Strict, self.spec.strict)];
        if self.loose_enabled {
            tiers.push((MatchTier::Loose, self.spec.loose));
        }
        tiers
    }

    fn try_tier(&self, tier: MatchTier, pattern: &Regex, text: &str) -> Option<ExtractedField> {
        let capture = pattern.captures(text)?.get(1)?;
        let raw = capture.as_str();
        let value = convert(self.spec.kind(), tier, raw);
        trace!(
            "{} {} pattern captured {:?} -> {:?}",
            self.spec.key, tier, raw, value
        );
        value.map(|v| {
            ExtractedField::matched(self.spec.key, raw, tier, v)
                .with_position(capture.start(), capture.end())
        })
    }
}

impl FieldExtractor for TieredFieldExtractor<'_> {
    fn key(&self) -> FieldKey {
        self.spec.key
    }

    fn extract(&self, text: &str) -> ExtractedField {
        self.tiers()
            .into_iter()
            .find_map(|(tier, pattern)| self.try_tier(tier, pattern, text))
            .unwrap_or_else(|| ExtractedField::unmatched(self.spec.key))
    }
}

/// Convert a raw capture to a typed value.
fn convert(kind: ValueKind, tier: MatchTier, raw: &str) -> Option<LabValue> {
    match kind {
        ValueKind::Numeric => parse_lab_number(raw).map(LabValue::Number),
        ValueKind::Integer => raw.trim().parse::<i64>().ok().map(LabValue::Integer),
        ValueKind::Sex => Some(LabValue::Category(normalize_sex(raw))),
        ValueKind::Name => {
            let name = match tier {
                MatchTier::Loose => clean_loose_name(raw),
                _ => raw,
            };
            let name = name.trim().trim_end_matches([',', '.', '-', ' ']);
            (!name.is_empty()).then(|| LabValue::Text(name.to_string()))
        }
    }
}

/// Cut a loosely captured name at the next demographic label.
fn clean_loose_name(raw: &str) -> &str {
    match NAME_STOP.find(raw) {
        Some(m) => &raw[..m.start()],
        None => raw,
    }
}
