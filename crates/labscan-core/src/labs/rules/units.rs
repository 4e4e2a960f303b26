//! Conversion of alternate source units into canonical units.

use std::collections::BTreeMap;

use regex::Regex;
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::lab::{ExtractedField, FieldKey, LabValue};

use super::patterns::{ALBUMIN_UNIT_AFTER, TG_UNIT_AFTER};

/// A field whose value may be reported in a known alternate unit.
#[derive(Debug, Clone)]
pub struct UnitConversion {
    /// Field the conversion applies to.
    pub key: FieldKey,
    /// Anchored pattern; group 1 captures the unit token right after the value.
    unit_after: &'static Regex,
    /// Canonical unit token (lowercase, no spaces or slashes).
    canonical: &'static str,
    /// Alternate unit tokens and the factor converting them to canonical.
    alternates: Vec<(&'static str, Decimal)>,
}

impl UnitConversion {
    pub fn new(
        key: FieldKey,
        unit_after: &'static Regex,
        canonical: &'static str,
        alternates: Vec<(&'static str, Decimal)>,
    ) -> Self {
        Self {
            key,
            unit_after,
            canonical,
            alternates,
        }
    }

    /// Factor for the unit token opening `after`, if it is an alternate.
    ///
    /// `after` is the text following the captured value. A canonical token,
    /// or no token at all, means the value is already canonical.
    fn factor(&self, after: &str) -> Option<Decimal> {
        let caps = self.unit_after.captures(after)?;
        let token = unit_token(caps.get(1)?.as_str());
        if token == self.canonical {
            return None;
        }
        self.alternates
            .iter()
            .find(|(alt, _)| *alt == token)
            .map(|(_, factor)| *factor)
    }
}

/// Rewrites matched values whose source unit differs from the canonical one.
#[derive(Debug, Clone)]
pub struct UnitNormalizer {
    conversions: Vec<UnitConversion>,
}

impl UnitNormalizer {
    pub fn new(conversions: Vec<UnitConversion>) -> Self {
        Self { conversions }
    }

    /// Albumin g/L to g/dL, triglycerides mmol/L to mg/dL.
    pub fn standard() -> Self {
        Self::new(vec![
            UnitConversion::new(
                FieldKey::AlbuminGdl,
                &ALBUMIN_UNIT_AFTER,
                "gdl",
                vec![("gl", Decimal::new(1, 1))],
            ),
            UnitConversion::new(
                FieldKey::TgMgdl,
                &TG_UNIT_AFTER,
                "mgdl",
                vec![("mmoll", Decimal::new(8857, 2))],
            ),
        ])
    }

    /// Convert matched values in place, once per field. Returns the converted keys.
    ///
    /// The unit is read right after the span each field was captured from in
    /// `text`, so units written elsewhere in the report never apply. Absent
    /// fields, and fields without a recorded span, stay untouched.
    pub fn apply(
        &self,
        values: &mut BTreeMap<FieldKey, LabValue>,
        fields: &[ExtractedField],
        text: &str,
    ) -> Vec<FieldKey> {
        let mut converted = Vec::new();
        for conversion in &self.conversions {
            let Some(LabValue::Number(value)) = values.get(&conversion.key) else {
                continue;
            };
            let Some(after) = fields
                .iter()
                .find(|field| field.key == conversion.key)
                .and_then(|field| field.position)
                .and_then(|(_, end)| text.get(end..))
            else {
                continue;
            };
            if let Some(factor) = conversion.factor(after) {
                let canonical = *value * factor;
                debug!(
                    "Converted {} from {} to {} (factor {})",
                    conversion.key, value, canonical, factor
                );
                values.insert(conversion.key, LabValue::Number(canonical));
                converted.push(conversion.key);
            }
        }
        converted
    }
}

impl Default for UnitNormalizer {
    fn default() -> Self {
        Self::standard()
    }
}

/// Lowercase a unit and drop whitespace and slashes: `"g / dL"` -> `"gdl"`.
fn unit_token(unit: &str) -> String {
    unit.chars()
        .filter(|c| !c.is_whitespace() && *c != '/')
        .flat_map(char::to_lowercase)
        .collect()
}
