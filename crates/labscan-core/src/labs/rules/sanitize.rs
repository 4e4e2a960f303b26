//! Coercion and clamping of field values into plausible ranges.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::debug;

use crate::models::lab::{ClampRule, FieldKey, LabValue, ValueKind};

use super::normalize::normalize_sex;
use super::number::parse_lab_number;

/// Coerces values to their field's kind and clamps numeric ones.
///
/// Values that cannot be coerced are dropped. Applying the sanitizer to its
/// own output returns the same map.
#[derive(Debug, Clone)]
pub struct ValueSanitizer {
    rules: BTreeMap<FieldKey, ClampRule>,
    clamp: bool,
}

impl ValueSanitizer {
    pub fn new(rules: impl IntoIterator<Item = ClampRule>) -> Self {
        Self {
            rules: rules.into_iter().map(|r| (r.key, r)).collect(),
            clamp: true,
        }
    }

    /// Enable or disable clamping; coercion still applies.
    pub fn with_clamping(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }

    /// Clamp rule for a field, if any.
    pub fn rule(&self, key: FieldKey) -> Option<&ClampRule> {
        self.rules.get(&key)
    }

    /// Sanitize a whole mapping. Absent fields are never filled in.
    pub fn sanitize(&self, values: BTreeMap<FieldKey, LabValue>) -> BTreeMap<FieldKey, LabValue> {
        values
            .into_iter()
            .filter_map(|(key, value)| {
                let sanitized = self.sanitize_value(key, value);
                if sanitized.is_none() {
                    debug!("Dropped {}: value could not be coerced", key);
                }
                sanitized.map(|v| (key, v))
            })
            .collect()
    }

    /// Sanitize one value for `key`.
    pub fn sanitize_value(&self, key: FieldKey, value: LabValue) -> Option<LabValue> {
        match key.kind() {
            ValueKind::Numeric => {
                let number = self.clamp_number(key, coerce(&value)?);
                Some(LabValue::Number(number))
            }
            ValueKind::Integer => {
                let number = self.clamp_number(key, coerce(&value)?.trunc());
                number.to_i64().map(LabValue::Integer)
            }
            ValueKind::Sex => match value {
                LabValue::Category(s) | LabValue::Text(s) => {
                    let code = normalize_sex(&s);
                    (!code.is_empty()).then_some(LabValue::Category(code))
                }
                LabValue::Number(_) | LabValue::Integer(_) => None,
            },
            ValueKind::Name => match value {
                LabValue::Text(s) | LabValue::Category(s) => {
                    let name = s.trim();
                    (!name.is_empty()).then(|| LabValue::Text(name.to_string()))
                }
                LabValue::Number(_) | LabValue::Integer(_) => None,
            },
        }
    }

    fn clamp_number(&self, key: FieldKey, value: Decimal) -> Decimal {
        match self.rules.get(&key) {
            Some(rule) if self.clamp => {
                let clamped = rule.apply(value);
                if clamped != value {
                    debug!("Clamped {} from {} to {}", key, value, clamped);
                }
                clamped
            }
            _ => value,
        }
    }
}

impl Default for ValueSanitizer {
    fn default() -> Self {
        Self::new(ClampRule::defaults())
    }
}

/// Numeric coercion of any value kind.
fn coerce(value: &LabValue) -> Option<Decimal> {
    match value {
        LabValue::Number(d) => Some(*d),
        LabValue::Integer(i) => Some(Decimal::from(*i)),
        LabValue::Category(s) | LabValue::Text(s) => parse_lab_number(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn number(n: i64) -> LabValue {
        LabValue::Number(Decimal::from(n))
    }

    #[test]
    fn test_platelets_clamped_to_upper_bound() {
        let sanitizer = ValueSanitizer::default();
        let out = sanitizer.sanitize(BTreeMap::from([(FieldKey::Platelets, number(1500))]));
        assert_eq!(out[&FieldKey::Platelets], number(1000));
    }

    #[test]
    fn test_lower_bound() {
        let sanitizer = ValueSanitizer::default();
        let out = sanitizer.sanitize(BTreeMap::from([(FieldKey::UlnAst, number(3))]));
        assert_eq!(out[&FieldKey::UlnAst], number(10));
    }

    #[test]
    fn test_uncoercible_value_dropped() {
        let sanitizer = ValueSanitizer::default();
        let out = sanitizer.sanitize(BTreeMap::from([
            (FieldKey::AstUl, LabValue::Text("n/a".to_string())),
            (FieldKey::AltUl, LabValue::Text("30".to_string())),
        ]));
        assert_eq!(out, BTreeMap::from([(FieldKey::AltUl, number(30))]));
    }

    #[test]
    fn test_idempotent() {
        let sanitizer = ValueSanitizer::default();
        let input = BTreeMap::from([
            (FieldKey::Age, LabValue::Text("130".to_string())),
            (FieldKey::Sex, LabValue::Text("female".to_string())),
            (FieldKey::AlbuminGdl, LabValue::Number(Decimal::new(72, 1))),
            (FieldKey::PatientName, LabValue::Text("  Jane Doe ".to_string())),
            (FieldKey::Bmi, LabValue::Text("27,5".to_string())),
        ]);
        let once = sanitizer.sanitize(input);
        let twice = sanitizer.sanitize(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once[&FieldKey::Age], LabValue::Integer(120));
        assert_eq!(once[&FieldKey::Sex], LabValue::Category("F".to_string()));
        assert_eq!(once[&FieldKey::AlbuminGdl], number(6));
        assert_eq!(once[&FieldKey::Bmi], LabValue::Number(Decimal::new(275, 1)));
    }

    #[test]
    fn test_integer_fields_truncate() {
        let sanitizer = ValueSanitizer::default();
        assert_eq!(
            sanitizer.sanitize_value(FieldKey::Age, LabValue::Number(Decimal::new(455, 1))),
            Some(LabValue::Integer(45))
        );
        assert_eq!(
            sanitizer.sanitize_value(FieldKey::DiabIfg, LabValue::Integer(3)),
            Some(LabValue::Integer(1))
        );
    }

    #[test]
    fn test_clamping_disabled() {
        let sanitizer = ValueSanitizer::default().with_clamping(false);
        assert_eq!(
            sanitizer.sanitize_value(FieldKey::Platelets, number(1500)),
            Some(number(1500))
        );
    }

    #[test]
    fn test_absent_fields_not_fabricated() {
        let out = ValueSanitizer::default().sanitize(BTreeMap::new());
        assert!(out.is_empty());
    }
}
