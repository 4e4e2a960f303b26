//! Lab field keys, typed values and per-field extraction records.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stable identifier of one clinical field.
///
/// Declaration order is the iteration order of every output map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    /// Patient display name.
    PatientName,
    /// Patient sex, normalized to `M`/`F` when recognizable.
    Sex,
    /// Age in whole years.
    Age,
    /// Aspartate aminotransferase (U/L).
    AstUl,
    /// Alanine aminotransferase (U/L).
    AltUl,
    /// Gamma-glutamyl transferase (U/L).
    GgtUl,
    /// Triglycerides (mg/dL).
    TgMgdl,
    /// Platelet count (10^9/L).
    Platelets,
    /// Serum albumin (g/dL).
    AlbuminGdl,
    /// Upper limit of normal for AST (U/L).
    UlnAst,
    /// Body mass index (kg/m²). Manual entry only.
    Bmi,
    /// Waist circumference (cm). Manual entry only.
    WaistCm,
    /// Diabetes or impaired fasting glucose flag (0/1). Manual entry only.
    DiabIfg,
}

impl FieldKey {
    /// Every key, in declaration order.
    pub const ALL: [FieldKey; 13] = [
        FieldKey::PatientName,
        FieldKey::Sex,
        FieldKey::Age,
        FieldKey::AstUl,
        FieldKey::AltUl,
        FieldKey::GgtUl,
        FieldKey::TgMgdl,
        FieldKey::Platelets,
        FieldKey::AlbuminGdl,
        FieldKey::UlnAst,
        FieldKey::Bmi,
        FieldKey::WaistCm,
        FieldKey::DiabIfg,
    ];

    /// Serialized key, e.g. `ast_ul`.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKey::PatientName => "patient_name",
            FieldKey::Sex => "sex",
            FieldKey::Age => "age",
            FieldKey::AstUl => "ast_ul",
            FieldKey::AltUl => "alt_ul",
            FieldKey::GgtUl => "ggt_ul",
            FieldKey::TgMgdl => "tg_mgdl",
            FieldKey::Platelets => "platelets",
            FieldKey::AlbuminGdl => "albumin_gdl",
            FieldKey::UlnAst => "uln_ast",
            FieldKey::Bmi => "bmi",
            FieldKey::WaistCm => "waist_cm",
            FieldKey::DiabIfg => "diab_ifg",
        }
    }

    /// Human-readable label with canonical unit.
    pub fn label(&self) -> &'static str {
        match self {
            FieldKey::PatientName => "Patient name",
            FieldKey::Sex => "Sex",
            FieldKey::Age => "Age (years)",
            FieldKey::AstUl => "AST (U/L)",
            FieldKey::AltUl => "ALT (U/L)",
            FieldKey::GgtUl => "GGT (U/L)",
            FieldKey::TgMgdl => "Triglycerides (mg/dL)",
            FieldKey::Platelets => "Platelets (10^9/L)",
            FieldKey::AlbuminGdl => "Albumin (g/dL)",
            FieldKey::UlnAst => "ULN AST (U/L)",
            FieldKey::Bmi => "BMI (kg/m²)",
            FieldKey::WaistCm => "Waist circumference (cm)",
            FieldKey::DiabIfg => "Diabetes / IFG",
        }
    }

    /// Kind of value this field holds.
    pub fn kind(&self) -> ValueKind {
        match self {
            FieldKey::PatientName => ValueKind::Name,
            FieldKey::Sex => ValueKind::Sex,
            FieldKey::Age | FieldKey::DiabIfg => ValueKind::Integer,
            _ => ValueKind::Numeric,
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldKey::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown field key: {}", s))
    }
}

/// Expected kind of a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Decimal measurement.
    Numeric,
    /// Whole number (age, flags).
    Integer,
    /// Two-valued sex code with open fallback.
    Sex,
    /// Free text name.
    Name,
}

/// A typed field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LabValue {
    /// Decimal measurement in the canonical unit.
    Number(Decimal),
    /// Whole number.
    Integer(i64),
    /// Categorical code (`M`, `F`, or an unrecognized token kept verbatim).
    Category(String),
    /// Free text, also used for uncoerced manual input.
    Text(String),
}

impl LabValue {
    /// Numeric value, if this is a number or integer.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            LabValue::Number(d) => Some(*d),
            LabValue::Integer(i) => Some(Decimal::from(*i)),
            LabValue::Category(_) | LabValue::Text(_) => None,
        }
    }
}

impl fmt::Display for LabValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabValue::Number(d) => write!(f, "{}", d.normalize()),
            LabValue::Integer(i) => write!(f, "{}", i),
            LabValue::Category(s) | LabValue::Text(s) => f.write_str(s),
        }
    }
}

/// Which extraction tier produced a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    /// Unit-anchored (or range-anchored) pattern matched.
    Strict,
    /// Fallback pattern matched; lower precision.
    Loose,
    /// No pattern produced a usable value.
    Unmatched,
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchTier::Strict => "strict",
            MatchTier::Loose => "loose",
            MatchTier::Unmatched => "unmatched",
        };
        f.write_str(s)
    }
}

/// Outcome of resolving one field against a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedField {
    /// Field this record belongs to.
    pub key: FieldKey,
    /// Captured source text, if any pattern matched.
    pub raw: Option<String>,
    /// Tier that produced the value.
    pub tier: MatchTier,
    /// Typed value, `None` when unmatched.
    pub value: Option<LabValue>,
    /// Byte span of the captured value in the searched text.
    pub position: Option<(usize, usize)>,
}

impl ExtractedField {
    pub fn matched(key: FieldKey, raw: impl Into<String>, tier: MatchTier, value: LabValue) -> Self {
        Self {
            key,
            raw: Some(raw.into()),
            tier,
            value: Some(value),
            position: None,
        }
    }

    /// Record where the value was captured.
    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }

    pub fn unmatched(key: FieldKey) -> Self {
        Self {
            key,
            raw: None,
            tier: MatchTier::Unmatched,
            value: None,
            position: None,
        }
    }

    /// Whether a value was resolved.
    pub fn is_matched(&self) -> bool {
        self.value.is_some()
    }
}

/// Plausible closed numeric domain for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClampRule {
    pub key: FieldKey,
    pub lower: Decimal,
    pub upper: Decimal,
}

impl ClampRule {
    pub fn new(key: FieldKey, lower: i64, upper: i64) -> Self {
        Self {
            key,
            lower: Decimal::from(lower),
            upper: Decimal::from(upper),
        }
    }

    /// Built-in bounds, matching the limits of the manual entry form.
    pub fn defaults() -> Vec<ClampRule> {
        vec![
            ClampRule::new(FieldKey::Age, 0, 120),
            ClampRule::new(FieldKey::AstUl, 1, 5000),
            ClampRule::new(FieldKey::AltUl, 1, 5000),
            ClampRule::new(FieldKey::GgtUl, 1, 2000),
            ClampRule::new(FieldKey::TgMgdl, 10, 2000),
            ClampRule::new(FieldKey::Platelets, 20, 1000),
            ClampRule::new(FieldKey::AlbuminGdl, 1, 6),
            ClampRule::new(FieldKey::UlnAst, 10, 100),
            ClampRule::new(FieldKey::Bmi, 10, 80),
            ClampRule::new(FieldKey::WaistCm, 40, 200),
            ClampRule::new(FieldKey::DiabIfg, 0, 1),
        ]
    }

    /// Clamp a value into `[lower, upper]`.
    pub fn apply(&self, value: Decimal) -> Decimal {
        value.max(self.lower).min(self.upper)
    }
}
