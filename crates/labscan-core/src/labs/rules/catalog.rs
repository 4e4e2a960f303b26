//! Catalog of extractable fields and their strict/loose pattern pairs.

use regex::Regex;

use crate::models::lab::{FieldKey, ValueKind};

use super::patterns::*;

/// Definition of one extractable field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Field identifier.
    pub key: FieldKey,
    /// High-precision, unit-anchored pattern. Capture group 1 holds the value.
    pub strict: &'static Regex,
    /// Lower-precision fallback without a unit requirement.
    pub loose: &'static Regex,
}

impl FieldSpec {
    /// Kind of value captured by this field.
    pub fn kind(&self) -> ValueKind {
        self.key.kind()
    }
}

/// Enumerated table of field definitions, fixed at construction.
#[derive(Debug, Clone)]
pub struct FieldPatternCatalog {
    specs: Vec<FieldSpec>,
}

impl FieldPatternCatalog {
    /// The standard lab report catalog, ordered by field key.
    pub fn standard() -> Self {
        let mut specs = vec![
            spec(FieldKey::PatientName, &NAME_STRICT, &NAME_LOOSE),
            spec(FieldKey::Sex, &SEX_STRICT, &SEX_LOOSE),
            spec(FieldKey::Age, &AGE_STRICT, &AGE_LOOSE),
            spec(FieldKey::AstUl, &AST_STRICT, &AST_LOOSE),
            spec(FieldKey::AltUl, &ALT_STRICT, &ALT_LOOSE),
            spec(FieldKey::GgtUl, &GGT_STRICT, &GGT_LOOSE),
            spec(FieldKey::TgMgdl, &TG_STRICT, &TG_LOOSE),
            spec(FieldKey::Platelets, &PLATELETS_STRICT, &PLATELETS_LOOSE),
            spec(FieldKey::AlbuminGdl, &ALBUMIN_STRICT, &ALBUMIN_LOOSE),
            spec(FieldKey::UlnAst, &ULN_AST_STRICT, &ULN_AST_LOOSE),
        ];
        specs.sort_by_key(|s| s.key);
        Self { specs }
    }

    /// Iterate over field definitions in key order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.specs.iter()
    }

    /// Look up the definition for a key.
    pub fn get(&self, key: FieldKey) -> Option<&FieldSpec> {
        self.specs.iter().find(|s| s.key == key)
    }

    /// Whether the key can be extracted from text.
    pub fn contains(&self, key: FieldKey) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl Default for FieldPatternCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn spec(key: FieldKey, strict: &'static Regex, loose: &'static Regex) -> FieldSpec {
    FieldSpec { key, strict, loose }
}
