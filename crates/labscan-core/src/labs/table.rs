//! Mapping of tabular (CSV) rows onto lab fields.

use std::collections::BTreeMap;

use tracing::debug;

use crate::models::lab::{FieldKey, LabValue};

/// Resolve a column header to a field key.
///
/// Headers are matched trimmed and case-insensitively against canonical
/// names and their common short forms.
pub fn column_key(header: &str) -> Option<FieldKey> {
    let key = match header.trim().to_lowercase().as_str() {
        "age" => FieldKey::Age,
        "sex" => FieldKey::Sex,
        "bmi" => FieldKey::Bmi,
        "waist_cm" | "waist" => FieldKey::WaistCm,
        "tg_mgdl" | "tg" | "triglycerides" => FieldKey::TgMgdl,
        "ggt_ul" | "ggt" => FieldKey::GgtUl,
        "ast_ul" | "ast" => FieldKey::AstUl,
        "alt_ul" | "alt" => FieldKey::AltUl,
        "uln_ast" => FieldKey::UlnAst,
        "platelets" => FieldKey::Platelets,
        "albumin_gdl" | "albumin" => FieldKey::AlbuminGdl,
        "diab_ifg" | "diabetes" => FieldKey::DiabIfg,
        _ => return None,
    };
    Some(key)
}

/// Column layout of a table, resolved once from its header row.
#[derive(Debug, Clone)]
pub struct TableMapper {
    columns: Vec<Option<FieldKey>>,
}

impl TableMapper {
    /// Resolve a header row. Unknown columns are kept as gaps and ignored.
    pub fn from_headers<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let columns: Vec<_> = headers
            .into_iter()
            .map(|h| {
                let key = column_key(h.as_ref());
                if key.is_none() {
                    debug!("Ignoring column {:?}", h.as_ref());
                }
                key
            })
            .collect();
        Self { columns }
    }

    /// Field keys recognized in the header, in column order.
    pub fn recognized(&self) -> Vec<FieldKey> {
        self.columns.iter().flatten().copied().collect()
    }

    /// Map one row onto raw field values. Empty cells are skipped and the
    /// first non-empty cell wins when two columns name the same field.
    pub fn map_row<I, S>(&self, cells: I) -> BTreeMap<FieldKey, LabValue>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = BTreeMap::new();
        for (key, cell) in self.columns.iter().zip(cells) {
            let Some(key) = key else {
                continue;
            };
            let cell = cell.as_ref().trim();
            if cell.is_empty() || values.contains_key(key) {
                continue;
            }
            values.insert(*key, cell_value(*key, cell));
        }
        values
    }
}

fn cell_value(key: FieldKey, cell: &str) -> LabValue {
    if key == FieldKey::DiabIfg {
        match cell.to_lowercase().as_str() {
            "yes" | "y" | "true" => return LabValue::Integer(1),
            "no" | "n" | "false" => return LabValue::Integer(0),
            _ => {}
        }
    }
    LabValue::Text(cell.to_string())
}
