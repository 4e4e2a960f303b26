//! Lab report parser running the full extraction pipeline.

use std::collections::BTreeMap;
use std::time::Instant;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::config::{ExtractionConfig, LabscanConfig, PdfConfig};
use crate::models::lab::{ExtractedField, FieldKey, LabValue, MatchTier};
use crate::pdf::{PdfExtractor, PdfProcessor};

use super::LabParser;
use super::rules::{
    FieldExtractor, FieldPatternCatalog, FieldSpec, RangeExtractor, TieredFieldExtractor,
    UnitNormalizer, ValueSanitizer, normalize_text,
};
use super::table::TableMapper;

/// Result of lab value extraction for one document or table row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractionResult {
    /// Resolved, sanitized values. Keys are present only when resolved.
    pub values: BTreeMap<FieldKey, LabValue>,
    /// Tier that resolved each extractable field.
    pub tiers: BTreeMap<FieldKey, MatchTier>,
    /// Normalized source text, kept for display only.
    #[serde(skip_serializing)]
    pub raw_text: String,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ExtractionResult {
    /// Value for a field, if resolved.
    pub fn get(&self, key: FieldKey) -> Option<&LabValue> {
        self.values.get(&key)
    }

    /// Numeric value for a field, if resolved and numeric.
    pub fn number(&self, key: FieldKey) -> Option<Decimal> {
        self.get(key).and_then(LabValue::as_decimal)
    }

    /// Tier for a field; `Unmatched` when never attempted.
    pub fn tier(&self, key: FieldKey) -> MatchTier {
        self.tiers.get(&key).copied().unwrap_or(MatchTier::Unmatched)
    }

    /// Whether no field was resolved.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of resolved fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }
}

/// Lab report parser: normalization, tiered and range extraction, unit
/// conversion, then sanitization.
///
/// Built once and read-only afterwards, so one instance can serve many
/// documents concurrently.
pub struct LabReportParser {
    catalog: FieldPatternCatalog,
    range: RangeExtractor,
    units: UnitNormalizer,
    sanitizer: ValueSanitizer,
    loose_enabled: bool,
    convert_units: bool,
    pdf: PdfConfig,
}

impl LabReportParser {
    /// Create a new parser with default settings.
    pub fn new() -> Self {
        Self::from_config(&LabscanConfig::default())
    }

    /// Create a parser from configuration.
    pub fn from_config(config: &LabscanConfig) -> Self {
        Self::with_extraction_config(&config.extraction).with_pdf_config(config.pdf.clone())
    }

    /// Create a parser from the extraction section only.
    pub fn with_extraction_config(config: &ExtractionConfig) -> Self {
        Self {
            catalog: FieldPatternCatalog::standard(),
            range: RangeExtractor::ast_uln(),
            units: UnitNormalizer::standard(),
            sanitizer: ValueSanitizer::new(config.clamp_rules.iter().copied())
                .with_clamping(config.clamp_values),
            loose_enabled: config.enable_loose_tier,
            convert_units: config.convert_units,
            pdf: PdfConfig::default(),
        }
    }

    /// Set PDF reading options.
    pub fn with_pdf_config(mut self, pdf: PdfConfig) -> Self {
        self.pdf = pdf;
        self
    }

    /// Set the loose fallback tier.
    pub fn with_loose_tier(mut self, enabled: bool) -> Self {
        self.loose_enabled = enabled;
        self
    }

    /// Set alternate unit conversion.
    pub fn with_unit_conversion(mut self, enabled: bool) -> Self {
        self.convert_units = enabled;
        self
    }

    /// Field catalog used by this parser.
    pub fn catalog(&self) -> &FieldPatternCatalog {
        &self.catalog
    }

    /// Resolve one field. The range extractor goes first for its key and
    /// falls through to the field's strict/loose patterns.
    fn resolve(&self, spec: &FieldSpec, text: &str) -> ExtractedField {
        if spec.key == self.range.key() {
            let field = self.range.extract(text);
            if field.is_matched() {
                return field;
            }
        }
        TieredFieldExtractor::new(spec)
            .with_loose_tier(self.loose_enabled)
            .extract(text)
    }

    /// Map a table row onto field keys and sanitize it.
    pub fn parse_row<I, S>(&self, mapper: &TableMapper, cells: I) -> ExtractionResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let values = self.sanitizer.sanitize(mapper.map_row(cells));
        ExtractionResult {
            values,
            ..ExtractionResult::default()
        }
    }

    fn no_text(&self, start: Instant) -> ExtractionResult {
        ExtractionResult {
            tiers: self
                .catalog
                .iter()
                .map(|s| (s.key, MatchTier::Unmatched))
                .collect(),
            warnings: vec!["No text available; values must be entered manually".to_string()],
            processing_time_ms: start.elapsed().as_millis() as u64,
            ..ExtractionResult::default()
        }
    }

    fn pdf_text(&self, data: &[u8]) -> Result<String> {
        let mut extractor = PdfExtractor::new()
            .with_min_text_length(self.pdf.min_text_length)
            .with_max_pages(self.pdf.max_pages);
        extractor.load(data)?;
        let text = extractor.extract_text()?;
        debug!(
            "Read {} chars from {} page PDF",
            text.len(),
            extractor.page_count()
        );
        Ok(text)
    }
}

impl Default for LabReportParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LabParser for LabReportParser {
    fn parse(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();
        let normalized = normalize_text(text);

        if normalized.trim().is_empty() {
            info!("No text to parse");
            return self.no_text(start);
        }

        info!("Parsing lab report from {} characters of text", normalized.len());

        let mut values = BTreeMap::new();
        let mut tiers = BTreeMap::new();
        let mut warnings = Vec::new();
        let mut fields = Vec::with_capacity(self.catalog.len());

        for spec in self.catalog.iter() {
            let field = self.resolve(spec, &normalized);
            debug!("{} -> {} {:?}", field.key, field.tier, field.raw);

            tiers.insert(field.key, field.tier);
            match &field.value {
                Some(value) => {
                    values.insert(field.key, value.clone());
                }
                None => warnings.push(format!("Could not extract {}", spec.key.label())),
            }
            fields.push(field);
        }

        if self.convert_units {
            self.units.apply(&mut values, &fields, &normalized);
        }

        let values = self.sanitizer.sanitize(values);

        debug!(
            "Resolved {} of {} fields",
            values.len(),
            self.catalog.len()
        );

        ExtractionResult {
            values,
            tiers,
            raw_text: normalized,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }

    fn parse_pdf(&self, data: &[u8]) -> ExtractionResult {
        match self.pdf_text(data) {
            Ok(text) => self.parse(&text),
            Err(e) => {
                warn!("Could not read PDF text: {}", e);
                self.no_text(Instant::now())
            }
        }
    }

    fn sanitize(&self, values: BTreeMap<FieldKey, LabValue>) -> BTreeMap<FieldKey, LabValue> {
        self.sanitizer.sanitize(values)
    }
}
