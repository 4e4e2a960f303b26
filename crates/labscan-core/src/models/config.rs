//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{LabscanError, Result};
use crate::models::lab::ClampRule;

/// Main configuration for labscan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LabscanConfig {
    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Output configuration.
    pub output: OutputConfig,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum text length to consider a PDF as text-based.
    pub min_text_length: usize,

    /// Maximum pages to read (0 = unlimited).
    pub max_pages: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            min_text_length: 50,
            max_pages: 0,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Fall back to the loose (unit-free) pattern when the strict one fails.
    pub enable_loose_tier: bool,

    /// Convert alternate units (e.g. albumin g/L) into canonical units.
    pub convert_units: bool,

    /// Clamp numeric values into their plausible range.
    pub clamp_values: bool,

    /// Plausible ranges per field.
    pub clamp_rules: Vec<ClampRule>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            enable_loose_tier: true,
            convert_units: true,
            clamp_values: true,
            clamp_rules: ClampRule::defaults(),
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format used by the CLI (json, csv or text).
    pub format: String,

    /// Pretty-print JSON output.
    pub pretty_json: bool,

    /// Decimal places used in text and CSV output (None = as extracted).
    pub decimal_places: Option<u32>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            pretty_json: true,
            decimal_places: None,
        }
    }
}

impl LabscanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings that cannot be applied.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.output.format.as_str(), "json" | "csv" | "text") {
            return Err(LabscanError::Config(format!(
                "unknown output format: {}",
                self.output.format
            )));
        }
        for rule in &self.extraction.clamp_rules {
            if rule.lower > rule.upper {
                return Err(LabscanError::Config(format!(
                    "clamp rule for {} has lower bound {} above upper bound {}",
                    rule.key, rule.lower, rule.upper
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lab::FieldKey;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: LabscanConfig =
            serde_json::from_str(r#"{"extraction": {"enable_loose_tier": false}}"#).unwrap();
        assert!(!config.extraction.enable_loose_tier);
        assert!(config.extraction.convert_units);
        assert_eq!(config.extraction.clamp_rules, ClampRule::defaults());
        assert_eq!(config.pdf.min_text_length, 50);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = LabscanConfig::default();
        config.extraction.clamp_values = false;
        config.save(&path).unwrap();

        let loaded = LabscanConfig::from_file(&path).unwrap();
        assert!(!loaded.extraction.clamp_values);
    }

    #[test]
    fn test_inverted_clamp_rule_rejected() {
        let mut config = LabscanConfig::default();
        config.extraction.clamp_rules = vec![ClampRule::new(FieldKey::Bmi, 80, 10)];
        assert!(matches!(config.validate(), Err(LabscanError::Config(_))));
    }

    #[test]
    fn test_unknown_output_format_rejected() {
        let mut config = LabscanConfig::default();
        config.output.format = "xml".to_string();
        assert!(config.validate().is_err());
    }
}
