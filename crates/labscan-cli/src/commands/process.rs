//! Process command - extract lab values from a single report.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use labscan_core::labs::{ExtractionResult, LabParser, LabReportParser};
use labscan_core::models::config::{LabscanConfig, OutputConfig};
use labscan_core::models::lab::{FieldKey, LabValue, MatchTier};
use labscan_core::pdf::{PdfExtractor, PdfProcessor};

use super::load_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or plain text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (default: from config)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Show which extraction tier resolved each field
    #[arg(long)]
    show_tiers: bool,

    /// Only accept unit-anchored matches
    #[arg(long)]
    strict_only: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// Explicit choice, or the configured default.
    pub fn resolve(explicit: Option<Self>, config: &OutputConfig) -> anyhow::Result<Self> {
        match explicit {
            Some(format) => Ok(format),
            None => OutputFormat::from_str(&config.format, true)
                .map_err(|e| anyhow::anyhow!("Invalid output format in config: {}", e)),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let format = OutputFormat::resolve(args.format, &config.output)?;

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );

    let mut parser = LabReportParser::from_config(&config);
    if args.strict_only {
        parser = parser.with_loose_tier(false);
    }

    let result = read_report(&args.input, &parser, &config, &pb)?;

    pb.finish_and_clear();

    if !result.warnings.is_empty() {
        eprintln!("{}", style("Warnings:").yellow());
        for warning in &result.warnings {
            eprintln!("  - {}", warning);
        }
    }

    let output = format_result(&result, format, &config.output)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_tiers {
        println!();
        println!("{} Extraction tiers:", style("ℹ").blue());
        for (key, tier) in &result.tiers {
            let tier = match tier {
                MatchTier::Strict => style(tier.to_string()).green(),
                MatchTier::Loose => style(tier.to_string()).yellow(),
                MatchTier::Unmatched => style(tier.to_string()).red(),
            };
            println!("  {:<14} {}", key.as_str(), tier);
        }
        println!(
            "{} Processing time: {}ms",
            style("ℹ").blue(),
            result.processing_time_ms
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Read and parse one report, dispatching on the file extension.
pub fn read_report(
    path: &Path,
    parser: &LabReportParser,
    config: &LabscanConfig,
    pb: &ProgressBar,
) -> anyhow::Result<ExtractionResult> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "pdf" => process_pdf(path, parser, config, pb),
        "txt" | "text" => {
            pb.set_message("Extracting lab values...");
            let text = fs::read_to_string(path)?;
            Ok(parser.parse(&text))
        }
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    }
}

fn process_pdf(
    path: &Path,
    parser: &LabReportParser,
    config: &LabscanConfig,
    pb: &ProgressBar,
) -> anyhow::Result<ExtractionResult> {
    pb.set_message("Loading PDF...");

    let data = fs::read(path)?;
    let mut extractor = PdfExtractor::new()
        .with_min_text_length(config.pdf.min_text_length)
        .with_max_pages(config.pdf.max_pages);

    match extractor.load(&data) {
        Ok(()) => {
            debug!("PDF has {} pages", extractor.page_count());
            let pdf_type = extractor.analyze();
            debug!("PDF type: {:?}", pdf_type);
            if !pdf_type.has_text() {
                warn!(
                    "{} has no usable text layer; values must be entered manually",
                    path.display()
                );
            }
        }
        Err(e) => warn!("Could not open {}: {}", path.display(), e),
    }

    pb.set_message("Extracting lab values...");
    Ok(parser.parse_pdf(&data))
}

/// Render a value for text and CSV output.
pub fn format_value(value: &LabValue, decimal_places: Option<u32>) -> String {
    match (value, decimal_places) {
        (LabValue::Number(d), Some(dp)) => d.round_dp(dp).to_string(),
        _ => value.to_string(),
    }
}

pub fn format_result(
    result: &ExtractionResult,
    format: OutputFormat,
    config: &OutputConfig,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if config.pretty_json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Json => Ok(serde_json::to_string(result)?),
        OutputFormat::Csv => format_csv(result, config),
        OutputFormat::Text => Ok(format_text(result, config)),
    }
}

fn format_csv(result: &ExtractionResult, config: &OutputConfig) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(FieldKey::ALL.iter().map(|k| k.as_str()))?;
    wtr.write_record(FieldKey::ALL.iter().map(|k| {
        result
            .get(*k)
            .map(|v| format_value(v, config.decimal_places))
            .unwrap_or_default()
    }))?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult, config: &OutputConfig) -> String {
    let mut output = String::new();

    output.push_str("Lab values:\n");
    for (key, value) in &result.values {
        output.push_str(&format!(
            "  {:<26} {}\n",
            key.label(),
            format_value(value, config.decimal_places)
        ));
    }

    let missing: Vec<_> = result
        .tiers
        .iter()
        .filter(|(key, _)| !result.values.contains_key(key))
        .map(|(key, _)| key.label())
        .collect();

    if !missing.is_empty() {
        output.push_str("\nNot found (enter manually):\n");
        for label in missing {
            output.push_str(&format!("  {}\n", label));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value_rounding() {
        let value = LabValue::Number("3.856".parse().unwrap());
        assert_eq!(format_value(&value, None), "3.856");
        assert_eq!(format_value(&value, Some(1)), "3.9");
        assert_eq!(format_value(&LabValue::Integer(54), Some(1)), "54");
    }

    #[test]
    fn test_resolve_format_from_config() {
        let mut config = OutputConfig::default();
        config.format = "csv".to_string();
        assert_eq!(OutputFormat::resolve(None, &config).unwrap(), OutputFormat::Csv);
        assert_eq!(
            OutputFormat::resolve(Some(OutputFormat::Text), &config).unwrap(),
            OutputFormat::Text
        );
    }

    #[test]
    fn test_text_lists_missing_fields() {
        let result = LabReportParser::new().parse("AST 40 U/L");
        let text = format_text(&result, &OutputConfig::default());
        assert!(text.contains("AST (U/L)"));
        assert!(text.contains("Not found"));
        assert!(text.contains("Platelets (10^9/L)"));
    }

    #[test]
    fn test_csv_has_all_columns() {
        let result = LabReportParser::new().parse("ALT 22 U/L");
        let csv = format_csv(&result, &OutputConfig::default()).unwrap();
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("patient_name,sex,age,ast_ul,alt_ul"));
        assert_eq!(lines.next().unwrap(), ",,,,22,,,,,,,,");
    }
}
