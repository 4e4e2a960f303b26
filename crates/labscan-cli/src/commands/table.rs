//! Table command - normalize manually entered values from a CSV file.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::{debug, info};

use labscan_core::labs::{LabReportParser, TableMapper};
use labscan_core::models::lab::FieldKey;

use super::load_config;
use super::process::format_value;

/// Arguments for the table command.
#[derive(Args)]
pub struct TableArgs {
    /// Input CSV file with a header row
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write JSON lines instead of CSV
    #[arg(long)]
    jsonl: bool,
}

pub async fn run(args: TableArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(&args.input)?;

    let mapper = TableMapper::from_headers(rdr.headers()?.iter());

    // Output columns in canonical field order
    let mut columns = mapper.recognized();
    columns.sort();
    columns.dedup();

    if columns.is_empty() {
        anyhow::bail!("No recognized columns in {}", args.input.display());
    }
    info!(
        "Recognized columns: {}",
        columns.iter().map(FieldKey::as_str).collect::<Vec<_>>().join(", ")
    );

    let parser = LabReportParser::from_config(&config);

    let mut csv_out = csv::Writer::from_writer(vec![]);
    let mut jsonl_out = Vec::new();
    if !args.jsonl {
        csv_out.write_record(columns.iter().map(FieldKey::as_str))?;
    }

    let mut rows = 0usize;
    for record in rdr.records() {
        let record = record?;
        let result = parser.parse_row(&mapper, record.iter());
        debug!("Row {}: {} values", rows + 1, result.len());

        if args.jsonl {
            serde_json::to_writer(&mut jsonl_out, &result.values)?;
            jsonl_out.push(b'\n');
        } else {
            csv_out.write_record(columns.iter().map(|k| {
                result
                    .get(*k)
                    .map(|v| format_value(v, config.output.decimal_places))
                    .unwrap_or_default()
            }))?;
        }
        rows += 1;
    }

    let data = if args.jsonl {
        jsonl_out
    } else {
        csv_out.into_inner()?
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &data)?;
        println!(
            "{} Wrote {} rows to {}",
            style("✓").green(),
            rows,
            output_path.display()
        );
    } else {
        std::io::stdout().write_all(&data)?;
    }

    Ok(())
}
