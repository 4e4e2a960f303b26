use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const REPORT: &str = "\
Patient Name: John Carter
Age: 61 years   Sex: M
AST 52 U/L   (5-40)
ALT 77 U/L
GGT 130 U/L
Triglycerides 2.0 mmol/L
Platelets 145 x10^9/L
Albumin 41 g/L
";

/// Command isolated from the user's configuration directory.
fn labscan(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("labscan").unwrap();
    cmd.env("XDG_CONFIG_HOME", home).env_remove("RUST_LOG");
    cmd
}

fn write_report(dir: &TempDir, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn process_text_report_as_json() {
    let dir = TempDir::new().unwrap();
    let report = write_report(&dir, "report.txt", REPORT);

    labscan(dir.path())
        .arg("process")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"patient_name\": \"John Carter\""))
        .stdout(predicate::str::contains("\"age\": 61"))
        .stdout(predicate::str::contains("\"sex\": \"M\""))
        .stdout(predicate::str::contains("\"uln_ast\": 40"))
        .stdout(predicate::str::contains("\"albumin_gdl\": 4.1"))
        .stdout(predicate::str::contains("\"tg_mgdl\": 177.14"));
}

#[test]
fn process_text_report_as_csv() {
    let dir = TempDir::new().unwrap();
    let report = write_report(&dir, "report.txt", "ALT 35 U/L\nPlatelets 1500 K/uL\n");

    labscan(dir.path())
        .args(["process", "--format", "csv"])
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("patient_name,sex,age,ast_ul,alt_ul"))
        .stdout(predicate::str::contains(",,,,35,,,1000,"));
}

#[test]
fn process_shows_tiers() {
    let dir = TempDir::new().unwrap();
    let report = write_report(&dir, "report.txt", "AST 30 U/L\nGGT 44\n");

    labscan(dir.path())
        .args(["process", "--format", "text", "--show-tiers"])
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("AST (U/L)"))
        .stdout(predicate::str::contains("strict"))
        .stdout(predicate::str::contains("loose"))
        .stdout(predicate::str::contains("Not found"));
}

#[test]
fn process_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let report = write_report(&dir, "report.txt", REPORT);
    let output = dir.path().join("out.json");

    labscan(dir.path())
        .arg("process")
        .arg(&report)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
    assert_eq!(json["values"]["ast_ul"], serde_json::json!(52.0));
    assert_eq!(json["tiers"]["ast_ul"], "strict");
}

#[test]
fn process_unreadable_pdf_gives_empty_values() {
    let dir = TempDir::new().unwrap();
    let report = write_report(&dir, "scan.pdf", "not really a pdf");

    labscan(dir.path())
        .arg("process")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"values\": {}"))
        .stderr(predicate::str::contains("entered manually"));
}

#[test]
fn process_missing_file_fails() {
    let dir = TempDir::new().unwrap();

    labscan(dir.path())
        .args(["process", "does-not-exist.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn process_unsupported_extension_fails() {
    let dir = TempDir::new().unwrap();
    let report = write_report(&dir, "report.docx", REPORT);

    labscan(dir.path())
        .arg("process")
        .arg(&report)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}

#[test]
fn table_normalizes_rows() {
    let dir = TempDir::new().unwrap();
    let table = write_report(
        &dir,
        "patients.csv",
        "id,Age,Sex,AST,Platelets,Albumin\n\
         p1,47.9,female,41,1500,3.9\n\
         p2,130,m,n/a,210,\n",
    );

    labscan(dir.path())
        .arg("table")
        .arg(&table)
        .assert()
        .success()
        .stdout(predicate::str::contains("sex,age,ast_ul,platelets,albumin_gdl"))
        .stdout(predicate::str::contains("F,47,41,1000,3.9"))
        .stdout(predicate::str::contains("M,120,,210,"));
}

#[test]
fn table_jsonl_output() {
    let dir = TempDir::new().unwrap();
    let table = write_report(&dir, "patients.csv", "waist,diabetes\n102,yes\n");

    labscan(dir.path())
        .args(["table", "--jsonl"])
        .arg(&table)
        .assert()
        .success()
        .stdout(predicate::str::contains("{\"waist_cm\":102.0,\"diab_ifg\":1}"));
}

#[test]
fn table_without_known_columns_fails() {
    let dir = TempDir::new().unwrap();
    let table = write_report(&dir, "other.csv", "foo,bar\n1,2\n");

    labscan(dir.path())
        .arg("table")
        .arg(&table)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No recognized columns"));
}

#[test]
fn batch_writes_outputs_and_summary() {
    let dir = TempDir::new().unwrap();
    let inputs = dir.path().join("in");
    fs::create_dir(&inputs).unwrap();
    fs::write(inputs.join("a.txt"), REPORT).unwrap();
    fs::write(inputs.join("b.txt"), "AST 25 U/L\n").unwrap();
    let out = dir.path().join("out");

    labscan(dir.path())
        .arg("batch")
        .arg(format!("{}/*.txt", inputs.display()))
        .arg("--output-dir")
        .arg(&out)
        .args(["--summary", "-j", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 successful"));

    assert!(out.join("a.json").exists());
    assert!(out.join("b.json").exists());

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    let lines: Vec<_> = summary.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("filename,status,patient_name"));
    assert!(lines[1].starts_with("a.txt,success,John Carter"));
    assert!(lines[2].starts_with("b.txt,success"));
}

#[test]
fn batch_no_matches_fails() {
    let dir = TempDir::new().unwrap();

    labscan(dir.path())
        .arg("batch")
        .arg(format!("{}/*.pdf", dir.path().display()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn config_init_set_get() {
    let dir = TempDir::new().unwrap();

    labscan(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("labscan"))
        .stdout(predicate::str::contains("not created"));

    labscan(dir.path()).args(["config", "init"]).assert().success();
    assert!(dir.path().join("labscan").join("config.json").exists());

    labscan(dir.path())
        .args(["config", "set", "output.format", "csv"])
        .assert()
        .success();

    labscan(dir.path())
        .args(["config", "get", "output.format"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"csv\""));

    labscan(dir.path())
        .args(["config", "set", "output.format", "xml"])
        .assert()
        .failure();
}

#[test]
fn configured_format_is_used() {
    let dir = TempDir::new().unwrap();
    let report = write_report(&dir, "report.txt", "ALT 35 U/L\n");
    let config = dir.path().join("custom.json");
    fs::write(&config, r#"{"output": {"format": "text"}}"#).unwrap();

    labscan(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("process")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("Lab values:"));
}
