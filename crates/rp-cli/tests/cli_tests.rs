//! End-to-end tests of the `rp` binary against a temporary project

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const PIPELINE_YML: &str = r#"
name: cli_test
generator:
  seed: 5
  stores: 3
  products: 25
  customers: 12
  days: 3
  end_date: "2024-04-10"
  dirty_rate: 0.1
  volume:
    weekday_min: 3
    weekday_max: 5
    weekend_min: 4
    weekend_max: 6
targets:
  scratch:
    database:
      path: ":memory:"
"#;

/// Path to the compiled rp binary
fn rp_bin() -> String {
    env!("CARGO_BIN_EXE_rp").to_string()
}

/// Run `rp -p <project> <args>`
fn run_rp(project: &Path, args: &[&str]) -> Output {
    Command::new(rp_bin())
        .arg("-p")
        .arg(project)
        .args(args)
        .env_remove("RP_TARGET")
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("Failed to execute rp with args {:?}: {}", args, e))
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("pipeline.yml"), PIPELINE_YML).unwrap();
    dir
}

#[test]
fn test_ls_lists_builtin_models_without_a_warehouse() {
    let dir = project();
    let output = run_rp(dir.path(), &["ls", "--output", "json"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let models: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let models = models.as_array().unwrap();
    assert_eq!(models.len(), 8);
    let fact = models.iter().find(|m| m["name"] == "fact_sales").unwrap();
    assert_eq!(fact["materialized"], "table");
    assert_eq!(fact["relation"], "analytics.fact_sales");
    assert!(!dir.path().join("warehouse.duckdb").exists());
}

#[test]
fn test_unknown_target_is_a_general_error() {
    let dir = project();
    let output = run_rp(dir.path(), &["--target", "nope", "run"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Target 'nope' not found"));
}

#[test]
fn test_dashboard_requires_materialized_models() {
    let dir = project();
    let output = run_rp(dir.path(), &["--target", "scratch", "dashboard"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("rp run"));
}

#[test]
fn test_load_without_generated_files_is_a_load_error() {
    let dir = project();
    let output = run_rp(dir.path(), &["load"]);
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_pipeline_then_dashboard_and_failing_assertion() {
    let dir = project();

    let output = run_rp(dir.path(), &["pipeline"]);
    assert!(
        output.status.success(),
        "stdout:\n{}\nstderr:\n{}",
        stdout(&output),
        String::from_utf8_lossy(&output.stderr)
    );
    let text = stdout(&output);
    assert!(text.contains("=== Phase 4/4: Test ==="));
    assert!(text.contains("Pipeline completed successfully."));
    assert!(dir.path().join("data").join("stores.csv").exists());

    let run_results: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("target/run_results.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(run_results["success_count"], 8);
    assert_eq!(run_results["results"].as_array().unwrap().len(), 8);
    assert!(dir.path().join("target/test_results.json").exists());

    let output = run_rp(dir.path(), &["dashboard", "--output", "json"]);
    assert!(output.status.success());
    let snapshot: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(snapshot["panels"].as_array().unwrap().len(), 9);
    assert_eq!(snapshot["filters"]["date_range"]["end"], "2024-04-10");

    let output = run_rp(dir.path(), &["dashboard"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("== Key Performance Indicators =="));

    let output = run_rp(dir.path(), &["dashboard", "--list-filters", "--output", "json"]);
    let options: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(!options["store_types"].as_array().unwrap().is_empty());

    let assertions = dir.path().join("assertions");
    std::fs::create_dir_all(&assertions).unwrap();
    std::fs::write(
        assertions.join("assert_no_sales.sql"),
        "SELECT sale_key FROM {{ ref('fact_sales') }}",
    )
    .unwrap();

    let output = run_rp(dir.path(), &["test"]);
    assert_eq!(output.status.code(), Some(2));
    let text = stdout(&output);
    assert!(text.contains("✗ assert_no_sales"));
    assert!(text.contains("Sample failing rows:"));

    let output = run_rp(dir.path(), &["test", "--select", "stg_stores"]);
    assert!(output.status.success(), "{}", stdout(&output));
    assert!(!stdout(&output).contains("assert_no_sales"));
}
