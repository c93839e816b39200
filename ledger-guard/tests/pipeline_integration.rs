//! End-to-end tests: upload-shaped files through the full pipeline.

use std::io::Write;

use ledger_guard::prelude::*;
use ledger_guard::rules::Dimension;
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    path
}

const SCENARIO_CSV: &str = "\
transaction_id,amount,date,customer_email,credit_card_pan
tx1,100,2023-01-01,alice@example.com,4111-1111-1111-1111
tx2,-50,2023-01-02,,4111-1111-1111-1111
tx3,200,2023/01/03,fail,5500-0000-0000-0004
tx3,30,2023-01-04,dave@example.com,5500-0000-0000-0004
";

#[tokio::test]
async fn test_scenario_csv() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "ledger.csv", SCENARIO_CSV);

    let response = HealthPipeline::new().analyze_file(&path, None).await.unwrap();
    assert_eq!(response.filename, "ledger.csv");
    assert_eq!(response.metadata.total_rows, 4);
    assert_eq!(response.metadata.total_columns, 5);

    let results = &response.scores.rule_results;
    assert_eq!(results.len(), 30);

    let transaction_id = &results["uniqueness_transaction_id"];
    assert_eq!(transaction_id.score, 75.0);
    assert!(!transaction_id.passed);

    assert!(!results["accuracy_negative_amounts"].passed);
    assert_eq!(results["security_pan_storage"].score, 0.0);
    assert!(!results["security_pan_storage"].passed);
    assert!(results["security_cvv_storage"].passed);

    assert!(response.scores.overall_score < 100.0);
    assert_eq!(response.scores.health_score, response.scores.overall_score);
    assert!(response.scores.dimension_score(Dimension::Security).unwrap() < 100.0);

    // Dates are 2023, far past the freshness window
    assert!(!results["timeliness_dataset_age"].passed);
    assert_eq!(response.analysis, Advice::skipped());
}

#[tokio::test]
async fn test_metadata_never_carries_cell_values() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "ledger.csv", SCENARIO_CSV);

    let response = HealthPipeline::new().analyze_file(&path, None).await.unwrap();
    assert!(!response.metadata.column("credit_card_pan").unwrap().is_numeric());

    // Text cells never reach the profile; numeric columns keep only extrema
    let json = serde_json::to_string(&response).unwrap();
    for value in ["4111-1111-1111-1111", "alice@example.com", "tx1"] {
        assert!(!json.contains(value), "{value} leaked into the response");
    }
}

#[tokio::test]
async fn test_empty_json_array() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "empty.json", "[]");

    let response = HealthPipeline::new().analyze_file(&path, None).await.unwrap();
    assert_eq!(response.metadata.total_rows, 0);
    assert_eq!(response.metadata.total_columns, 0);
    assert!(response.metadata.columns().is_empty());
    assert_eq!(response.scores.rule_results.len(), 30);
    assert!(response.scores.overall_score.is_finite());
    assert!(response.scores.rule_results["security_pan_storage"].passed);
}

#[tokio::test]
async fn test_header_only_csv() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "empty.csv", "transaction_id,amount\n");

    let response = HealthPipeline::new().analyze_file(&path, None).await.unwrap();
    assert_eq!(response.metadata.total_rows, 0);
    assert_eq!(response.scores.rule_results.len(), 30);
    for result in response.scores.rule_results.values() {
        assert!((0.0..=100.0).contains(&result.score), "{}", result.rule_id);
    }
}

#[tokio::test]
async fn test_spreadsheet_rejected_before_profiling() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "ledger.xlsx", "PK\u{3}\u{4}");

    let err = HealthPipeline::new()
        .analyze_file(&path, None)
        .await
        .unwrap_err();
    assert!(matches!(err, GuardError::UnsupportedFormat { ref extension } if extension == "xlsx"));
    assert!(err.is_input_error());
}

#[tokio::test]
async fn test_json_output_shape() {
    use ledger_guard::formatters::JsonFormatter;

    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "ledger.csv", SCENARIO_CSV);
    let response = HealthPipeline::new().analyze_file(&path, None).await.unwrap();

    let rendered = JsonFormatter::new().format(&response).unwrap();
    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(value["filename"], "ledger.csv");
    assert_eq!(value["metadata"]["total_rows"], 4);
    assert!(value["metadata"]["columns"]["credit_card_pan"].is_object());
    assert_eq!(value["scores"]["dimension_scores"].as_object().unwrap().len(), 8);
    assert_eq!(
        value["analysis"]["executive_summary"],
        "AI analysis skipped (GOOGLE_API_KEY not set)."
    );
}

#[tokio::test]
async fn test_missing_upload_is_input_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("never-written.csv");

    let err = HealthPipeline::new()
        .analyze_file(&path, None)
        .await
        .unwrap_err();
    assert!(err.is_input_error(), "{err}");
}

#[tokio::test]
async fn test_blank_header_column_is_profiled() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "ledger.csv",
        "transaction_id,,amount\ntx1,x,10\ntx2,y,20\n",
    );

    let response = HealthPipeline::new().analyze_file(&path, None).await.unwrap();
    assert_eq!(
        response.metadata.column_names().collect::<Vec<_>>(),
        vec!["transaction_id", "Unnamed: 1", "amount"]
    );
    assert_eq!(response.scores.rule_results["uniqueness_transaction_id"].score, 100.0);
}
