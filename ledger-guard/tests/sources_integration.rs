//! Integration tests for the file loaders.

use std::fs::File;
use std::io::Write;
use std::sync::Arc;

use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use datafusion::parquet::arrow::ArrowWriter;
use datafusion::prelude::*;
use ledger_guard::prelude::*;
use ledger_guard::profiler::ValueCategory;
use ledger_guard::sources::{source_for, DatasetFormat, JsonLayout};
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    path
}

async fn load_and_profile(path: &std::path::Path) -> DatasetProfile {
    let ctx = SessionContext::new();
    load_file(&ctx, path, "dataset").await.unwrap();
    ColumnProfiler::new().profile(&ctx, "dataset").await.unwrap()
}

#[tokio::test]
async fn test_csv_upload() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "payments.CSV",
        "payment_id,amount,currency\np1,10.5,USD\np2,,EUR\np3,7,GBP\n",
    );

    let profile = load_and_profile(&path).await;
    assert_eq!(profile.total_rows, 3);
    assert_eq!(profile.total_columns, 3);

    let amount = profile.column("amount").unwrap();
    assert_eq!(amount.value_category, ValueCategory::Numeric);
    assert_eq!(amount.null_count, 1);
}

#[tokio::test]
async fn test_tsv_upload() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "payments.tsv", "id\tamount\na\t1\nb\t2\n");

    let profile = load_and_profile(&path).await;
    assert_eq!(profile.total_rows, 2);
    assert_eq!(
        profile.column_names().collect::<Vec<_>>(),
        vec!["id", "amount"]
    );
}

#[tokio::test]
async fn test_json_array_upload() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "payments.json",
        r#"[
            {"id": "a", "email": "a@example.com", "amount": 1},
            {"id": "b", "email": null, "amount": 2.5},
            {"id": "c", "email": "c@example.com"}
        ]"#,
    );
    assert_eq!(
        DatasetFormat::from_path(&path).unwrap(),
        DatasetFormat::Json(JsonLayout::Array)
    );

    let profile = load_and_profile(&path).await;
    assert_eq!(profile.total_rows, 3);
    assert_eq!(profile.column("email").unwrap().null_count, 1);
    assert_eq!(profile.column("amount").unwrap().null_count, 1);
}

#[tokio::test]
async fn test_ndjson_upload() {
    let dir = TempDir::new().unwrap();
    let contents = "{\"id\": \"a\", \"amount\": 1}\n{\"id\": \"b\", \"amount\": -2}\n{\"id\": \"c\", \"amount\": 3}\n";

    for name in ["payments.json", "payments.jsonl", "payments.ndjson"] {
        let path = write_file(&dir, name, contents);
        let profile = load_and_profile(&path).await;
        assert_eq!(profile.total_rows, 3, "{name}");
        assert_eq!(
            profile.column("amount").unwrap().numeric.as_ref().unwrap().negative_count,
            1
        );
    }
}

#[tokio::test]
async fn test_parquet_upload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("payments.parquet");

    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("amount", DataType::Float64, true),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(vec!["a", "b"])),
            Arc::new(Float64Array::from(vec![Some(1.0), None])),
        ],
    )
    .unwrap();
    let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let profile = load_and_profile(&path).await;
    assert_eq!(profile.total_rows, 2);
    assert_eq!(profile.column("amount").unwrap().null_percentage, 50.0);
}

#[test]
fn test_unsupported_extensions() {
    for name in ["report.xlsx", "report.XLS", "report.pdf", "report"] {
        let err = source_for(name).unwrap_err();
        assert!(matches!(err, GuardError::UnsupportedFormat { .. }), "{name}");
        assert!(err.to_string().contains("Unsupported file format"));
    }
}

#[tokio::test]
async fn test_malformed_files_are_input_errors() {
    let dir = TempDir::new().unwrap();
    let broken_json = write_file(&dir, "broken.json", "[{\"id\": 1},");
    let broken_lines = write_file(&dir, "broken.jsonl", "{\"id\": 1}\n{not json}\n");

    for path in [broken_json, broken_lines] {
        let ctx = SessionContext::new();
        let err = load_file(&ctx, &path, "dataset").await.unwrap_err();
        assert!(err.is_input_error(), "{}: {err}", path.display());
    }

    let ctx = SessionContext::new();
    let missing = dir.path().join("missing.csv");
    let err = load_file(&ctx, &missing, "dataset").await.unwrap_err();
    assert!(err.is_input_error());
}
