//! Common in-memory datasets for tests and benchmarks.
//!
//! Compiled for unit tests and for dependents enabling the `test-utils`
//! feature.

use std::sync::Arc;

use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use datafusion::common::TableReference;
use datafusion::datasource::MemTable;
use datafusion::prelude::*;

use crate::error::Result;

/// Table name the fixtures are registered under.
pub const FIXTURE_TABLE: &str = "dataset";

/// Schema of the four-row transaction scenario.
pub fn scenario_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("transaction_id", DataType::Utf8, true),
        Field::new("amount", DataType::Float64, true),
        Field::new("date", DataType::Utf8, true),
        Field::new("customer_email", DataType::Utf8, true),
        Field::new("credit_card_pan", DataType::Utf8, true),
        Field::new("notes", DataType::Utf8, true),
    ]))
}

/// Four transactions with a duplicate id, a negative amount, one non-ISO
/// date, a missing and a malformed email, a stored card number and an empty
/// notes column.
#[allow(clippy::expect_used)]
pub fn scenario_batches() -> Vec<RecordBatch> {
    let batch = RecordBatch::try_new(
        scenario_schema(),
        vec![
            Arc::new(StringArray::from(vec!["tx1", "tx2", "tx3", "tx3"])),
            Arc::new(Float64Array::from(vec![100.0, -50.0, 200.0, 30.0])),
            Arc::new(StringArray::from(vec![
                "2023-01-01",
                "2023-01-02",
                "2023/01/03",
                "2023-01-04",
            ])),
            Arc::new(StringArray::from(vec![
                Some("alice@example.com"),
                None,
                Some("fail"),
                Some("dave@example.com"),
            ])),
            Arc::new(StringArray::from(vec![
                "4111111111111111",
                "4111111111111111",
                "5500000000000004",
                "5500000000000004",
            ])),
            Arc::new(StringArray::from(vec![None::<&str>, None, None, None])),
        ],
    )
    .expect("Scenario fixture should match its schema");
    vec![batch]
}

/// Registers `batches` under [`FIXTURE_TABLE`] in a fresh context.
pub fn context_with(schema: SchemaRef, batches: Vec<RecordBatch>) -> Result<SessionContext> {
    let ctx = SessionContext::new();
    let table = MemTable::try_new(schema, vec![batches])?;
    ctx.register_table(TableReference::bare(FIXTURE_TABLE), Arc::new(table))?;
    Ok(ctx)
}

/// Creates a context holding the four-row transaction scenario.
pub fn create_scenario_context() -> Result<SessionContext> {
    context_with(scenario_schema(), scenario_batches())
}

/// Creates a context holding a well-formed dataset of `rows` transactions.
///
/// Every rule that can be computed from a profile passes except timeliness,
/// which depends on the evaluation date (dates start at 2024-01-01).
#[allow(clippy::expect_used)]
pub fn create_compliant_context(rows: usize) -> Result<SessionContext> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("transaction_id", DataType::Utf8, false),
        Field::new("customer_id", DataType::Utf8, false),
        Field::new("amount", DataType::Float64, false),
        Field::new("currency", DataType::Utf8, false),
        Field::new("country", DataType::Utf8, false),
        Field::new("transaction_date", DataType::Utf8, false),
        Field::new("billing_address", DataType::Utf8, false),
        Field::new("source_of_funds", DataType::Utf8, false),
        Field::new("created_at", DataType::Utf8, false),
        Field::new("device_fingerprint", DataType::Utf8, false),
        Field::new("customer_email", DataType::Utf8, false),
    ]));

    let ids: Vec<String> = (0..rows).map(|i| format!("tx{i:06}")).collect();
    let customers: Vec<String> = (0..rows).map(|i| format!("c{:04}", i % 500)).collect();
    let amounts: Vec<f64> = (0..rows).map(|i| 10.0 + (i % 1000) as f64).collect();
    let currencies: Vec<&str> = (0..rows).map(|i| ["USD", "EUR", "GBP"][i % 3]).collect();
    let countries: Vec<&str> = (0..rows).map(|i| ["US", "DE", "GB"][i % 3]).collect();
    let dates: Vec<String> = (0..rows)
        .map(|i| format!("2024-01-{:02}", i % 28 + 1))
        .collect();
    let addresses: Vec<String> = (0..rows).map(|i| format!("{i} Main Street")).collect();
    let sources: Vec<&str> = (0..rows).map(|i| ["salary", "savings"][i % 2]).collect();
    let created: Vec<String> = dates.iter().map(|d| format!("{d}T09:00:00")).collect();
    let devices: Vec<String> = (0..rows).map(|i| format!("dev-{:x}", i % 64)).collect();
    let emails: Vec<String> = (0..rows)
        .map(|i| format!("user{}@example.com", i % 500))
        .collect();

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(StringArray::from(customers)),
            Arc::new(Float64Array::from(amounts)),
            Arc::new(StringArray::from(currencies)),
            Arc::new(StringArray::from(countries)),
            Arc::new(StringArray::from(dates)),
            Arc::new(StringArray::from(addresses)),
            Arc::new(StringArray::from(sources)),
            Arc::new(StringArray::from(created)),
            Arc::new(StringArray::from(devices)),
            Arc::new(StringArray::from(emails)),
        ],
    )
    .expect("Compliant fixture should match its schema");

    context_with(schema, vec![batch])
}
