//! JSON loader for top-level arrays and newline-delimited records.

use std::sync::Arc;

use arrow::json::reader::{infer_json_schema_from_iterator, ReaderBuilder};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use datafusion::prelude::*;
use serde_json::Value;
use tracing::{debug, info, instrument};

use super::{
    dotted_extension, ensure_file, register_batches, register_materialized, DataSource,
};
use crate::error::{GuardError, Result};

/// Rows decoded per record batch for array-layout files.
const DECODE_BATCH_SIZE: usize = 8192;

/// How records are laid out in a JSON file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonLayout {
    /// A single top-level array of objects
    Array,
    /// One object per line
    Lines,
}

/// A JSON file of flat records.
#[derive(Debug, Clone)]
pub struct JsonSource {
    path: String,
    layout: JsonLayout,
}

impl JsonSource {
    pub fn new(path: impl Into<String>, layout: JsonLayout) -> Self {
        Self {
            path: path.into(),
            layout,
        }
    }

    async fn register_lines(&self, ctx: &SessionContext, table_name: &str) -> Result<()> {
        ensure_file(&self.path, "JSON").await?;
        let extension = dotted_extension(&self.path);
        let options = NdJsonReadOptions {
            file_extension: &extension,
            ..Default::default()
        };

        let frame = ctx
            .read_json(self.path.as_str(), options)
            .await
            .map_err(|e| GuardError::data_source_with_source("JSON", e.to_string(), Box::new(e)))?;

        register_materialized(ctx, table_name, "JSON", frame).await
    }

    async fn register_array(&self, ctx: &SessionContext, table_name: &str) -> Result<()> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| GuardError::data_source_with_source("JSON", e.to_string(), Box::new(e)))?;
        let records: Vec<Value> = serde_json::from_slice(strip_bom(&bytes)).map_err(|e| {
            GuardError::data_source_with_source("JSON", e.to_string(), Box::new(e))
        })?;

        let (schema, batches) = decode_records(&records)
            .map_err(|e| GuardError::data_source_with_source("JSON", e.to_string(), Box::new(e)))?;
        debug!(
            table = table_name,
            columns = schema.fields().len(),
            rows = records.len(),
            "Decoded JSON array"
        );

        register_batches(ctx, table_name, schema, batches)
    }
}

#[async_trait]
impl DataSource for JsonSource {
    #[instrument(skip(self, ctx), fields(source.type = "json", json.layout = ?self.layout))]
    async fn register(&self, ctx: &SessionContext, table_name: &str) -> Result<()> {
        info!(table.name = %table_name, "Loading JSON file");
        match self.layout {
            JsonLayout::Array => self.register_array(ctx, table_name).await,
            JsonLayout::Lines => self.register_lines(ctx, table_name).await,
        }
    }

    fn description(&self) -> String {
        let layout = match self.layout {
            JsonLayout::Array => "array",
            JsonLayout::Lines => "newline-delimited",
        };
        format!("JSON file '{}' ({layout})", self.path)
    }
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes)
}

/// Infers a schema over every record and decodes them into batches. An empty
/// array yields a table with no columns.
fn decode_records(
    records: &[Value],
) -> std::result::Result<(arrow::datatypes::SchemaRef, Vec<RecordBatch>), arrow::error::ArrowError>
{
    let schema = Arc::new(infer_json_schema_from_iterator(records.iter().map(Ok))?);
    if records.is_empty() {
        return Ok((schema, Vec::new()));
    }

    let mut decoder = ReaderBuilder::new(schema.clone())
        .with_batch_size(DECODE_BATCH_SIZE)
        .with_coerce_primitive(true)
        .build_decoder()?;

    let mut batches = Vec::new();
    for chunk in records.chunks(DECODE_BATCH_SIZE) {
        decoder.serialize(chunk)?;
        if let Some(batch) = decoder.flush()? {
            batches.push(batch);
        }
    }
    Ok((schema, batches))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    async fn count_rows(ctx: &SessionContext) -> usize {
        ctx.table("dataset")
            .await
            .unwrap()
            .collect()
            .await
            .unwrap()
            .iter()
            .map(|b| b.num_rows())
            .sum()
    }

    #[tokio::test]
    async fn test_array_layout() {
        let file = write_temp(
            ".json",
            r#"[{"id": "a", "amount": 1.5}, {"id": "b", "amount": null}, {"id": "c"}]"#,
        );
        let source = JsonSource::new(file.path().to_str().unwrap(), JsonLayout::Array);
        let ctx = SessionContext::new();
        source.register(&ctx, "dataset").await.unwrap();

        assert_eq!(count_rows(&ctx).await, 3);
        let schema = ctx.table("dataset").await.unwrap().schema().clone();
        assert!(schema.field_with_unqualified_name("amount").is_ok());
    }

    #[tokio::test]
    async fn test_empty_array_has_no_columns() {
        let file = write_temp(".json", "[]");
        let source = JsonSource::new(file.path().to_str().unwrap(), JsonLayout::Array);
        let ctx = SessionContext::new();
        source.register(&ctx, "dataset").await.unwrap();

        let frame = ctx.table("dataset").await.unwrap();
        assert_eq!(frame.schema().fields().len(), 0);
    }

    #[tokio::test]
    async fn test_lines_layout() {
        let file = write_temp(".jsonl", "{\"id\": \"a\"}\n{\"id\": \"b\"}\n");
        let source = JsonSource::new(file.path().to_str().unwrap(), JsonLayout::Lines);
        let ctx = SessionContext::new();
        source.register(&ctx, "dataset").await.unwrap();

        assert_eq!(count_rows(&ctx).await, 2);
    }

    #[tokio::test]
    async fn test_malformed_array_is_input_error() {
        let file = write_temp(".json", "[{\"id\": ");
        let source = JsonSource::new(file.path().to_str().unwrap(), JsonLayout::Array);
        let err = source
            .register(&SessionContext::new(), "dataset")
            .await
            .unwrap_err();
        assert!(err.is_input_error());
    }
}
