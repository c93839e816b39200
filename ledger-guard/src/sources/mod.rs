//! Dataset loaders for uploaded files.
//!
//! A file is decoded by the loader its extension selects and registered in a
//! DataFusion context as an in-memory table. Decoding happens eagerly, so a
//! malformed file is reported as an input error before profiling starts.
//!
//! | Extension | Loader |
//! |---|---|
//! | `.csv`, `.txt` | [`CsvSource`], comma-delimited |
//! | `.tsv` | [`CsvSource`], tab-delimited |
//! | `.json` | [`JsonSource`], array or newline-delimited (sniffed) |
//! | `.jsonl`, `.ndjson` | [`JsonSource`], newline-delimited |
//! | `.parquet` | [`ParquetSource`] |
//!
//! Spreadsheets (`.xls`, `.xlsx`) and anything else are rejected with
//! [`GuardError::UnsupportedFormat`].

use std::collections::HashSet;
use std::fmt::Debug;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use arrow::datatypes::{Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use datafusion::common::TableReference;
use datafusion::dataframe::DataFrame;
use datafusion::datasource::MemTable;
use datafusion::prelude::SessionContext;
use tracing::{debug, instrument};

use crate::error::{GuardError, Result};

mod csv;
mod json;
mod parquet;

pub use csv::{CsvOptions, CsvSource};
pub use json::{JsonLayout, JsonSource};
pub use parquet::ParquetSource;

/// Bytes inspected when sniffing the layout of a `.json` file.
const SNIFF_CHUNK: usize = 4096;

/// A decodable dataset that can be registered with a DataFusion context.
#[async_trait]
pub trait DataSource: Debug + Send + Sync {
    /// Decodes the source and registers it as `table_name`.
    async fn register(&self, ctx: &SessionContext, table_name: &str) -> Result<()>;

    /// Returns a human-readable description of this data source.
    fn description(&self) -> String;
}

/// The decoder an uploaded file is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Delimited { delimiter: u8 },
    Json(JsonLayout),
    Parquet,
}

impl DatasetFormat {
    /// Chooses a format from the file extension, case-insensitively.
    ///
    /// `.json` files are opened to tell a top-level array from
    /// newline-delimited objects.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = extension_of(path);

        match extension.as_str() {
            "csv" | "txt" => Ok(DatasetFormat::Delimited { delimiter: b',' }),
            "tsv" => Ok(DatasetFormat::Delimited { delimiter: b'\t' }),
            "jsonl" | "ndjson" => Ok(DatasetFormat::Json(JsonLayout::Lines)),
            "json" => Ok(DatasetFormat::Json(sniff_json_layout(path)?)),
            "parquet" => Ok(DatasetFormat::Parquet),
            _ => Err(GuardError::UnsupportedFormat { extension }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DatasetFormat::Delimited { .. } => "CSV",
            DatasetFormat::Json(_) => "JSON",
            DatasetFormat::Parquet => "Parquet",
        }
    }
}

/// Builds the loader for `path`.
pub fn source_for(path: impl AsRef<Path>) -> Result<Box<dyn DataSource>> {
    let path = path.as_ref();
    let location = path_str(path)?;

    let source: Box<dyn DataSource> = match DatasetFormat::from_path(path)? {
        DatasetFormat::Delimited { delimiter } => Box::new(CsvSource::with_options(
            location,
            CsvOptions {
                delimiter,
                ..CsvOptions::default()
            },
        )),
        DatasetFormat::Json(layout) => Box::new(JsonSource::new(location, layout)),
        DatasetFormat::Parquet => Box::new(ParquetSource::new(location)),
    };
    Ok(source)
}

/// Decodes the file at `path` and registers it as `table_name`.
#[instrument(skip(ctx, path), fields(path = %path.as_ref().display()))]
pub async fn load_file(
    ctx: &SessionContext,
    path: impl AsRef<Path>,
    table_name: &str,
) -> Result<()> {
    let source = source_for(path)?;
    debug!(source = %source.description(), "Selected loader");
    source.register(ctx, table_name).await
}

/// Lowercased extension without the dot; empty when absent.
fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

/// The path's extension as written, with its dot, for engine file listing.
fn dotted_extension(path: &str) -> String {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}

fn path_str(path: &Path) -> Result<String> {
    path.to_str()
        .map(str::to_string)
        .ok_or_else(|| GuardError::Configuration("Path contains invalid UTF-8".to_string()))
}

fn sniff_json_layout(path: &Path) -> Result<JsonLayout> {
    let mut file = std::fs::File::open(path).map_err(|e| {
        GuardError::data_source_with_source("JSON", e.to_string(), Box::new(e))
    })?;

    let mut buffer = [0u8; SNIFF_CHUNK];
    let mut at_start = true;
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            return Ok(JsonLayout::Array);
        }

        let mut chunk = &buffer[..read];
        if at_start {
            chunk = chunk.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(chunk);
            at_start = false;
        }

        if let Some(first) = chunk.iter().find(|b| !b.is_ascii_whitespace()) {
            return Ok(if *first == b'[' {
                JsonLayout::Array
            } else {
                JsonLayout::Lines
            });
        }
    }
}

/// Fails with a data source error unless `path` names a readable regular
/// file. The engine's listing tables treat a missing path as an empty file set.
pub(crate) async fn ensure_file(path: &str, source_type: &str) -> Result<()> {
    let metadata = tokio::fs::metadata(path).await.map_err(|e| {
        GuardError::data_source_with_source(
            source_type,
            format!("Cannot open '{path}': {e}"),
            Box::new(e),
        )
    })?;

    if !metadata.is_file() {
        return Err(GuardError::data_source(
            source_type,
            format!("'{path}' is not a regular file"),
        ));
    }
    Ok(())
}

/// Materializes `frame` and registers the batches as an in-memory table.
///
/// Any failure while decoding is reported as a data source error.
pub(crate) async fn register_materialized(
    ctx: &SessionContext,
    table_name: &str,
    source_type: &str,
    frame: DataFrame,
) -> Result<()> {
    let schema = frame.schema().inner().clone();
    let batches = frame
        .collect()
        .await
        .map_err(|e| GuardError::data_source_with_source(source_type, e.to_string(), Box::new(e)))?;

    register_batches(ctx, table_name, schema, batches)
}

/// Registers decoded batches as `table_name`, labelling unnamed columns first.
pub(crate) fn register_batches(
    ctx: &SessionContext,
    table_name: &str,
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
) -> Result<()> {
    let (schema, batches) = label_columns(schema, batches)?;

    let rows: usize = batches.iter().map(|batch| batch.num_rows()).sum();
    debug!(
        table = table_name,
        columns = schema.fields().len(),
        rows,
        "Materialized dataset"
    );

    let table = MemTable::try_new(schema, vec![batches])?;
    ctx.register_table(TableReference::bare(table_name), Arc::new(table))?;
    Ok(())
}

/// Names blank headers `Unnamed: <position>` and suffixes repeated names with
/// `.1`, `.2`, ... so every column can be addressed on its own.
fn label_columns(
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let names = column_labels(schema.fields().iter().map(|field| field.name().as_str()));
    if names
        .iter()
        .zip(schema.fields().iter())
        .all(|(name, field)| name == field.name())
    {
        return Ok((schema, batches));
    }

    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .zip(names)
        .map(|(field, name)| Field::clone(field).with_name(name))
        .collect();
    let relabelled = Arc::new(Schema::new_with_metadata(fields, schema.metadata().clone()));
    debug!(
        columns = relabelled.fields().len(),
        "Relabelled blank or repeated column names"
    );

    let batches = batches
        .into_iter()
        .map(|batch| RecordBatch::try_new(relabelled.clone(), batch.columns().to_vec()))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((relabelled, batches))
}

fn column_labels<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let names: Vec<String> = names
        .enumerate()
        .map(|(position, name)| {
            if name.trim().is_empty() {
                format!("Unnamed: {position}")
            } else {
                name.to_string()
            }
        })
        .collect();

    let mut taken: HashSet<String> = HashSet::with_capacity(names.len());
    let mut labels = Vec::with_capacity(names.len());
    for name in &names {
        let mut label = name.clone();
        let mut suffix = 1;
        while taken.contains(&label) || (label != *name && names.contains(&label)) {
            label = format!("{name}.{suffix}");
            suffix += 1;
        }
        taken.insert(label.clone());
        labels.push(label);
    }
    labels
}
