//! Delimited text loader.

use async_trait::async_trait;
use datafusion::prelude::*;
use tracing::{info, instrument};

use super::{dotted_extension, ensure_file, register_materialized, DataSource};
use crate::error::{GuardError, Result};

/// Options for configuring delimited file reading.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Whether the file has a header row
    pub has_header: bool,
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
    /// Maximum records to read for schema inference
    pub schema_infer_max_records: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            quote: b'"',
            schema_infer_max_records: 1000,
        }
    }
}

/// A delimited text file.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: String,
    options: CsvOptions,
}

impl CsvSource {
    pub fn new(path: impl Into<String>) -> Self {
        Self::with_options(path, CsvOptions::default())
    }

    pub fn with_options(path: impl Into<String>, options: CsvOptions) -> Self {
        Self {
            path: path.into(),
            options,
        }
    }
}

#[async_trait]
impl DataSource for CsvSource {
    #[instrument(skip(self, ctx), fields(
        source.type = "csv",
        csv.delimiter = %self.options.delimiter as char,
        csv.has_header = self.options.has_header
    ))]
    async fn register(&self, ctx: &SessionContext, table_name: &str) -> Result<()> {
        info!(table.name = %table_name, "Loading delimited file");
        ensure_file(&self.path, "CSV").await?;

        let extension = dotted_extension(&self.path);
        let options = CsvReadOptions::new()
            .has_header(self.options.has_header)
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .schema_infer_max_records(self.options.schema_infer_max_records)
            .file_extension(&extension);

        let frame = ctx
            .read_csv(self.path.as_str(), options)
            .await
            .map_err(|e| GuardError::data_source_with_source("CSV", e.to_string(), Box::new(e)))?;

        register_materialized(ctx, table_name, "CSV", frame).await
    }

    fn description(&self) -> String {
        format!(
            "CSV file '{}' (delimiter {:?})",
            self.path, self.options.delimiter as char
        )
    }
}
