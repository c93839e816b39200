//! Parquet loader.

use async_trait::async_trait;
use datafusion::prelude::*;
use tracing::{info, instrument};

use super::{dotted_extension, ensure_file, register_materialized, DataSource};
use crate::error::{GuardError, Result};

/// A single Parquet file.
#[derive(Debug, Clone)]
pub struct ParquetSource {
    path: String,
}

impl ParquetSource {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DataSource for ParquetSource {
    #[instrument(skip(self, ctx), fields(source.type = "parquet"))]
    async fn register(&self, ctx: &SessionContext, table_name: &str) -> Result<()> {
        info!(table.name = %table_name, "Loading Parquet file");
        ensure_file(&self.path, "Parquet").await?;

        let extension = dotted_extension(&self.path);
        let options = ParquetReadOptions {
            file_extension: &extension,
            ..Default::default()
        };

        let frame = ctx
            .read_parquet(self.path.as_str(), options)
            .await
            .map_err(|e| {
                GuardError::data_source_with_source("Parquet", e.to_string(), Box::new(e))
            })?;

        register_materialized(ctx, table_name, "Parquet", frame).await
    }

    fn description(&self) -> String {
        format!("Parquet file '{}'", self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::create_scenario_context;
    use datafusion::dataframe::DataFrameWriteOptions;

    #[tokio::test]
    async fn test_round_trip_through_parquet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.parquet");
        let path = path.to_str().unwrap();

        let scenario = create_scenario_context().unwrap();
        scenario
            .table("dataset")
            .await
            .unwrap()
            .write_parquet(
                path,
                DataFrameWriteOptions::new().with_single_file_output(true),
                None,
            )
            .await
            .unwrap();

        let ctx = SessionContext::new();
        let source = ParquetSource::new(path);
        source.register(&ctx, "dataset").await.unwrap();

        let frame = ctx.table("dataset").await.unwrap();
        assert_eq!(frame.schema().fields().len(), 6);
        assert_eq!(frame.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_not_parquet_is_input_error() {
        let mut file = tempfile::Builder::new()
            .suffix(".parquet")
            .tempfile()
            .unwrap();
        std::io::Write::write_all(&mut file, b"id,amount\n1,2\n").unwrap();

        let source = ParquetSource::new(file.path().to_str().unwrap());
        let err = source
            .register(&SessionContext::new(), "dataset")
            .await
            .unwrap_err();
        assert!(err.is_input_error());
    }
}
