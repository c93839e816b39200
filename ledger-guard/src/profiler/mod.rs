//! Column profiling over DataFusion tables.
//!
//! The [`ColumnProfiler`] turns a registered table into a [`DatasetProfile`]
//! by issuing aggregate SQL per column:
//!
//! - null and distinct counts for every column
//! - min / max / mean / negative count for numeric columns
//! - full-value match counts of the fixed [`ValuePattern`] set for text columns
//! - date bounds for text columns that are mostly ISO dates
//!
//! Only aggregates leave the engine. The one pass that reads values (date
//! bounds) keeps nothing but the running minimum and maximum.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use arrow::array::{Float64Array, StringArray};
//! use arrow::datatypes::{DataType, Field, Schema};
//! use arrow::record_batch::RecordBatch;
//! use ledger_guard::profiler::{ColumnProfiler, ValueCategory};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let schema = Arc::new(Schema::new(vec![
//!     Field::new("transaction_id", DataType::Utf8, true),
//!     Field::new("amount", DataType::Float64, true),
//! ]));
//! let batch = RecordBatch::try_new(
//!     schema.clone(),
//!     vec![
//!         Arc::new(StringArray::from(vec!["tx1", "tx2"])),
//!         Arc::new(Float64Array::from(vec![100.0, -50.0])),
//!     ],
//! )
//! .unwrap();
//!
//! let profiler = ColumnProfiler::builder().enable_parallel(false).build();
//! let profile = profiler.profile_batches(schema, vec![batch]).await.unwrap();
//!
//! assert_eq!(profile.total_rows, 2);
//! let amount = profile.column("amount").unwrap();
//! assert_eq!(amount.value_category, ValueCategory::Numeric);
//! assert_eq!(amount.min(), Some(-50.0));
//! # })
//! ```

mod dates;
mod patterns;
mod types;

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, SchemaRef};
use arrow::record_batch::RecordBatch;
use datafusion::common::TableReference;
use datafusion::datasource::MemTable;
use datafusion::prelude::*;
use futures::{StreamExt, TryStreamExt};
use tracing::{debug, info, instrument};

use crate::error::{ErrorContext, GuardError, Result};
use crate::security::SqlSecurity;

pub use dates::{format_profile_date, parse_date_value, parse_profile_date};
pub use patterns::ValuePattern;
pub use types::{
    ColumnProfile, DatasetProfile, NumericStatistics, PatternMatch, TextStatistics, ValueCategory,
};

use dates::DateBounds;

/// Table name used when profiling in-memory batches.
const BATCH_TABLE: &str = "dataset";

/// Minimum ISO date match percentage (exclusive) before date bounds are derived.
const DATE_DERIVATION_THRESHOLD: f64 = 50.0;

/// Largest finite double. `abs(v) <= FINITE_BOUND` rejects nulls, NaN and
/// infinities, none of which survive a JSON round trip.
const FINITE_BOUND: &str = "1.7976931348623157e308";

/// Configuration for the column profiler.
#[derive(Debug, Clone)]
pub struct ProfilerConfig {
    /// Profile several columns at once
    pub enable_parallel: bool,
    /// Upper bound on columns in flight when parallel profiling is enabled
    pub max_concurrency: usize,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            enable_parallel: true,
            max_concurrency: 8,
        }
    }
}

/// Builder for [`ColumnProfiler`].
#[derive(Debug, Default)]
pub struct ColumnProfilerBuilder {
    config: ProfilerConfig,
}

impl ColumnProfilerBuilder {
    /// Enable or disable concurrent column profiling
    pub fn enable_parallel(mut self, enable: bool) -> Self {
        self.config.enable_parallel = enable;
        self
    }

    /// Set the maximum number of columns profiled at once
    pub fn max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Build the ColumnProfiler
    pub fn build(self) -> ColumnProfiler {
        ColumnProfiler {
            config: self.config,
        }
    }
}

/// How a column's Arrow type is treated before looking at its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StorageClass {
    Numeric,
    String,
    /// Booleans and temporal types, profiled through their string form
    Scalar,
    Null,
    /// Binary and nested types
    Opaque,
}

impl StorageClass {
    fn of(data_type: &DataType) -> Self {
        match data_type {
            DataType::Null => StorageClass::Null,
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => StorageClass::String,
            DataType::Boolean => StorageClass::Scalar,
            DataType::Dictionary(_, value_type) => StorageClass::of(value_type),
            t if t.is_numeric() => StorageClass::Numeric,
            t if t.is_temporal() => StorageClass::Scalar,
            _ => StorageClass::Opaque,
        }
    }
}

/// Derives privacy-preserving column profiles from a DataFusion table.
#[derive(Debug, Clone)]
pub struct ColumnProfiler {
    config: ProfilerConfig,
}

impl Default for ColumnProfiler {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnProfiler {
    /// Create a new builder for ColumnProfiler
    pub fn builder() -> ColumnProfilerBuilder {
        ColumnProfilerBuilder::default()
    }

    /// Create a ColumnProfiler with default configuration
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn config(&self) -> &ProfilerConfig {
        &self.config
    }

    /// Profiles every column of `table_name`, in source column order.
    ///
    /// Degenerate data (zero rows, all-null columns) yields empty statistics
    /// rather than an error. Errors are reserved for a missing table or an
    /// engine failure.
    #[instrument(skip(self, ctx))]
    pub async fn profile(&self, ctx: &SessionContext, table_name: &str) -> Result<DatasetProfile> {
        if !ctx.table_exist(TableReference::bare(table_name))? {
            return Err(GuardError::TableNotFound {
                table: table_name.to_string(),
            });
        }

        let fields = ctx
            .table(TableReference::bare(table_name))
            .await?
            .schema()
            .fields()
            .clone();

        if fields.is_empty() {
            info!(table = table_name, "Table has no columns, returning empty profile");
            return Ok(DatasetProfile::empty());
        }

        let table = SqlSecurity::quote_identifier(table_name)?;
        let row_count = query(ctx, &format!("SELECT COUNT(*) AS row_count FROM {table}")).await?;
        let total_rows = first_u64(&row_count, 0)?;

        info!(
            table = table_name,
            columns = fields.len(),
            rows = total_rows,
            parallel = self.config.enable_parallel,
            "Starting dataset profiling"
        );

        let concurrency = if self.config.enable_parallel {
            self.config.max_concurrency.max(1)
        } else {
            1
        };

        let columns: Vec<ColumnProfile> = futures::stream::iter(fields.iter())
            .map(|field| {
                let table = table.as_str();
                async move {
                    self.profile_column(ctx, table, field, total_rows)
                        .await
                        .with_context(|| format!("Failed to profile column '{}'", field.name()))
                }
            })
            .buffered(concurrency)
            .try_collect()
            .await?;

        info!(
            table = table_name,
            columns = columns.len(),
            "Completed dataset profiling"
        );

        Ok(DatasetProfile::new(total_rows, columns))
    }

    /// Profiles in-memory record batches by registering them in a private
    /// session.
    pub async fn profile_batches(
        &self,
        schema: SchemaRef,
        batches: Vec<RecordBatch>,
    ) -> Result<DatasetProfile> {
        let ctx = SessionContext::new();
        let table = MemTable::try_new(schema, vec![batches])?;
        ctx.register_table(TableReference::bare(BATCH_TABLE), Arc::new(table))?;
        self.profile(&ctx, BATCH_TABLE).await
    }

    async fn profile_column(
        &self,
        ctx: &SessionContext,
        table: &str,
        field: &Field,
        total_rows: u64,
    ) -> Result<ColumnProfile> {
        let name = field.name();
        let storage = StorageClass::of(field.data_type());

        if storage == StorageClass::Null {
            debug!(column = %name, "Null-typed column");
            return Ok(ColumnProfile::new(
                name,
                ValueCategory::Other,
                total_rows,
                percentage(total_rows, total_rows),
                0,
            ));
        }

        let column = SqlSecurity::quote_identifier(name)?;
        let numeric_probe = if storage == StorageClass::String {
            format!(
                ", SUM(CASE WHEN TRY_CAST({column} AS DOUBLE) IS NOT NULL THEN 1 ELSE 0 END) \
                 AS numeric_count"
            )
        } else {
            String::new()
        };
        let counts = query(
            ctx,
            &format!(
                "SELECT COUNT({column}) AS non_null_count, \
                 COUNT(DISTINCT {column}) AS distinct_count{numeric_probe} \
                 FROM {table}"
            ),
        )
        .await?;

        let non_null = first_u64(&counts, 0)?;
        let unique_count = first_u64(&counts, 1)?;
        let null_count = total_rows.saturating_sub(non_null);

        let category = match storage {
            StorageClass::Numeric => ValueCategory::Numeric,
            StorageClass::String if non_null > 0 && first_u64(&counts, 2)? == non_null => {
                ValueCategory::Numeric
            }
            StorageClass::Opaque => ValueCategory::Other,
            _ if non_null == 0 => ValueCategory::Other,
            _ => ValueCategory::Text,
        };

        let mut profile = ColumnProfile::new(
            name,
            category,
            null_count,
            percentage(null_count, total_rows),
            unique_count,
        );

        if non_null > 0 {
            match category {
                ValueCategory::Numeric => {
                    if let Some(stats) = self.numeric_statistics(ctx, table, &column).await? {
                        profile = profile.with_numeric(stats);
                    }
                }
                ValueCategory::Text => {
                    let stats = self
                        .text_statistics(ctx, table, &column, total_rows)
                        .await?;
                    profile = profile.with_text(stats);
                }
                ValueCategory::Other => {}
            }
        }

        debug!(
            column = %name,
            category = ?profile.value_category,
            null_percentage = profile.null_percentage,
            "Profiled column"
        );

        Ok(profile)
    }

    async fn numeric_statistics(
        &self,
        ctx: &SessionContext,
        table: &str,
        column: &str,
    ) -> Result<Option<NumericStatistics>> {
        let batches = query(
            ctx,
            &format!(
                "SELECT MIN(v) AS min_value, MAX(v) AS max_value, AVG(v) AS mean_value, \
                 COUNT(CASE WHEN v < 0 THEN 1 END) AS negative_count \
                 FROM (SELECT TRY_CAST({column} AS DOUBLE) AS v FROM {table}) AS numeric_values \
                 WHERE abs(v) <= {FINITE_BOUND}"
            ),
        )
        .await?;

        let (Some(min), Some(max), Some(mean)) = (
            first_f64(&batches, 0)?,
            first_f64(&batches, 1)?,
            first_f64(&batches, 2)?,
        ) else {
            return Ok(None);
        };

        Ok(Some(NumericStatistics {
            min,
            max,
            mean,
            negative_count: first_u64(&batches, 3)?,
        }))
    }

    async fn text_statistics(
        &self,
        ctx: &SessionContext,
        table: &str,
        column: &str,
        total_rows: u64,
    ) -> Result<TextStatistics> {
        let mut select = Vec::with_capacity(ValuePattern::ALL.len());
        for pattern in ValuePattern::ALL {
            let literal = SqlSecurity::regex_literal(pattern.regex())?;
            select.push(format!(
                "COUNT(CASE WHEN regexp_like(v, '{literal}') THEN 1 END) AS {}",
                pattern.as_str()
            ));
        }

        let batches = query(
            ctx,
            &format!(
                "SELECT {} FROM (SELECT CAST({column} AS VARCHAR) AS v FROM {table} \
                 WHERE {column} IS NOT NULL) AS text_values",
                select.join(", ")
            ),
        )
        .await?;

        let mut stats = TextStatistics::default();
        for (idx, pattern) in ValuePattern::ALL.into_iter().enumerate() {
            let match_count = first_u64(&batches, idx)?;
            stats.patterns.insert(
                pattern,
                PatternMatch {
                    match_count,
                    match_percentage: percentage(match_count, total_rows),
                },
            );
        }

        let iso_share = stats
            .patterns
            .get(&ValuePattern::IsoDate)
            .map_or(0.0, |matched| matched.match_percentage);
        if iso_share > DATE_DERIVATION_THRESHOLD {
            if let Some((min_date, max_date)) = self.date_bounds(ctx, table, column).await? {
                stats.min_date = Some(min_date);
                stats.max_date = Some(max_date);
            }
        }

        Ok(stats)
    }

    /// Streams the column's values once, keeping only the parsed extrema.
    async fn date_bounds(
        &self,
        ctx: &SessionContext,
        table: &str,
        column: &str,
    ) -> Result<Option<(String, String)>> {
        let mut stream = ctx
            .sql(&format!(
                "SELECT CAST({column} AS VARCHAR) AS v FROM {table} WHERE {column} IS NOT NULL"
            ))
            .await?
            .execute_stream()
            .await?;

        let mut bounds = DateBounds::default();
        while let Some(batch) = stream.next().await {
            let batch = batch?;
            let values = as_strings(batch.column(0))?;
            let values = values
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| GuardError::Internal("Expected string values".to_string()))?;
            for value in values.iter().flatten() {
                bounds.observe(value);
            }
        }

        Ok(bounds.finish())
    }
}

async fn query(ctx: &SessionContext, sql: &str) -> Result<Vec<RecordBatch>> {
    Ok(ctx.sql(sql).await?.collect().await?)
}

/// Percentage of `count` over `total`, rounded to 2 decimals; 0 when `total` is 0.
fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(count as f64 / total as f64 * 100.0)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn first_row(batches: &[RecordBatch]) -> Option<&RecordBatch> {
    batches.iter().find(|batch| batch.num_rows() > 0)
}

fn first_u64(batches: &[RecordBatch], col_idx: usize) -> Result<u64> {
    let Some(batch) = first_row(batches) else {
        return Ok(0);
    };
    let column = cast(batch.column(col_idx), &DataType::Int64)?;
    let values = column
        .as_any()
        .downcast_ref::<Int64Array>()
        .ok_or_else(|| GuardError::Internal("Expected an integer aggregate".to_string()))?;

    if values.is_null(0) {
        return Ok(0);
    }
    Ok(u64::try_from(values.value(0)).unwrap_or(0))
}

fn first_f64(batches: &[RecordBatch], col_idx: usize) -> Result<Option<f64>> {
    let Some(batch) = first_row(batches) else {
        return Ok(None);
    };
    let column = cast(batch.column(col_idx), &DataType::Float64)?;
    let values = column
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| GuardError::Internal("Expected a floating-point aggregate".to_string()))?;

    if values.is_null(0) {
        return Ok(None);
    }
    Ok(Some(values.value(0)))
}

fn as_strings(array: &ArrayRef) -> Result<ArrayRef> {
    Ok(cast(array, &DataType::Utf8)?)
}
