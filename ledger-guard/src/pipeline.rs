//! End-to-end analysis: profile, evaluate, aggregate, then optionally advise.
//!
//! # Examples
//!
//! ```rust
//! use ledger_guard::pipeline::HealthPipeline;
//! use datafusion::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> ledger_guard::prelude::Result<()> {
//! let ctx = SessionContext::new();
//! ctx.sql(
//!     "CREATE TABLE dataset AS SELECT * FROM (VALUES ('tx1', 10.0), ('tx2', -5.0)) AS t(transaction_id, amount)",
//! )
//!     .await?
//!     .collect()
//!     .await?;
//!
//! let outcome = HealthPipeline::new().analyze(&ctx, "dataset").await?;
//! assert_eq!(outcome.metadata.total_rows, 2);
//! assert_eq!(outcome.scores.rule_results.len(), 30);
//! assert!(!outcome.scores.rule_results["accuracy_negative_amounts"].passed);
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use chrono::{NaiveDateTime, Utc};
use datafusion::prelude::SessionContext;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, Level};

use crate::advisory::{advise_or_fallback, Advice, Advisor};
use crate::error::Result;
use crate::logging::{truncate_field, LogConfig};
use crate::profiler::{ColumnProfiler, DatasetProfile};
use crate::rules::RuleEvaluator;
use crate::scoring::{aggregate, ComplianceReport};
use crate::sources::load_file;

/// Table name uploaded files are registered under.
pub const DATASET_TABLE: &str = "dataset";

/// Deterministic result of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub metadata: DatasetProfile,
    pub scores: ComplianceReport,
}

/// Analysis of an uploaded file together with its narrative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub filename: String,
    pub metadata: DatasetProfile,
    pub scores: ComplianceReport,
    pub analysis: Advice,
}

/// Runs the profiler, the rule catalog and the score aggregator in order.
#[derive(Debug, Clone, Default)]
pub struct HealthPipeline {
    profiler: ColumnProfiler,
    evaluator: RuleEvaluator,
    log_config: LogConfig,
}

impl HealthPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiler(mut self, profiler: ColumnProfiler) -> Self {
        self.profiler = profiler;
        self
    }

    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    pub fn log_config(&self) -> &LogConfig {
        &self.log_config
    }

    /// Profiles `table_name` and scores it against the rule catalog.
    #[instrument(skip(self, ctx))]
    pub async fn analyze(&self, ctx: &SessionContext, table_name: &str) -> Result<AnalysisOutcome> {
        self.analyze_at(ctx, table_name, Utc::now().naive_utc()).await
    }

    /// Like [`analyze`](Self::analyze), evaluating freshness against `now`.
    pub async fn analyze_at(
        &self,
        ctx: &SessionContext,
        table_name: &str,
        now: NaiveDateTime,
    ) -> Result<AnalysisOutcome> {
        let metadata = self.profiler.profile(ctx, table_name).await?;
        if self.announces() {
            info!(
                rows = metadata.total_rows,
                columns = metadata.total_columns,
                "Profiled dataset"
            );
        }

        let results = self.evaluator.evaluate_at(&metadata, now);
        let scores = aggregate(results);
        if self.announces() {
            info!(
                rules = scores.rule_results.len(),
                overall_score = scores.overall_score,
                "Scored dataset"
            );
        }

        for failed in scores.failed_rules() {
            crate::log_rule!(
                self.log_config,
                rule = %failed.rule_id,
                dimension = %failed.dimension,
                score = failed.score,
                details = %truncate_field(&failed.details, self.log_config.max_field_length),
                "Rule failed"
            );
        }

        Ok(AnalysisOutcome { metadata, scores })
    }

    /// Analyzes `table_name` and attaches a narrative from `advisor`.
    ///
    /// Advisory failures never fail the analysis; they yield a fallback.
    #[instrument(skip(self, ctx, advisor))]
    pub async fn analyze_with_advice(
        &self,
        ctx: &SessionContext,
        table_name: &str,
        filename: &str,
        advisor: Option<&dyn Advisor>,
    ) -> Result<AnalysisResponse> {
        let AnalysisOutcome { metadata, scores } = self.analyze(ctx, table_name).await?;
        let analysis = advise_or_fallback(advisor, &scores, &metadata).await;

        Ok(AnalysisResponse {
            filename: filename.to_string(),
            metadata,
            scores,
            analysis,
        })
    }

    /// Loads the file at `path` into a fresh context and analyzes it.
    ///
    /// Unsupported or undecodable files fail with an input error before
    /// profiling starts.
    #[instrument(skip(self, path, advisor), fields(path = %path.as_ref().display()))]
    pub async fn analyze_file(
        &self,
        path: impl AsRef<Path>,
        advisor: Option<&dyn Advisor>,
    ) -> Result<AnalysisResponse> {
        let path = path.as_ref();
        let ctx = SessionContext::new();
        load_file(&ctx, path, DATASET_TABLE).await?;

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.analyze_with_advice(&ctx, DATASET_TABLE, &filename, advisor)
            .await
    }

    /// Stage summaries are logged unless the base level is quieter than INFO.
    fn announces(&self) -> bool {
        self.log_config.base_level >= Level::INFO
    }
}
