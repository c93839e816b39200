//! Rendering of analysis responses for terminals and machines.
//!
//! # Examples
//!
//! ```rust
//! use ledger_guard::formatters::{HumanFormatter, JsonFormatter, ReportFormatter};
//! use ledger_guard::pipeline::HealthPipeline;
//! use datafusion::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> ledger_guard::prelude::Result<()> {
//! let ctx = SessionContext::new();
//! ctx.sql("CREATE TABLE dataset AS SELECT 'tx1' AS transaction_id")
//!     .await?
//!     .collect()
//!     .await?;
//! let response = HealthPipeline::new()
//!     .analyze_with_advice(&ctx, "dataset", "ledger.csv", None)
//!     .await?;
//!
//! let json = JsonFormatter::new().format(&response)?;
//! assert!(json.contains("\"filename\": \"ledger.csv\""));
//!
//! let text = HumanFormatter::new().format(&response)?;
//! assert!(text.contains("ledger.csv"));
//! # Ok(())
//! # }
//! ```

use std::fmt::Write;

use crate::error::{GuardError, Result};
use crate::pipeline::AnalysisResponse;

/// Configuration options for formatting analysis responses.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Include per-dimension scores
    pub include_dimensions: bool,
    /// Include failed rule details
    pub include_failures: bool,
    /// Include the advisory narrative
    pub include_advice: bool,
    /// Maximum number of failed rules to display (`None` for all)
    pub max_failures: Option<usize>,
    /// Whether to use colorized output (for human formatter)
    pub use_colors: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            include_dimensions: true,
            include_failures: true,
            include_advice: true,
            max_failures: None,
            use_colors: true,
        }
    }
}

impl FormatterConfig {
    /// Creates a minimal configuration showing only the overall score.
    pub fn minimal() -> Self {
        Self {
            include_dimensions: false,
            include_failures: false,
            include_advice: false,
            max_failures: Some(0),
            use_colors: false,
        }
    }

    /// Creates a configuration suitable for CI/CD environments.
    pub fn ci() -> Self {
        Self {
            include_dimensions: true,
            include_failures: true,
            include_advice: false,
            max_failures: Some(10),
            use_colors: false,
        }
    }

    pub fn with_max_failures(mut self, max: usize) -> Self {
        self.max_failures = Some(max);
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }
}

/// Converts an analysis response into a string representation.
pub trait ReportFormatter {
    fn format(&self, response: &AnalysisResponse) -> Result<String>;
}

/// The full response as JSON, in the `{filename, metadata, scores, analysis}`
/// shape.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Sets whether to use pretty-printed JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, response: &AnalysisResponse) -> Result<String> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(response)
        } else {
            serde_json::to_string(response)
        };
        rendered.map_err(|e| GuardError::Internal(format!("Failed to serialize response to JSON: {e}")))
    }
}

/// Console summary of the scores, failures and narrative.
#[derive(Debug, Clone, Default)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }

    fn paint(&self, text: &str, color: &str) -> String {
        if self.config.use_colors {
            format!("\x1b[{color}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn score_color(score: f64) -> &'static str {
        if score >= 90.0 {
            "32"
        } else if score >= 70.0 {
            "33"
        } else {
            "31"
        }
    }

    fn render(&self, response: &AnalysisResponse, out: &mut String) -> std::fmt::Result {
        let scores = &response.scores;
        let config = &self.config;

        writeln!(out)?;
        writeln!(out, "Dataset: {}", response.filename)?;
        writeln!(
            out,
            "Rows: {}   Columns: {}",
            response.metadata.total_rows, response.metadata.total_columns
        )?;
        writeln!(out)?;

        let overall = format!("{:.2}", scores.overall_score);
        writeln!(
            out,
            "Overall score: {}",
            self.paint(&overall, Self::score_color(scores.overall_score))
        )?;

        if config.include_dimensions && !scores.dimension_scores.is_empty() {
            writeln!(out)?;
            writeln!(out, "Dimensions:")?;
            for (dimension, score) in &scores.dimension_scores {
                let value = format!("{score:>6.2}");
                writeln!(
                    out,
                    "   {:<14} {}",
                    dimension.as_str(),
                    self.paint(&value, Self::score_color(*score))
                )?;
            }
        }

        let failed = scores.failed_rules();
        if config.include_failures && !failed.is_empty() {
            let shown = config.max_failures.unwrap_or(failed.len()).min(failed.len());

            writeln!(out)?;
            writeln!(out, "Failed rules ({}):", failed.len())?;
            for rule in &failed[..shown] {
                writeln!(
                    out,
                    "   {} {} (weight {}, score {:.2})",
                    self.paint("x", "31"),
                    rule.rule_id,
                    rule.weight,
                    rule.score
                )?;
                writeln!(out, "      {}", rule.details)?;
            }
            if failed.len() > shown {
                writeln!(out, "   ... and {} more", failed.len() - shown)?;
            }
        }

        if config.include_advice {
            let advice = &response.analysis;
            writeln!(out)?;
            writeln!(out, "Summary: {}", advice.executive_summary)?;
            writeln!(out, "Risks: {}", advice.risk_assessment)?;
            for step in &advice.remediation_steps {
                writeln!(out, "   [{}] {}: {}", step.priority, step.issue, step.action)?;
            }
        }

        writeln!(out)
    }
}

impl ReportFormatter for HumanFormatter {
    fn format(&self, response: &AnalysisResponse) -> Result<String> {
        let mut output = String::new();
        self.render(response, &mut output)
            .map_err(|e| GuardError::Internal(format!("Failed to render report: {e}")))?;
        Ok(output)
    }
}
