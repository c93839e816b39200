//! Prelude for commonly used types and traits in ledger-guard.

pub use crate::advisory::{advise_or_fallback, Advice, Advisor, AdvisoryConfig};
pub use crate::error::{ErrorContext, GuardError, Result};
pub use crate::formatters::{FormatterConfig, ReportFormatter};
pub use crate::logging::LogConfig;
pub use crate::pipeline::{AnalysisOutcome, AnalysisResponse, HealthPipeline};
pub use crate::profiler::{ColumnProfiler, DatasetProfile};
pub use crate::rules::{Dimension, RuleEvaluator, RuleResult};
pub use crate::scoring::{aggregate, ComplianceReport};
pub use crate::sources::{load_file, DataSource};
