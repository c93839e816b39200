//! # Ledger Guard - compliance scoring for financial datasets
//!
//! Ledger Guard profiles a tabular dataset with DataFusion, evaluates the
//! profile against a fixed catalog of 30 weighted compliance rules across
//! eight dimensions, and rolls the outcomes up into dimension and overall
//! scores. Only metadata travels past the profiler: rules, scores and the
//! optional advisory narrative never see a cell value.
//!
//! ## Quick Start
//!
//! ```rust
//! use ledger_guard::prelude::*;
//! use datafusion::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> ledger_guard::prelude::Result<()> {
//! let ctx = SessionContext::new();
//! ctx.sql(
//!     "CREATE TABLE dataset AS SELECT * FROM (VALUES \
//!      ('tx1', 100.0, '4111111111111111'), \
//!      ('tx2', 25.5, '5500000000000004')) AS t(transaction_id, amount, card_number)",
//! )
//! .await?
//! .collect()
//! .await?;
//!
//! let outcome = HealthPipeline::new().analyze(&ctx, "dataset").await?;
//!
//! let pan = &outcome.scores.rule_results["security_pan_storage"];
//! assert!(!pan.passed);
//! assert!(outcome.scores.overall_score < 100.0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Stages
//!
//! | Stage | Module | Output |
//! |---|---|---|
//! | Load | [`sources`] | a registered table |
//! | Profile | [`profiler`] | [`profiler::DatasetProfile`] |
//! | Evaluate | [`rules`] | one [`rules::RuleResult`] per catalog rule |
//! | Aggregate | [`scoring`] | [`scoring::ComplianceReport`] |
//! | Advise | [`advisory`] | [`advisory::Advice`] (never fails) |
//!
//! [`pipeline::HealthPipeline`] chains them. The `analyze` binary exposes the
//! same flow on the command line.
//!
//! ## Features
//!
//! - `advisory`: compiles the hosted text-generation client used for
//!   remediation narratives.
//! - `test-utils`: exposes the in-memory fixtures in [`test_fixtures`].
//!
//! ## Logging
//!
//! The library emits `tracing` events and never installs a subscriber. See
//! [`logging::setup::init_logging`] for the one the binary uses.

pub mod advisory;
pub mod error;
pub mod formatters;
pub mod logging;
pub mod pipeline;
pub mod prelude;
pub mod profiler;
pub mod rules;
pub mod scoring;
pub mod security;
pub mod sources;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_fixtures;
