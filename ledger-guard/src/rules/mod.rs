//! The compliance rule catalog and its evaluator.
//!
//! The catalog is a fixed table of 30 [`RuleDefinition`]s spread over eight
//! [`Dimension`]s. Each definition pairs a weight and a pass threshold with a
//! pure scoring function over a [`DatasetProfile`]. Rules look at column names
//! (through the [`NamePattern`] vocabularies declared next to them) and at the
//! aggregate statistics of matching columns, never at values.
//!
//! ## Example
//!
//! ```rust
//! use ledger_guard::profiler::DatasetProfile;
//! use ledger_guard::rules::RuleEvaluator;
//!
//! let results = RuleEvaluator::new().evaluate(&DatasetProfile::empty());
//! assert_eq!(results.len(), 30);
//! assert!(results["security_pan_storage"].passed);
//! ```

mod accuracy;
mod completeness;
mod consistency;
mod integrity;
mod names;
mod result;
mod security;
mod timeliness;
mod uniqueness;
mod validity;

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, Utc};
use tracing::{debug, instrument};

use crate::profiler::{ColumnProfile, DatasetProfile};

pub use names::NamePattern;
pub use result::{Dimension, RuleResult};

/// Score every rule reports when a check cannot be computed from a profile.
pub(crate) const COMPLIANT: f64 = 100.0;

/// Pass condition attached to a rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    /// Score must equal the value
    Equals(f64),
    /// Score must be strictly greater than the value
    GreaterThan(f64),
    /// Rule always passes
    Always,
}

impl Threshold {
    pub fn is_met(&self, score: f64) -> bool {
        match self {
            Threshold::Equals(target) => (score - target).abs() < 1e-9,
            Threshold::GreaterThan(floor) => score > *floor,
            Threshold::Always => true,
        }
    }
}

/// What a rule's scoring function reports before thresholding.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub score: f64,
    pub details: String,
}

impl Outcome {
    pub fn new(score: f64, details: impl Into<String>) -> Self {
        Self {
            score,
            details: details.into(),
        }
    }
}

/// Read-only inputs shared by every rule of one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub profile: &'a DatasetProfile,
    /// Evaluation instant, read once per evaluation
    pub now: NaiveDateTime,
}

/// One entry of the catalog.
pub struct RuleDefinition {
    pub id: &'static str,
    pub dimension: Dimension,
    pub weight: u32,
    pub threshold: Threshold,
    pub description: &'static str,
    score: fn(&RuleContext<'_>) -> Outcome,
}

impl RuleDefinition {
    pub(crate) const fn new(
        id: &'static str,
        dimension: Dimension,
        weight: u32,
        threshold: Threshold,
        description: &'static str,
        score: fn(&RuleContext<'_>) -> Outcome,
    ) -> Self {
        Self {
            id,
            dimension,
            weight,
            threshold,
            description,
            score,
        }
    }

    /// Scores the rule, clamps the score to [0, 100] and applies the threshold.
    pub fn apply(&self, ctx: &RuleContext<'_>) -> RuleResult {
        let outcome = (self.score)(ctx);
        let score = if outcome.score.is_nan() {
            0.0
        } else {
            outcome.score.clamp(0.0, 100.0)
        };

        RuleResult {
            rule_id: self.id.to_string(),
            dimension: self.dimension,
            score,
            weight: self.weight,
            passed: self.threshold.is_met(score),
            details: outcome.details,
        }
    }
}

impl std::fmt::Debug for RuleDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleDefinition")
            .field("id", &self.id)
            .field("dimension", &self.dimension)
            .field("weight", &self.weight)
            .field("threshold", &self.threshold)
            .finish()
    }
}

/// All catalog rules, grouped by dimension in declaration order.
pub fn catalog() -> impl Iterator<Item = &'static RuleDefinition> {
    completeness::RULES
        .iter()
        .chain(validity::RULES.iter())
        .chain(accuracy::RULES.iter())
        .chain(uniqueness::RULES.iter())
        .chain(consistency::RULES.iter())
        .chain(timeliness::RULES.iter())
        .chain(integrity::RULES.iter())
        .chain(security::RULES.iter())
}

/// Evaluates the full catalog against a profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEvaluator;

impl RuleEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Evaluates every rule against `profile`, reading the current UTC time
    /// once.
    pub fn evaluate(&self, profile: &DatasetProfile) -> BTreeMap<String, RuleResult> {
        self.evaluate_at(profile, Utc::now().naive_utc())
    }

    /// Evaluates every rule with an explicit evaluation instant.
    #[instrument(skip(self, profile), fields(columns = profile.total_columns))]
    pub fn evaluate_at(
        &self,
        profile: &DatasetProfile,
        now: NaiveDateTime,
    ) -> BTreeMap<String, RuleResult> {
        let ctx = RuleContext { profile, now };

        catalog()
            .map(|rule| {
                let result = rule.apply(&ctx);
                debug!(
                    rule = rule.id,
                    score = result.score,
                    passed = result.passed,
                    "Evaluated rule"
                );
                (result.rule_id.clone(), result)
            })
            .collect()
    }
}

/// Mean of `values`, or `None` when empty.
pub(crate) fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Share of non-null cells in a column.
pub(crate) fn non_null_percentage(column: &ColumnProfile) -> f64 {
    100.0 - column.null_percentage
}

/// Presence rule: 100 when any column matches, 0 otherwise.
pub(crate) fn presence(pattern: &NamePattern, ctx: &RuleContext<'_>, subject: &str) -> Outcome {
    if pattern.any(ctx.profile) {
        Outcome::new(100.0, format!("{subject}: column present"))
    } else {
        Outcome::new(0.0, format!("{subject}: no matching column"))
    }
}
