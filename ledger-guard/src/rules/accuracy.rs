//! Accuracy rules.

use super::{Dimension, NamePattern, Outcome, RuleContext, RuleDefinition, Threshold, COMPLIANT};

static MONETARY: NamePattern = NamePattern::new("amount|price|cost|value|balance");

/// Null share above which a column counts as a null cluster.
const NULL_CLUSTER_THRESHOLD: f64 = 90.0;
const NULL_CLUSTER_PENALTY: f64 = 10.0;

pub(super) static RULES: [RuleDefinition; 4] = [
    RuleDefinition::new(
        "accuracy_impossible_date",
        Dimension::Accuracy,
        4,
        Threshold::Always,
        "Dates are logically possible",
        impossible_date,
    ),
    RuleDefinition::new(
        "accuracy_negative_amounts",
        Dimension::Accuracy,
        5,
        Threshold::Equals(100.0),
        "Monetary columns hold strictly positive values",
        negative_amounts,
    ),
    RuleDefinition::new(
        "accuracy_arithmetic",
        Dimension::Accuracy,
        4,
        Threshold::Always,
        "Derived totals add up",
        arithmetic,
    ),
    RuleDefinition::new(
        "accuracy_null_clusters",
        Dimension::Accuracy,
        2,
        Threshold::GreaterThan(80.0),
        "No systemic null clusters",
        null_clusters,
    ),
];

fn impossible_date(_: &RuleContext<'_>) -> Outcome {
    Outcome::new(COMPLIANT, "Date plausibility is not measurable from a profile")
}

fn negative_amounts(ctx: &RuleContext<'_>) -> Outcome {
    let monetary: Vec<_> = MONETARY
        .columns(ctx.profile)
        .filter(|column| column.is_numeric())
        .collect();

    if monetary.is_empty() {
        return Outcome::new(COMPLIANT, "No numeric monetary columns");
    }

    let positive = monetary
        .iter()
        .filter(|column| column.min().unwrap_or(0.0) > 0.0)
        .count();
    let score = positive as f64 / monetary.len() as f64 * 100.0;
    Outcome::new(
        score,
        format!(
            "{positive} of {} monetary columns strictly positive",
            monetary.len()
        ),
    )
}

fn arithmetic(_: &RuleContext<'_>) -> Outcome {
    Outcome::new(COMPLIANT, "Arithmetic checks are not measurable from a profile")
}

fn null_clusters(ctx: &RuleContext<'_>) -> Outcome {
    let clustered = ctx
        .profile
        .columns()
        .iter()
        .filter(|column| column.null_percentage > NULL_CLUSTER_THRESHOLD)
        .count();
    let score = (100.0 - NULL_CLUSTER_PENALTY * clustered as f64).max(0.0);
    Outcome::new(
        score,
        format!("{clustered} columns more than {NULL_CLUSTER_THRESHOLD}% null"),
    )
}
