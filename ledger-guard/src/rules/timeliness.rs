//! Timeliness rules: the newest record is within the freshness SLA.

use super::{Dimension, Outcome, RuleContext, RuleDefinition, Threshold, COMPLIANT};
use crate::profiler::parse_profile_date;

/// Days a dataset may age before its score starts to drop.
const FRESHNESS_SLA_DAYS: i64 = 30;

pub(super) static RULES: [RuleDefinition; 2] = [
    RuleDefinition::new(
        "timeliness_dataset_age",
        Dimension::Timeliness,
        4,
        Threshold::GreaterThan(80.0),
        "Latest record is within the freshness SLA",
        dataset_age,
    ),
    RuleDefinition::new(
        "timeliness_late_ingestion",
        Dimension::Timeliness,
        2,
        Threshold::GreaterThan(80.0),
        "Records are ingested without delay",
        dataset_age,
    ),
];

/// Loses one point per day past the SLA.
fn dataset_age(ctx: &RuleContext<'_>) -> Outcome {
    let Some(latest) = ctx
        .profile
        .columns()
        .iter()
        .filter_map(|column| column.max_date())
        .max()
    else {
        return Outcome::new(COMPLIANT, "No date columns to assess");
    };

    let Some(latest) = parse_profile_date(latest) else {
        return Outcome::new(0.0, "Latest date could not be read");
    };

    let age = (ctx.now - latest).num_days();
    let score = if age <= FRESHNESS_SLA_DAYS {
        100.0
    } else {
        (100 - (age - FRESHNESS_SLA_DAYS)).max(0) as f64
    };

    Outcome::new(
        score,
        format!("Data age: {age} days (SLA: {FRESHNESS_SLA_DAYS})"),
    )
}
