//! Uniqueness rules.

use super::{Dimension, NamePattern, Outcome, RuleContext, RuleDefinition, Threshold, COMPLIANT};

static IDENTIFIER: NamePattern = NamePattern::new("id|uuid|key");

pub(super) static RULES: [RuleDefinition; 3] = [
    RuleDefinition::new(
        "uniqueness_transaction_id",
        Dimension::Uniqueness,
        5,
        Threshold::GreaterThan(99.0),
        "Transaction identifiers are unique",
        transaction_id,
    ),
    RuleDefinition::new(
        "uniqueness_composite_key",
        Dimension::Uniqueness,
        3,
        Threshold::Always,
        "Rows are unique",
        composite_key,
    ),
    RuleDefinition::new(
        "uniqueness_primary_key",
        Dimension::Uniqueness,
        2,
        Threshold::GreaterThan(99.0),
        "Entity keys are unique",
        transaction_id,
    ),
];

/// Distinct share of the first identifier-like column in source order.
fn transaction_id(ctx: &RuleContext<'_>) -> Outcome {
    let Some(column) = IDENTIFIER.columns(ctx.profile).next() else {
        return Outcome::new(0.0, "No identifier column found");
    };

    let rows = ctx.profile.total_rows;
    let score = if column.unique_count == rows {
        100.0
    } else {
        column.unique_count as f64 / rows as f64 * 100.0
    };

    Outcome::new(
        score,
        format!(
            "Column '{}' has {} distinct values over {rows} rows",
            column.name, column.unique_count
        ),
    )
}

fn composite_key(_: &RuleContext<'_>) -> Outcome {
    Outcome::new(COMPLIANT, "Row-level uniqueness is not measurable from a profile")
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::profiler::{ColumnProfile, ValueCategory};

    fn id_column(name: &str, unique: u64) -> ColumnProfile {
        ColumnProfile::new(name, ValueCategory::Text, 0, 0.0, unique)
    }

    #[test]
    fn test_duplicate_identifier() {
        let profile = profile(4, vec![id_column("transaction_id", 3)]);
        let result = run(&profile, "uniqueness_transaction_id");
        assert_eq!(result.score, 75.0);
        assert!(!result.passed);

        let primary = run(&profile, "uniqueness_primary_key");
        assert_eq!(primary.score, 75.0);
        assert!(!primary.passed);
    }

    #[test]
    fn test_first_identifier_wins() {
        let profile = profile(
            4,
            vec![id_column("uuid", 4), id_column("transaction_id", 1)],
        );
        let result = run(&profile, "uniqueness_transaction_id");
        assert_eq!(result.score, 100.0);
        assert!(result.passed);
    }

    #[test]
    fn test_no_identifier() {
        let profile = profile(4, vec![numeric("amount", 1.0)]);
        let result = run(&profile, "uniqueness_transaction_id");
        assert_eq!(result.score, 0.0);
        assert!(!result.passed);
    }

    #[test]
    fn test_empty_identifier_column_is_unique() {
        let profile = profile(0, vec![id_column("transaction_id", 0)]);
        assert_eq!(run(&profile, "uniqueness_transaction_id").score, 100.0);
    }
}
