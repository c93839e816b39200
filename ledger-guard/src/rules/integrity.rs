//! Integrity rules.

use super::{Dimension, NamePattern, Outcome, RuleContext, RuleDefinition, Threshold, COMPLIANT};

static FOREIGN_KEY: NamePattern = NamePattern::new("^.+_id$");

/// Null share above which a foreign key counts as broken.
const FOREIGN_KEY_NULL_THRESHOLD: f64 = 20.0;
const FOREIGN_KEY_PENALTY: f64 = 20.0;

pub(super) static RULES: [RuleDefinition; 1] = [RuleDefinition::new(
    "integrity_referential",
    Dimension::Integrity,
    7,
    Threshold::GreaterThan(80.0),
    "Foreign keys are populated",
    referential,
)];

fn referential(ctx: &RuleContext<'_>) -> Outcome {
    // The transaction identifier is the dataset's own key, not a reference.
    let foreign_keys: Vec<_> = FOREIGN_KEY
        .columns(ctx.profile)
        .filter(|column| !column.name.to_lowercase().contains("transaction"))
        .collect();

    if foreign_keys.is_empty() {
        return Outcome::new(COMPLIANT, "No foreign key columns");
    }

    let sparse = foreign_keys
        .iter()
        .filter(|column| column.null_percentage > FOREIGN_KEY_NULL_THRESHOLD)
        .count();
    let score = (100.0 - FOREIGN_KEY_PENALTY * sparse as f64).max(0.0);

    Outcome::new(
        score,
        format!(
            "{sparse} of {} foreign keys more than {FOREIGN_KEY_NULL_THRESHOLD}% null",
            foreign_keys.len()
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;

    #[test]
    fn test_sparse_foreign_keys() {
        let profile = profile(
            10,
            vec![
                text("transaction_id", 0.0),
                text("merchant_id", 25.0),
                text("account_id", 10.0),
            ],
        );
        let result = run(&profile, "integrity_referential");
        assert_eq!(result.score, 80.0);
        assert!(!result.passed);
    }

    #[test]
    fn test_transaction_key_is_excluded() {
        let profile = profile(10, vec![text("Transaction_ID", 100.0)]);
        let result = run(&profile, "integrity_referential");
        assert_eq!(result.score, 100.0);
        assert!(result.passed);
    }

    #[test]
    fn test_penalty_floors_at_zero() {
        let columns = (0..6).map(|i| text(&format!("ref{i}_id"), 50.0)).collect();
        let result = run(&profile(10, columns), "integrity_referential");
        assert_eq!(result.score, 0.0);
    }
}
