//! Security rules: cardholder data must not be stored.

use super::{Dimension, NamePattern, Outcome, RuleContext, RuleDefinition, Threshold, COMPLIANT};

static PAN: NamePattern = NamePattern::new("pan|creditcard|card_number");
static CVV: NamePattern = NamePattern::new("cvv|cvc");

pub(super) static RULES: [RuleDefinition; 3] = [
    RuleDefinition::new(
        "security_pan_storage",
        Dimension::Security,
        5,
        Threshold::Equals(100.0),
        "Primary account numbers are not stored",
        pan_storage,
    ),
    RuleDefinition::new(
        "security_cvv_storage",
        Dimension::Security,
        5,
        Threshold::Equals(100.0),
        "Card verification values are not stored",
        cvv_storage,
    ),
    RuleDefinition::new(
        "security_metadata_only",
        Dimension::Security,
        2,
        Threshold::Always,
        "Only metadata leaves the profiler",
        metadata_only,
    ),
];

fn forbidden(pattern: &NamePattern, ctx: &RuleContext<'_>, subject: &str) -> Outcome {
    let offending: Vec<_> = pattern
        .columns(ctx.profile)
        .map(|column| column.name.as_str())
        .collect();

    if offending.is_empty() {
        Outcome::new(COMPLIANT, format!("No {subject} columns"))
    } else {
        Outcome::new(
            0.0,
            format!("{subject} stored in: {}", offending.join(", ")),
        )
    }
}

fn pan_storage(ctx: &RuleContext<'_>) -> Outcome {
    forbidden(&PAN, ctx, "PAN")
}

fn cvv_storage(ctx: &RuleContext<'_>) -> Outcome {
    forbidden(&CVV, ctx, "CVV")
}

fn metadata_only(_: &RuleContext<'_>) -> Outcome {
    Outcome::new(COMPLIANT, "Profile holds aggregates only")
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;

    #[test]
    fn test_pan_column_fails() {
        let profile = profile(4, vec![text("credit_card_pan", 0.0)]);
        let result = run(&profile, "security_pan_storage");
        assert_eq!(result.score, 0.0);
        assert!(!result.passed);
        assert_eq!(result.details, "PAN stored in: credit_card_pan");

        assert_eq!(run(&profile, "security_cvv_storage").score, 100.0);
    }

    #[test]
    fn test_cvv_column_fails() {
        let profile = profile(4, vec![text("Card_CVC", 0.0)]);
        assert!(!run(&profile, "security_cvv_storage").passed);
    }

    #[test]
    fn test_clean_dataset_passes() {
        let profile = profile(4, vec![text("transaction_id", 0.0), numeric("amount", 1.0)]);
        assert_eq!(run(&profile, "security_pan_storage").score, 100.0);
        assert_eq!(run(&profile, "security_cvv_storage").score, 100.0);
        assert!(run(&profile, "security_metadata_only").passed);
    }
}
