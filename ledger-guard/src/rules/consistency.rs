//! Consistency rules. None of these are measurable from column statistics
//! alone, so all three report the compliant default.

use super::{Dimension, Outcome, RuleContext, RuleDefinition, Threshold, COMPLIANT};

pub(super) static RULES: [RuleDefinition; 3] = [
    RuleDefinition::new(
        "consistency_status_mismatch",
        Dimension::Consistency,
        4,
        Threshold::Always,
        "Status values agree across related fields",
        status_mismatch,
    ),
    RuleDefinition::new(
        "consistency_currency_country",
        Dimension::Consistency,
        3,
        Threshold::Always,
        "Currencies align with countries",
        currency_country,
    ),
    RuleDefinition::new(
        "consistency_schema_drift",
        Dimension::Consistency,
        3,
        Threshold::Always,
        "Schema matches previous submissions",
        schema_drift,
    ),
];

fn status_mismatch(_: &RuleContext<'_>) -> Outcome {
    Outcome::new(COMPLIANT, "Status agreement is not measurable from a profile")
}

fn currency_country(_: &RuleContext<'_>) -> Outcome {
    Outcome::new(COMPLIANT, "Currency and country alignment is not measurable from a profile")
}

fn schema_drift(_: &RuleContext<'_>) -> Outcome {
    Outcome::new(COMPLIANT, "Schema drift needs a previous submission to compare against")
}
