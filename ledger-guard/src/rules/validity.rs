//! Validity rules: values follow the expected formats.

use super::{
    mean, Dimension, NamePattern, Outcome, RuleContext, RuleDefinition, Threshold, COMPLIANT,
};
use crate::profiler::ValuePattern;

static DATE: NamePattern = NamePattern::new("date|time");
static CURRENCY: NamePattern = NamePattern::new("currency|curr");
static COUNTRY: NamePattern = NamePattern::new("country|cntry|nation");
static EMAIL: NamePattern = NamePattern::new("email");

pub(super) static RULES: [RuleDefinition; 7] = [
    RuleDefinition::new(
        "validity_date_format",
        Dimension::Validity,
        4,
        Threshold::GreaterThan(90.0),
        "Date columns hold ISO 8601 dates",
        date_format,
    ),
    RuleDefinition::new(
        "validity_currency_code",
        Dimension::Validity,
        3,
        Threshold::GreaterThan(95.0),
        "Currency columns hold ISO 4217 codes",
        currency_code,
    ),
    RuleDefinition::new(
        "validity_country_code",
        Dimension::Validity,
        3,
        Threshold::GreaterThan(95.0),
        "Country columns hold ISO 3166 codes",
        country_code,
    ),
    RuleDefinition::new(
        "validity_name_pattern",
        Dimension::Validity,
        3,
        Threshold::Always,
        "Personal names follow naming conventions",
        name_pattern,
    ),
    RuleDefinition::new(
        "validity_field_length",
        Dimension::Validity,
        2,
        Threshold::Always,
        "Values are not truncated",
        field_length,
    ),
    RuleDefinition::new(
        "validity_regex_conformity",
        Dimension::Validity,
        2,
        Threshold::GreaterThan(90.0),
        "Email columns hold well-formed addresses",
        regex_conformity,
    ),
    RuleDefinition::new(
        "validity_schema_type",
        Dimension::Validity,
        1,
        Threshold::Always,
        "Column types are consistent",
        schema_type,
    ),
];

/// Mean match rate of `pattern` over the columns named like `columns`.
///
/// A matching column without pattern rates counts as 0; no matching column
/// at all is compliant.
fn conformity(ctx: &RuleContext<'_>, columns: &NamePattern, pattern: ValuePattern) -> Outcome {
    let rates = columns
        .columns(ctx.profile)
        .map(|column| column.pattern_percentage(pattern).unwrap_or(0.0));

    match mean(rates) {
        Some(score) => Outcome::new(score, format!("{score:.2}% of values match {pattern}")),
        None => Outcome::new(COMPLIANT, format!("No columns expected to hold {pattern} values")),
    }
}

fn date_format(ctx: &RuleContext<'_>) -> Outcome {
    conformity(ctx, &DATE, ValuePattern::IsoDate)
}

fn currency_code(ctx: &RuleContext<'_>) -> Outcome {
    conformity(ctx, &CURRENCY, ValuePattern::CurrencyCode)
}

fn country_code(ctx: &RuleContext<'_>) -> Outcome {
    conformity(ctx, &COUNTRY, ValuePattern::CountryCode)
}

fn regex_conformity(ctx: &RuleContext<'_>) -> Outcome {
    conformity(ctx, &EMAIL, ValuePattern::Email)
}

fn name_pattern(_: &RuleContext<'_>) -> Outcome {
    Outcome::new(COMPLIANT, "Name conventions are not measurable from a profile")
}

fn field_length(_: &RuleContext<'_>) -> Outcome {
    Outcome::new(COMPLIANT, "Field truncation is not measurable from a profile")
}

fn schema_type(_: &RuleContext<'_>) -> Outcome {
    Outcome::new(COMPLIANT, "Type consistency is not measurable from a profile")
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::profiler::ValuePattern;

    #[test]
    fn test_date_format_averages_rates() {
        let profile = profile(
            4,
            vec![
                with_pattern(text("booking_date", 0.0), ValuePattern::IsoDate, 75.0),
                with_pattern(text("value_date", 0.0), ValuePattern::IsoDate, 100.0),
            ],
        );
        let result = run(&profile, "validity_date_format");
        assert_eq!(result.score, 87.5);
        assert!(!result.passed);
    }

    #[test]
    fn test_missing_rate_counts_as_zero() {
        // Numeric timestamps carry no pattern rates
        let profile = profile(
            4,
            vec![
                numeric("epoch_time", 1.0),
                with_pattern(text("date", 0.0), ValuePattern::IsoDate, 100.0),
            ],
        );
        assert_eq!(run(&profile, "validity_date_format").score, 50.0);
    }

    #[test]
    fn test_no_matching_columns_is_compliant() {
        let profile = profile(4, vec![numeric("amount", 1.0)]);
        for rule in [
            "validity_date_format",
            "validity_currency_code",
            "validity_country_code",
            "validity_regex_conformity",
        ] {
            let result = run(&profile, rule);
            assert_eq!(result.score, 100.0, "{rule}");
            assert!(result.passed, "{rule}");
        }
    }

    #[test]
    fn test_codes_and_email() {
        let profile = profile(
            4,
            vec![
                with_pattern(text("currency", 0.0), ValuePattern::CurrencyCode, 96.0),
                with_pattern(text("cntry", 0.0), ValuePattern::CountryCode, 95.0),
                with_pattern(text("customer_email", 25.0), ValuePattern::Email, 50.0),
            ],
        );
        assert!(run(&profile, "validity_currency_code").passed);
        assert!(!run(&profile, "validity_country_code").passed);

        let email = run(&profile, "validity_regex_conformity");
        assert_eq!(email.score, 50.0);
        assert!(!email.passed);
    }

    #[test]
    fn test_placeholders_pass() {
        let profile = profile(0, vec![]);
        for rule in [
            "validity_name_pattern",
            "validity_field_length",
            "validity_schema_type",
        ] {
            let result = run(&profile, rule);
            assert_eq!(result.score, 100.0);
            assert!(result.passed);
        }
    }
}
