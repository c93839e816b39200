//! Completeness rules: required columns exist and are populated.

use super::{
    mean, non_null_percentage, presence, Dimension, NamePattern, Outcome, RuleContext,
    RuleDefinition, Threshold,
};

static ID: NamePattern = NamePattern::new("id");
static AMOUNT: NamePattern = NamePattern::new("amount");
static DATE: NamePattern = NamePattern::new("date|time");
static ADDRESS: NamePattern = NamePattern::new("address|city|zip|post|state");
static KYC_ID: NamePattern = NamePattern::new("kyc|passport|ssn|tax|national_id|customer_id");
static SOURCE_OF_FUNDS: NamePattern =
    NamePattern::new("source|provenance|scource_of_funds|remitter");
static AUDIT_TRAIL: NamePattern =
    NamePattern::new("created_at|updated_at|audit|timestamp|version");
static ENHANCED_DATA: NamePattern = NamePattern::new("device|ip|location|browser|metadata");

/// Identifier, amount and date: every transaction dataset needs all three.
static MANDATORY: [&NamePattern; 3] = [&ID, &AMOUNT, &DATE];

pub(super) static RULES: [RuleDefinition; 7] = [
    RuleDefinition::new(
        "completeness_mandatory_columns",
        Dimension::Completeness,
        4,
        Threshold::Equals(100.0),
        "Identifier, amount and date columns are present",
        mandatory_columns,
    ),
    RuleDefinition::new(
        "completeness_mandatory_nulls",
        Dimension::Completeness,
        4,
        Threshold::GreaterThan(95.0),
        "Mandatory columns are populated",
        mandatory_nulls,
    ),
    RuleDefinition::new(
        "completeness_address",
        Dimension::Completeness,
        3,
        Threshold::GreaterThan(90.0),
        "Address fields are populated",
        address,
    ),
    RuleDefinition::new(
        "completeness_kyc_id",
        Dimension::Completeness,
        5,
        Threshold::Equals(100.0),
        "A know-your-customer identifier is present",
        kyc_id,
    ),
    RuleDefinition::new(
        "completeness_source_of_funds",
        Dimension::Completeness,
        3,
        Threshold::Equals(100.0),
        "Source of funds is recorded",
        source_of_funds,
    ),
    RuleDefinition::new(
        "completeness_audit_trail",
        Dimension::Completeness,
        2,
        Threshold::Equals(100.0),
        "Audit trail columns are present",
        audit_trail,
    ),
    RuleDefinition::new(
        "completeness_enhanced_data",
        Dimension::Completeness,
        1,
        Threshold::Equals(100.0),
        "Device or session context is captured",
        enhanced_data,
    ),
];

fn mandatory_columns(ctx: &RuleContext<'_>) -> Outcome {
    let present = MANDATORY
        .iter()
        .filter(|pattern| pattern.any(ctx.profile))
        .count();
    let score = present as f64 / MANDATORY.len() as f64 * 100.0;
    Outcome::new(
        score,
        format!("{present} of {} mandatory columns present", MANDATORY.len()),
    )
}

fn mandatory_nulls(ctx: &RuleContext<'_>) -> Outcome {
    // A column matching two patterns is counted once per pattern.
    let populated = MANDATORY
        .iter()
        .flat_map(|pattern| pattern.columns(ctx.profile))
        .map(non_null_percentage);

    match mean(populated) {
        Some(score) => Outcome::new(score, format!("Mandatory columns {score:.2}% populated")),
        None => Outcome::new(0.0, "No mandatory columns to check"),
    }
}

fn address(ctx: &RuleContext<'_>) -> Outcome {
    match mean(ADDRESS.columns(ctx.profile).map(non_null_percentage)) {
        Some(score) => Outcome::new(score, format!("Address fields {score:.2}% populated")),
        None => Outcome::new(0.0, "No address fields found"),
    }
}

fn kyc_id(ctx: &RuleContext<'_>) -> Outcome {
    presence(&KYC_ID, ctx, "KYC identifier")
}

fn source_of_funds(ctx: &RuleContext<'_>) -> Outcome {
    presence(&SOURCE_OF_FUNDS, ctx, "Source of funds")
}

fn audit_trail(ctx: &RuleContext<'_>) -> Outcome {
    presence(&AUDIT_TRAIL, ctx, "Audit trail")
}

fn enhanced_data(ctx: &RuleContext<'_>) -> Outcome {
    presence(&ENHANCED_DATA, ctx, "Enhanced data")
}
