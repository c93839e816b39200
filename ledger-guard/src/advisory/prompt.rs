//! Prompt construction and reply parsing for text-generation advisors.

use super::{Advice, AdvisoryError, AdvisoryResult};
use crate::profiler::DatasetProfile;
use crate::scoring::ComplianceReport;

/// System instruction sent with every advisory request.
pub const SYSTEM_PROMPT: &str = r#"You are an expert Financial Data Compliance Officer.
Your role is to analyze dataset metadata and compliance scores to provide a plain-English assessment and actionable remediation steps.

You will receive:
1. A 'Health Score' and 'Compliance Score'.
2. Dimension-wise breakdown (Completeness, Validity, etc.).
3. Metadata summary (column names, patterns found).

Output strictly valid JSON with the following structure:
{
    "executive_summary": "One sentence overview of the data health.",
    "risk_assessment": "Short paragraph explaining key risks (e.g. 'Missing KYC fields', 'PII detected').",
    "remediation_steps": [
        {"issue": "Description of issue", "action": "Exact step to fix it", "priority": "High/Medium/Low"}
    ]
}"#;

/// Renders the scores and the metadata profile into the user message.
///
/// Only aggregates and column metadata are included; the profile carries no
/// cell values.
pub fn user_message(report: &ComplianceReport, profile: &DatasetProfile) -> AdvisoryResult<String> {
    let dimension_scores = serde_json::to_string(&report.dimension_scores)?;
    let rule_details = serde_json::to_string_pretty(&report.rule_results)?;
    let metadata = serde_json::to_string_pretty(profile)?;

    Ok(format!(
        "Overall Score: {}\nHealth Score: {}\nDimension Scores: {dimension_scores}\nRule Details: {rule_details}\n\nMetadata Profile: {metadata}\n",
        report.overall_score, report.health_score
    ))
}

/// Parses a reply into [`Advice`], accepting an optional Markdown code fence.
pub fn parse_advice(reply: &str) -> AdvisoryResult<Advice> {
    let body = strip_fence(reply).trim();
    serde_json::from_str(body).map_err(|e| AdvisoryError::InvalidReply {
        message: e.to_string(),
    })
}

fn strip_fence(reply: &str) -> &str {
    let inner = if let Some((_, rest)) = reply.split_once("```json") {
        rest
    } else if let Some((_, rest)) = reply.split_once("```") {
        rest
    } else {
        return reply;
    };

    match inner.split_once("```") {
        Some((body, _)) => body,
        None => inner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{now, profile, text};
    use crate::rules::RuleEvaluator;
    use crate::scoring::aggregate;

    const REPLY: &str = r#"{
        "executive_summary": "Mostly healthy.",
        "risk_assessment": "Card numbers are stored.",
        "remediation_steps": [
            {"issue": "PAN column", "action": "Drop or tokenize it", "priority": "High"}
        ]
    }"#;

    #[test]
    fn test_parse_plain_reply() {
        let advice = parse_advice(REPLY).unwrap();
        assert_eq!(advice.executive_summary, "Mostly healthy.");
        assert_eq!(advice.remediation_steps.len(), 1);
        assert_eq!(advice.remediation_steps[0].priority, "High");
    }

    #[test]
    fn test_parse_fenced_reply() {
        let fenced = format!("Here you go:\n```json\n{REPLY}\n```\nThanks");
        assert_eq!(parse_advice(&fenced).unwrap(), parse_advice(REPLY).unwrap());

        let bare_fence = format!("```\n{REPLY}\n```");
        assert_eq!(parse_advice(&bare_fence).unwrap(), parse_advice(REPLY).unwrap());
    }

    #[test]
    fn test_missing_steps_default_to_empty() {
        let advice =
            parse_advice(r#"{"executive_summary": "ok", "risk_assessment": "none"}"#).unwrap();
        assert!(advice.remediation_steps.is_empty());
    }

    #[test]
    fn test_invalid_reply() {
        let err = parse_advice("I cannot help with that.").unwrap_err();
        assert!(matches!(err, AdvisoryError::InvalidReply { .. }));
    }

    #[test]
    fn test_user_message_carries_scores_and_metadata() {
        let dataset = profile(10, vec![text("credit_card_pan", 0.0)]);
        let report = aggregate(RuleEvaluator::new().evaluate_at(&dataset, now()));
        let message = user_message(&report, &dataset).unwrap();

        assert!(message.starts_with(&format!("Overall Score: {}", report.overall_score)));
        assert!(message.contains("\"security_pan_storage\""));
        assert!(message.contains("Metadata Profile: {"));
        assert!(message.contains("\"credit_card_pan\""));
    }
}
