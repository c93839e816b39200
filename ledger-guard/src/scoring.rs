//! Rolls rule outcomes up into dimension and overall scores.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::profiler::round2;
use crate::rules::{Dimension, RuleResult};

/// Dimension and overall compliance scores for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    /// Weighted pass ratio per dimension, 0-100
    pub dimension_scores: BTreeMap<Dimension, f64>,
    /// Weighted pass ratio over all rules, 0-100
    pub overall_score: f64,
    /// Currently equal to `overall_score`
    pub health_score: f64,
    pub rule_results: BTreeMap<String, RuleResult>,
}

impl ComplianceReport {
    /// Results of rules that did not pass, heaviest first.
    pub fn failed_rules(&self) -> Vec<&RuleResult> {
        let mut failed: Vec<_> = self
            .rule_results
            .values()
            .filter(|result| !result.passed)
            .collect();
        failed.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.rule_id.cmp(&b.rule_id)));
        failed
    }

    pub fn dimension_score(&self, dimension: Dimension) -> Option<f64> {
        self.dimension_scores.get(&dimension).copied()
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct WeightTally {
    passed: u64,
    total: u64,
}

impl WeightTally {
    fn add(&mut self, result: &RuleResult) {
        let weight = u64::from(result.weight);
        self.total += weight;
        if result.passed {
            self.passed += weight;
        }
    }

    /// 100 x passed / total, rounded to 2 decimals; 100 when nothing was weighed.
    fn score(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        round2(self.passed as f64 / self.total as f64 * 100.0)
    }
}

/// Aggregates rule results into a [`ComplianceReport`].
///
/// Only dimensions that occur in `rule_results` get a score. Aggregating a
/// report's own `rule_results` again yields the same report.
pub fn aggregate(rule_results: BTreeMap<String, RuleResult>) -> ComplianceReport {
    let mut overall = WeightTally::default();
    let mut by_dimension: BTreeMap<Dimension, WeightTally> = BTreeMap::new();

    for result in rule_results.values() {
        overall.add(result);
        by_dimension.entry(result.dimension).or_default().add(result);
    }

    let dimension_scores: BTreeMap<Dimension, f64> = by_dimension
        .into_iter()
        .map(|(dimension, tally)| (dimension, tally.score()))
        .collect();
    let overall_score = overall.score();

    info!(
        rules = rule_results.len(),
        overall_score,
        "Aggregated compliance scores"
    );

    ComplianceReport {
        dimension_scores,
        overall_score,
        health_score: overall_score,
        rule_results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(rule_id: &str, weight: u32, passed: bool) -> (String, RuleResult) {
        let dimension = Dimension::of_rule(rule_id).unwrap();
        (
            rule_id.to_string(),
            RuleResult {
                rule_id: rule_id.to_string(),
                dimension,
                score: if passed { 100.0 } else { 0.0 },
                weight,
                passed,
                details: String::new(),
            },
        )
    }

    #[test]
    fn test_weighted_dimension_scores() {
        let results: BTreeMap<_, _> = [
            result("security_pan_storage", 5, false),
            result("security_cvv_storage", 5, true),
            result("security_metadata_only", 2, true),
            result("integrity_referential", 7, true),
        ]
        .into_iter()
        .collect();

        let report = aggregate(results);
        assert_eq!(report.dimension_score(Dimension::Security), Some(58.33));
        assert_eq!(report.dimension_score(Dimension::Integrity), Some(100.0));
        assert_eq!(report.dimension_score(Dimension::Validity), None);
        // 14 of 19
        assert_eq!(report.overall_score, 73.68);
        assert_eq!(report.health_score, report.overall_score);
    }

    #[test]
    fn test_empty_results() {
        let report = aggregate(BTreeMap::new());
        assert!(report.dimension_scores.is_empty());
        assert_eq!(report.overall_score, 100.0);
    }

    #[test]
    fn test_idempotent() {
        let results: BTreeMap<_, _> = [
            result("accuracy_negative_amounts", 5, false),
            result("accuracy_null_clusters", 2, true),
        ]
        .into_iter()
        .collect();
        let report = aggregate(results);
        let again = aggregate(report.rule_results.clone());
        assert_eq!(report, again);
    }

    #[test]
    fn test_failed_rules_heaviest_first() {
        let results: BTreeMap<_, _> = [
            result("accuracy_null_clusters", 2, false),
            result("accuracy_negative_amounts", 5, false),
            result("validity_schema_type", 1, true),
        ]
        .into_iter()
        .collect();
        let report = aggregate(results);
        let failed: Vec<_> = report
            .failed_rules()
            .into_iter()
            .map(|r| r.rule_id.as_str())
            .collect();
        assert_eq!(failed, vec!["accuracy_negative_amounts", "accuracy_null_clusters"]);
    }

    #[test]
    fn test_report_serializes_dimension_names() {
        let results: BTreeMap<_, _> = [result("timeliness_dataset_age", 4, true)]
            .into_iter()
            .collect();
        let json = serde_json::to_value(aggregate(results)).unwrap();
        assert_eq!(json["dimension_scores"]["timeliness"], 100.0);
        assert_eq!(
            json["rule_results"]["timeliness_dataset_age"]["dimension"],
            "timeliness"
        );
    }
}
