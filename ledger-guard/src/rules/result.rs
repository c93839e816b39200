//! Rule outcomes and the dimensions they are grouped by.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GuardError;

/// A compliance dimension. Every rule id starts with its dimension name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Completeness,
    Validity,
    Accuracy,
    Uniqueness,
    Consistency,
    Timeliness,
    Integrity,
    Security,
}

impl Dimension {
    pub const ALL: [Dimension; 8] = [
        Dimension::Completeness,
        Dimension::Validity,
        Dimension::Accuracy,
        Dimension::Uniqueness,
        Dimension::Consistency,
        Dimension::Timeliness,
        Dimension::Integrity,
        Dimension::Security,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Completeness => "completeness",
            Dimension::Validity => "validity",
            Dimension::Accuracy => "accuracy",
            Dimension::Uniqueness => "uniqueness",
            Dimension::Consistency => "consistency",
            Dimension::Timeliness => "timeliness",
            Dimension::Integrity => "integrity",
            Dimension::Security => "security",
        }
    }

    /// Dimension named by the prefix of `rule_id` before its first underscore.
    pub fn of_rule(rule_id: &str) -> Option<Self> {
        let prefix = rule_id.split('_').next()?;
        prefix.parse().ok()
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dimension::ALL
            .into_iter()
            .find(|dimension| dimension.as_str() == s)
            .ok_or_else(|| GuardError::Configuration(format!("Unknown dimension '{s}'")))
    }
}

/// Outcome of one catalog rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleResult {
    pub rule_id: String,
    pub dimension: Dimension,
    /// 0-100
    pub score: f64,
    pub weight: u32,
    pub passed: bool,
    pub details: String,
}
