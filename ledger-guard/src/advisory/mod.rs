//! Plain-English remediation narratives for a compliance report.
//!
//! The advisory layer sits after scoring and only ever sees the report and the
//! metadata profile. It never changes a score. [`advise_or_fallback`] is the
//! boundary the pipeline calls: it always returns an [`Advice`], substituting a
//! fixed fallback when no advisor is configured or the advisor fails.
//!
//! The hosted client, [`GeminiAdvisor`], is compiled with the `advisory`
//! feature.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::profiler::DatasetProfile;
use crate::scoring::ComplianceReport;

mod config;
mod error;
#[cfg(feature = "advisory")]
mod gemini;
pub mod prompt;

pub use config::{AdvisoryConfig, API_KEY_VAR, DEFAULT_MODEL, MODEL_VAR};
pub use error::{AdvisoryError, AdvisoryResult};
#[cfg(feature = "advisory")]
pub use gemini::GeminiAdvisor;
pub use prompt::parse_advice;

/// One suggested fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemediationStep {
    pub issue: String,
    pub action: String,
    /// Free text, usually "High", "Medium" or "Low"
    #[serde(default)]
    pub priority: String,
}

/// Narrative assessment of a compliance report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advice {
    pub executive_summary: String,
    pub risk_assessment: String,
    #[serde(default)]
    pub remediation_steps: Vec<RemediationStep>,
}

impl Advice {
    /// Returned when no advisor is configured.
    pub fn skipped() -> Self {
        Self {
            executive_summary: "AI analysis skipped (GOOGLE_API_KEY not set).".to_string(),
            risk_assessment: "Configure the API key to enable GenAI insights.".to_string(),
            remediation_steps: Vec::new(),
        }
    }

    /// Returned when the advisor failed; carries the error text.
    pub fn failed(error: &AdvisoryError) -> Self {
        Self {
            executive_summary: "AI analysis failed temporarily.".to_string(),
            risk_assessment: error.to_string(),
            remediation_steps: Vec::new(),
        }
    }
}

/// Produces a narrative from scores and metadata.
#[async_trait]
pub trait Advisor: Send + Sync {
    async fn advise(
        &self,
        report: &ComplianceReport,
        profile: &DatasetProfile,
    ) -> AdvisoryResult<Advice>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}

/// Asks `advisor` for a narrative, falling back instead of failing.
pub async fn advise_or_fallback(
    advisor: Option<&dyn Advisor>,
    report: &ComplianceReport,
    profile: &DatasetProfile,
) -> Advice {
    let Some(advisor) = advisor else {
        info!("No advisor configured, skipping narrative");
        return Advice::skipped();
    };

    match advisor.advise(report, profile).await {
        Ok(advice) => {
            info!(
                advisor = advisor.name(),
                steps = advice.remediation_steps.len(),
                "Received remediation narrative"
            );
            advice
        }
        Err(e) => {
            warn!(advisor = advisor.name(), error = %e, "Advisory request failed, using fallback");
            Advice::failed(&e)
        }
    }
}

/// Builds the advisor described by `config`.
///
/// Without the `advisory` feature no client is available and `None` is
/// returned, so the pipeline reports the skipped fallback.
pub fn advisor_from_config(config: Option<AdvisoryConfig>) -> AdvisoryResult<Option<Box<dyn Advisor>>> {
    let Some(config) = config else {
        return Ok(None);
    };

    #[cfg(feature = "advisory")]
    {
        Ok(Some(Box::new(GeminiAdvisor::new(config)?)))
    }

    #[cfg(not(feature = "advisory"))]
    {
        warn!(
            model = config.model(),
            "Advisory key present but ledger-guard was built without the `advisory` feature"
        );
        Ok(None)
    }
}
