//! Client for the hosted Gemini text-generation API.
//!
//! One `generateContent` call per analysis, retried after transient failures.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::prompt::{parse_advice, user_message, SYSTEM_PROMPT};
use super::{Advice, Advisor, AdvisoryConfig, AdvisoryError, AdvisoryResult};
use crate::profiler::DatasetProfile;
use crate::scoring::ComplianceReport;

/// Longest pause between attempts, whatever the provider asks for.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// HTTP client for the Gemini `generateContent` API.
#[derive(Clone)]
pub struct GeminiAdvisor {
    config: Arc<AdvisoryConfig>,
    client: Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().map(|p| p.text.as_str()).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

impl GeminiAdvisor {
    /// Create a new advisor with the given configuration.
    pub fn new(config: AdvisoryConfig) -> AdvisoryResult<Self> {
        if config.api_key().is_blank() {
            return Err(AdvisoryError::Configuration {
                message: "API key is empty".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AdvisoryError::Configuration {
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    pub fn config(&self) -> &AdvisoryConfig {
        &self.config
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint(),
            self.config.model()
        )
    }

    /// Sends `message`, retrying transient failures up to the configured limit.
    async fn generate_with_retry(&self, message: &str) -> AdvisoryResult<String> {
        let mut retry_count = 0;
        loop {
            match self.generate(message).await {
                Err(e) if e.is_retryable() && retry_count < self.config.max_retries() => {
                    let backoff = calculate_backoff(retry_count, e.retry_after());
                    warn!(
                        error = %e,
                        retry_count,
                        backoff_ms = backoff.as_millis() as u64,
                        "Retryable advisory error"
                    );
                    tokio::time::sleep(backoff).await;
                    retry_count += 1;
                }
                result => return result,
            }
        }
    }

    async fn generate(&self, message: &str) -> AdvisoryResult<String> {
        let request = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: SYSTEM_PROMPT,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: message }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature(),
            },
        };

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", self.config.api_key().expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| AdvisoryError::Network {
                message: e.to_string(),
            })?;

        let body: GenerateResponse = self.handle_response(response).await?;
        body.text().ok_or_else(|| AdvisoryError::InvalidReply {
            message: "Response contained no text".to_string(),
        })
    }

    /// Handle a successful or error response.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> AdvisoryResult<T> {
        let status = response.status();

        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| AdvisoryError::Serialization {
                    message: e.to_string(),
                })
        } else {
            self.handle_error_response(response).await
        }
    }

    /// Convert an error response to an AdvisoryError.
    async fn handle_error_response<T>(&self, response: reqwest::Response) -> AdvisoryResult<T> {
        let status = response.status();
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());

        let body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 | 403 => Err(AdvisoryError::Authentication { message: body }),
            429 => Err(AdvisoryError::RateLimited {
                retry_after_secs: retry_after,
            }),
            code => Err(AdvisoryError::ServerError {
                status: code,
                message: body,
            }),
        }
    }
}

/// `retry_after` seconds (1 by default) doubled per earlier retry, capped.
fn calculate_backoff(retry_count: u32, retry_after: Option<u64>) -> Duration {
    let base_delay = retry_after.unwrap_or(1);
    let backoff = Duration::from_secs(base_delay.saturating_mul(1 << retry_count.min(5)));
    backoff.min(MAX_BACKOFF)
}

impl std::fmt::Debug for GeminiAdvisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiAdvisor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Advisor for GeminiAdvisor {
    #[instrument(skip_all, fields(model = %self.config.model()))]
    async fn advise(
        &self,
        report: &ComplianceReport,
        profile: &DatasetProfile,
    ) -> AdvisoryResult<Advice> {
        let message = user_message(report, profile)?;
        debug!(prompt_bytes = message.len(), "Requesting remediation narrative");

        let reply = self.generate_with_retry(&message).await?;
        parse_advice(&reply)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{now, profile, text};
    use crate::rules::RuleEvaluator;
    use crate::scoring::aggregate;

    fn make_test_config() -> AdvisoryConfig {
        AdvisoryConfig::new("test-api-key")
            .with_endpoint("http://localhost:1")
            .with_timeout(Duration::from_millis(200))
    }

    #[test]
    fn test_blank_key_rejected() {
        let err = GeminiAdvisor::new(AdvisoryConfig::new("  ")).unwrap_err();
        assert!(matches!(err, AdvisoryError::Configuration { .. }));
    }

    #[test]
    fn test_url() {
        let advisor = GeminiAdvisor::new(make_test_config()).unwrap();
        assert_eq!(
            advisor.url(),
            "http://localhost:1/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_shape() {
        let request = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: "sys" }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: "hello" }],
            }],
            generation_config: GenerationConfig { temperature: 0.2 },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "sys");
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["contents"][0]["role"], "user");
        assert!(json["generationConfig"]["temperature"].as_f64().is_some());
    }

    #[test]
    fn test_response_text() {
        let body: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "{\"a\""}, {"text": ": 1}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(body.text().as_deref(), Some("{\"a\": 1}"));

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(empty.text().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let advisor = GeminiAdvisor::new(make_test_config()).unwrap();
        let err = advisor.generate("hello").await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_calculate_backoff() {
        assert_eq!(calculate_backoff(0, None), Duration::from_secs(1));
        assert_eq!(calculate_backoff(2, None), Duration::from_secs(4));
        assert_eq!(calculate_backoff(0, Some(5)), Duration::from_secs(5));
        assert_eq!(calculate_backoff(1, Some(120)), MAX_BACKOFF);
        assert_eq!(calculate_backoff(40, Some(1)), MAX_BACKOFF);
    }

    #[tokio::test]
    async fn test_advise_retries_then_reports_network_error() {
        let dataset = profile(3, vec![text("transaction_id", 0.0)]);
        let report = aggregate(RuleEvaluator::new().evaluate_at(&dataset, now()));
        let advisor = GeminiAdvisor::new(make_test_config().with_max_retries(1)).unwrap();

        let started = std::time::Instant::now();
        let err = advisor.advise(&report, &dataset).await.unwrap_err();
        assert!(matches!(err, AdvisoryError::Network { .. }));
        // One pause of the default one-second backoff before the second attempt
        assert!(started.elapsed() >= Duration::from_secs(1));
    }
}
