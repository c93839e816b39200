//! Settings for the hosted advisor, read from the environment or built in code.

use std::time::Duration;

use crate::security::SecureString;

/// Environment variable holding the provider API key.
pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";
/// Environment variable overriding the model name.
pub const MODEL_VAR: &str = "LEDGER_GUARD_ADVISORY_MODEL";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// Settings for the hosted text-generation advisor.
#[derive(Debug, Clone)]
pub struct AdvisoryConfig {
    api_key: SecureString,
    model: String,
    endpoint: String,
    temperature: f32,
    timeout: Duration,
    max_retries: u32,
}

impl AdvisoryConfig {
    pub fn new(api_key: impl Into<SecureString>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(60),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Reads the key and optional model override from the environment.
    ///
    /// Returns `None` when the key is unset or blank.
    pub fn from_env() -> Option<Self> {
        let api_key = SecureString::new(std::env::var(API_KEY_VAR).ok()?);
        if api_key.is_blank() {
            return None;
        }

        let mut config = Self::new(api_key);
        if let Ok(model) = std::env::var(MODEL_VAR) {
            if !model.trim().is_empty() {
                config = config.with_model(model.trim());
            }
        }
        Some(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Extra attempts after a transient failure (network, 429, 5xx).
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn api_key(&self) -> &SecureString {
        &self.api_key
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}
