use std::time::Duration;

use crate::error::AdvisorError;

pub const DEFAULT_BASE: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "mistralai/magistral-medium-2506";
pub const DEFAULT_MAX_TOKENS: u32 = 300;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";
pub const BASE_ENV: &str = "CLOPIDOGREL_ADVISOR_BASE";
pub const MODEL_ENV: &str = "CLOPIDOGREL_ADVISOR_MODEL";
pub const MAX_TOKENS_ENV: &str = "CLOPIDOGREL_ADVISOR_MAX_TOKENS";
pub const TIMEOUT_ENV: &str = "CLOPIDOGREL_ADVISOR_TIMEOUT_SECS";

/// Settings for the hosted explanation model, fixed at start-up.
#[derive(Clone)]
pub struct ExplanationConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl std::fmt::Debug for ExplanationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplanationConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for ExplanationConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ExplanationConfig {
    pub fn from_env() -> Result<Self, AdvisorError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AdvisorError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();
        if let Some(base) = value(BASE_ENV) {
            config.base_url = base;
        }
        config.api_key = value(API_KEY_ENV);
        if let Some(model) = value(MODEL_ENV) {
            config.model = model;
        }
        if let Some(raw) = value(MAX_TOKENS_ENV) {
            config.max_tokens = raw.parse::<u32>().ok().filter(|v| *v > 0).ok_or_else(|| {
                AdvisorError::InvalidArgument(format!(
                    "{MAX_TOKENS_ENV} must be a positive integer, got \"{raw}\""
                ))
            })?;
        }
        if let Some(raw) = value(TIMEOUT_ENV) {
            let secs = raw.parse::<u64>().ok().filter(|v| *v > 0).ok_or_else(|| {
                AdvisorError::InvalidArgument(format!(
                    "{TIMEOUT_ENV} must be a positive number of seconds, got \"{raw}\""
                ))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
