use std::collections::HashMap;
use std::env;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::llm::ProviderKind;
use crate::models::AnalysisDimension;

#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub openai_model: String,
    pub gemini_model: String,
    pub default_provider: ProviderKind,
    pub provider_overrides: HashMap<AnalysisDimension, ProviderKind>,
    pub database_path: String,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub concurrency_limit: usize,
    pub highlights_per_section: usize,
    pub total_failure_policy: TotalFailurePolicy,
    pub api_host: String,
    pub api_port: u16,
}

/// What the orchestrator does when every requested dimension fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TotalFailurePolicy {
    /// Return the all-failed report like any other.
    #[default]
    Record,
    /// Record the report, then fail the run with `Error::TotalFailure`.
    Reject,
}

impl std::str::FromStr for TotalFailurePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "record" => Ok(TotalFailurePolicy::Record),
            "reject" => Ok(TotalFailurePolicy::Reject),
            other => Err(Error::Config(format!(
                "TOTAL_FAILURE_POLICY must be 'record' or 'reject', got '{}'",
                other
            ))),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let openai_api_key = non_empty("OPENAI_API_KEY");
        let gemini_api_key = non_empty("GEMINI_API_KEY");

        if openai_api_key.is_none() && gemini_api_key.is_none() {
            return Err(Error::Config(
                "Set OPENAI_API_KEY or GEMINI_API_KEY (or both)".to_string(),
            ));
        }

        let default_provider = match non_empty("DEFAULT_PROVIDER") {
            Some(value) => value.parse()?,
            None if gemini_api_key.is_some() => ProviderKind::Gemini,
            None => ProviderKind::OpenAI,
        };

        let mut provider_overrides = HashMap::new();
        for dimension in AnalysisDimension::ALL {
            let key = format!("PROVIDER_{}", dimension.key().to_uppercase());
            if let Some(value) = non_empty(&key) {
                provider_overrides.insert(dimension, value.parse()?);
            }
        }

        let parse_or = |key: &str, default: u64| -> u64 {
            non_empty(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };

        let total_failure_policy = match non_empty("TOTAL_FAILURE_POLICY") {
            Some(value) => value.parse()?,
            None => TotalFailurePolicy::default(),
        };

        let config = Self {
            openai_api_key,
            gemini_api_key,
            openai_model: non_empty("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            gemini_model: non_empty("GEMINI_MODEL")
                .unwrap_or_else(|| "gemini-2.0-flash".to_string()),
            default_provider,
            provider_overrides,
            database_path: non_empty("DATABASE_PATH")
                .unwrap_or_else(|| "startupai.db".to_string()),
            request_timeout: Duration::from_secs(parse_or("REQUEST_TIMEOUT_SECS", 60)),
            max_retries: narrow("MAX_RETRIES", parse_or("MAX_RETRIES", 2))?,
            retry_base_delay: Duration::from_millis(parse_or("RETRY_BASE_DELAY_MS", 500)),
            concurrency_limit: narrow("CONCURRENCY_LIMIT", parse_or("CONCURRENCY_LIMIT", 7).max(1))?,
            highlights_per_section: narrow(
                "HIGHLIGHTS_PER_SECTION",
                parse_or("HIGHLIGHTS_PER_SECTION", 2),
            )?,
            total_failure_policy,
            api_host: non_empty("API_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            api_port: narrow("API_PORT", parse_or("API_PORT", 8000))?,
        };

        config.check_routing()?;
        Ok(config)
    }

    /// Every provider that routing can select must have a key.
    fn check_routing(&self) -> Result<()> {
        let selected = std::iter::once(self.default_provider)
            .chain(self.provider_overrides.values().copied());
        for kind in selected {
            if !self.has_key_for(kind) {
                return Err(Error::Config(format!(
                    "Provider '{}' is selected but its API key is not set",
                    kind
                )));
            }
        }
        Ok(())
    }

    pub fn has_key_for(&self, kind: ProviderKind) -> bool {
        match kind {
            ProviderKind::OpenAI => self.openai_api_key.is_some(),
            ProviderKind::Gemini => self.gemini_api_key.is_some(),
        }
    }

    pub fn provider_for(&self, dimension: AnalysisDimension) -> ProviderKind {
        self.provider_overrides
            .get(&dimension)
            .copied()
            .unwrap_or(self.default_provider)
    }
}

fn narrow<T: TryFrom<u64>>(key: &str, value: u64) -> Result<T> {
    T::try_from(value)
        .map_err(|_| Error::Config(format!("{} is out of range: {}", key, value)))
}

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub concurrency_limit: usize,
    pub highlights_per_section: usize,
    pub total_failure_policy: TotalFailurePolicy,
    pub show_progress: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(60),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(500),
            concurrency_limit: AnalysisDimension::ALL.len(),
            highlights_per_section: 2,
            total_failure_policy: TotalFailurePolicy::Record,
            show_progress: false,
        }
    }
}

impl From<&Config> for OrchestratorConfig {
    fn from(config: &Config) -> Self {
        Self {
            request_timeout: config.request_timeout,
            max_retries: config.max_retries,
            retry_base_delay: config.retry_base_delay,
            concurrency_limit: config.concurrency_limit,
            highlights_per_section: config.highlights_per_section,
            total_failure_policy: config.total_failure_policy,
            show_progress: false,
        }
    }
}
