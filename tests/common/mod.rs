#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use startupai::config::OrchestratorConfig;
use startupai::{HistoryStore, LLMProvider, ProviderError, ProviderRouting, StartupAnalyst};

pub const ANALYSIS_TEXT: &str = "Demand looks steady across urban areas.\n\n\
## Key takeaways\n\
- Urban commuters are the first segment\n\
- Subscription pricing fits the usage pattern\n\
- Hardware costs dominate early spend\n";

/// Answers every prompt with the same text after an optional delay.
pub struct Canned {
    pub name: String,
    pub text: String,
    pub delay: Duration,
}

impl Canned {
    pub fn new(name: &str) -> Arc<Self> {
        Self::delayed(name, Duration::ZERO)
    }

    pub fn delayed(name: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            text: ANALYSIS_TEXT.to_string(),
            delay,
        })
    }
}

#[async_trait]
impl LLMProvider for Canned {
    async fn complete(&self, _prompt: &str, _timeout: Duration) -> Result<String, ProviderError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.text.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Always fails with the given error.
pub struct Failing(pub ProviderError);

impl Failing {
    pub fn permanent() -> Arc<Self> {
        Arc::new(Self(ProviderError::InvalidRequest {
            provider: "Failing".to_string(),
            status: 400,
            message: "model not found".to_string(),
        }))
    }

    pub fn rate_limited() -> Arc<Self> {
        Arc::new(Self(ProviderError::RateLimited {
            provider: "Failing".to_string(),
        }))
    }
}

#[async_trait]
impl LLMProvider for Failing {
    async fn complete(&self, _prompt: &str, _timeout: Duration) -> Result<String, ProviderError> {
        Err(self.0.clone())
    }

    fn name(&self) -> &str {
        "Failing"
    }
}

/// Fails transiently `failures` times, then succeeds.
pub struct Flaky {
    failures: u32,
    calls: AtomicU32,
}

impl Flaky {
    pub fn new(failures: u32) -> Arc<Self> {
        Arc::new(Self {
            failures,
            calls: AtomicU32::new(0),
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LLMProvider for Flaky {
    async fn complete(&self, _prompt: &str, _timeout: Duration) -> Result<String, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.failures {
            Err(ProviderError::Unavailable {
                provider: "Flaky".to_string(),
                status: 503,
                message: "overloaded".to_string(),
            })
        } else {
            Ok(ANALYSIS_TEXT.to_string())
        }
    }

    fn name(&self) -> &str {
        "Flaky"
    }
}

/// Fast retries so tests don't sleep through real backoff.
pub fn test_config() -> OrchestratorConfig {
    OrchestratorConfig {
        request_timeout: Duration::from_secs(5),
        retry_base_delay: Duration::from_millis(1),
        ..OrchestratorConfig::default()
    }
}

pub fn analyst(routing: ProviderRouting) -> StartupAnalyst {
    analyst_with(routing, test_config())
}

pub fn analyst_with(routing: ProviderRouting, config: OrchestratorConfig) -> StartupAnalyst {
    let history = HistoryStore::in_memory().expect("in-memory history");
    StartupAnalyst::new(Arc::new(history), routing, config)
}
