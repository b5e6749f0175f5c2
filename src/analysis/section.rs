use std::time::Duration;
use tokio::time::sleep;

use crate::config::OrchestratorConfig;
use crate::llm::parser::parse_section;
use crate::llm::prompts;
use crate::llm::{LLMProvider, ProviderError};
use crate::models::{AnalysisDimension, SectionOutcome, SectionResult};

/// Bounded retries with exponential backoff for transient provider failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Calls the provider until it succeeds, fails permanently, or retries run out.
    /// Returns the final outcome and the number of attempts made.
    pub async fn complete(
        &self,
        provider: &dyn LLMProvider,
        prompt: &str,
        timeout: Duration,
    ) -> (Result<String, ProviderError>, u32) {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = match tokio::time::timeout(timeout, provider.complete(prompt, timeout)).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout {
                    provider: provider.name().to_string(),
                    timeout,
                }),
            };

            match result {
                Ok(text) => return (Ok(text), attempt),
                Err(e) if e.is_transient() && attempt <= self.max_retries => {
                    let delay = self.delay_for(attempt);
                    tracing::warn!(
                        "{} attempt {} failed ({}), retrying in {:?}",
                        provider.name(),
                        attempt,
                        e,
                        delay
                    );
                    sleep(delay).await;
                }
                Err(e) => return (Err(e), attempt),
            }
        }
    }
}

/// Produces the section for one dimension. Never fails: provider errors
/// become `Failed` sections.
#[derive(Debug, Clone)]
pub struct SectionAnalyzer {
    retry: RetryPolicy,
    timeout: Duration,
}

impl SectionAnalyzer {
    pub fn new(retry: RetryPolicy, timeout: Duration) -> Self {
        Self { retry, timeout }
    }

    pub async fn analyze(
        &self,
        dimension: AnalysisDimension,
        idea: &str,
        provider: &dyn LLMProvider,
    ) -> SectionResult {
        let prompt = prompts::build(dimension, idea);
        tracing::debug!("Analyzing {} with {}", dimension, provider.name());

        let (result, attempts) = self.retry.complete(provider, &prompt, self.timeout).await;

        let outcome = match result {
            Ok(content) => {
                let parsed = parse_section(&content);
                SectionOutcome::Succeeded {
                    content,
                    shape: parsed.shape,
                    highlights: parsed.highlights,
                }
            }
            Err(e) => {
                tracing::warn!("{} failed after {} attempt(s): {}", dimension, attempts, e);
                SectionOutcome::Failed {
                    error: e.to_string(),
                    transient: e.is_transient(),
                }
            }
        };

        SectionResult {
            dimension,
            provider: provider.name().to_string(),
            attempts,
            outcome,
        }
    }
}

impl From<&OrchestratorConfig> for SectionAnalyzer {
    fn from(config: &OrchestratorConfig) -> Self {
        let retry = RetryPolicy {
            max_retries: config.max_retries,
            base_delay: config.retry_base_delay,
            ..RetryPolicy::default()
        };
        Self::new(retry, config.request_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Scripted {
        responses: Mutex<Vec<Result<String, ProviderError>>>,
        calls: Mutex<u32>,
    }

    impl Scripted {
        fn new(mut responses: Vec<Result<String, ProviderError>>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl LLMProvider for Scripted {
        async fn complete(&self, _prompt: &str, _timeout: Duration) -> Result<String, ProviderError> {
            *self.calls.lock().unwrap() += 1;
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok("- fallback".to_string()))
        }

        fn name(&self) -> &str {
            "Scripted"
        }
    }

    fn rate_limited() -> ProviderError {
        ProviderError::RateLimited {
            provider: "Scripted".to_string(),
        }
    }

    fn analyzer() -> SectionAnalyzer {
        SectionAnalyzer::new(
            RetryPolicy {
                max_retries: 2,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(5),
            },
            Duration::from_secs(1),
        )
    }

    #[test]
    fn test_backoff_is_exponential_and_capped() {
        let policy = RetryPolicy {
            max_retries: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(350),
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(350));
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let provider = Scripted::new(vec![
            Err(rate_limited()),
            Err(rate_limited()),
            Ok("- works".to_string()),
        ]);

        let section = analyzer()
            .analyze(AnalysisDimension::MarketResearch, "idea", &provider)
            .await;

        assert!(section.succeeded());
        assert_eq!(section.attempts, 3);
        assert_eq!(section.highlights(), &["works".to_string()]);
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_retry_bound_is_respected() {
        let provider = Scripted::new(vec![
            Err(rate_limited()),
            Err(rate_limited()),
            Err(rate_limited()),
            Ok("- too late".to_string()),
        ]);

        let section = analyzer()
            .analyze(AnalysisDimension::MarketResearch, "idea", &provider)
            .await;

        assert!(!section.succeeded());
        assert_eq!(section.attempts, 3);
        assert_eq!(provider.calls(), 3);
        assert!(matches!(section.outcome, SectionOutcome::Failed { transient: true, .. }));
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let provider = Scripted::new(vec![Err(ProviderError::Authentication {
            provider: "Scripted".to_string(),
            status: 401,
        })]);

        let section = analyzer()
            .analyze(AnalysisDimension::RiskAssessment, "idea", &provider)
            .await;

        assert_eq!(provider.calls(), 1);
        assert!(section.error().unwrap().contains("credentials"));
        assert!(section.content().is_none());
    }

    struct Stalled;

    #[async_trait]
    impl LLMProvider for Stalled {
        async fn complete(&self, _prompt: &str, _timeout: Duration) -> Result<String, ProviderError> {
            sleep(Duration::from_secs(30)).await;
            Ok("never".to_string())
        }

        fn name(&self) -> &str {
            "Stalled"
        }
    }

    #[tokio::test]
    async fn test_timeout_counts_as_transient() {
        let analyzer = SectionAnalyzer::new(
            RetryPolicy {
                max_retries: 1,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(1),
            },
            Duration::from_millis(20),
        );

        let section = analyzer
            .analyze(AnalysisDimension::GoToMarket, "idea", &Stalled)
            .await;

        assert_eq!(section.attempts, 2);
        assert!(matches!(section.outcome, SectionOutcome::Failed { transient: true, .. }));
    }
}
