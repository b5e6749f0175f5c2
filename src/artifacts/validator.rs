use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use crate::analysis::RetryPolicy;
use crate::error::{Error, Result};
use crate::llm::parser::parse_verdict;
use crate::llm::{prompts, LLMProvider};
use crate::models::{BusinessModelDescription, ValidationResult, Verdict};

/// Critiques a business model with a single provider.
pub struct BusinessModelValidator {
    provider: Arc<dyn LLMProvider>,
    retry: RetryPolicy,
    timeout: Duration,
}

impl BusinessModelValidator {
    pub fn new(provider: Arc<dyn LLMProvider>, retry: RetryPolicy, timeout: Duration) -> Self {
        Self {
            provider,
            retry,
            timeout,
        }
    }

    pub async fn validate(&self, description: &BusinessModelDescription) -> Result<ValidationResult> {
        if description.is_empty() {
            return Err(Error::InvalidRequest(
                "Business model description has no content".to_string(),
            ));
        }

        let prompt = prompts::build_validation(description);
        tracing::info!("Validating business model with {}", self.provider.name());

        let (result, attempts) = self
            .retry
            .complete(self.provider.as_ref(), &prompt, self.timeout)
            .await;
        let critique = result.map_err(|e| {
            tracing::warn!("Validation failed after {} attempt(s): {}", attempts, e);
            Error::Provider(e)
        })?;

        let verdict = parse_verdict(&critique);
        Ok(ValidationResult {
            feasible: verdict == Verdict::Feasible,
            verdict,
            critique,
            provider: self.provider.name().to_string(),
            validated_at: Utc::now(),
        })
    }
}
