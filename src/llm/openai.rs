use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::Result;
use crate::llm::prompts::SYSTEM_PROMPT;
use crate::llm::provider::{LLMProvider, ProviderError};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const PROVIDER_NAME: &str = "OpenAI";

pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

impl OpenAIProvider {
    pub fn new(api_key: String, model: Option<String>) -> Result<Self> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            api_key,
            model: model.unwrap_or_else(|| "gpt-4o-mini".to_string()),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: 2048,
            temperature: 0.7,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn complete(&self, prompt: &str, timeout: Duration) -> std::result::Result<String, ProviderError> {
        tracing::debug!("Sending {} chars to OpenAI ({})", prompt.len(), self.model);

        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(timeout)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER_NAME, e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(PROVIDER_NAME, status, body));
        }

        let result: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::from_reqwest(PROVIDER_NAME, e, timeout)
            } else {
                ProviderError::MalformedResponse {
                    provider: PROVIDER_NAME.to_string(),
                    message: format!("Failed to parse OpenAI response: {}", e),
                }
            }
        })?;

        if let Some(error) = result.error {
            return Err(ProviderError::MalformedResponse {
                provider: PROVIDER_NAME.to_string(),
                message: error.message,
            });
        }

        let text = result
            .choices
            .into_iter()
            .filter_map(|c| c.message.content)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(ProviderError::MalformedResponse {
                provider: PROVIDER_NAME.to_string(),
                message: "Empty response from OpenAI".to_string(),
            });
        }

        Ok(text)
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(url: &str) -> OpenAIProvider {
        OpenAIProvider::new("test-key".to_string(), None)
            .unwrap()
            .with_base_url(url)
    }

    #[tokio::test]
    async fn test_complete_returns_message_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices": [{"message": {"role": "assistant", "content": "- Large market"}}]}"#)
            .create_async()
            .await;

        let text = provider(&server.url())
            .complete("prompt", Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(text, "- Large market");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rate_limit_is_transient() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body("slow down")
            .create_async()
            .await;

        let err = provider(&server.url())
            .complete("prompt", Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::RateLimited { .. }));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_auth_failure_is_permanent() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .create_async()
            .await;

        let err = provider(&server.url())
            .complete("prompt", Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Authentication { status: 401, .. }));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_empty_choices_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let err = provider(&server.url())
            .complete("prompt", Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::MalformedResponse { .. }));
    }
}
