use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// A hosted text-completion backend. Each call is a single attempt.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn complete(&self, prompt: &str, timeout: Duration) -> Result<String, ProviderError>;
    fn name(&self) -> &str;
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("{provider} rate limit exceeded")]
    RateLimited { provider: String },

    #[error("{provider} did not respond within {timeout:?}")]
    Timeout { provider: String, timeout: Duration },

    #[error("{provider} network error: {message}")]
    Network { provider: String, message: String },

    #[error("{provider} unavailable ({status}): {message}")]
    Unavailable {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("{provider} rejected the credentials ({status})")]
    Authentication { provider: String, status: u16 },

    #[error("{provider} rejected the request ({status}): {message}")]
    InvalidRequest {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("{provider} returned an unusable response: {message}")]
    MalformedResponse { provider: String, message: String },
}

impl ProviderError {
    /// Transient failures may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimited { .. }
                | ProviderError::Timeout { .. }
                | ProviderError::Network { .. }
                | ProviderError::Unavailable { .. }
        )
    }

    pub fn from_status(provider: &str, status: StatusCode, body: String) -> Self {
        let provider = provider.to_string();
        match status.as_u16() {
            429 => ProviderError::RateLimited { provider },
            401 | 403 => ProviderError::Authentication {
                provider,
                status: status.as_u16(),
            },
            408 | 500..=599 => ProviderError::Unavailable {
                provider,
                status: status.as_u16(),
                message: body,
            },
            code => ProviderError::InvalidRequest {
                provider,
                status: code,
                message: body,
            },
        }
    }

    pub fn from_reqwest(provider: &str, error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            ProviderError::Timeout {
                provider: provider.to_string(),
                timeout,
            }
        } else {
            ProviderError::Network {
                provider: provider.to_string(),
                message: error.to_string(),
            }
        }
    }
}

/// Configuration-level choice of backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAI,
    Gemini,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::OpenAI => write!(f, "openai"),
            ProviderKind::Gemini => write!(f, "gemini"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> crate::error::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "gpt" => Ok(ProviderKind::OpenAI),
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            other => Err(crate::error::Error::Config(format!(
                "Unknown provider: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let transient = [429u16, 408, 500, 502, 503];
        for code in transient {
            let status = StatusCode::from_u16(code).unwrap();
            assert!(
                ProviderError::from_status("OpenAI", status, String::new()).is_transient(),
                "{} should be transient",
                code
            );
        }

        let permanent = [400u16, 401, 403, 404, 422];
        for code in permanent {
            let status = StatusCode::from_u16(code).unwrap();
            assert!(
                !ProviderError::from_status("Gemini", status, String::new()).is_transient(),
                "{} should be permanent",
                code
            );
        }
    }

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAI);
        assert_eq!("gemini".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert!("claude".parse::<ProviderKind>().is_err());
    }
}
