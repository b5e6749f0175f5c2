use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::llm::{GeminiProvider, LLMProvider, OpenAIProvider, ProviderKind};
use crate::models::AnalysisDimension;

/// Which provider serves which dimension.
#[derive(Clone)]
pub struct ProviderRouting {
    default: Arc<dyn LLMProvider>,
    overrides: HashMap<AnalysisDimension, Arc<dyn LLMProvider>>,
}

impl ProviderRouting {
    pub fn new(default: Arc<dyn LLMProvider>) -> Self {
        Self {
            default,
            overrides: HashMap::new(),
        }
    }

    pub fn with_override(
        mut self,
        dimension: AnalysisDimension,
        provider: Arc<dyn LLMProvider>,
    ) -> Self {
        self.overrides.insert(dimension, provider);
        self
    }

    pub fn provider_for(&self, dimension: AnalysisDimension) -> Arc<dyn LLMProvider> {
        self.overrides
            .get(&dimension)
            .cloned()
            .unwrap_or_else(|| self.default.clone())
    }

    pub fn default_provider(&self) -> Arc<dyn LLMProvider> {
        self.default.clone()
    }

    /// Builds one client per configured provider kind and routes dimensions per the config.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut clients: HashMap<ProviderKind, Arc<dyn LLMProvider>> = HashMap::new();

        if let Some(key) = &config.openai_api_key {
            let provider = OpenAIProvider::new(key.clone(), Some(config.openai_model.clone()))?;
            clients.insert(ProviderKind::OpenAI, Arc::new(provider));
        }
        if let Some(key) = &config.gemini_api_key {
            let provider = GeminiProvider::new(key.clone(), Some(config.gemini_model.clone()))?;
            clients.insert(ProviderKind::Gemini, Arc::new(provider));
        }

        let client_for = |kind: ProviderKind| -> Result<Arc<dyn LLMProvider>> {
            clients.get(&kind).cloned().ok_or_else(|| {
                Error::Config(format!("Provider '{}' has no API key configured", kind))
            })
        };

        let mut routing = Self::new(client_for(config.default_provider)?);
        for (dimension, kind) in &config.provider_overrides {
            routing = routing.with_override(*dimension, client_for(*kind)?);
        }

        tracing::debug!(
            "Routing: default={}, overrides={}",
            config.default_provider,
            config.provider_overrides.len()
        );
        Ok(routing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_from_config() {
        let config = Config::from_lookup(|key| match key {
            "OPENAI_API_KEY" => Some("o".to_string()),
            "GEMINI_API_KEY" => Some("g".to_string()),
            "DEFAULT_PROVIDER" => Some("openai".to_string()),
            "PROVIDER_MARKET_RESEARCH" => Some("gemini".to_string()),
            _ => None,
        })
        .unwrap();

        let routing = ProviderRouting::from_config(&config).unwrap();
        assert_eq!(routing.provider_for(AnalysisDimension::MarketResearch).name(), "Gemini");
        assert_eq!(routing.provider_for(AnalysisDimension::BusinessModel).name(), "OpenAI");
    }
}
