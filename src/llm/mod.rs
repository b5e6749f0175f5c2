pub mod provider;
pub mod openai;
pub mod gemini;
pub mod prompts;
pub mod parser;

pub use provider::{LLMProvider, ProviderError, ProviderKind};
pub use openai::OpenAIProvider;
pub use gemini::GeminiProvider;
